//! Opaque upstream records and pagination primitives.
//!
//! The remote backends are schemaless at the client: a record is just a
//! JSON object, and attribute names vary between deployments. Typed
//! access happens later through the field resolver.

use serde_json::{Map, Value};

/// An opaque record from either upstream backend.
pub type Record = Map<String, Value>;

/// One page of records as returned by a remote collection.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<Record>,
    /// Total count reported by the remote, when it reports one. May be
    /// stale or inconsistent across pages.
    pub total: Option<u64>,
}

/// Safety ceilings for exhaustive pagination.
#[derive(Debug, Clone)]
pub struct PageLimits {
    /// Maximum records the remote accepts per request.
    pub page_size: usize,
    /// Hard cap on the number of page fetches per run.
    pub max_attempts: u32,
    /// Hard cap on the offset reached while paging.
    pub max_offset: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_attempts: 100,
            max_offset: 10_000,
        }
    }
}

/// The full contents of a remote collection after exhaustive pagination.
#[derive(Debug, Clone)]
pub struct Collected {
    /// All records, in server-returned order.
    pub records: Vec<Record>,
    /// The last total the remote reported, 0 if it never reported one.
    pub reported_total: u64,
}
