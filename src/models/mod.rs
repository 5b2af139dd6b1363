//! Shared data types for upstream records and pagination.

pub mod record;
