//! Ordered field-candidate resolution against loosely-typed records.
//!
//! Upstream deployments disagree on attribute names (`ward_number`,
//! `ward`, `wardId`, `ward_id` all mean the same thing), so every
//! logical attribute is resolved through a fixed, ordered alias list.
//! The first candidate with a usable value wins, and values are
//! normalized to strings so numeric and string spellings of the same
//! value aggregate together.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::record::Record;

/// Ward number as recorded on an interest registration.
pub const WARD_NUMBER: &[&str] = &["ward_number", "ward", "wardId", "ward_id"];

/// Ward foreign key as recorded on a document-store record.
pub const WARD_FK: &[&str] = &["wardId", "ward_id", "ward", "wardid"];

/// District of an interest registration.
pub const DISTRICT: &[&str] = &["District", "district"];

/// Registration date of a user, falling back to the record's own
/// creation timestamp.
pub const JOINED_DATE: &[&str] = &[
    "joinedDate",
    "joined_date",
    "$createdAt",
    "createdAt",
    "created_at",
];

/// Last login timestamp of a user.
pub const LAST_LOGIN: &[&str] = &[
    "lastLogin",
    "last_login",
    "lastLoginDate",
    "lastLoginAt",
    "last_login_date",
    "last_login_at",
    "lastActive",
    "last_active",
];

/// Cumulative login counter of a user.
pub const LOGIN_COUNT: &[&str] = &["loginCount", "login_count", "totalLogins", "total_logins"];

/// Display name of a councillor reference record.
pub const COUNCILLOR_NAME: &[&str] = &["councilorName", "councillorName", "name"];

/// Foreign key from a ward to its municipality. The first alias is the
/// misspelling the production content API actually uses.
pub const MUNICIPALITY_FK: &[&str] = &["muncipality", "municipality"];

/// Resolve the first usable value among `candidates`, normalized to a
/// string. Null, absent, and empty-string values are skipped; numbers
/// are stringified so `7` and `"7"` compare equal downstream.
pub fn resolve(record: &Record, candidates: &[&str]) -> Option<String> {
    for name in candidates {
        match record.get(*name) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(Value::Bool(b)) => return Some(b.to_string()),
            _ => {}
        }
    }
    None
}

/// Resolve with a caller-supplied fallback for unresolvable records.
pub fn resolve_or(record: &Record, candidates: &[&str], default: &str) -> String {
    resolve(record, candidates).unwrap_or_else(|| default.to_string())
}

/// Resolve a date-like attribute and parse it to UTC.
///
/// Mirrors the resolution rule of [`resolve`]: the first present alias
/// is taken, and a record whose chosen value fails to parse yields
/// `None` rather than falling through to later aliases.
pub fn resolve_date(record: &Record, candidates: &[&str]) -> Option<DateTime<Utc>> {
    let raw = resolve(record, candidates)?;
    parse_date(&raw)
}

/// Resolve a numeric attribute, defaulting to 0. Accepts both JSON
/// numbers and numeric strings.
pub fn resolve_count(record: &Record, candidates: &[&str]) -> u64 {
    for name in candidates {
        match record.get(*name) {
            Some(Value::Number(n)) => {
                if let Some(v) = n.as_u64() {
                    return v;
                }
                if let Some(f) = n.as_f64() {
                    return f.max(0.0) as u64;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(v) = s.parse::<u64>() {
                    return v;
                }
            }
            _ => {}
        }
    }
    0
}

/// Parse an upstream timestamp. Accepts RFC 3339 (the document store's
/// native format), naive datetimes, and plain calendar dates.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}
