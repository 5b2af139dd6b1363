//! Folding a complete record set into counts, rankings, and histograms.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use serde::Serialize;

use crate::models::record::Record;
use crate::services::resolve;

/// Abbreviated month names, chart order.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// An insertion-ordered counter.
///
/// First-seen key order is preserved so that ranking ties break
/// deterministically by encounter order rather than by hash order.
#[derive(Debug, Clone, Default)]
pub struct KeyCounts {
    order: Vec<String>,
    counts: HashMap<String, u64>,
}

impl KeyCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.order.push(key.to_string());
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    pub fn distinct(&self) -> usize {
        self.order.len()
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Iterate `(key, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.counts[key]))
    }

    /// Copy into a sorted map for JSON output.
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

/// Count records by a resolved key. Unresolvable records land in the
/// `fallback` bucket, so every record is attributed to exactly one key
/// and `counts.total() == records.len()`.
pub fn count_by_key(records: &[Record], candidates: &[&str], fallback: &str) -> KeyCounts {
    let mut counts = KeyCounts::new();
    for record in records {
        let key = resolve::resolve_or(record, candidates, fallback);
        counts.increment(&key);
    }
    counts
}

/// Top-N `(key, count)` pairs, descending by count. The sort is stable,
/// so ties keep first-seen order.
pub fn rank_top(counts: &KeyCounts, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

/// One calendar-month bucket, collapsed across years.
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    pub month: String,
    pub month_number: u32,
    pub count: u64,
}

/// Bucket records by calendar month across all years, Jan..Dec.
///
/// Records whose date attribute is missing or unparseable are dropped
/// from the histogram only; the caller's total count is unaffected.
pub fn month_histogram(records: &[Record], candidates: &[&str]) -> Vec<MonthBucket> {
    let mut counts = [0u64; 12];
    for record in records {
        if let Some(date) = resolve::resolve_date(record, candidates) {
            counts[date.month0() as usize] += 1;
        }
    }
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| MonthBucket {
            month: name.to_string(),
            month_number: i as u32 + 1,
            count: counts[i],
        })
        .collect()
}

/// One per-(year, month) bucket.
#[derive(Debug, Clone, Serialize)]
pub struct YearMonthBucket {
    /// Lexicographically sortable `YYYY-MM` key.
    pub key: String,
    pub year: i32,
    pub month: String,
    pub month_number: u32,
    pub count: u64,
}

/// Bucket records per (year, month), sorted chronologically by the
/// `YYYY-MM` key. Only months that actually occur appear.
pub fn year_month_histogram(records: &[Record], candidates: &[&str]) -> Vec<YearMonthBucket> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        if let Some(date) = resolve::resolve_date(record, candidates) {
            let key = format!("{}-{:02}", date.year(), date.month());
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(key, count)| {
            let (year, month) = split_year_month(&key);
            YearMonthBucket {
                month: MONTH_NAMES[(month - 1) as usize].to_string(),
                month_number: month,
                year,
                key,
                count,
            }
        })
        .collect()
}

fn split_year_month(key: &str) -> (i32, u32) {
    let (year, month) = key.split_once('-').unwrap_or((key, "1"));
    (
        year.parse().unwrap_or(0),
        month.parse::<u32>().unwrap_or(1).clamp(1, 12),
    )
}

/// Keyed lookup against a reference list, with a synthesized
/// `"<Label> #<key>"` fallback when the key has no match.
pub fn lookup_name(names: &HashMap<String, String>, key: &str, label: &str) -> String {
    names
        .get(key)
        .cloned()
        .unwrap_or_else(|| format!("{label} #{key}"))
}

/// Build an id-to-display-name map from a reference record list.
///
/// Ids are string-normalized so numeric and string keys unify; records
/// without an id are skipped, records without a name map to "Unknown".
pub fn reference_name_map(records: &[Record], name_candidates: &[&str]) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for record in records {
        if let Some(id) = resolve::resolve(record, &["id"]) {
            let name = resolve::resolve_or(record, name_candidates, "Unknown");
            names.insert(id, name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn every_record_lands_in_exactly_one_bucket() {
        let recs = records(vec![
            json!({"ward_number": "1"}),
            json!({"ward": 2}),
            json!({"unrelated": true}),
            json!({"ward_id": "1"}),
        ]);
        let counts = count_by_key(&recs, resolve::WARD_NUMBER, "unknown");
        assert_eq!(counts.total(), recs.len() as u64);
        assert_eq!(counts.get("unknown"), 1);
    }

    #[test]
    fn mixed_aliases_unify_on_one_key() {
        let recs = records(vec![
            json!({"ward_number": "1"}),
            json!({"ward": 1}),
            json!({"ward_id": "1"}),
        ]);
        let counts = count_by_key(&recs, resolve::WARD_NUMBER, "unknown");
        assert_eq!(counts.get("1"), 3);
        assert_eq!(counts.distinct(), 1);
    }

    #[test]
    fn ranking_ties_keep_first_seen_order() {
        // Interleave categories so hash order would scramble them.
        let recs = records(vec![
            json!({"ward": "b"}),
            json!({"ward": "c"}),
            json!({"ward": "a"}),
            json!({"ward": "c"}),
            json!({"ward": "b"}),
            json!({"ward": "a"}),
        ]);
        let counts = count_by_key(&recs, resolve::WARD_NUMBER, "unknown");
        let ranked = rank_top(&counts, 10);
        let keys: Vec<&str> = ranked.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "c", "a"]);
    }

    #[test]
    fn ranking_truncates_to_n() {
        let recs = records(vec![
            json!({"ward": 1}),
            json!({"ward": 2}),
            json!({"ward": 2}),
            json!({"ward": 3}),
        ]);
        let counts = count_by_key(&recs, resolve::WARD_NUMBER, "unknown");
        let ranked = rank_top(&counts, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], ("2".to_string(), 2));
    }

    #[test]
    fn month_histogram_collapses_years() {
        let recs = records(vec![
            json!({"joinedDate": "2023-01-10T00:00:00+00:00"}),
            json!({"joinedDate": "2024-01-05T00:00:00+00:00"}),
            json!({"joinedDate": "2024-06-01T00:00:00+00:00"}),
            json!({"joinedDate": "not a date"}),
        ]);
        let buckets = month_histogram(&recs, resolve::JOINED_DATE);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].month, "Jan");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[5].count, 1);
        let total: u64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, 3); // the unparseable record is excluded
    }

    #[test]
    fn year_month_histogram_is_chronological() {
        let recs = records(vec![
            json!({"joinedDate": "2024-01-15"}),
            json!({"joinedDate": "2024-01-20"}),
            json!({"joinedDate": "2024-02-01"}),
        ]);
        let buckets = year_month_histogram(&recs, resolve::JOINED_DATE);
        let pairs: Vec<(&str, u64)> = buckets.iter().map(|b| (b.key.as_str(), b.count)).collect();
        assert_eq!(pairs, vec![("2024-01", 2), ("2024-02", 1)]);
        assert_eq!(buckets[0].year, 2024);
        assert_eq!(buckets[0].month, "Jan");
    }

    #[test]
    fn lookup_name_synthesizes_label_on_miss() {
        let mut names = HashMap::new();
        names.insert("7".to_string(), "Central Ward".to_string());
        assert_eq!(lookup_name(&names, "7", "Ward"), "Central Ward");
        assert_eq!(lookup_name(&names, "42", "Councillor"), "Councillor #42");
    }

    #[test]
    fn reference_map_normalizes_numeric_ids() {
        let recs = records(vec![
            json!({"id": 3, "councilorName": "A. Nair"}),
            json!({"id": "4", "name": "B. Menon"}),
            json!({"councillorName": "no id, skipped"}),
        ]);
        let names = reference_name_map(&recs, resolve::COUNCILLOR_NAME);
        assert_eq!(names.get("3").map(String::as_str), Some("A. Nair"));
        assert_eq!(names.get("4").map(String::as_str), Some("B. Menon"));
        assert_eq!(names.len(), 2);
    }
}
