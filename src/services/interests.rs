//! Ward interest analytics from the content API.
//!
//! Interest registrations carry personal contact details that must not
//! leave this service: records are sanitized before any aggregate or
//! raw record is exposed.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::errors::AppError;
use crate::models::record::Record;
use crate::services::aggregate;
use crate::services::references::{self, WardReferences};
use crate::services::resolve;
use crate::sources::content_api::ContentApi;

/// Number of wards in the ranking.
const TOP_WARD_LIMIT: usize = 10;

/// Substrings marking a field as personal contact data. Matched
/// case-insensitively against attribute names.
const PERSONAL_FIELD_MARKERS: &[&str] =
    &["mobile", "phone", "email", "contact", "address", "personal"];

/// One ranked ward with enrichment.
#[derive(Debug, Clone, Serialize)]
pub struct TopWard {
    pub ward_number: String,
    pub count: u64,
    pub ward_name: String,
    pub district: Option<String>,
    pub panchayath_name: Option<String>,
    pub ward_type: Option<String>,
    pub councillor_name: Option<String>,
    pub municipality_name: Option<String>,
}

/// The complete ward-interest aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct InterestSummary {
    pub total_count: u64,
    pub count_by_ward: BTreeMap<String, u64>,
    pub count_by_district: BTreeMap<String, u64>,
    pub district_count: usize,
    pub top_wards: Vec<TopWard>,
    /// Councillors who registered interest. This list is deliberately
    /// not sanitized: name and phone are its payload.
    pub councillors: Vec<Record>,
}

/// Build the interest aggregate.
///
/// The interest registrations are the primary fetch and fail the run;
/// reference and councillor fetches degrade with a warning.
pub async fn build(content: &ContentApi) -> Result<InterestSummary, AppError> {
    let collected = content.list_items_all("interested_wards").await?;
    let records: Vec<Record> = collected.records.iter().map(sanitize_record).collect();

    let refs = references::fetch(content).await;
    let councillors = match content.list_items("interested_councillors").await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Interested councillors fetch failed; returning none");
            Vec::new()
        }
    };

    Ok(summarize(
        &records,
        collected.reported_total,
        &refs,
        councillors,
    ))
}

/// Drop personal contact fields from a record.
///
/// `name` is matched exactly, not as a substring: keyed detail fields
/// like `panchayath_name` are not personal data and must survive.
pub fn sanitize_record(record: &Record) -> Record {
    record
        .iter()
        .filter(|(key, _)| !is_personal_field(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn is_personal_field(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower == "name"
        || PERSONAL_FIELD_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
}

/// First-occurrence descriptive details per ward number.
#[derive(Debug, Clone, Default)]
struct WardDetails {
    district: Option<String>,
    panchayath_name: Option<String>,
    ward_type: Option<String>,
}

fn summarize(
    records: &[Record],
    reported_total: u64,
    refs: &WardReferences,
    councillors: Vec<Record>,
) -> InterestSummary {
    let total_count = if reported_total > 0 {
        reported_total
    } else {
        records.len() as u64
    };

    let count_by_ward = aggregate::count_by_key(records, resolve::WARD_NUMBER, "unknown");
    let count_by_district = aggregate::count_by_key(records, resolve::DISTRICT, "Unknown");

    let mut details: HashMap<String, WardDetails> = HashMap::new();
    for record in records {
        let key = resolve::resolve_or(record, resolve::WARD_NUMBER, "unknown");
        details.entry(key).or_insert_with(|| WardDetails {
            district: resolve::resolve(record, resolve::DISTRICT),
            panchayath_name: resolve::resolve(record, &["panchayath_name", "panchayathName"]),
            ward_type: resolve::resolve(record, &["type", "panchayath_type"]),
        });
    }

    let top_wards = aggregate::rank_top(&count_by_ward, TOP_WARD_LIMIT)
        .into_iter()
        .map(|(ward_number, count)| {
            let ward = refs.find_by_ward_number(&ward_number);
            let ward_name = match ward {
                Some(w) => {
                    let name = resolve::resolve_or(w, &["ward_name", "name"], "Unknown");
                    let number = resolve::resolve_or(w, &["ward_number"], &ward_number);
                    format!("{} (Ward #{})", name.trim(), number)
                }
                None => format!("Ward #{ward_number}"),
            };
            let detail = details.get(&ward_number).cloned().unwrap_or_default();
            TopWard {
                ward_name,
                count,
                district: detail.district,
                panchayath_name: detail.panchayath_name,
                ward_type: detail.ward_type,
                councillor_name: ward.and_then(|w| refs.councillor_for(w)),
                municipality_name: ward.and_then(|w| refs.municipality_for(w)),
                ward_number,
            }
        })
        .collect();

    InterestSummary {
        total_count,
        count_by_ward: count_by_ward.to_map(),
        count_by_district: count_by_district.to_map(),
        district_count: count_by_district.distinct(),
        top_wards,
        councillors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values.into_iter().map(record).collect()
    }

    #[test]
    fn sanitize_strips_contact_fields_only() {
        let rec = record(json!({
            "ward_number": 7,
            "District": "North",
            "panchayath_name": "Hilltop",
            "name": "A Person",
            "mobileNumber": "555-0100",
            "phone_number": "555-0101",
            "email": "a@example.com",
            "fullAddress": "1 Main St",
            "personal_info": {"dob": "1990-01-01"}
        }));
        let clean = sanitize_record(&rec);
        assert!(clean.contains_key("ward_number"));
        assert!(clean.contains_key("District"));
        assert!(clean.contains_key("panchayath_name"));
        assert!(!clean.contains_key("name"));
        assert!(!clean.contains_key("mobileNumber"));
        assert!(!clean.contains_key("phone_number"));
        assert!(!clean.contains_key("email"));
        assert!(!clean.contains_key("fullAddress"));
        assert!(!clean.contains_key("personal_info"));
    }

    #[test]
    fn mixed_ward_aliases_aggregate_together() {
        let recs = records(vec![
            json!({"ward_number": "1"}),
            json!({"ward": 1}),
            json!({"ward_id": "1"}),
        ]);
        let summary = summarize(&recs, 0, &WardReferences::default(), Vec::new());
        assert_eq!(summary.total_count, 3);
        assert_eq!(summary.count_by_ward.get("1"), Some(&3));
        assert_eq!(summary.count_by_ward.len(), 1);
    }

    #[test]
    fn reported_total_wins_over_record_count() {
        let recs = records(vec![json!({"ward": 1})]);
        let summary = summarize(&recs, 40, &WardReferences::default(), Vec::new());
        assert_eq!(summary.total_count, 40);
    }

    #[test]
    fn district_counts_include_unknown_bucket() {
        let recs = records(vec![
            json!({"ward": 1, "District": "North"}),
            json!({"ward": 2, "district": "North"}),
            json!({"ward": 3}),
        ]);
        let summary = summarize(&recs, 0, &WardReferences::default(), Vec::new());
        assert_eq!(summary.count_by_district.get("North"), Some(&2));
        assert_eq!(summary.count_by_district.get("Unknown"), Some(&1));
        assert_eq!(summary.district_count, 2);
    }

    #[test]
    fn top_ward_without_reference_match_gets_synthesized_name() {
        let recs = records(vec![json!({"ward": 42}), json!({"ward": 42})]);
        let summary = summarize(&recs, 0, &WardReferences::default(), Vec::new());
        assert_eq!(summary.top_wards.len(), 1);
        let top = &summary.top_wards[0];
        assert_eq!(top.ward_name, "Ward #42");
        assert_eq!(top.count, 2);
        assert_eq!(top.councillor_name, None);
    }

    #[test]
    fn top_ward_enrichment_from_references() {
        let refs = WardReferences::for_tests(
            vec![record(
                json!({"id": "w1", "ward_number": 7, "ward_name": " Central ", "ward_councillor": 5}),
            )],
            std::collections::HashMap::new(),
            std::collections::HashMap::new(),
        );
        let recs = records(vec![json!({
            "ward_number": 7,
            "District": "North",
            "panchayath_name": "Hilltop",
            "type": "municipality"
        })]);
        let summary = summarize(&recs, 0, &refs, Vec::new());
        let top = &summary.top_wards[0];
        assert_eq!(top.ward_name, "Central (Ward #7)");
        assert_eq!(top.district.as_deref(), Some("North"));
        assert_eq!(top.panchayath_name.as_deref(), Some("Hilltop"));
        assert_eq!(top.ward_type.as_deref(), Some("municipality"));
        assert_eq!(top.councillor_name.as_deref(), Some("Councillor #5"));
    }

    #[test]
    fn ranking_is_limited_to_ten() {
        let recs: Vec<Record> = (0..15)
            .flat_map(|i| {
                // ward i appears 15-i times so ranking order is 0..14
                std::iter::repeat(json!({"ward": i})).take(15 - i)
            })
            .map(record)
            .collect();
        let summary = summarize(&recs, 0, &WardReferences::default(), Vec::new());
        assert_eq!(summary.top_wards.len(), 10);
        assert_eq!(summary.top_wards[0].ward_number, "0");
        assert_eq!(summary.top_wards[9].ward_number, "9");
    }
}
