//! Ward reference data shared by the overview and interests views.
//!
//! Wards, councillors, and municipalities are small reference lists on
//! the content API. They are fetched concurrently, and a failure in any
//! one of them only degrades display enrichment; it never fails the
//! aggregation that consumes them.

use std::collections::HashMap;

use crate::errors::AppError;
use crate::models::record::Record;
use crate::services::{aggregate, resolve};
use crate::sources::content_api::ContentApi;

/// Reference lists keyed for display-name enrichment.
#[derive(Debug, Clone, Default)]
pub struct WardReferences {
    pub wards: Vec<Record>,
    councillor_names: HashMap<String, String>,
    municipality_names: HashMap<String, String>,
}

impl WardReferences {
    /// Find the ward reference record matching a ward number.
    pub fn find_by_ward_number(&self, ward_number: &str) -> Option<&Record> {
        self.wards
            .iter()
            .find(|w| resolve::resolve(w, &["ward_number"]).as_deref() == Some(ward_number))
    }

    /// Councillor display name for a ward, synthesizing
    /// `"Councillor #<fk>"` when the foreign key has no match.
    pub fn councillor_for(&self, ward: &Record) -> Option<String> {
        resolve::resolve(ward, &["ward_councillor"])
            .map(|fk| aggregate::lookup_name(&self.councillor_names, &fk, "Councillor"))
    }

    /// Municipality display name for a ward, synthesizing
    /// `"Municipality #<fk>"` when the foreign key has no match.
    pub fn municipality_for(&self, ward: &Record) -> Option<String> {
        resolve::resolve(ward, resolve::MUNICIPALITY_FK)
            .map(|fk| aggregate::lookup_name(&self.municipality_names, &fk, "Municipality"))
    }

    #[cfg(test)]
    pub fn for_tests(
        wards: Vec<Record>,
        councillor_names: HashMap<String, String>,
        municipality_names: HashMap<String, String>,
    ) -> Self {
        Self {
            wards,
            councillor_names,
            municipality_names,
        }
    }
}

/// Fetch all three reference lists concurrently. Individual failures
/// are logged and replaced with empty lists.
pub async fn fetch(content: &ContentApi) -> WardReferences {
    let (wards, councillors, municipalities) = tokio::join!(
        content.list_items("wards"),
        content.list_items("councillors"),
        content.list_items("municipalities"),
    );

    let wards = ok_or_empty(wards, "wards");
    let councillors = ok_or_empty(councillors, "councillors");
    let municipalities = ok_or_empty(municipalities, "municipalities");

    WardReferences {
        councillor_names: aggregate::reference_name_map(&councillors, resolve::COUNCILLOR_NAME),
        municipality_names: aggregate::reference_name_map(&municipalities, &["name"]),
        wards,
    }
}

fn ok_or_empty(result: Result<Vec<Record>, AppError>, collection: &str) -> Vec<Record> {
    match result {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(collection, error = %e, "Reference fetch failed; enrichment degraded");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn refs() -> WardReferences {
        let mut councillors = HashMap::new();
        councillors.insert("3".to_string(), "A. Nair".to_string());
        let mut municipalities = HashMap::new();
        municipalities.insert("9".to_string(), "North Municipality".to_string());
        WardReferences::for_tests(
            vec![record(json!({"id": "w1", "ward_number": 7, "ward_name": "Central"}))],
            councillors,
            municipalities,
        )
    }

    #[test]
    fn ward_number_lookup_is_string_normalized() {
        let refs = refs();
        assert!(refs.find_by_ward_number("7").is_some());
        assert!(refs.find_by_ward_number("8").is_none());
    }

    #[test]
    fn councillor_enrichment_falls_back_to_label() {
        let refs = refs();
        let matched = record(json!({"ward_councillor": 3}));
        assert_eq!(refs.councillor_for(&matched), Some("A. Nair".to_string()));

        let unmatched = record(json!({"ward_councillor": 42}));
        assert_eq!(
            refs.councillor_for(&unmatched),
            Some("Councillor #42".to_string())
        );

        let missing_fk = record(json!({}));
        assert_eq!(refs.councillor_for(&missing_fk), None);
    }

    #[test]
    fn municipality_accepts_misspelled_upstream_field() {
        let refs = refs();
        let ward = record(json!({"muncipality": 9}));
        assert_eq!(
            refs.municipality_for(&ward),
            Some("North Municipality".to_string())
        );
        let ward = record(json!({"municipality": 11}));
        assert_eq!(
            refs.municipality_for(&ward),
            Some("Municipality #11".to_string())
        );
    }
}
