//! Dashboard overview aggregation: headline counts, the monthly
//! registration trend, and per-ward activity rollups.

use futures::future::join_all;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::record::Record;
use crate::services::aggregate::{self, MonthBucket};
use crate::services::references::{self, WardReferences};
use crate::services::resolve;
use crate::sources::content_api::ContentApi;
use crate::sources::document_store::DocumentStore;

/// Collection-name aliases for the headline metrics. Deployments name
/// these collections inconsistently, so matching is case-insensitive
/// with a substring fallback.
pub const USER_COLLECTION_NAMES: &[&str] = &["user", "users", "member", "members"];
pub const DONOR_COLLECTION_NAMES: &[&str] =
    &["blood donor", "blooddonor", "donor", "donors", "blood-donor"];
pub const VOLUNTEER_COLLECTION_NAMES: &[&str] = &["volunteer", "volunteers"];
pub const DONATION_COLLECTION_NAMES: &[&str] = &["donation", "donations"];
pub const ISSUE_COLLECTION_NAMES: &[&str] = &[
    "issue report",
    "issuereport",
    "issue",
    "issues",
    "issue-report",
    "report",
    "reports",
];

/// Document count for one collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionCount {
    pub id: String,
    pub name: String,
    pub document_count: u64,
}

/// Headline totals for the overview page.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlineStats {
    pub total_users: u64,
    pub total_blood_donors: u64,
    pub total_volunteers: u64,
    pub total_donations: u64,
    pub total_issue_reports: u64,
}

/// Per-ward record counts across the tracked collections.
#[derive(Debug, Clone, Serialize)]
pub struct WardActivity {
    pub users: u64,
    pub donors: u64,
    pub volunteers: u64,
    pub donations: u64,
    pub issue_reports: u64,
}

/// One ward with display enrichment and activity rollup.
#[derive(Debug, Clone, Serialize)]
pub struct WardSummary {
    pub id: String,
    pub ward_name: String,
    pub ward_number: String,
    pub councillor_name: String,
    pub municipality_name: String,
    pub activity: WardActivity,
}

/// The complete overview aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub stats: HeadlineStats,
    pub collections: Vec<CollectionCount>,
    pub monthly_registrations: Vec<MonthBucket>,
    pub wards: Vec<WardSummary>,
}

/// Build the overview aggregate from both backends.
///
/// The collection listing is the primary fetch and fails the run; a
/// single collection failing to page degrades to a zero count, and
/// reference failures degrade ward enrichment, both logged.
pub async fn build(
    documents: &DocumentStore,
    content: &ContentApi,
) -> Result<DashboardOverview, AppError> {
    let collections = documents.list_collections().await?;

    let infos: Vec<(String, String)> = collections
        .iter()
        .filter_map(|c| {
            let id = resolve::resolve(c, &["$id", "id"])?;
            let name = resolve::resolve_or(c, &["name"], &id);
            Some((id, name))
        })
        .collect();

    // Each collection is paged exactly once; counts and rollups reuse
    // the same fetch.
    let fetched: Vec<Vec<Record>> = join_all(infos.iter().map(|(id, name)| async move {
        match documents.list_documents(id).await {
            Ok(collected) => collected.records,
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Collection fetch failed; counting as empty");
                Vec::new()
            }
        }
    }))
    .await;

    let counts: Vec<CollectionCount> = infos
        .iter()
        .zip(&fetched)
        .map(|((id, name), docs)| CollectionCount {
            id: id.clone(),
            name: name.clone(),
            document_count: docs.len() as u64,
        })
        .collect();

    let stats = HeadlineStats {
        total_users: stat_count(&counts, USER_COLLECTION_NAMES),
        total_blood_donors: stat_count(&counts, DONOR_COLLECTION_NAMES),
        total_volunteers: stat_count(&counts, VOLUNTEER_COLLECTION_NAMES),
        total_donations: stat_count(&counts, DONATION_COLLECTION_NAMES),
        total_issue_reports: stat_count(&counts, ISSUE_COLLECTION_NAMES),
    };

    let monthly_registrations = aggregate::month_histogram(
        docs_for(&infos, &fetched, USER_COLLECTION_NAMES),
        resolve::JOINED_DATE,
    );

    let refs = references::fetch(content).await;
    let wards = ward_summaries(
        &refs,
        WardDocSets {
            users: docs_for(&infos, &fetched, USER_COLLECTION_NAMES),
            donors: docs_for(&infos, &fetched, DONOR_COLLECTION_NAMES),
            volunteers: docs_for(&infos, &fetched, VOLUNTEER_COLLECTION_NAMES),
            donations: docs_for(&infos, &fetched, DONATION_COLLECTION_NAMES),
            issue_reports: docs_for(&infos, &fetched, ISSUE_COLLECTION_NAMES),
        },
    );

    Ok(DashboardOverview {
        stats,
        collections: counts,
        monthly_registrations,
        wards,
    })
}

/// Document sets feeding the per-ward rollup.
struct WardDocSets<'a> {
    users: &'a [Record],
    donors: &'a [Record],
    volunteers: &'a [Record],
    donations: &'a [Record],
    issue_reports: &'a [Record],
}

/// Match a collection by name: case-insensitive exact first, then
/// substring.
fn find_index(infos: &[(String, String)], names: &[&str]) -> Option<usize> {
    let exact = infos.iter().position(|(_, name)| {
        names
            .iter()
            .any(|candidate| name.eq_ignore_ascii_case(candidate))
    });
    exact.or_else(|| {
        infos.iter().position(|(_, name)| {
            let lower = name.to_lowercase();
            names.iter().any(|candidate| lower.contains(candidate))
        })
    })
}

fn docs_for<'a>(
    infos: &[(String, String)],
    fetched: &'a [Vec<Record>],
    names: &[&str],
) -> &'a [Record] {
    find_index(infos, names)
        .map(|i| fetched[i].as_slice())
        .unwrap_or(&[])
}

/// Headline count for a named metric: an exact name match with a
/// nonzero count wins, then the first substring match.
fn stat_count(counts: &[CollectionCount], names: &[&str]) -> u64 {
    for candidate in names {
        if let Some(c) = counts
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(candidate))
        {
            if c.document_count > 0 {
                return c.document_count;
            }
        }
    }
    counts
        .iter()
        .find(|c| {
            let lower = c.name.to_lowercase();
            names.iter().any(|candidate| lower.contains(candidate))
        })
        .map(|c| c.document_count)
        .unwrap_or(0)
}

fn ward_summaries(refs: &WardReferences, sets: WardDocSets<'_>) -> Vec<WardSummary> {
    refs.wards
        .iter()
        .filter_map(|ward| {
            let id = resolve::resolve(ward, &["id"])?;
            Some(WardSummary {
                ward_name: resolve::resolve_or(ward, &["ward_name", "name"], "")
                    .trim()
                    .to_string(),
                ward_number: resolve::resolve_or(ward, &["ward_number"], ""),
                councillor_name: refs
                    .councillor_for(ward)
                    .unwrap_or_else(|| "Unknown".to_string()),
                municipality_name: refs
                    .municipality_for(ward)
                    .unwrap_or_else(|| "Unknown".to_string()),
                activity: WardActivity {
                    users: count_matching(sets.users, &id),
                    donors: count_matching(sets.donors, &id),
                    volunteers: count_matching(sets.volunteers, &id),
                    donations: count_matching(sets.donations, &id),
                    issue_reports: count_matching(sets.issue_reports, &id),
                },
                id,
            })
        })
        .collect()
}

/// Count documents whose ward foreign key resolves to `ward_id`.
fn count_matching(docs: &[Record], ward_id: &str) -> u64 {
    docs.iter()
        .filter(|doc| resolve::resolve(doc, resolve::WARD_FK).as_deref() == Some(ward_id))
        .count() as u64
}
