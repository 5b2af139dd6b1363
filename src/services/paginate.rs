//! Exhaustive offset/limit pagination against a remote collection.

use std::future::Future;

use crate::errors::AppError;
use crate::models::record::{Collected, Page, PageLimits};

/// Retrieve the complete contents of a remote collection by repeated
/// bounded-size requests.
///
/// `fetch` is called as `fetch(offset, limit)` and must return one page
/// in server order. The loop stops on the first of:
///
/// - a page shorter than `limits.page_size` (last page),
/// - an empty page,
/// - `accumulated >= reported_total`, only once a total > 0 is known,
/// - the `max_attempts` ceiling,
/// - the `max_offset` ceiling.
///
/// A reported total of 0 is treated as unknown: some remotes report a
/// stale 0 while still returning records, so a zero total must never
/// halt the loop by itself. The offset advances by the number of
/// records actually returned, tolerating short pages mid-stream.
///
/// Any fetch error aborts the whole run; a partial accumulation is
/// never returned.
pub async fn collect_all<F, Fut>(limits: &PageLimits, mut fetch: F) -> Result<Collected, AppError>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Page, AppError>>,
{
    let mut records = Vec::new();
    let mut reported_total: u64 = 0;
    let mut offset: usize = 0;
    let mut attempts: u32 = 0;

    loop {
        if attempts >= limits.max_attempts {
            tracing::warn!(
                attempts,
                accumulated = records.len(),
                "Pagination hit the attempt ceiling before exhaustion"
            );
            break;
        }
        attempts += 1;

        let page = fetch(offset, limits.page_size).await?;
        if reported_total == 0 {
            if let Some(total) = page.total {
                reported_total = total;
            }
        }

        let returned = page.records.len();
        tracing::debug!(attempts, offset, returned, reported_total, "Fetched page");
        if returned == 0 {
            break;
        }

        records.extend(page.records);
        offset += returned;

        if returned < limits.page_size {
            break;
        }
        if reported_total > 0 && records.len() as u64 >= reported_total {
            break;
        }
        if offset > limits.max_offset {
            tracing::warn!(
                offset,
                accumulated = records.len(),
                "Pagination hit the offset ceiling before exhaustion"
            );
            break;
        }
    }

    Ok(Collected {
        records,
        reported_total,
    })
}
