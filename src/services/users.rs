//! User registration and login metrics.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::record::Record;
use crate::services::aggregate::{self, YearMonthBucket};
use crate::services::overview::USER_COLLECTION_NAMES;
use crate::services::resolve;
use crate::sources::document_store::DocumentStore;

/// Registration counts in recent calendar windows. Weeks start on
/// Sunday; the last-month and last-week windows are half-open.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationWindows {
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
    pub last_week: u64,
    pub last_month: u64,
}

/// Login activity. A user is active when their last login is within
/// the past 30 days; users without any login timestamp count as never
/// logged in and inactive.
#[derive(Debug, Clone, Serialize)]
pub struct LoginActivity {
    pub active_users: u64,
    pub inactive_users: u64,
    pub never_logged_in: u64,
    pub logged_in_today: u64,
    pub logged_in_this_week: u64,
    pub logged_in_this_month: u64,
    /// Percentage of users active, rounded to one decimal.
    pub login_rate: f64,
    /// Mean logins per user, rounded to one decimal.
    pub average_login_frequency: f64,
}

/// The complete user metrics aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct UserMetrics {
    pub total_users: u64,
    pub registrations: RegistrationWindows,
    pub logins: LoginActivity,
    pub monthly: Vec<YearMonthBucket>,
}

/// Build user metrics from the users collection.
///
/// The collection id comes from configuration when set, otherwise it is
/// discovered from the collection listing by name aliases.
pub async fn build(
    documents: &DocumentStore,
    configured_collection: Option<&str>,
) -> Result<UserMetrics, AppError> {
    let collection_id = match configured_collection {
        Some(id) => id.to_string(),
        None => discover_users_collection(documents).await?,
    };
    let docs = documents.list_documents(&collection_id).await?.records;
    Ok(compute(&docs, Utc::now()))
}

async fn discover_users_collection(documents: &DocumentStore) -> Result<String, AppError> {
    let collections = documents.list_collections().await?;
    for collection in &collections {
        let Some(name) = resolve::resolve(collection, &["name"]) else {
            continue;
        };
        let lower = name.to_lowercase();
        if USER_COLLECTION_NAMES
            .iter()
            .any(|candidate| lower.contains(candidate))
        {
            if let Some(id) = resolve::resolve(collection, &["$id", "id"]) {
                return Ok(id);
            }
        }
    }
    Err(AppError::NotFound("users collection".to_string()))
}

/// Fold the user records into metrics, relative to `now`.
///
/// Records whose registration date is missing or unparseable contribute
/// to `total_users` only, mirroring the category-count rule that no
/// record is ever dropped from the total.
pub fn compute(docs: &[Record], now: DateTime<Utc>) -> UserMetrics {
    let today = now.date_naive();
    let start_of_today = today.and_time(NaiveTime::MIN).and_utc();
    let start_of_week =
        start_of_today - Duration::days(today.weekday().num_days_from_sunday() as i64);
    let start_of_last_week = start_of_week - Duration::days(7);
    let start_of_month = month_start(today.year(), today.month());
    let start_of_last_month = if today.month() == 1 {
        month_start(today.year() - 1, 12)
    } else {
        month_start(today.year(), today.month() - 1)
    };
    let thirty_days_ago = now - Duration::days(30);

    let mut registrations = RegistrationWindows {
        today: 0,
        this_week: 0,
        this_month: 0,
        last_week: 0,
        last_month: 0,
    };
    let mut active_users = 0;
    let mut inactive_users = 0;
    let mut never_logged_in = 0;
    let mut logged_in_today = 0;
    let mut logged_in_this_week = 0;
    let mut logged_in_this_month = 0;
    let mut total_logins: u64 = 0;

    for doc in docs {
        let Some(joined) = resolve::resolve_date(doc, resolve::JOINED_DATE) else {
            continue;
        };

        if joined >= start_of_today {
            registrations.today += 1;
        }
        if joined >= start_of_week {
            registrations.this_week += 1;
        }
        if joined >= start_of_month {
            registrations.this_month += 1;
        }
        if joined >= start_of_last_week && joined < start_of_week {
            registrations.last_week += 1;
        }
        if joined >= start_of_last_month && joined < start_of_month {
            registrations.last_month += 1;
        }

        total_logins += resolve::resolve_count(doc, resolve::LOGIN_COUNT);
        match resolve::resolve_date(doc, resolve::LAST_LOGIN) {
            None => {
                never_logged_in += 1;
                inactive_users += 1;
            }
            Some(last_login) => {
                if last_login >= thirty_days_ago {
                    active_users += 1;
                } else {
                    inactive_users += 1;
                }
                if last_login >= start_of_today {
                    logged_in_today += 1;
                }
                if last_login >= start_of_week {
                    logged_in_this_week += 1;
                }
                if last_login >= start_of_month {
                    logged_in_this_month += 1;
                }
            }
        }
    }

    let total_users = docs.len() as u64;
    let login_rate = if total_users > 0 {
        round1(active_users as f64 * 100.0 / total_users as f64)
    } else {
        0.0
    };
    let average_login_frequency = if total_users > 0 {
        round1(total_logins as f64 / total_users as f64)
    } else {
        0.0
    };

    UserMetrics {
        total_users,
        registrations,
        logins: LoginActivity {
            active_users,
            inactive_users,
            never_logged_in,
            logged_in_today,
            logged_in_this_week,
            logged_in_this_month,
            login_rate,
            average_login_frequency,
        },
        monthly: aggregate::year_month_histogram(docs, resolve::JOINED_DATE),
    }
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // Day 1 always exists for a valid month.
    NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    /// Saturday 2024-06-15 noon; the week started Sunday 2024-06-09.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn registration_windows() {
        let docs = records(vec![
            json!({"joinedDate": "2024-06-15T08:00:00+00:00"}), // today
            json!({"joinedDate": "2024-06-10T08:00:00+00:00"}), // this week
            json!({"joinedDate": "2024-06-05T08:00:00+00:00"}), // this month + last week
            json!({"joinedDate": "2024-05-20T08:00:00+00:00"}), // last month
            json!({"joinedDate": "2023-12-25T08:00:00+00:00"}), // outside all windows
            json!({"note": "no date"}),
        ]);
        let metrics = compute(&docs, now());
        assert_eq!(metrics.total_users, 6);
        assert_eq!(metrics.registrations.today, 1);
        assert_eq!(metrics.registrations.this_week, 2);
        assert_eq!(metrics.registrations.this_month, 3);
        assert_eq!(metrics.registrations.last_week, 1);
        assert_eq!(metrics.registrations.last_month, 1);
    }

    #[test]
    fn login_activity() {
        let docs = records(vec![
            json!({
                "joinedDate": "2024-01-01T00:00:00+00:00",
                "lastLogin": "2024-06-15T09:00:00+00:00",
                "loginCount": 9
            }),
            json!({
                "joinedDate": "2024-01-01T00:00:00+00:00",
                "last_login": "2024-04-01T00:00:00+00:00",
                "login_count": 3
            }),
            json!({"joinedDate": "2024-01-01T00:00:00+00:00"}),
        ]);
        let metrics = compute(&docs, now());
        assert_eq!(metrics.logins.active_users, 1);
        assert_eq!(metrics.logins.inactive_users, 2);
        assert_eq!(metrics.logins.never_logged_in, 1);
        assert_eq!(metrics.logins.logged_in_today, 1);
        assert_eq!(metrics.logins.logged_in_this_week, 1);
        assert_eq!(metrics.logins.logged_in_this_month, 1);
        assert_eq!(metrics.logins.login_rate, 33.3);
        assert_eq!(metrics.logins.average_login_frequency, 4.0);
    }

    #[test]
    fn empty_collection_yields_zero_rates() {
        let metrics = compute(&[], now());
        assert_eq!(metrics.total_users, 0);
        assert_eq!(metrics.logins.login_rate, 0.0);
        assert_eq!(metrics.logins.average_login_frequency, 0.0);
        assert!(metrics.monthly.is_empty());
    }

    #[test]
    fn monthly_histogram_is_chronological() {
        let docs = records(vec![
            json!({"joinedDate": "2024-02-01T00:00:00+00:00"}),
            json!({"joinedDate": "2024-01-15T00:00:00+00:00"}),
            json!({"joinedDate": "2024-01-20T00:00:00+00:00"}),
        ]);
        let metrics = compute(&docs, now());
        let pairs: Vec<(&str, u64)> = metrics
            .monthly
            .iter()
            .map(|b| (b.key.as_str(), b.count))
            .collect();
        assert_eq!(pairs, vec![("2024-01", 2), ("2024-02", 1)]);
    }

    #[test]
    fn january_rolls_last_month_into_previous_year() {
        let january = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let docs = records(vec![
            json!({"joinedDate": "2023-12-20T00:00:00+00:00"}),
            json!({"joinedDate": "2024-01-05T00:00:00+00:00"}),
        ]);
        let metrics = compute(&docs, january);
        assert_eq!(metrics.registrations.last_month, 1);
        assert_eq!(metrics.registrations.this_month, 1);
    }
}
