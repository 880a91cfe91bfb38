use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::journal::JournalEntry;

/// How far back the report window reaches.
pub const WINDOW_DAYS: i64 = 7;

/// All of a user's journal entries created within the trailing 7-day window
/// ending at `now`, ascending by creation time. An empty result is not an
/// error here; callers decide how to treat a data-free window.
pub async fn entries_for_trailing_week(
    db: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Vec<JournalEntry>> {
    let cutoff = now - Duration::days(WINDOW_DAYS);

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(cutoff)
    .fetch_all(db)
    .await?;

    Ok(entries)
}

/// Inclusive report bounds for a window ending at `now`:
/// `to` is the generation date, `from` is six days earlier.
pub fn window_bounds(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let to = now.date_naive();
    let from = to - Duration::days(WINDOW_DAYS - 1);
    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_bounds_span_six_days() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
        let (from, to) = window_bounds(now);
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!((to - from).num_days(), 6);
    }

    #[test]
    fn test_window_bounds_cross_month_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 30, 0).unwrap();
        let (from, to) = window_bounds(now);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }
}
