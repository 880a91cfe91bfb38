use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted weekly report. Append-only: re-running the pipeline within
/// the same week inserts another row rather than updating an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub report_response: String,
    pub visualizations: String,
    pub created_at: DateTime<Utc>,
}
