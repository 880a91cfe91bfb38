use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::charts::{self, VisualizationBundle};
use crate::analytics::narrative::{self, WeeklyAnalysis};
use crate::analytics::series::normalize;
use crate::analytics::window::{entries_for_trailing_week, window_bounds};
use crate::error::{AppError, AppResult};
use crate::models::report::WeeklyReport;
use crate::services::llm::LlmClient;

/// Result of one pipeline run: the persisted row plus the structures it was
/// serialized from, so the handler can respond without re-decoding.
pub struct AssembledReport {
    pub report: WeeklyReport,
    pub analysis: WeeklyAnalysis,
    pub visualizations: VisualizationBundle,
}

/// Run the full weekly pipeline for one user: select the trailing window,
/// normalize, generate the narrative, render the charts, persist one report
/// row. A window with zero entries fails with `NoData` and persists nothing.
/// Each successful invocation appends a new row; history is never updated.
pub async fn generate_weekly_report(
    db: &PgPool,
    llm: &LlmClient,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<AssembledReport> {
    let entries = entries_for_trailing_week(db, user_id, now).await?;
    if entries.is_empty() {
        return Err(AppError::NoData);
    }

    // The narrative and the charts must be derived from the same series
    // instance: the generator attaches it to its output, and the renderer
    // consumes that attached value rather than a recomputation.
    let series = normalize(&entries);
    let generated = narrative::generate(llm, &entries, &series).await?;
    let visualizations = charts::render_all(&generated.raw_data)?;

    let (from_date, to_date) = window_bounds(now);
    let report_response = serde_json::to_string(&generated.analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {}", e)))?;
    let visualizations_json = serde_json::to_string(&visualizations).map_err(|e| {
        AppError::Internal(anyhow::anyhow!("Failed to serialize visualizations: {}", e))
    })?;

    let report = sqlx::query_as::<_, WeeklyReport>(
        r#"
        INSERT INTO weekly_reports (id, user_id, from_date, to_date, report_response, visualizations)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(from_date)
    .bind(to_date)
    .bind(&report_response)
    .bind(&visualizations_json)
    .fetch_one(db)
    .await?;

    tracing::info!(
        user_id = %user_id,
        report_id = %report.id,
        entries = entries.len(),
        "Weekly report generated"
    );

    Ok(AssembledReport {
        report,
        analysis: generated.analysis,
        visualizations,
    })
}
