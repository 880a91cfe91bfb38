use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Serialize;

use crate::analytics::assembler;
use crate::analytics::charts::{self, VisualizationBundle};
use crate::analytics::narrative::{self, GeneratedAnalysis, WeeklyAnalysis};
use crate::analytics::series::normalize;
use crate::analytics::window::entries_for_trailing_week;
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::report::WeeklyReport;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CombinedWeeklyReport {
    pub analysis: WeeklyAnalysis,
    pub visualizations: VisualizationBundle,
}

/// Narrative-only weekly analysis for the trailing 7-day window. The raw
/// normalized series rides along under `raw_data`.
pub async fn get_weekly_analysis(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<GeneratedAnalysis>> {
    let entries = entries_for_trailing_week(&state.db, auth_user.id, Utc::now()).await?;
    if entries.is_empty() {
        return Err(AppError::NoData);
    }

    let series = normalize(&entries);
    let generated = narrative::generate(&state.llm, &entries, &series).await?;
    Ok(Json(generated))
}

/// Chart bundle only; no model call involved.
pub async fn get_weekly_visualizations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<VisualizationBundle>> {
    let entries = entries_for_trailing_week(&state.db, auth_user.id, Utc::now()).await?;
    if entries.is_empty() {
        return Err(AppError::NoData);
    }

    let series = normalize(&entries);
    let visualizations = charts::render_all(&series)?;
    Ok(Json(visualizations))
}

/// Full pipeline: narrative + charts from one series, persisted as a new
/// report row, returned as the combined response.
pub async fn get_weekly_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<CombinedWeeklyReport>> {
    let assembled =
        assembler::generate_weekly_report(&state.db, &state.llm, auth_user.id, Utc::now()).await?;

    Ok(Json(CombinedWeeklyReport {
        analysis: assembled.analysis,
        visualizations: assembled.visualizations,
    }))
}

/// Persisted report history, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<WeeklyReport>>> {
    let reports = sqlx::query_as::<_, WeeklyReport>(
        r#"
        SELECT * FROM weekly_reports
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reports))
}
