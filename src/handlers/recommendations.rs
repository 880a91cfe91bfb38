use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::recommendation::{Recommendation, RecommendationQuery};
use crate::AppState;

pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let recommendations = match query.category {
        Some(category) => {
            sqlx::query_as::<_, Recommendation>(
                r#"
                SELECT * FROM recommendations
                WHERE category = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(category)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Recommendation>(
                "SELECT * FROM recommendations ORDER BY created_at DESC",
            )
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(recommendations))
}
