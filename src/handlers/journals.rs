use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::{CreateJournalRequest, EntryAnalysis, JournalEntry};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateJournalResponse {
    pub entry: JournalEntry,
    /// Short supportive reply from the model, when it provides one.
    pub response: Option<String>,
}

/// Prompt for scoring one journal entry. The model answers with a single
/// fenced JSON block carrying the full 11-emotion / 3-sentiment vector;
/// every dimension must be present so the stored row is fully populated.
fn build_entry_prompt(content: &str) -> String {
    format!(
        r#"You are an empathetic journaling assistant. Read the journal entry below and score it.

Journal entry:
{content}

Respond with exactly one fenced code block labeled json, containing this exact structure (all scores are integers from 0 to 10):

```json
{{
  "emotion": {{
    "happiness": 0, "sadness": 0, "fear": 0, "anger": 0, "surprise": 0,
    "joy": 0, "love": 0, "disgust": 0, "relief": 0, "gratitude": 0, "confusion": 0
  }},
  "sentiment": {{"positive": 0, "negative": 0, "neutral": 0}},
  "response": "one or two warm sentences reflecting the entry back to the writer"
}}
```"#
    )
}

/// Analyze and persist one journal entry. Scores are produced exactly once,
/// here; the row is never updated afterwards.
pub async fn create_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalRequest>,
) -> AppResult<Json<CreateJournalResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let prompt = build_entry_prompt(&body.content);
    let raw = state.llm.complete(&prompt).await?;
    let analysis: EntryAnalysis = crate::services::llm::parse_fenced_json(&raw)?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journals (
            id, user_id, journal_content,
            positive_score, negative_score, neutral_score,
            happiness_score, sadness_score, fear_score, anger_score,
            surprise_score, joy_score, love_score, disgust_score,
            relief_score, gratitude_score, confusion_score
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(analysis.sentiment.positive)
    .bind(analysis.sentiment.negative)
    .bind(analysis.sentiment.neutral)
    .bind(analysis.emotion.happiness)
    .bind(analysis.emotion.sadness)
    .bind(analysis.emotion.fear)
    .bind(analysis.emotion.anger)
    .bind(analysis.emotion.surprise)
    .bind(analysis.emotion.joy)
    .bind(analysis.emotion.love)
    .bind(analysis.emotion.disgust)
    .bind(analysis.emotion.relief)
    .bind(analysis.emotion.gratitude)
    .bind(analysis.emotion.confusion)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(CreateJournalResponse {
        entry,
        response: analysis.response,
    }))
}

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(journal_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM journals WHERE id = $1 AND user_id = $2")
        .bind(journal_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Journal entry not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_prompt_embeds_content_and_schema() {
        let prompt = build_entry_prompt("Slept badly, anxious about the demo.");
        assert!(prompt.contains("Slept badly, anxious about the demo."));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("\"confusion\": 0"));
        assert!(prompt.contains("\"neutral\": 0"));
    }

    #[test]
    fn test_entry_analysis_parses_from_model_shape() {
        let raw = r#"Of course!
```json
{
  "emotion": {"happiness":1,"sadness":6,"fear":7,"anger":2,"surprise":0,
              "joy":0,"love":0,"disgust":0,"relief":0,"gratitude":1,"confusion":3},
  "sentiment": {"positive":1,"negative":7,"neutral":2},
  "response": "That sounds like a heavy night — be gentle with yourself today."
}
```"#;
        let analysis: EntryAnalysis = crate::services::llm::parse_fenced_json(raw).unwrap();
        assert_eq!(analysis.emotion.fear, 7);
        assert_eq!(analysis.sentiment.negative, 7);
        assert!(analysis.response.unwrap().starts_with("That sounds"));
    }
}
