use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub category: RecommendationCategory,
    pub title: String,
    pub ref_url: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq)]
#[sqlx(type_name = "recommendation_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Music,
    Food,
    Exercise,
    Movie,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub category: Option<RecommendationCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecommendationCategory::Exercise).unwrap(),
            "\"exercise\""
        );
    }

    #[test]
    fn test_query_category_optional() {
        let q: RecommendationQuery = serde_json::from_str("{}").unwrap();
        assert!(q.category.is_none());
        let q: RecommendationQuery = serde_json::from_str(r#"{"category":"music"}"#).unwrap();
        assert_eq!(q.category, Some(RecommendationCategory::Music));
    }
}
