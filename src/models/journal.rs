use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// The eleven emotion dimensions scored on every journal entry. Field order
/// here is the declared dimension order used everywhere downstream: chart
/// axis layout and top-3 tie-breaking both depend on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EmotionScores {
    #[sqlx(rename = "happiness_score")]
    pub happiness: i32,
    #[sqlx(rename = "sadness_score")]
    pub sadness: i32,
    #[sqlx(rename = "fear_score")]
    pub fear: i32,
    #[sqlx(rename = "anger_score")]
    pub anger: i32,
    #[sqlx(rename = "surprise_score")]
    pub surprise: i32,
    #[sqlx(rename = "joy_score")]
    pub joy: i32,
    #[sqlx(rename = "love_score")]
    pub love: i32,
    #[sqlx(rename = "disgust_score")]
    pub disgust: i32,
    #[sqlx(rename = "relief_score")]
    pub relief: i32,
    #[sqlx(rename = "gratitude_score")]
    pub gratitude: i32,
    #[sqlx(rename = "confusion_score")]
    pub confusion: i32,
}

impl EmotionScores {
    pub const NAMES: [&'static str; 11] = [
        "happiness",
        "sadness",
        "fear",
        "anger",
        "surprise",
        "joy",
        "love",
        "disgust",
        "relief",
        "gratitude",
        "confusion",
    ];

    /// Values in declared dimension order, index-aligned with `NAMES`.
    pub fn values(&self) -> [i32; 11] {
        [
            self.happiness,
            self.sadness,
            self.fear,
            self.anger,
            self.surprise,
            self.joy,
            self.love,
            self.disgust,
            self.relief,
            self.gratitude,
            self.confusion,
        ]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i32)> {
        Self::NAMES.into_iter().zip(self.values())
    }
}

/// The three sentiment dimensions scored on every journal entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SentimentScores {
    #[sqlx(rename = "positive_score")]
    pub positive: i32,
    #[sqlx(rename = "negative_score")]
    pub negative: i32,
    #[sqlx(rename = "neutral_score")]
    pub neutral: i32,
}

impl SentimentScores {
    pub const NAMES: [&'static str; 3] = ["positive", "negative", "neutral"];

    pub fn values(&self) -> [i32; 3] {
        [self.positive, self.negative, self.neutral]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i32)> {
        Self::NAMES.into_iter().zip(self.values())
    }
}

/// One journal submission. Scores are produced once by the model at analysis
/// time and never recomputed; rows are immutable except by full deletion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub journal_content: String,
    pub created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub emotion: EmotionScores,
    #[sqlx(flatten)]
    pub sentiment: SentimentScores,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    #[validate(length(min = 1, max = 20000, message = "Entry cannot be empty"))]
    pub content: String,
}

/// Per-entry result parsed out of the model's fenced JSON block: the score
/// vectors plus an optional supportive reply shown back to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAnalysis {
    pub emotion: EmotionScores,
    pub sentiment: SentimentScores,
    #[serde(default)]
    pub response: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scores() -> EmotionScores {
        EmotionScores {
            happiness: 8,
            sadness: 1,
            joy: 7,
            gratitude: 5,
            ..Default::default()
        }
    }

    // ── dimension contract ───────────────────────────────────────────────

    #[test]
    fn test_values_align_with_names() {
        let scores = sample_scores();
        let pairs: Vec<_> = scores.iter().collect();
        assert_eq!(pairs.len(), 11);
        assert_eq!(pairs[0], ("happiness", 8));
        assert_eq!(pairs[1], ("sadness", 1));
        assert_eq!(pairs[5], ("joy", 7));
        assert_eq!(pairs[9], ("gratitude", 5));
        assert_eq!(pairs[10], ("confusion", 0));
    }

    #[test]
    fn test_sentiment_values_align_with_names() {
        let scores = SentimentScores {
            positive: 6,
            negative: 2,
            neutral: 2,
        };
        let pairs: Vec<_> = scores.iter().collect();
        assert_eq!(pairs, vec![("positive", 6), ("negative", 2), ("neutral", 2)]);
    }

    // ── serde shapes ─────────────────────────────────────────────────────

    #[test]
    fn test_emotion_scores_serialize_without_suffix() {
        let json = serde_json::to_value(sample_scores()).unwrap();
        assert_eq!(json["happiness"], 8);
        assert!(json.get("happiness_score").is_none());
    }

    #[test]
    fn test_entry_analysis_response_optional() {
        let json = r#"{
            "emotion": {"happiness":5,"sadness":0,"fear":0,"anger":0,"surprise":0,
                        "joy":4,"love":0,"disgust":0,"relief":0,"gratitude":3,"confusion":0},
            "sentiment": {"positive":7,"negative":1,"neutral":2}
        }"#;
        let parsed: EntryAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.emotion.happiness, 5);
        assert_eq!(parsed.sentiment.positive, 7);
        assert!(parsed.response.is_none());
    }

    #[test]
    fn test_create_request_rejects_empty_content() {
        let req = CreateJournalRequest { content: String::new() };
        assert!(req.validate().is_err());
        let req = CreateJournalRequest { content: "Had a good day.".into() };
        assert!(req.validate().is_ok());
    }
}
