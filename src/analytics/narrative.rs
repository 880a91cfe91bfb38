use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::series::NormalizedSeries;
use crate::error::AppResult;
use crate::models::journal::{EmotionScores, JournalEntry, SentimentScores};
use crate::services::llm::{parse_fenced_json, LlmClient};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DominantDay {
    pub day: String,
    pub emotions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyEmotionAnalysis {
    pub dominant_emotions: Vec<String>,
    pub highest_positive_day: DominantDay,
    pub highest_negative_day: DominantDay,
    pub emotional_patterns: String,
    pub trajectory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySentimentAnalysis {
    pub overall_sentiment: String,
    pub significant_shifts: Vec<String>,
    pub influencing_factors: Vec<String>,
    pub general_mood: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressAssessment {
    pub growth_areas: Vec<String>,
    pub challenges: Vec<String>,
    pub consistent_patterns: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CumulativeScores {
    pub emotion: EmotionScores,
    pub sentiment: SentimentScores,
}

/// The structured weekly interpretation. Everything except
/// `cumulative_scores` comes from the model; the sums are computed locally
/// from the series, so a numeric field never depends on model arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAnalysis {
    pub weekly_emotion_analysis: WeeklyEmotionAnalysis,
    pub weekly_sentiment_analysis: WeeklySentimentAnalysis,
    pub progress_assessment: ProgressAssessment,
    pub weekly_summary: String,
    #[serde(default)]
    pub cumulative_scores: CumulativeScores,
}

/// Generator output: the analysis plus the exact series it was derived
/// from, attached under `raw_data` so the caller can forward it to the
/// chart renderer without recomputation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedAnalysis {
    #[serde(flatten)]
    pub analysis: WeeklyAnalysis,
    pub raw_data: NormalizedSeries,
}

impl WeeklyAnalysis {
    /// Fixed result for a window with zero entries; produced without a
    /// model call.
    pub fn no_entries() -> Self {
        Self {
            weekly_emotion_analysis: WeeklyEmotionAnalysis {
                dominant_emotions: Vec::new(),
                highest_positive_day: DominantDay { day: String::new(), emotions: Vec::new() },
                highest_negative_day: DominantDay { day: String::new(), emotions: Vec::new() },
                emotional_patterns: "No journal entries were recorded this week.".into(),
                trajectory: "No data available.".into(),
            },
            weekly_sentiment_analysis: WeeklySentimentAnalysis {
                overall_sentiment: "neutral".into(),
                significant_shifts: Vec::new(),
                influencing_factors: Vec::new(),
                general_mood: "unknown".into(),
            },
            progress_assessment: ProgressAssessment {
                growth_areas: Vec::new(),
                challenges: Vec::new(),
                consistent_patterns: Vec::new(),
                improvement_suggestions: vec![
                    "Write a few journal entries this week to unlock your analysis.".into(),
                ],
            },
            weekly_summary: "No journal entries found for the past week.".into(),
            cumulative_scores: CumulativeScores::default(),
        }
    }
}

/// One serialized entry record as embedded in the weekly prompt.
#[derive(Debug, Serialize)]
struct PromptEntry<'a> {
    journal_content: &'a str,
    emotion: &'a EmotionScores,
    sentiment: &'a SentimentScores,
    journal_timing: String,
}

fn format_timing(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Per-dimension sums across the window, computed from the series rather
/// than requested from the model.
pub fn cumulative_scores(series: &NormalizedSeries) -> CumulativeScores {
    let mut totals = CumulativeScores::default();
    for i in 0..series.len() {
        let e = series.emotions.at(i);
        totals.emotion.happiness += e.happiness;
        totals.emotion.sadness += e.sadness;
        totals.emotion.fear += e.fear;
        totals.emotion.anger += e.anger;
        totals.emotion.surprise += e.surprise;
        totals.emotion.joy += e.joy;
        totals.emotion.love += e.love;
        totals.emotion.disgust += e.disgust;
        totals.emotion.relief += e.relief;
        totals.emotion.gratitude += e.gratitude;
        totals.emotion.confusion += e.confusion;
        totals.sentiment.positive += series.sentiments.positive[i];
        totals.sentiment.negative += series.sentiments.negative[i];
        totals.sentiment.neutral += series.sentiments.neutral[i];
    }
    totals
}

/// Render the weekly analysis prompt: the serialized entry records followed
/// by the exact JSON schema the model must answer with, inside one fenced
/// ```json block.
pub fn build_prompt(entries: &[JournalEntry]) -> String {
    let records: Vec<PromptEntry<'_>> = entries
        .iter()
        .map(|e| PromptEntry {
            journal_content: &e.journal_content,
            emotion: &e.emotion,
            sentiment: &e.sentiment,
            journal_timing: format_timing(e.created_at),
        })
        .collect();

    let serialized =
        serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".into());

    format!(
        r#"You are a reflective journaling coach. Below are one user's journal entries from the past 7 days, each with emotion scores (0-10) and sentiment scores (0-10) already assigned at write time.

Journal entries:
{serialized}

Analyze the week as a whole. Respond with exactly one fenced code block labeled json, containing this exact structure:

```json
{{
  "weekly_emotion_analysis": {{
    "dominant_emotions": ["emotion names that defined the week"],
    "highest_positive_day": {{"day": "YYYY-MM-DD", "emotions": ["strongest positive emotions that day"]}},
    "highest_negative_day": {{"day": "YYYY-MM-DD", "emotions": ["strongest negative emotions that day"]}},
    "emotional_patterns": "free-text description of recurring emotional patterns",
    "trajectory": "free-text description of how emotions moved across the week"
  }},
  "weekly_sentiment_analysis": {{
    "overall_sentiment": "positive | negative | neutral | mixed",
    "significant_shifts": ["notable sentiment shifts, one per item"],
    "influencing_factors": ["factors from the entries that drove the week's sentiment"],
    "general_mood": "one short mood label"
  }},
  "progress_assessment": {{
    "growth_areas": ["areas where the user is growing"],
    "challenges": ["recurring difficulties"],
    "consistent_patterns": ["stable behaviors or feelings"],
    "improvement_suggestions": ["specific actionable suggestions"]
  }},
  "weekly_summary": "one paragraph summarizing the week"
}}
```

Use only dates that appear in the entries. Do not add any keys beyond the schema."#
    )
}

/// Produce the weekly narrative: render the prompt, delegate to the model,
/// parse the fenced JSON block, and attach the series it was derived from.
/// Zero entries short-circuits to the fixed no-entries analysis without a
/// model call.
pub async fn generate(
    llm: &LlmClient,
    entries: &[JournalEntry],
    series: &NormalizedSeries,
) -> AppResult<GeneratedAnalysis> {
    if entries.is_empty() {
        return Ok(GeneratedAnalysis {
            analysis: WeeklyAnalysis::no_entries(),
            raw_data: series.clone(),
        });
    }

    let prompt = build_prompt(entries);
    let response = llm.complete(&prompt).await?;

    let mut analysis: WeeklyAnalysis = parse_fenced_json(&response)?;
    analysis.cumulative_scores = cumulative_scores(series);

    Ok(GeneratedAnalysis {
        analysis,
        raw_data: series.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::series::normalize;
    use crate::config::Config;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn entry(date: (i32, u32, u32), happiness: i32, sadness: i32) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            journal_content: "Stressful standup, calmer afternoon.".into(),
            created_at: Utc.with_ymd_and_hms(date.0, date.1, date.2, 10, 0, 0).unwrap(),
            emotion: EmotionScores { happiness, sadness, ..Default::default() },
            sentiment: SentimentScores { positive: happiness, negative: sadness, neutral: 1 },
        }
    }

    fn model_response() -> &'static str {
        r#"Here is the weekly analysis you asked for.
```json
{
  "weekly_emotion_analysis": {
    "dominant_emotions": ["happiness", "sadness"],
    "highest_positive_day": {"day": "2024-01-01", "emotions": ["happiness"]},
    "highest_negative_day": {"day": "2024-01-03", "emotions": ["sadness"]},
    "emotional_patterns": "Mornings trend low, evenings recover.",
    "trajectory": "Downward early, stabilizing by the weekend."
  },
  "weekly_sentiment_analysis": {
    "overall_sentiment": "mixed",
    "significant_shifts": ["Sharp drop on the 3rd"],
    "influencing_factors": ["work deadline"],
    "general_mood": "strained"
  },
  "progress_assessment": {
    "growth_areas": ["naming feelings"],
    "challenges": ["sleep"],
    "consistent_patterns": ["evening recovery"],
    "improvement_suggestions": ["wind down earlier"]
  },
  "weekly_summary": "A mixed week with an early dip and steady recovery."
}
```"#
    }

    // ── schema ───────────────────────────────────────────────────────────

    #[test]
    fn test_analysis_schema_decodes_from_fenced_block() {
        let analysis: WeeklyAnalysis = parse_fenced_json(model_response()).unwrap();
        assert_eq!(
            analysis.weekly_emotion_analysis.highest_negative_day,
            DominantDay { day: "2024-01-03".into(), emotions: vec!["sadness".into()] }
        );
        assert_eq!(analysis.weekly_sentiment_analysis.overall_sentiment, "mixed");
        assert!(!analysis.weekly_summary.is_empty());
        // Absent from the model payload, defaulted to zeros until computed.
        assert_eq!(analysis.cumulative_scores.emotion.happiness, 0);
    }

    #[test]
    fn test_generated_analysis_flattens_with_raw_data() {
        let entries = vec![entry((2024, 1, 1), 8, 0)];
        let series = normalize(&entries);
        let generated = GeneratedAnalysis {
            analysis: WeeklyAnalysis::no_entries(),
            raw_data: series,
        };
        let json = serde_json::to_value(&generated).unwrap();
        assert!(json.get("weekly_summary").is_some());
        assert!(json.get("raw_data").is_some());
        assert_eq!(json["raw_data"]["dates"][0], "2024-01-01");
    }

    // ── cumulative scores ────────────────────────────────────────────────

    #[test]
    fn test_cumulative_scores_sum_all_indices() {
        let entries = vec![entry((2024, 1, 1), 8, 0), entry((2024, 1, 3), 2, 9)];
        let series = normalize(&entries);
        let totals = cumulative_scores(&series);
        assert_eq!(totals.emotion.happiness, 10);
        assert_eq!(totals.emotion.sadness, 9);
        assert_eq!(totals.sentiment.neutral, 2);
    }

    #[test]
    fn test_cumulative_scores_empty_series_is_zero() {
        let totals = cumulative_scores(&NormalizedSeries::default());
        assert_eq!(totals.emotion.values(), [0; 11]);
        assert_eq!(totals.sentiment.values(), [0; 3]);
    }

    // ── prompt ───────────────────────────────────────────────────────────

    #[test]
    fn test_prompt_embeds_entries_and_schema() {
        let entries = vec![entry((2024, 1, 1), 8, 0)];
        let prompt = build_prompt(&entries);
        assert!(prompt.contains("Stressful standup"));
        assert!(prompt.contains("\"journal_timing\": \"2024-01-01 10:00:00\""));
        assert!(prompt.contains("```json"));
        assert!(prompt.contains("weekly_summary"));
    }

    // ── no-entries short circuit ─────────────────────────────────────────

    #[tokio::test]
    async fn test_generate_short_circuits_without_entries() {
        let config = Config {
            database_url: String::new(),
            host: String::new(),
            port: 0,
            frontend_url: String::new(),
            jwt_secret: String::new(),
            jwt_access_ttl_secs: 0,
            jwt_refresh_ttl_secs: 0,
            claude_api_key: String::new(),
            claude_model: String::new(),
        };
        let llm = LlmClient::new(&config);
        let series = NormalizedSeries::default();

        let generated = generate(&llm, &[], &series).await.unwrap();
        assert_eq!(
            generated.analysis.weekly_summary,
            "No journal entries found for the past week."
        );
        assert!(generated.raw_data.is_empty());
    }
}
