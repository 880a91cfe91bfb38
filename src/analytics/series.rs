use serde::{Deserialize, Serialize};

use crate::models::journal::{EmotionScores, JournalEntry, SentimentScores};

/// Per-dimension emotion time series, index-aligned with the owning
/// `NormalizedSeries::dates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionSeries {
    pub happiness: Vec<i32>,
    pub sadness: Vec<i32>,
    pub fear: Vec<i32>,
    pub anger: Vec<i32>,
    pub surprise: Vec<i32>,
    pub joy: Vec<i32>,
    pub love: Vec<i32>,
    pub disgust: Vec<i32>,
    pub relief: Vec<i32>,
    pub gratitude: Vec<i32>,
    pub confusion: Vec<i32>,
}

impl EmotionSeries {
    fn push(&mut self, scores: &EmotionScores) {
        self.happiness.push(scores.happiness);
        self.sadness.push(scores.sadness);
        self.fear.push(scores.fear);
        self.anger.push(scores.anger);
        self.surprise.push(scores.surprise);
        self.joy.push(scores.joy);
        self.love.push(scores.love);
        self.disgust.push(scores.disgust);
        self.relief.push(scores.relief);
        self.gratitude.push(scores.gratitude);
        self.confusion.push(scores.confusion);
    }

    /// All eleven dimensions in declared order.
    pub fn dimensions(&self) -> [(&'static str, &[i32]); 11] {
        [
            ("happiness", &self.happiness),
            ("sadness", &self.sadness),
            ("fear", &self.fear),
            ("anger", &self.anger),
            ("surprise", &self.surprise),
            ("joy", &self.joy),
            ("love", &self.love),
            ("disgust", &self.disgust),
            ("relief", &self.relief),
            ("gratitude", &self.gratitude),
            ("confusion", &self.confusion),
        ]
    }

    /// The score vector at one entry index.
    pub fn at(&self, idx: usize) -> EmotionScores {
        EmotionScores {
            happiness: self.happiness[idx],
            sadness: self.sadness[idx],
            fear: self.fear[idx],
            anger: self.anger[idx],
            surprise: self.surprise[idx],
            joy: self.joy[idx],
            love: self.love[idx],
            disgust: self.disgust[idx],
            relief: self.relief[idx],
            gratitude: self.gratitude[idx],
            confusion: self.confusion[idx],
        }
    }
}

/// Per-dimension sentiment time series, index-aligned with `dates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentSeries {
    pub positive: Vec<i32>,
    pub negative: Vec<i32>,
    pub neutral: Vec<i32>,
}

impl SentimentSeries {
    fn push(&mut self, scores: &SentimentScores) {
        self.positive.push(scores.positive);
        self.negative.push(scores.negative);
        self.neutral.push(scores.neutral);
    }

    pub fn dimensions(&self) -> [(&'static str, &[i32]); 3] {
        [
            ("positive", &self.positive),
            ("negative", &self.negative),
            ("neutral", &self.neutral),
        ]
    }
}

/// Date-aligned parallel arrays derived from one window of journal entries.
///
/// `dates` holds one calendar-date string per entry, in entry order. The
/// series is sparse: days with several entries contribute several indices,
/// and days without entries are simply absent. Consumers must not assume one
/// point per calendar day. Every score vector has exactly `dates.len()`
/// elements, and index `i` across all vectors refers to the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub dates: Vec<String>,
    pub emotions: EmotionSeries,
    pub sentiments: SentimentSeries,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Convert an ordered entry list into a `NormalizedSeries`. Pure: no
/// deduplication, no gap-filling, no re-sorting. Input order (the
/// selector's ascending creation time) is preserved verbatim.
pub fn normalize(entries: &[JournalEntry]) -> NormalizedSeries {
    let mut series = NormalizedSeries::default();
    for entry in entries {
        series
            .dates
            .push(entry.created_at.date_naive().format("%Y-%m-%d").to_string());
        series.emotions.push(&entry.emotion);
        series.sentiments.push(&entry.sentiment);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn entry_on(
        date: (i32, u32, u32),
        hour: u32,
        emotion: EmotionScores,
        sentiment: SentimentScores,
    ) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            journal_content: "entry".into(),
            created_at: Utc
                .with_ymd_and_hms(date.0, date.1, date.2, hour, 30, 0)
                .unwrap(),
            emotion,
            sentiment,
        }
    }

    fn sample_entries() -> Vec<JournalEntry> {
        vec![
            entry_on(
                (2024, 1, 1),
                9,
                EmotionScores { happiness: 8, ..Default::default() },
                SentimentScores { positive: 7, negative: 1, neutral: 2 },
            ),
            entry_on(
                (2024, 1, 1),
                21,
                EmotionScores { happiness: 4, sadness: 2, ..Default::default() },
                SentimentScores { positive: 4, negative: 3, neutral: 3 },
            ),
            entry_on(
                (2024, 1, 3),
                12,
                EmotionScores { sadness: 9, fear: 3, ..Default::default() },
                SentimentScores { positive: 1, negative: 8, neutral: 1 },
            ),
        ]
    }

    // ── structural invariants ────────────────────────────────────────────

    #[test]
    fn test_dates_length_matches_entries() {
        let entries = sample_entries();
        let series = normalize(&entries);
        assert_eq!(series.len(), entries.len());
        for (_, values) in series.emotions.dimensions() {
            assert_eq!(values.len(), entries.len());
        }
        for (_, values) in series.sentiments.dimensions() {
            assert_eq!(values.len(), entries.len());
        }
    }

    #[test]
    fn test_order_preserved_and_index_aligned() {
        let series = normalize(&sample_entries());
        assert_eq!(series.dates, vec!["2024-01-01", "2024-01-01", "2024-01-03"]);
        assert_eq!(series.emotions.happiness, vec![8, 4, 0]);
        assert_eq!(series.emotions.sadness, vec![0, 2, 9]);
        assert_eq!(series.sentiments.negative, vec![1, 3, 8]);
    }

    #[test]
    fn test_duplicate_dates_each_keep_their_index() {
        let series = normalize(&sample_entries());
        // Two entries on Jan 1: no averaging, no dedup.
        assert_eq!(series.dates[0], series.dates[1]);
        assert_ne!(series.emotions.happiness[0], series.emotions.happiness[1]);
    }

    #[test]
    fn test_time_of_day_discarded() {
        let series = normalize(&sample_entries());
        assert!(series.dates.iter().all(|d| d.len() == 10));
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series = normalize(&[]);
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn test_at_reconstructs_entry_scores() {
        let entries = sample_entries();
        let series = normalize(&entries);
        assert_eq!(series.emotions.at(2), entries[2].emotion);
    }
}
