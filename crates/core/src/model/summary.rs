use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::sequence::{PracticeConfig, Sequence};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) exceeds total attempts ({attempts})")]
    ScoreExceedsAttempts { score: u32, attempts: u32 },
}

/// Result of a finished counting drill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSummary {
    config: PracticeConfig,
    score: u32,
    total_attempts: u32,
    decade_crossings: u32,
    hundred_crossings: u32,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl PracticeSummary {
    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if the tally or time range is inconsistent.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        config: PracticeConfig,
        score: u32,
        total_attempts: u32,
        decade_crossings: u32,
        hundred_crossings: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        if score > total_attempts {
            return Err(SummaryError::ScoreExceedsAttempts {
                score,
                attempts: total_attempts,
            });
        }
        Ok(Self {
            config,
            score,
            total_attempts,
            decade_crossings,
            hundred_crossings,
            started_at,
            completed_at,
        })
    }

    /// Build a summary for a drill over `sequence`, counting the boundaries it contains.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if the tally or time range is inconsistent.
    pub fn from_sequence(
        config: PracticeConfig,
        sequence: &Sequence,
        score: u32,
        total_attempts: u32,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SummaryError> {
        let (decades, hundreds) = sequence.crossing_counts();
        Self::from_persisted(
            config,
            score,
            total_attempts,
            decades,
            hundreds,
            started_at,
            completed_at,
        )
    }

    #[must_use]
    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn decade_crossings(&self) -> u32 {
        self.decade_crossings
    }

    #[must_use]
    pub fn hundred_crossings(&self) -> u32 {
        self.hundred_crossings
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sequence::PracticeConfigDraft;
    use crate::time::fixed_now;

    #[test]
    fn counts_crossings_from_sequence() {
        let config = PracticeConfigDraft {
            start: 95,
            step: 5,
            count: 4,
            ..PracticeConfigDraft::default()
        }
        .validate()
        .unwrap();
        let summary = PracticeSummary::from_sequence(
            config,
            &config.generate(),
            4,
            6,
            fixed_now(),
            fixed_now(),
        )
        .unwrap();
        // 95 100 105 110
        assert_eq!(summary.decade_crossings(), 2);
        assert_eq!(summary.hundred_crossings(), 1);
        assert_eq!(summary.score(), 4);
        assert_eq!(summary.total_attempts(), 6);
    }

    #[test]
    fn rejects_score_above_attempts() {
        let err = PracticeSummary::from_persisted(
            PracticeConfig::default(),
            3,
            2,
            0,
            0,
            fixed_now(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SummaryError::ScoreExceedsAttempts {
                score: 3,
                attempts: 2
            }
        );
    }

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = PracticeSummary::from_persisted(
            PracticeConfig::default(),
            1,
            1,
            0,
            0,
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SummaryError::InvalidTimeRange);
    }
}
