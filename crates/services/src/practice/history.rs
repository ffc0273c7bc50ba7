use chrono::{DateTime, Utc};
use std::sync::Arc;

use count_core::model::{PracticeMode, PracticeSummary, ProgressReport, Step};
use storage::repository::{PracticeSummaryRepository, PracticeSummaryRow};

use crate::error::ProgressError;

/// Presentation-agnostic list item for a finished drill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSummaryListItem {
    pub id: i64,
    pub completed_at: DateTime<Utc>,
    pub mode: PracticeMode,
    pub step: Step,
    pub score: u32,
    pub total_attempts: u32,
}

impl PracticeSummaryListItem {
    #[must_use]
    pub fn from_row(row: &PracticeSummaryRow) -> Self {
        let summary = &row.summary;
        Self {
            id: row.id,
            completed_at: summary.completed_at(),
            mode: summary.config().mode(),
            step: summary.config().step(),
            score: summary.score(),
            total_attempts: summary.total_attempts(),
        }
    }
}

/// Read side over persisted drills: recent history and the progress board.
#[derive(Clone)]
pub struct PracticeHistoryService {
    summaries: Arc<dyn PracticeSummaryRepository>,
}

impl PracticeHistoryService {
    #[must_use]
    pub fn new(summaries: Arc<dyn PracticeSummaryRepository>) -> Self {
        Self { summaries }
    }

    /// Most recent drills, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn list_recent(
        &self,
        limit: u32,
    ) -> Result<Vec<PracticeSummaryListItem>, ProgressError> {
        let rows = self.summaries.list_summaries(limit).await?;
        Ok(rows.iter().map(PracticeSummaryListItem::from_row).collect())
    }

    /// Stats and achievements across every stored drill.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` on repository failures.
    pub async fn progress_report(&self) -> Result<ProgressReport, ProgressError> {
        let rows = self.summaries.list_summaries(u32::MAX).await?;
        let summaries: Vec<PracticeSummary> = rows.into_iter().map(|row| row.summary).collect();
        Ok(ProgressReport::from_summaries(&summaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use count_core::model::{AchievementKind, PracticeConfig, PracticeConfigDraft};
    use count_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn counting_by(step: u32) -> PracticeConfig {
        PracticeConfigDraft {
            step,
            count: 4,
            ..PracticeConfigDraft::default()
        }
        .validate()
        .unwrap()
    }

    async fn append(repo: &InMemoryRepository, config: PracticeConfig, minutes: i64) -> i64 {
        let at = fixed_now() + chrono::Duration::minutes(minutes);
        let summary =
            PracticeSummary::from_sequence(config, &config.generate(), 4, 5, at, at).unwrap();
        repo.append_summary(&summary).await.unwrap()
    }

    #[tokio::test]
    async fn list_recent_is_newest_first() {
        let repo = InMemoryRepository::new();
        let older = append(&repo, counting_by(2), 0).await;
        let newer = append(&repo, counting_by(10), 3).await;
        let history = PracticeHistoryService::new(Arc::new(repo));

        let items = history.list_recent(5).await.unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![newer, older]);
        assert_eq!(items[0].step, Step::Ten);
        assert_eq!(items[0].score, 4);
        assert_eq!(items[0].total_attempts, 5);
    }

    #[tokio::test]
    async fn progress_report_earns_counting_badges() {
        let repo = InMemoryRepository::new();
        for minute in 0..5 {
            append(&repo, counting_by(10), minute).await;
        }
        let history = PracticeHistoryService::new(Arc::new(repo));
        let report = history.progress_report().await.unwrap();

        let tens = report
            .achievements
            .iter()
            .find(|a| a.kind == AchievementKind::CountingByTens)
            .unwrap();
        assert!(tens.is_earned());
        assert_eq!(tens.earned_at, Some(fixed_now() + chrono::Duration::minutes(4)));
        assert_eq!(report.stats[3].completed, 5);
        assert_eq!(report.stats[3].percentage, 25);
    }

    #[tokio::test]
    async fn empty_history_reports_nothing_earned() {
        let history = PracticeHistoryService::new(Arc::new(InMemoryRepository::new()));
        assert!(history.list_recent(10).await.unwrap().is_empty());
        let report = history.progress_report().await.unwrap();
        assert!(report.achievements.iter().all(|a| !a.is_earned()));
    }
}
