use std::sync::Arc;
use std::time::Duration;

use count_core::model::Passcode;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::practice::{PracticeHistoryService, PracticeLoopService};
use crate::reward_service::RewardService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    rewards: RewardService,
    practice_loop: Arc<PracticeLoopService>,
    history: Arc<PracticeHistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or ledger loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        passcode: Passcode,
        feedback_delay: Duration,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, passcode, feedback_delay).await
    }

    async fn from_storage(
        storage: Storage,
        clock: Clock,
        passcode: Passcode,
        feedback_delay: Duration,
    ) -> Result<Self, AppServicesError> {
        let rewards = RewardService::load(storage.ledger(), passcode).await?;
        let practice_loop = Arc::new(
            PracticeLoopService::new(clock, rewards.clone(), Arc::clone(&storage.summaries))
                .with_feedback_delay(feedback_delay),
        );
        let history = Arc::new(PracticeHistoryService::new(Arc::clone(&storage.summaries)));

        Ok(Self {
            rewards,
            practice_loop,
            history,
        })
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardService {
        &self.rewards
    }

    #[must_use]
    pub fn practice_loop(&self) -> Arc<PracticeLoopService> {
        Arc::clone(&self.practice_loop)
    }

    #[must_use]
    pub fn history(&self) -> Arc<PracticeHistoryService> {
        Arc::clone(&self.history)
    }
}
