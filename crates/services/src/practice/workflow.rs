use std::sync::Arc;
use std::time::Duration;

use count_core::input::parse_answer;
use count_core::model::{CoinOutcome, PracticeConfig, RewardLedger};
use count_core::time::DEFAULT_FEEDBACK_DELAY_MS;
use storage::repository::PracticeSummaryRepository;
use tracing::{debug, info};

use super::session::{Advance, PracticeSession, SubmitOutcome};
use crate::Clock;
use crate::error::SessionError;
use crate::reward_service::RewardService;

/// Result of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerResult {
    pub outcome: SubmitOutcome,
    /// Set when the answer earned a coin.
    pub reward: Option<(CoinOutcome, RewardLedger)>,
    /// How long to show feedback before calling `advance`.
    pub feedback_delay: Option<Duration>,
}

/// Result of moving past a correct answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceResult {
    pub advance: Advance,
    pub summary_id: Option<i64>,
}

/// Orchestrates drills with reward crediting and summary persistence.
#[derive(Clone)]
pub struct PracticeLoopService {
    clock: Clock,
    rewards: RewardService,
    summaries: Arc<dyn PracticeSummaryRepository>,
    feedback_delay: Duration,
}

impl PracticeLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        rewards: RewardService,
        summaries: Arc<dyn PracticeSummaryRepository>,
    ) -> Self {
        Self {
            clock,
            rewards,
            summaries,
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_DELAY_MS),
        }
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, feedback_delay: Duration) -> Self {
        self.feedback_delay = feedback_delay;
        self
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardService {
        &self.rewards
    }

    /// Start a drill for `config`.
    #[must_use]
    pub fn start(&self, config: PracticeConfig) -> PracticeSession {
        let mut session = PracticeSession::new(self.clock);
        let len = session.start(config).len();
        info!(
            mode = config.mode().as_str(),
            step = config.step().value(),
            start = config.start(),
            direction = config.direction().as_str(),
            len,
            "practice session started"
        );
        session
    }

    /// Check raw learner input against the current question.
    ///
    /// Blank or non-numeric input is ignored and returns `None`, as does any
    /// submission the session itself ignores. A correct answer credits one coin.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Reward` if the earned coin cannot be persisted.
    /// The submission is then undone and the question stays open.
    pub async fn answer(
        &self,
        session: &mut PracticeSession,
        raw: &str,
    ) -> Result<Option<AnswerResult>, SessionError> {
        let Some(outcome) = session.submit_answer(parse_answer(raw)) else {
            return Ok(None);
        };
        debug!(
            index = outcome.index,
            answer = outcome.answer,
            correct = outcome.is_correct(),
            "answer checked"
        );
        if !outcome.is_correct() {
            return Ok(Some(AnswerResult {
                outcome,
                reward: None,
                feedback_delay: None,
            }));
        }

        let reward = match self.rewards.earn_coin().await {
            Ok(reward) => reward,
            Err(err) => {
                // Retract the answer so the learner can submit it again.
                session.rollback(&outcome);
                return Err(err.into());
            }
        };
        Ok(Some(AnswerResult {
            outcome,
            reward: Some(reward),
            feedback_delay: Some(self.feedback_delay),
        }))
    }

    /// Move to the next question, persisting the summary when the drill completes.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the summary cannot be built or stored.
    pub async fn advance(&self, session: &mut PracticeSession) -> Result<AdvanceResult, SessionError> {
        let advance = session.advance()?;
        let summary_id = match &advance {
            Advance::Completed(summary) => {
                let id = self.summaries.append_summary(summary).await?;
                info!(
                    summary_id = id,
                    score = summary.score(),
                    total_attempts = summary.total_attempts(),
                    "practice session complete"
                );
                Some(id)
            }
            Advance::Idle | Advance::Next(_) => None,
        };
        Ok(AdvanceResult {
            advance,
            summary_id,
        })
    }
}
