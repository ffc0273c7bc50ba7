use chrono::{DateTime, Utc};
use std::fmt;

use count_core::Clock;
use count_core::model::{NumberLine, PracticeConfig, PracticeSummary, Sequence};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What the learner is told after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

/// An accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub feedback: Feedback,
    /// Position the answer was checked against.
    pub index: usize,
    pub answer: i64,
    /// Answer recorded at `index` before this one.
    pub previous: Option<i64>,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.feedback == Feedback::Correct
    }
}

/// Result of moving past a correctly answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Nothing was waiting to advance.
    Idle,
    /// Moved to the question at this index.
    Next(usize),
    /// The last question was answered; the session is idle again.
    Completed(PracticeSummary),
}

/// One slot of the drill board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCell {
    /// Already answered, the number is shown.
    Revealed(i64),
    /// The question being asked.
    Current,
    /// Not reached yet.
    Hidden,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

struct ActiveDrill {
    config: PracticeConfig,
    sequence: Sequence,
    current: usize,
    answers: Vec<Option<i64>>,
    score: u32,
    total_attempts: u32,
    awaiting_advance: bool,
    started_at: DateTime<Utc>,
}

/// Counting drill controller.
///
/// Idle until [`start`](Self::start) generates a sequence. While active, each
/// submission is checked against the current number. A correct answer parks
/// the session until [`advance`](Self::advance) is called after the feedback
/// pause; answering the last number completes the drill and returns to idle.
pub struct PracticeSession {
    clock: Clock,
    active: Option<ActiveDrill>,
}

impl PracticeSession {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            active: None,
        }
    }

    /// Generate a sequence for `config` and start asking, replacing any
    /// drill in progress.
    pub fn start(&mut self, config: PracticeConfig) -> &Sequence {
        let sequence = config.generate();
        let drill = self.active.insert(ActiveDrill {
            config,
            answers: vec![None; sequence.len()],
            sequence,
            current: 0,
            score: 0,
            total_attempts: 0,
            awaiting_advance: false,
            started_at: self.clock.now(),
        });
        &drill.sequence
    }

    /// Abandon the drill in progress, if any.
    pub fn reset(&mut self) {
        self.active = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn is_awaiting_advance(&self) -> bool {
        self.active.as_ref().is_some_and(|d| d.awaiting_advance)
    }

    #[must_use]
    pub fn config(&self) -> Option<&PracticeConfig> {
        self.active.as_ref().map(|d| &d.config)
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&Sequence> {
        self.active.as_ref().map(|d| &d.sequence)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.active.as_ref().map_or(0, |d| d.current)
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<i64>] {
        match &self.active {
            Some(drill) => &drill.answers,
            None => &[],
        }
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.active.as_ref().map_or(0, |d| d.score)
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.active.as_ref().map_or(0, |d| d.total_attempts)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        match &self.active {
            Some(drill) => SessionProgress {
                total: drill.sequence.len(),
                answered: drill.current,
                remaining: drill.sequence.len().saturating_sub(drill.current),
                is_active: true,
            },
            None => SessionProgress {
                total: 0,
                answered: 0,
                remaining: 0,
                is_active: false,
            },
        }
    }

    /// Check `answer` against the current number.
    ///
    /// Returns `None` without touching any counter when the answer is absent,
    /// no drill is active, every number has been answered, or a correct answer
    /// is still waiting for [`advance`](Self::advance).
    pub fn submit_answer(&mut self, answer: Option<i64>) -> Option<SubmitOutcome> {
        let answer = answer?;
        let drill = self.active.as_mut()?;
        if drill.awaiting_advance {
            return None;
        }
        let expected = drill.sequence.get(drill.current)?;

        let previous = drill.answers[drill.current].replace(answer);
        drill.total_attempts = drill.total_attempts.saturating_add(1);

        let feedback = if answer == expected {
            drill.score = drill.score.saturating_add(1);
            drill.awaiting_advance = true;
            Feedback::Correct
        } else {
            Feedback::Incorrect
        };

        Some(SubmitOutcome {
            feedback,
            index: drill.current,
            answer,
            previous,
        })
    }

    /// Undo the submission described by `outcome`, as if it never happened.
    ///
    /// Only the latest submission can be undone; anything else is ignored.
    pub(crate) fn rollback(&mut self, outcome: &SubmitOutcome) {
        let Some(drill) = self.active.as_mut() else {
            return;
        };
        let pending_correct = outcome.is_correct() && drill.awaiting_advance;
        if drill.current != outcome.index
            || drill.answers.get(outcome.index).copied().flatten() != Some(outcome.answer)
            || (outcome.is_correct() && !pending_correct)
        {
            return;
        }
        drill.answers[outcome.index] = outcome.previous;
        drill.total_attempts = drill.total_attempts.saturating_sub(1);
        if pending_correct {
            drill.score = drill.score.saturating_sub(1);
            drill.awaiting_advance = false;
        }
    }

    /// Move past a correctly answered question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the completed drill cannot be summarized.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        let Some(drill) = self.active.as_mut() else {
            return Ok(Advance::Idle);
        };
        if !drill.awaiting_advance {
            return Ok(Advance::Idle);
        }

        drill.awaiting_advance = false;
        drill.current += 1;
        if drill.current < drill.sequence.len() {
            return Ok(Advance::Next(drill.current));
        }

        let Some(drill) = self.active.take() else {
            return Ok(Advance::Idle);
        };
        let completed_at = self.clock.now().max(drill.started_at);
        let summary = PracticeSummary::from_sequence(
            drill.config,
            &drill.sequence,
            drill.score,
            drill.total_attempts,
            drill.started_at,
            completed_at,
        )?;
        Ok(Advance::Completed(summary))
    }

    /// Board cells: answered numbers revealed, the current one marked.
    #[must_use]
    pub fn board(&self) -> Vec<BoardCell> {
        let Some(drill) = &self.active else {
            return Vec::new();
        };
        drill
            .sequence
            .values()
            .iter()
            .enumerate()
            .map(|(index, &value)| match index.cmp(&drill.current) {
                std::cmp::Ordering::Less => BoardCell::Revealed(value),
                std::cmp::Ordering::Equal => BoardCell::Current,
                std::cmp::Ordering::Greater => BoardCell::Hidden,
            })
            .collect()
    }

    /// Number-line hint for the active drill.
    #[must_use]
    pub fn hint(&self) -> Option<NumberLine> {
        self.active
            .as_ref()
            .map(|d| NumberLine::new(&d.sequence, d.current))
    }
}

impl fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PracticeSession");
        s.field("active", &self.is_active());
        if let Some(drill) = &self.active {
            s.field("config", &drill.config)
                .field("len", &drill.sequence.len())
                .field("current", &drill.current)
                .field("score", &drill.score)
                .field("total_attempts", &drill.total_attempts)
                .field("awaiting_advance", &drill.awaiting_advance);
        }
        s.finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use count_core::model::{Direction, PracticeConfigDraft};
    use count_core::time::{fixed_clock, fixed_now};

    fn config(start: i64, step: u32, direction: Direction, count: u32) -> PracticeConfig {
        PracticeConfigDraft {
            start,
            step,
            direction,
            count,
            ..PracticeConfigDraft::default()
        }
        .validate()
        .unwrap()
    }

    fn answer_and_advance(session: &mut PracticeSession, value: i64) -> Advance {
        let outcome = session.submit_answer(Some(value)).unwrap();
        assert!(outcome.is_correct());
        session.advance().unwrap()
    }

    #[test]
    fn idle_session_ignores_submissions() {
        let mut session = PracticeSession::new(fixed_clock());
        assert!(!session.is_active());
        assert_eq!(session.submit_answer(Some(1)), None);
        assert_eq!(session.advance().unwrap(), Advance::Idle);
        assert!(session.board().is_empty());
        assert!(session.hint().is_none());
    }

    #[test]
    fn counting_by_twos_completes_and_resets() {
        let mut session = PracticeSession::new(fixed_clock());
        let seq = session.start(config(0, 2, Direction::Forward, 5));
        assert_eq!(seq.values(), &[0, 2, 4, 6, 8]);

        for (i, value) in [0, 2, 4, 6].into_iter().enumerate() {
            assert_eq!(answer_and_advance(&mut session, value), Advance::Next(i + 1));
        }

        let Advance::Completed(summary) = answer_and_advance(&mut session, 8) else {
            panic!("expected completion");
        };
        assert_eq!(summary.score(), 5);
        assert_eq!(summary.total_attempts(), 5);
        assert_eq!(summary.completed_at(), fixed_now());
        assert!(!session.is_active());
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.submit_answer(Some(10)), None);
    }

    #[test]
    fn wrong_answer_keeps_position() {
        let mut session = PracticeSession::new(fixed_clock());
        let seq = session.start(config(5, 1, Direction::Backward, 5));
        assert_eq!(seq.values(), &[5, 4, 3, 2, 1]);

        let outcome = session.submit_answer(Some(99)).unwrap();
        assert_eq!(outcome.feedback, Feedback::Incorrect);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.total_attempts(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.answers()[0], Some(99));
        assert_eq!(session.advance().unwrap(), Advance::Idle);

        // retry the same question
        let outcome = session.submit_answer(Some(5)).unwrap();
        assert!(outcome.is_correct());
        assert_eq!(outcome.index, 0);
        assert_eq!(session.total_attempts(), 2);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn absent_answer_is_a_no_op() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(0, 1, Direction::Forward, 3));
        assert_eq!(session.submit_answer(None), None);
        assert_eq!(session.total_attempts(), 0);
    }

    #[test]
    fn submissions_during_feedback_pause_are_ignored() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(0, 1, Direction::Forward, 3));
        assert!(session.submit_answer(Some(0)).unwrap().is_correct());
        assert!(session.is_awaiting_advance());

        assert_eq!(session.submit_answer(Some(1)), None);
        assert_eq!(session.total_attempts(), 1);
        assert_eq!(session.current_index(), 0);

        assert_eq!(session.advance().unwrap(), Advance::Next(1));
        assert!(!session.is_awaiting_advance());
    }

    #[test]
    fn negative_answers_match_exactly() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(1, 3, Direction::Backward, 3));
        answer_and_advance(&mut session, 1);
        assert_eq!(
            session.submit_answer(Some(2)).unwrap().feedback,
            Feedback::Incorrect
        );
        assert!(session.submit_answer(Some(-2)).unwrap().is_correct());
    }

    #[test]
    fn rollback_restores_the_question() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(0, 1, Direction::Forward, 3));
        session.submit_answer(Some(4));
        let outcome = session.submit_answer(Some(0)).unwrap();
        assert_eq!(outcome.previous, Some(4));

        session.rollback(&outcome);
        assert!(!session.is_awaiting_advance());
        assert_eq!(session.score(), 0);
        assert_eq!(session.total_attempts(), 1);
        assert_eq!(session.answers()[0], Some(4));

        // the same answer is accepted again
        assert!(session.submit_answer(Some(0)).unwrap().is_correct());
        assert_eq!(session.score(), 1);
        assert_eq!(session.total_attempts(), 2);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(0, 1, Direction::Forward, 3));
        session.submit_answer(Some(7));
        session.reset();
        assert!(!session.is_active());
        assert_eq!(session.total_attempts(), 0);
        assert!(!session.progress().is_active);
    }

    #[test]
    fn board_and_hint_track_position() {
        let mut session = PracticeSession::new(fixed_clock());
        session.start(config(8, 1, Direction::Forward, 4));
        answer_and_advance(&mut session, 8);

        assert_eq!(
            session.board(),
            vec![
                BoardCell::Revealed(8),
                BoardCell::Current,
                BoardCell::Hidden,
                BoardCell::Hidden
            ]
        );
        let hint = session.hint().unwrap();
        assert!(hint.markers()[1].is_current);
        // 8 9 10 11
        assert!(hint.markers()[2].boundary.unwrap().decade);

        let progress = session.progress();
        assert_eq!(progress.total, 4);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 3);
    }

    #[test]
    fn invariants_hold_for_mixed_histories() {
        // Small LCG so the history is deterministic.
        let mut seed: u64 = 0x2545_F491;
        let mut next = || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            seed >> 33
        };

        for round in 0..50_i64 {
            let mut session = PracticeSession::new(fixed_clock());
            let len = 1 + u32::try_from(next() % 8).unwrap();
            session.start(config(round - 25, 5, Direction::Backward, len));
            let mut completed = false;

            for _ in 0..200 {
                let expected = session.sequence().and_then(|s| s.get(session.current_index()));
                let Some(expected) = expected else { break };
                let guess = if next() % 3 == 0 { expected + 1 } else { expected };
                let before = session.current_index();
                let outcome = session.submit_answer(Some(guess)).unwrap();

                assert!(session.score() <= session.total_attempts());
                let len = session.sequence().unwrap().len();
                assert!(session.current_index() <= len);
                if outcome.is_correct() {
                    if let Advance::Completed(summary) = session.advance().unwrap() {
                        assert!(summary.score() <= summary.total_attempts());
                        assert_eq!(summary.score(), summary.config().count());
                        completed = true;
                        break;
                    }
                    assert_eq!(session.current_index(), before + 1);
                } else {
                    assert_eq!(session.current_index(), before);
                }
            }
            assert!(completed);
        }
    }
}
