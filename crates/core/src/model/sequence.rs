use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::boundary::{Boundary, boundary_between};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequenceError {
    #[error("unsupported step: {0} (expected 1, 2, 3, 5 or 10)")]
    UnsupportedStep(u32),

    #[error("sequence length must be > 0")]
    EmptyCount,

    #[error("unknown practice mode: {0}")]
    UnknownMode(String),

    #[error("unknown crossing kind: {0}")]
    UnknownCrossing(String),

    #[error("unknown direction: {0}")]
    UnknownDirection(String),
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

/// Distance between consecutive numbers in a counting drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    One,
    Two,
    Three,
    Five,
    Ten,
}

impl Step {
    pub const ALL: [Step; 5] = [Step::One, Step::Two, Step::Three, Step::Five, Step::Ten];

    /// Converts a numeric step to a `Step`.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::UnsupportedStep` for anything but 1, 2, 3, 5 or 10.
    pub fn from_value(value: u32) -> Result<Self, SequenceError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            other => Err(SequenceError::UnsupportedStep(other)),
        }
    }

    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Step::One => 1,
            Step::Two => 2,
            Step::Three => 3,
            Step::Five => 5,
            Step::Ten => 10,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

//
// ─── DIRECTION ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

impl FromStr for Direction {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            other => Err(SequenceError::UnknownDirection(other.to_string())),
        }
    }
}

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Which place-value boundary a crossing drill is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingKind {
    Decade,
    Hundred,
}

impl CrossingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CrossingKind::Decade => "decade",
            CrossingKind::Hundred => "hundred",
        }
    }

    /// Size of the place-value group this kind crosses.
    #[must_use]
    pub fn group_size(self) -> i64 {
        match self {
            CrossingKind::Decade => 10,
            CrossingKind::Hundred => 100,
        }
    }
}

impl FromStr for CrossingKind {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decade" => Ok(Self::Decade),
            "hundred" => Ok(Self::Hundred),
            other => Err(SequenceError::UnknownCrossing(other.to_string())),
        }
    }
}

/// Drill flavour. Only affects labeling; both modes generate the same numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PracticeMode {
    #[default]
    Pattern,
    Crossing(CrossingKind),
}

impl PracticeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PracticeMode::Pattern => "pattern",
            PracticeMode::Crossing(_) => "crossing",
        }
    }

    #[must_use]
    pub fn crossing_kind(self) -> Option<CrossingKind> {
        match self {
            PracticeMode::Pattern => None,
            PracticeMode::Crossing(kind) => Some(kind),
        }
    }

    /// Rebuild a mode from its persisted name and optional crossing kind.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::UnknownMode` for unknown names, or for a
    /// crossing mode without a kind.
    pub fn from_parts(mode: &str, crossing: Option<CrossingKind>) -> Result<Self, SequenceError> {
        match (mode, crossing) {
            ("pattern", _) => Ok(Self::Pattern),
            ("crossing", Some(kind)) => Ok(Self::Crossing(kind)),
            (other, _) => Err(SequenceError::UnknownMode(other.to_string())),
        }
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Number of items in a freshly configured drill.
pub const DEFAULT_COUNT: u32 = 40;

/// Validated drill configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeConfig {
    mode: PracticeMode,
    step: Step,
    start: i64,
    direction: Direction,
    count: u32,
}

/// Unvalidated drill configuration, as collected from a form or CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeConfigDraft {
    pub mode: PracticeMode,
    pub step: u32,
    pub start: i64,
    pub direction: Direction,
    pub count: u32,
}

impl Default for PracticeConfigDraft {
    fn default() -> Self {
        Self {
            mode: PracticeMode::Pattern,
            step: 1,
            start: 0,
            direction: Direction::Forward,
            count: DEFAULT_COUNT,
        }
    }
}

impl PracticeConfigDraft {
    /// Validate the draft into a usable configuration.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::UnsupportedStep` or `SequenceError::EmptyCount`.
    pub fn validate(self) -> Result<PracticeConfig, SequenceError> {
        let step = Step::from_value(self.step)?;
        if self.count == 0 {
            return Err(SequenceError::EmptyCount);
        }
        Ok(PracticeConfig {
            mode: self.mode,
            step,
            start: self.start,
            direction: self.direction,
            count: self.count,
        })
    }
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            mode: PracticeMode::Pattern,
            step: Step::One,
            start: 0,
            direction: Direction::Forward,
            count: DEFAULT_COUNT,
        }
    }
}

impl PracticeConfig {
    #[must_use]
    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Heading shown above the drill board.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self.mode {
            PracticeMode::Pattern => "Number Pattern Practice",
            PracticeMode::Crossing(CrossingKind::Decade) => "Decade Crossing Practice",
            PracticeMode::Crossing(CrossingKind::Hundred) => "Hundred Crossing Practice",
        }
    }

    /// One-line description, e.g. "Counting forward by 2s starting from 0".
    ///
    /// Crossing drills leave out the starting number.
    #[must_use]
    pub fn description(&self) -> String {
        let heading = match self.direction {
            Direction::Forward => "Counting forward",
            Direction::Backward => "Counting backward",
        };
        match self.mode {
            PracticeMode::Pattern => {
                format!("{heading} by {}s starting from {}", self.step, self.start)
            }
            PracticeMode::Crossing(_) => format!("{heading} by {}s", self.step),
        }
    }

    #[must_use]
    pub fn generate(&self) -> Sequence {
        generate(self.mode, self.start, self.step, self.direction, self.count)
    }
}

//
// ─── SEQUENCE ──────────────────────────────────────────────────────────────────
//

/// Immutable ordered list of numbers the learner has to count through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    values: Vec<i64>,
}

/// Produce `count` numbers starting at `start`, `step` apart.
///
/// Element `i` is `start + i*step` forward and `start - i*step` backward.
/// `mode` does not change the arithmetic; a crossing drill is not guaranteed
/// to contain a boundary (see [`Sequence::crosses`]).
#[must_use]
pub fn generate(
    _mode: PracticeMode,
    start: i64,
    step: Step,
    direction: Direction,
    count: u32,
) -> Sequence {
    let step = i64::from(step.value());
    let values = (0..i64::from(count))
        .map(|i| {
            let offset = i.saturating_mul(step);
            match direction {
                Direction::Forward => start.saturating_add(offset),
                Direction::Backward => start.saturating_sub(offset),
            }
        })
        .collect();
    Sequence { values }
}

impl Sequence {
    #[must_use]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.values.get(index).copied()
    }

    /// Boundary between each element and its predecessor; empty for index 0.
    #[must_use]
    pub fn boundaries(&self) -> Vec<Boundary> {
        self.values
            .windows(2)
            .map(|pair| boundary_between(pair[0], pair[1]))
            .collect()
    }

    /// Whether at least one boundary of `kind` appears anywhere in the sequence.
    #[must_use]
    pub fn crosses(&self, kind: CrossingKind) -> bool {
        self.boundaries().iter().any(|b| b.crosses(kind))
    }

    /// Number of (decade, hundred) boundaries in the sequence.
    #[must_use]
    pub fn crossing_counts(&self) -> (u32, u32) {
        self.boundaries()
            .iter()
            .fold((0_u32, 0_u32), |(decades, hundreds), b| {
                (
                    decades.saturating_add(u32::from(b.decade)),
                    hundreds.saturating_add(u32::from(b.hundred)),
                )
            })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
