pub mod boundary;
mod ledger;
mod passcode;
mod progress;
pub mod sequence;
mod summary;

pub use boundary::{Boundary, NumberLine, NumberLineMarker, boundary_between};
pub use ledger::{COINS_PER_EGG, CoinOutcome, RewardLedger};
pub use passcode::{DEFAULT_PASSCODE, Passcode, PasscodeError};
pub use progress::{
    Achievement, AchievementKind, AchievementTier, ProgressCategory, ProgressReport, ProgressStat,
};
pub use sequence::{
    CrossingKind, DEFAULT_COUNT, Direction, PracticeConfig, PracticeConfigDraft, PracticeMode,
    Sequence, SequenceError, Step, generate,
};
pub use summary::{PracticeSummary, SummaryError};
