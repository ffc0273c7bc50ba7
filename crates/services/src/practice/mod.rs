mod history;
mod progress;
mod session;
mod workflow;

// Public API of the practice subsystem.
pub use crate::error::SessionError;
pub use history::{PracticeHistoryService, PracticeSummaryListItem};
pub use progress::SessionProgress;
pub use session::{Advance, BoardCell, Feedback, PracticeSession, SubmitOutcome};
pub use workflow::{AdvanceResult, AnswerResult, PracticeLoopService};
