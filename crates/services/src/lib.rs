#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod practice;
pub mod reward_service;

pub use count_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressError, RewardError, SessionError};
pub use reward_service::{RewardEditor, RewardService};

pub use practice::{
    Advance, AdvanceResult, AnswerResult, BoardCell, Feedback, PracticeHistoryService,
    PracticeLoopService, PracticeSession, PracticeSummaryListItem, SessionProgress,
    SubmitOutcome,
};
