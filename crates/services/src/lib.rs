#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod sessions;
pub mod stats_service;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use error::{AppServicesError, ImportError, SessionError, StatsServiceError};
pub use stats_service::{ImportSummary, StatsService};

pub use sessions::{
    AnswerResult, QuizLoopService, QuizRequest, QuizResults, QuizSession, QuizStart, Review,
    ReviewItem, SessionProgress, SessionState,
};
