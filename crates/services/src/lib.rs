#![forbid(unsafe_code)]

pub mod api_client;
pub mod app_services;
pub mod attempt;
pub mod countdown_timer;
pub mod error;
pub mod stores;

pub use prep_core::Clock;

pub use api_client::{ApiClient, ApiConfig};
pub use app_services::AppServices;
pub use attempt::{AnswerOutcome, CompletedTest, QuestionReview, TestResults, TestRunner};
pub use countdown_timer::CountdownTimer;
pub use error::{ApiError, AppServicesError, AttemptError, StoreError};
pub use stores::{AuthService, ExamContextService, ProgressService, SessionTracker};
