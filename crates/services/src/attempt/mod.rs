mod completion;
mod runner;

// Public API of the attempt workflow.
pub use crate::error::AttemptError;
pub use completion::{CompletedTest, QuestionReview, TestResults};
pub use runner::{AnswerOutcome, TestRunner};
