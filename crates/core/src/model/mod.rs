mod auth;
mod exam;
mod features;
mod ids;
mod percent;
mod progress;
mod session;
mod settings;
mod subject;
mod resources;

pub use auth::{AuthSession, User};
pub use exam::{DEFAULT_EXAM_STANDARD, ExamSelection, ExamStandard};
pub use features::FeatureFlags;
pub use ids::{ParseIdError, QuestionId, TestId};
pub use percent::{Percent, PercentError};
pub use progress::{ProgressState, SubjectProgress};
pub use session::SessionState;
pub use settings::{
    ClientSettings, ClientSettingsDraft, ClientSettingsError, DEFAULT_API_BASE_URL,
    DEFAULT_TIME_LIMIT_SECS,
};
pub use subject::{Difficulty, LearningMode, ParseEnumError, QuestionType, Subject};
pub use resources::{
    AiFeedback, Evaluation, NewTest, NewTestDraft, NewTestError, Question, SubmissionResponse,
    Test, standards_for,
};
