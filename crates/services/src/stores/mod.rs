mod auth;
mod exam_context;
mod progress;
mod session_tracker;
#[cfg(test)]
mod test_support;

pub use auth::AuthService;
pub use exam_context::ExamContextService;
pub use progress::ProgressService;
pub use session_tracker::SessionTracker;
