use prep_core::model::{LearningMode, SessionState};
use tokio::sync::watch;

use crate::Clock;

/// Observable holder of the in-progress `SessionState`.
///
/// Every mutation publishes a new snapshot to subscribers. Nothing is
/// persisted; the state lives as long as the test-taking view.
pub struct SessionTracker {
    clock: Clock,
    state: watch::Sender<SessionState>,
}

impl SessionTracker {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        let (state, _) = watch::channel(SessionState::new(clock.now()));
        Self { clock, state }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn get(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn set_mode(&self, mode: LearningMode) {
        self.state.send_modify(|state| state.set_mode(mode));
    }

    /// Records or overwrites the answer for `index`.
    pub fn set_answer(&self, index: usize, value: impl Into<String>) {
        let value = value.into();
        self.state.send_modify(|state| state.set_answer(index, value));
    }

    /// Moves focus to `index` and clears the feedback and hint flags.
    pub fn set_current_question(&self, index: usize) {
        self.state
            .send_modify(|state| state.set_current_question(index));
    }

    pub fn toggle_mark_for_review(&self, index: usize) {
        self.state
            .send_modify(|state| state.toggle_mark_for_review(index));
    }

    pub fn record_question_time(&self, index: usize, seconds: u32) {
        self.state
            .send_modify(|state| state.record_question_time(index, seconds));
    }

    pub fn set_show_feedback(&self, show: bool) {
        self.state.send_modify(|state| state.set_show_feedback(show));
    }

    pub fn set_show_hint(&self, show: bool) {
        self.state.send_modify(|state| state.set_show_hint(show));
    }

    /// Back to the initial state with a fresh start time.
    pub fn reset_session(&self) {
        let now = self.clock.now();
        self.state.send_modify(|state| state.reset(now));
    }
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker")
            .field("clock", &self.clock)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
