use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::model::LearningMode;

/// In-progress test-taking state for one session.
///
/// Every operation is total. Keeping `current_question_index` inside
/// `[0, question_count)` is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    mode: LearningMode,
    current_question_index: usize,
    answers: BTreeMap<usize, String>,
    marked_for_review: BTreeSet<usize>,
    time_per_question: BTreeMap<usize, u32>,
    time_started: DateTime<Utc>,
    show_feedback: bool,
    show_hint: bool,
}

impl SessionState {
    /// Fresh session started at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            mode: LearningMode::default(),
            current_question_index: 0,
            answers: BTreeMap::new(),
            marked_for_review: BTreeSet::new(),
            time_per_question: BTreeMap::new(),
            time_started: now,
            show_feedback: false,
            show_hint: false,
        }
    }

    // ─── Mutations ─────────────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: LearningMode) {
        self.mode = mode;
    }

    /// Moves focus to `index`.
    ///
    /// Navigating always clears the per-question `show_feedback` and
    /// `show_hint` flags.
    pub fn set_current_question(&mut self, index: usize) {
        self.current_question_index = index;
        self.show_feedback = false;
        self.show_hint = false;
    }

    /// Records or overwrites the answer for `index`. The value is not checked
    /// against the question type.
    pub fn set_answer(&mut self, index: usize, value: impl Into<String>) {
        self.answers.insert(index, value.into());
    }

    pub fn toggle_mark_for_review(&mut self, index: usize) {
        if !self.marked_for_review.remove(&index) {
            self.marked_for_review.insert(index);
        }
    }

    /// Last write wins; repeated visits do not accumulate.
    pub fn record_question_time(&mut self, index: usize, seconds: u32) {
        self.time_per_question.insert(index, seconds);
    }

    pub fn set_show_feedback(&mut self, show: bool) {
        self.show_feedback = show;
    }

    pub fn set_show_hint(&mut self, show: bool) {
        self.show_hint = show;
    }

    /// Restores every field to its initial value and stamps `now` as the new
    /// start time.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        *self = Self::new(now);
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn mode(&self) -> LearningMode {
        self.mode
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn marked_for_review(&self) -> &BTreeSet<usize> {
        &self.marked_for_review
    }

    #[must_use]
    pub fn is_marked(&self, index: usize) -> bool {
        self.marked_for_review.contains(&index)
    }

    #[must_use]
    pub fn time_per_question(&self) -> &BTreeMap<usize, u32> {
        &self.time_per_question
    }

    #[must_use]
    pub fn question_time(&self, index: usize) -> Option<u32> {
        self.time_per_question.get(&index).copied()
    }

    #[must_use]
    pub fn time_started(&self) -> DateTime<Utc> {
        self.time_started
    }

    #[must_use]
    pub fn show_feedback(&self) -> bool {
        self.show_feedback
    }

    #[must_use]
    pub fn show_hint(&self) -> bool {
        self.show_hint
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Indices in `[0, question_count)` without an answer yet.
    #[must_use]
    pub fn unanswered(&self, question_count: usize) -> Vec<usize> {
        (0..question_count)
            .filter(|index| !self.answers.contains_key(index))
            .collect()
    }

    /// Answers keyed by the stringified question index, the shape the
    /// submission endpoint expects.
    #[must_use]
    pub fn answers_payload(&self) -> BTreeMap<String, String> {
        self.answers
            .iter()
            .map(|(index, answer)| (index.to_string(), answer.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn last_answer_per_index_wins() {
        let mut state = SessionState::new(fixed_now());
        state.set_answer(0, "A");
        state.set_answer(1, "B");
        state.set_answer(0, "C");
        assert_eq!(state.answer(0), Some("C"));
        assert_eq!(state.answer(1), Some("B"));
        assert_eq!(state.answered_count(), 2);
    }

    #[test]
    fn toggle_twice_restores_review_set() {
        let mut state = SessionState::new(fixed_now());
        state.toggle_mark_for_review(4);
        let before = state.marked_for_review().clone();
        state.toggle_mark_for_review(2);
        state.toggle_mark_for_review(2);
        assert_eq!(state.marked_for_review(), &before);
        state.toggle_mark_for_review(4);
        assert!(!state.is_marked(4));
    }

    #[test]
    fn navigation_clears_feedback_and_hint() {
        let mut state = SessionState::new(fixed_now());
        state.set_show_feedback(true);
        state.set_show_hint(true);
        state.set_current_question(3);
        assert_eq!(state.current_question_index(), 3);
        assert!(!state.show_feedback());
        assert!(!state.show_hint());
    }

    #[test]
    fn question_time_is_overwritten() {
        let mut state = SessionState::new(fixed_now());
        state.record_question_time(1, 30);
        state.record_question_time(1, 12);
        assert_eq!(state.question_time(1), Some(12));
    }

    #[test]
    fn reset_restores_initial_values() {
        let start = fixed_now();
        let mut state = SessionState::new(start);
        state.set_mode(LearningMode::Assessment);
        state.set_answer(0, "A");
        state.toggle_mark_for_review(0);
        state.record_question_time(0, 9);
        state.set_current_question(2);
        state.set_show_hint(true);

        let later = start + Duration::minutes(5);
        state.reset(later);

        assert_eq!(state, SessionState::new(later));
        assert!(state.time_started() >= start);
    }

    #[test]
    fn payload_uses_string_keys() {
        let mut state = SessionState::new(fixed_now());
        state.set_answer(2, "B");
        state.set_answer(0, "D");
        let payload = state.answers_payload();
        assert_eq!(payload.get("0").map(String::as_str), Some("D"));
        assert_eq!(payload.get("2").map(String::as_str), Some("B"));
        assert_eq!(state.unanswered(3), vec![1]);
    }
}
