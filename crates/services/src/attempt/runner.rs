use std::sync::Arc;

use chrono::{DateTime, Utc};
use prep_core::model::{LearningMode, Question, SessionState, Test};
use prep_core::scoring::answer_is_correct;
use tracing::{debug, info};

use crate::Clock;
use crate::api_client::ApiClient;
use crate::error::AttemptError;
use crate::stores::SessionTracker;

use super::completion::CompletedTest;

/// What the student sees right after answering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerOutcome {
    /// Only revealed in modes with immediate feedback, and only for
    /// multiple-choice questions.
    pub correct: Option<bool>,
    pub explanation: Option<String>,
}

/// Drives one attempt at a fetched test.
///
/// The per-question answers, flags and timings live in the shared
/// `SessionTracker` so views can subscribe to them; the runner enforces the
/// mode rules on top.
pub struct TestRunner {
    test: Test,
    mode: LearningMode,
    tracker: Arc<SessionTracker>,
    clock: Clock,
    entered_at: DateTime<Utc>,
}

impl TestRunner {
    /// Reset the tracker and start at the first question.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::EmptyTest` if the test has no questions.
    pub fn start(
        test: Test,
        mode: LearningMode,
        tracker: Arc<SessionTracker>,
        clock: Clock,
    ) -> Result<Self, AttemptError> {
        if test.is_empty() {
            return Err(AttemptError::EmptyTest);
        }
        tracker.reset_session();
        tracker.set_mode(mode);
        info!(test_id = %test.id, %mode, questions = test.len(), "attempt started");
        Ok(Self {
            test,
            mode,
            tracker,
            clock,
            entered_at: clock.now(),
        })
    }

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn mode(&self) -> LearningMode {
        self.mode
    }

    #[must_use]
    pub fn session(&self) -> SessionState {
        self.tracker.get()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.tracker.get().current_question_index()
    }

    /// # Errors
    ///
    /// Returns `AttemptError::IndexOutOfRange` if the tracker points past
    /// the test, which only happens when it is driven from elsewhere.
    pub fn current_question(&self) -> Result<&Question, AttemptError> {
        let index = self.current_index();
        self.test
            .question(index)
            .ok_or(AttemptError::IndexOutOfRange {
                index,
                count: self.test.len(),
            })
    }

    /// Answer the current question.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AnswerLocked` when the mode forbids changing an
    /// answer that was already given.
    pub fn answer_current(&mut self, value: &str) -> Result<AnswerOutcome, AttemptError> {
        let index = self.current_index();
        let question = self.current_question()?;

        if self.mode.locks_after_answer() && self.tracker.get().answer(index).is_some() {
            return Err(AttemptError::AnswerLocked(index));
        }

        let outcome = if self.mode.shows_immediate_feedback() {
            AnswerOutcome {
                correct: question
                    .is_mcq()
                    .then(|| answer_is_correct(question, value)),
                explanation: question.explanation_for(value).map(ToOwned::to_owned),
            }
        } else {
            AnswerOutcome::default()
        };

        self.tracker.set_answer(index, value);
        if self.mode.shows_immediate_feedback() {
            self.tracker.set_show_feedback(true);
        }
        debug!(index, "answer recorded");
        Ok(outcome)
    }

    /// Flip the hint for the current question, returning it when shown.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::HintsUnavailable` in assessment mode.
    pub fn toggle_hint(&mut self) -> Result<Option<String>, AttemptError> {
        if !self.mode.hints_available() {
            return Err(AttemptError::HintsUnavailable);
        }
        let show = !self.tracker.get().show_hint();
        self.tracker.set_show_hint(show);
        if !show {
            return Ok(None);
        }
        Ok(self.current_question()?.hint.clone())
    }

    pub fn toggle_mark_for_review(&mut self) {
        self.tracker.toggle_mark_for_review(self.current_index());
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index() + 1 >= self.test.len()
    }

    /// Whether the current question has an answer to move on from.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.tracker.get().answer(self.current_index()).is_some()
    }

    /// Move forward one question. Returns false on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        let target = self.current_index() + 1;
        self.enter(target);
        true
    }

    /// Move back one question. Returns false on the first question.
    pub fn previous(&mut self) -> bool {
        let Some(target) = self.current_index().checked_sub(1) else {
            return false;
        };
        self.enter(target);
        true
    }

    /// # Errors
    ///
    /// Returns `AttemptError::IndexOutOfRange` for an index outside the test.
    pub fn go_to(&mut self, index: usize) -> Result<(), AttemptError> {
        if index >= self.test.len() {
            return Err(AttemptError::IndexOutOfRange {
                index,
                count: self.test.len(),
            });
        }
        self.enter(index);
        Ok(())
    }

    /// Post the answers and close the attempt.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Api` when the submission fails; the session is
    /// left intact so it can be retried.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<CompletedTest, AttemptError> {
        self.close_current_question();
        let session = self.tracker.get();
        let response = api
            .submit_answers(self.test.id, &session.answers_payload())
            .await?;
        info!(
            test_id = %self.test.id,
            answered = session.answered_count(),
            "attempt submitted"
        );
        Ok(CompletedTest::new(
            self.test.clone(),
            self.mode,
            session.answers().clone(),
            response,
        ))
    }

    fn enter(&mut self, index: usize) {
        self.close_current_question();
        self.tracker.set_current_question(index);
    }

    /// Add the time spent since entering the current question to its total.
    fn close_current_question(&mut self) {
        let now = self.clock.now();
        let index = self.current_index();
        let spent = elapsed_secs(self.entered_at, now);
        let previous = self.tracker.get().question_time(index).unwrap_or(0);
        self.tracker
            .record_question_time(index, previous.saturating_add(spent));
        self.entered_at = now;
    }
}

fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    u32::try_from((to - from).num_seconds().max(0)).unwrap_or(u32::MAX)
}
