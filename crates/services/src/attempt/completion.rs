use std::collections::BTreeMap;

use prep_core::model::{
    AiFeedback, Evaluation, LearningMode, Percent, ProgressState, SubmissionResponse, Test,
};
use prep_core::scoring::{answer_is_correct, score_attempt};

use crate::error::AttemptError;
use crate::stores::ProgressService;

/// A submitted attempt whose progress has not been recorded yet.
///
/// `record` takes `self`, so one completion updates progress once.
#[derive(Debug, Clone)]
pub struct CompletedTest {
    test: Test,
    mode: LearningMode,
    answers: BTreeMap<usize, String>,
    response: SubmissionResponse,
    score: Percent,
}

impl CompletedTest {
    #[must_use]
    pub fn new(
        test: Test,
        mode: LearningMode,
        answers: BTreeMap<usize, String>,
        response: SubmissionResponse,
    ) -> Self {
        let score = score_attempt(&test, &answers, Some(&response.ai_feedback));
        Self {
            test,
            mode,
            answers,
            response,
            score,
        }
    }

    #[must_use]
    pub fn score(&self) -> Percent {
        self.score
    }

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    /// Fold the result into the student's progress.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::Store` if progress cannot be persisted.
    pub async fn record(self, progress: &ProgressService) -> Result<TestResults, AttemptError> {
        let questions = u32::try_from(self.test.len()).unwrap_or(u32::MAX);
        let progress = progress
            .update_progress(self.test.subject, self.score, questions)
            .await?;
        Ok(TestResults {
            test: self.test,
            mode: self.mode,
            answers: self.answers,
            score: self.score,
            mcq_score: self.response.score,
            correct_count: self.response.correct_count,
            total_mcq: self.response.total_mcq,
            feedback: self.response.ai_feedback,
            progress,
        })
    }
}

/// Everything the results view shows.
#[derive(Debug, Clone)]
pub struct TestResults {
    pub test: Test,
    pub mode: LearningMode,
    pub answers: BTreeMap<usize, String>,
    pub score: Percent,
    /// Backend's multiple-choice percentage, when the test had any.
    pub mcq_score: Option<f64>,
    pub correct_count: u32,
    pub total_mcq: u32,
    pub feedback: AiFeedback,
    /// Progress after this attempt was recorded.
    pub progress: ProgressState,
}

/// One row of the per-question breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview<'a> {
    pub index: usize,
    pub question_text: &'a str,
    pub given: Option<&'a str>,
    pub correct_answer: &'a str,
    pub is_correct: bool,
    pub evaluation: Option<&'a Evaluation>,
}

impl TestResults {
    #[must_use]
    pub fn question_reviews(&self) -> Vec<QuestionReview<'_>> {
        self.test
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let given = self.answers.get(&index).map(String::as_str);
                QuestionReview {
                    index,
                    question_text: &question.question_text,
                    given,
                    correct_answer: &question.correct_answer,
                    is_correct: given.is_some_and(|answer| answer_is_correct(question, answer)),
                    evaluation: self.feedback.evaluation_for(index),
                }
            })
            .collect()
    }

    /// Summary line used for the downloadable report.
    #[must_use]
    pub fn summary(&self) -> &str {
        if self.feedback.overall_summary.trim().is_empty() {
            "Good effort!"
        } else {
            &self.feedback.overall_summary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prep_core::model::{Difficulty, Question, QuestionType, Subject, TestId};
    use prep_core::time::{fixed_clock, fixed_now};
    use storage::repository::Storage;

    fn sample_test() -> Test {
        let question = |sequence: u32, correct: &str| Question {
            id: None,
            sequence,
            question_text: format!("Q{sequence}"),
            question_type: QuestionType::OpenEnded,
            options: None,
            correct_answer: correct.into(),
            explanation: None,
            hint: None,
            explanation_correct: None,
            explanation_wrong: None,
            common_misconceptions: None,
            worked_example: None,
        };
        Test {
            id: TestId::random(),
            title: "Reading check".into(),
            grade_level: 7,
            subject: Subject::English,
            standard_focus: "Reading Literature (RL)".into(),
            question_count: 2,
            question_type: QuestionType::OpenEnded,
            difficulty: Difficulty::Medium,
            created_at: fixed_now(),
            questions: vec![question(1, "theme"), question(2, "setting")],
        }
    }

    fn response(scores: &[f64]) -> SubmissionResponse {
        SubmissionResponse {
            score: None,
            correct_count: 0,
            total_mcq: 0,
            ai_feedback: AiFeedback {
                overall_summary: String::new(),
                evaluations: Some(
                    scores
                        .iter()
                        .enumerate()
                        .map(|(i, score)| Evaluation {
                            index: i + 1,
                            score: Some(*score),
                            feedback: format!("feedback {}", i + 1),
                            suggestion: None,
                        })
                        .collect(),
                ),
            },
        }
    }

    #[tokio::test]
    async fn record_updates_progress_once_with_evaluated_score() {
        let storage = Storage::in_memory();
        let progress = ProgressService::load(fixed_clock(), storage.progress.clone())
            .await
            .unwrap();
        let answers = BTreeMap::from([(0, "theme".to_string())]);
        let completed =
            CompletedTest::new(sample_test(), LearningMode::Learn, answers, response(&[1.0, 0.5]));
        assert_eq!(completed.score().value(), 75);

        let results = completed.record(&progress).await.unwrap();
        assert_eq!(results.progress.streak(), 1);
        assert_eq!(results.progress.total_questions_solved(), 2);
        let english = results.progress.mastery_for(Subject::English).unwrap();
        assert_eq!(english.mastery().value(), 75);
        assert_eq!(english.tests_completed(), 1);
        assert_eq!(results.summary(), "Good effort!");
    }

    #[test]
    fn reviews_line_up_answers_and_evaluations() {
        let answers = BTreeMap::from([(0, "theme".to_string()), (1, "plot".to_string())]);
        let completed =
            CompletedTest::new(sample_test(), LearningMode::Practice, answers, response(&[1.0]));
        let results = TestResults {
            test: completed.test.clone(),
            mode: completed.mode,
            answers: completed.answers.clone(),
            score: completed.score,
            mcq_score: None,
            correct_count: 0,
            total_mcq: 0,
            feedback: completed.response.ai_feedback.clone(),
            progress: ProgressState::default(),
        };
        let reviews = results.question_reviews();
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].is_correct);
        assert_eq!(reviews[0].evaluation.map(|e| e.feedback.as_str()), Some("feedback 1"));
        assert!(!reviews[1].is_correct);
        assert_eq!(reviews[1].given, Some("plot"));
        assert!(reviews[1].evaluation.is_none());
    }
}
