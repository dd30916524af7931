//! Overall score of a finished attempt.

use std::collections::BTreeMap;

use crate::model::{AiFeedback, Percent, Question, Test};

/// Exact match against the question's key.
#[must_use]
pub fn answer_is_correct(question: &Question, answer: &str) -> bool {
    answer == question.correct_answer
}

/// Percentage score for an attempt.
///
/// When the feedback carries an evaluations list, its 0..1 scores are summed
/// and divided by the number of questions, so an empty list scores 0.
/// Without a list, answers are matched against the answer key. An empty test
/// scores 0.
#[must_use]
pub fn score_attempt(
    test: &Test,
    answers: &BTreeMap<usize, String>,
    feedback: Option<&AiFeedback>,
) -> Percent {
    let question_count = test.questions.len();
    if question_count == 0 {
        return Percent::ZERO;
    }

    match feedback.and_then(|f| f.evaluations.as_deref()) {
        Some(evaluations) => {
            let sum: f64 = evaluations
                .iter()
                .map(|e| e.score.unwrap_or(0.0).clamp(0.0, 1.0))
                .sum();
            #[allow(clippy::cast_precision_loss)]
            let pct = (sum / question_count as f64 * 100.0).round();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Percent::saturating(pct.max(0.0) as u32)
        }
        None => {
            let correct = test
                .questions
                .iter()
                .enumerate()
                .filter(|(index, question)| {
                    answers
                        .get(index)
                        .is_some_and(|answer| answer_is_correct(question, answer))
                })
                .count();
            Percent::from_ratio(correct as u64, question_count as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Evaluation, QuestionType, Subject, TestId};
    use crate::time::fixed_now;

    fn question(correct: &str) -> Question {
        Question {
            id: None,
            sequence: 1,
            question_text: "?".into(),
            question_type: QuestionType::Mcq,
            options: None,
            correct_answer: correct.into(),
            explanation: None,
            hint: None,
            explanation_correct: None,
            explanation_wrong: None,
            common_misconceptions: None,
            worked_example: None,
        }
    }

    fn build_test(keys: &[&str]) -> Test {
        Test {
            id: TestId::random(),
            title: "Sample".into(),
            grade_level: 5,
            subject: Subject::Mathematics,
            standard_focus: "Geometry (G)".into(),
            question_count: u32::try_from(keys.len()).unwrap(),
            question_type: QuestionType::Mcq,
            difficulty: Difficulty::Easy,
            created_at: fixed_now(),
            questions: keys.iter().map(|k| question(k)).collect(),
        }
    }

    fn evaluation(index: usize, score: Option<f64>) -> Evaluation {
        Evaluation {
            index,
            score,
            feedback: String::new(),
            suggestion: None,
        }
    }

    #[test]
    fn answer_key_match_without_feedback() {
        let test = build_test(&["A", "B", "C"]);
        let answers = BTreeMap::from([(0, "A".to_string()), (1, "C".to_string())]);
        assert_eq!(score_attempt(&test, &answers, None).value(), 33);
    }

    #[test]
    fn evaluations_take_precedence() {
        let test = build_test(&["A", "B"]);
        let answers = BTreeMap::from([(0, "A".to_string()), (1, "B".to_string())]);
        let feedback = AiFeedback {
            overall_summary: "ok".into(),
            evaluations: Some(vec![evaluation(1, Some(1.0)), evaluation(2, Some(0.5))]),
        };
        assert_eq!(score_attempt(&test, &answers, Some(&feedback)).value(), 75);
    }

    #[test]
    fn missing_evaluation_scores_count_as_zero() {
        let test = build_test(&["A", "B"]);
        let feedback = AiFeedback {
            overall_summary: String::new(),
            evaluations: Some(vec![evaluation(1, None), evaluation(2, Some(1.0))]),
        };
        assert_eq!(score_attempt(&test, &BTreeMap::new(), Some(&feedback)).value(), 50);
    }

    #[test]
    fn absent_evaluations_fall_back_to_answer_key() {
        let test = build_test(&["A"]);
        let answers = BTreeMap::from([(0, "A".to_string())]);
        let feedback = AiFeedback::default();
        assert_eq!(score_attempt(&test, &answers, Some(&feedback)), Percent::FULL);
    }

    #[test]
    fn empty_evaluations_score_zero() {
        let test = build_test(&["A"]);
        let answers = BTreeMap::from([(0, "A".to_string())]);
        let feedback = AiFeedback {
            overall_summary: "No grading available.".into(),
            evaluations: Some(Vec::new()),
        };
        assert_eq!(score_attempt(&test, &answers, Some(&feedback)), Percent::ZERO);
    }

    #[test]
    fn empty_test_scores_zero() {
        let test = build_test(&[]);
        assert_eq!(score_attempt(&test, &BTreeMap::new(), None), Percent::ZERO);
    }
}
