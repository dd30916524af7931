use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, QuestionId, QuestionType, Subject, TestId};
use crate::model::exam::DEFAULT_EXAM_STANDARD;

//
// ─── TEST RESOURCE ─────────────────────────────────────────────────────────────
//

/// A generated practice test as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub id: TestId,
    pub title: String,
    pub grade_level: u8,
    pub subject: Subject,
    pub standard_focus: String,
    pub question_count: u32,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Test {
    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuestionId>,
    pub sequence: u32,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_correct: Option<String>,
    /// Why each wrong option is wrong, keyed by option letter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_wrong: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_misconceptions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worked_example: Option<String>,
}

impl Question {
    /// Multiple choice if typed so, or if it carries options at all.
    #[must_use]
    pub fn is_mcq(&self) -> bool {
        self.question_type == QuestionType::Mcq || self.options.is_some()
    }

    /// Explanation to show after `answer` was given, preferring the most
    /// specific one available.
    #[must_use]
    pub fn explanation_for(&self, answer: &str) -> Option<&str> {
        if answer == self.correct_answer {
            self.explanation_correct
                .as_deref()
                .or(self.explanation.as_deref())
        } else {
            self.explanation_wrong
                .as_ref()
                .and_then(|wrong| wrong.get(answer))
                .map(String::as_str)
                .or(self.explanation.as_deref())
        }
    }
}

/// Accepts RFC 3339 timestamps and the naive `YYYY-MM-DDTHH:MM:SS[.f]` form
/// some backends emit for UTC columns.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

//
// ─── GENERATION REQUEST ────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NewTestError {
    #[error("title must be at least 5 characters")]
    TitleTooShort,
    #[error("grade level must be between 3 and 12, got {0}")]
    InvalidGradeLevel(u8),
    #[error("question count must be between 1 and 50, got {0}")]
    InvalidQuestionCount(u32),
    #[error("a standard focus is required")]
    MissingStandard,
}

/// Validated body of `POST /tests/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTest {
    title: String,
    grade_level: u8,
    subject: Subject,
    standard_focus: String,
    question_count: u32,
    question_type: QuestionType,
    difficulty: Difficulty,
    exam_standard: String,
}

/// Form input for a new test, validated into `NewTest`.
#[derive(Debug, Clone)]
pub struct NewTestDraft {
    pub title: String,
    pub grade_level: u8,
    pub subject: Subject,
    pub standard_focus: Option<String>,
    pub question_count: u32,
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub exam_standard: Option<String>,
}

impl Default for NewTestDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            grade_level: 5,
            subject: Subject::Mathematics,
            standard_focus: None,
            question_count: 10,
            question_type: QuestionType::Mcq,
            difficulty: Difficulty::Medium,
            exam_standard: None,
        }
    }
}

impl NewTestDraft {
    /// # Errors
    ///
    /// Returns `NewTestError` when a field is outside what the backend accepts.
    /// A missing standard falls back to the first one listed for the subject
    /// and grade.
    pub fn validate(self) -> Result<NewTest, NewTestError> {
        let title = self.title.trim().to_string();
        if title.chars().count() < 5 {
            return Err(NewTestError::TitleTooShort);
        }
        if !(3..=12).contains(&self.grade_level) {
            return Err(NewTestError::InvalidGradeLevel(self.grade_level));
        }
        if !(1..=50).contains(&self.question_count) {
            return Err(NewTestError::InvalidQuestionCount(self.question_count));
        }
        let standard_focus = self
            .standard_focus
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                standards_for(self.subject, self.grade_level)
                    .first()
                    .map(|s| (*s).to_string())
            })
            .ok_or(NewTestError::MissingStandard)?;

        Ok(NewTest {
            title,
            grade_level: self.grade_level,
            subject: self.subject,
            standard_focus,
            question_count: self.question_count,
            question_type: self.question_type,
            difficulty: self.difficulty,
            exam_standard: self
                .exam_standard
                .unwrap_or_else(|| DEFAULT_EXAM_STANDARD.to_string()),
        })
    }
}

impl NewTest {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn standard_focus(&self) -> &str {
        &self.standard_focus
    }

    #[must_use]
    pub fn exam_standard(&self) -> &str {
        &self.exam_standard
    }
}

/// Curriculum strands offered for a subject and grade.
#[must_use]
pub fn standards_for(subject: Subject, grade_level: u8) -> &'static [&'static str] {
    const MATH_ELEMENTARY: &[&str] = &[
        "Operations & Algebraic Thinking (OA)",
        "Number & Operations in Base Ten (NBT)",
        "Number & Operations - Fractions (NF)",
        "Measurement & Data (MD)",
        "Geometry (G)",
    ];
    const MATH_MIDDLE: &[&str] = &[
        "Ratio & Proportional Relationships (RP)",
        "The Number System (NS)",
        "Expressions & Equations (EE)",
        "Geometry (G)",
        "Statistics & Probability (SP)",
    ];
    const MATH_GRADE_8: &[&str] = &[
        "The Number System (NS)",
        "Expressions & Equations (EE)",
        "Functions (F)",
        "Geometry (G)",
        "Statistics & Probability (SP)",
    ];
    const MATH_DEFAULT: &[&str] = &[
        "Number Sense",
        "Algebra",
        "Geometry",
        "Measurement",
        "Data Analysis & Probability",
    ];
    const ENGLISH: &[&str] = &[
        "Reading: Literature (RL)",
        "Reading: Informational Text (RI)",
        "Writing (W)",
        "Speaking & Listening (SL)",
        "Language (L)",
    ];
    const SCIENCE_GRADE_5: &[&str] = &[
        "Forces & Motion",
        "Matter: Properties & Change",
        "Energy: Conservation & Transfer",
        "Earth Systems & Weather",
        "Ecosystems",
    ];
    const SCIENCE_GRADE_8: &[&str] = &[
        "Matter: Properties & Change",
        "Energy: Conservation & Transfer",
        "Earth Systems, Structures & Processes",
        "Ecosystems",
        "Evolution & Genetics",
    ];
    const SCIENCE_DEFAULT: &[&str] = &[
        "Forces & Motion",
        "Matter & Energy",
        "Earth Science",
        "Life Science",
        "Ecosystems",
    ];
    const SOCIAL_STUDIES: &[&str] = &[
        "History",
        "Geography & Environmental Literacy",
        "Civics & Governance",
        "Economics & Financial Literacy",
        "Culture",
    ];

    match (subject, grade_level) {
        (Subject::Mathematics, 3..=5) => MATH_ELEMENTARY,
        (Subject::Mathematics, 6 | 7) => MATH_MIDDLE,
        (Subject::Mathematics, 8) => MATH_GRADE_8,
        (Subject::Mathematics, _) => MATH_DEFAULT,
        (Subject::English, _) => ENGLISH,
        (Subject::Science, 5) => SCIENCE_GRADE_5,
        (Subject::Science, 8) => SCIENCE_GRADE_8,
        (Subject::Science, _) => SCIENCE_DEFAULT,
        (Subject::SocialStudies, _) => SOCIAL_STUDIES,
    }
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

/// Per-question verdict from the feedback service. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub index: usize,
    /// Between 0 and 1.
    #[serde(default)]
    pub score: Option<f64>,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiFeedback {
    pub overall_summary: String,
    /// `None` when the backend sent no evaluations list at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluations: Option<Vec<Evaluation>>,
}

impl AiFeedback {
    /// Evaluation for the 0-based question `index`.
    #[must_use]
    pub fn evaluation_for(&self, index: usize) -> Option<&Evaluation> {
        self.evaluations
            .iter()
            .flatten()
            .find(|e| e.index == index + 1)
    }
}

/// Response of `POST /tests/{id}/submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    /// Multiple-choice percentage, absent when the test has no MCQs.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub correct_count: u32,
    #[serde(default)]
    pub total_mcq: u32,
    pub ai_feedback: AiFeedback,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_JSON: &str = r#"{
        "id": "0b6c2f4e-9d1a-4c1e-8f00-3a2b1c0d9e8f",
        "title": "Fractions warm-up",
        "grade_level": 5,
        "subject": "mathematics",
        "standard_focus": "Number & Operations - Fractions (NF)",
        "question_count": 2,
        "question_type": "mcq",
        "difficulty": "easy",
        "created_at": "2024-05-01T12:30:00.123456",
        "questions": [
            {
                "sequence": 1,
                "question_text": "1/2 + 1/4 = ?",
                "question_type": "mcq",
                "options": {"A": "3/4", "B": "2/6"},
                "correct_answer": "A",
                "explanation": "Common denominators.",
                "explanation_wrong": {"B": "Numerators and denominators are not added."}
            },
            {
                "sequence": 2,
                "question_text": "Explain equivalent fractions.",
                "question_type": "open_ended",
                "correct_answer": "Same value, different form"
            }
        ]
    }"#;

    #[test]
    fn parses_backend_test() {
        let test: Test = serde_json::from_str(TEST_JSON).unwrap();
        assert_eq!(test.len(), 2);
        assert_eq!(test.subject, Subject::Mathematics);
        assert!(test.questions[0].is_mcq());
        assert!(!test.questions[1].is_mcq());
        assert_eq!(test.created_at.date_naive().to_string(), "2024-05-01");
    }

    #[test]
    fn explanation_prefers_specific_text() {
        let test: Test = serde_json::from_str(TEST_JSON).unwrap();
        let q = &test.questions[0];
        assert_eq!(q.explanation_for("A"), Some("Common denominators."));
        assert_eq!(
            q.explanation_for("B"),
            Some("Numerators and denominators are not added.")
        );
        assert_eq!(q.explanation_for("C"), Some("Common denominators."));
    }

    #[test]
    fn draft_validation() {
        let draft = NewTestDraft {
            title: "Quiz".into(),
            ..NewTestDraft::default()
        };
        assert_eq!(draft.validate(), Err(NewTestError::TitleTooShort));

        let draft = NewTestDraft {
            title: "Grade 2 quiz".into(),
            grade_level: 2,
            ..NewTestDraft::default()
        };
        assert_eq!(draft.validate(), Err(NewTestError::InvalidGradeLevel(2)));

        let draft = NewTestDraft {
            title: "Long quiz".into(),
            question_count: 51,
            ..NewTestDraft::default()
        };
        assert_eq!(draft.validate(), Err(NewTestError::InvalidQuestionCount(51)));
    }

    #[test]
    fn draft_fills_standard_and_exam() {
        let new_test = NewTestDraft {
            title: "Science check".into(),
            subject: Subject::Science,
            grade_level: 8,
            ..NewTestDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(new_test.standard_focus(), "Matter: Properties & Change");
        assert_eq!(new_test.exam_standard(), "ncdpi");

        let body = serde_json::to_value(&new_test).unwrap();
        assert_eq!(body["subject"], "science");
        assert_eq!(body["grade_level"], 8);
    }

    #[test]
    fn parses_submission_response() {
        let json = r#"{
            "score": null,
            "correct_count": 0,
            "total_mcq": 0,
            "ai_feedback": {
                "overall_summary": "Solid work.",
                "evaluations": [{"index": 1, "score": 0.5, "feedback": "Partly right."}]
            }
        }"#;
        let response: SubmissionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.score, None);
        let eval = response.ai_feedback.evaluation_for(0).unwrap();
        assert_eq!(eval.score, Some(0.5));
        assert!(response.ai_feedback.evaluation_for(1).is_none());
    }

    #[test]
    fn feedback_without_evaluations_list_is_distinct_from_empty() {
        let absent: AiFeedback = serde_json::from_str(r#"{"overall_summary": "ok"}"#).unwrap();
        assert_eq!(absent.evaluations, None);
        assert!(absent.evaluation_for(0).is_none());

        let empty: AiFeedback =
            serde_json::from_str(r#"{"overall_summary": "ok", "evaluations": []}"#).unwrap();
        assert_eq!(empty.evaluations, Some(Vec::new()));
    }
}
