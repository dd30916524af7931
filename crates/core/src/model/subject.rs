use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct ParseEnumError {
    kind: &'static str,
    raw: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_owned(),
        }
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// Subject area a test belongs to. Mastery is tracked per subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    English,
    Science,
    SocialStudies,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Mathematics,
        Subject::English,
        Subject::Science,
        Subject::SocialStudies,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::English => "english",
            Subject::Science => "science",
            Subject::SocialStudies => "social_studies",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::Science => "Science",
            Subject::SocialStudies => "Social Studies",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("subject", s))
    }
}

//
// ─── LEARNING MODE ─────────────────────────────────────────────────────────────
//

/// How a test is taken. Controls feedback timing, hints, retries and the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningMode {
    /// Hints, unlimited retries, instant feedback.
    #[default]
    Learn,
    /// Instant feedback, one answer per question.
    Practice,
    /// Timed, feedback only after submission.
    Assessment,
}

impl LearningMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LearningMode::Learn => "learn",
            LearningMode::Practice => "practice",
            LearningMode::Assessment => "assessment",
        }
    }

    /// Only assessments run a countdown.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, LearningMode::Assessment)
    }

    #[must_use]
    pub fn shows_immediate_feedback(self) -> bool {
        matches!(self, LearningMode::Learn | LearningMode::Practice)
    }

    /// Practice mode accepts a single answer per question.
    #[must_use]
    pub fn locks_after_answer(self) -> bool {
        matches!(self, LearningMode::Practice)
    }

    #[must_use]
    pub fn hints_available(self) -> bool {
        matches!(self, LearningMode::Learn | LearningMode::Practice)
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learn" => Ok(LearningMode::Learn),
            "practice" => Ok(LearningMode::Practice),
            "assessment" => Ok(LearningMode::Assessment),
            _ => Err(ParseEnumError::new("learning mode", s)),
        }
    }
}

//
// ─── QUESTION TYPE / DIFFICULTY ────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    OpenEnded,
    Mixed,
}

impl FromStr for QuestionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(QuestionType::Mcq),
            "open_ended" => Ok(QuestionType::OpenEnded),
            "mixed" => Ok(QuestionType::Mixed),
            _ => Err(ParseEnumError::new("question type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}
