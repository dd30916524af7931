use serde::{Deserialize, Serialize};

/// The exam standard the user is preparing for.
///
/// The three fields are always set or cleared together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSelection {
    #[serde(rename = "selectedExam")]
    exam_id: Option<String>,
    exam_name: Option<String>,
    exam_color: Option<String>,
}

impl ExamSelection {
    /// Stores the selection as one triple. `id` is not checked against the
    /// catalogue.
    pub fn set(&mut self, id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) {
        *self = Self {
            exam_id: Some(id.into()),
            exam_name: Some(name.into()),
            exam_color: Some(color.into()),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.exam_id.is_some()
    }

    #[must_use]
    pub fn exam_id(&self) -> Option<&str> {
        self.exam_id.as_deref()
    }

    #[must_use]
    pub fn exam_name(&self) -> Option<&str> {
        self.exam_name.as_deref()
    }

    #[must_use]
    pub fn exam_color(&self) -> Option<&str> {
        self.exam_color.as_deref()
    }
}

/// One entry of the built-in exam standard catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamStandard {
    pub id: &'static str,
    pub name: &'static str,
    pub full_name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub region: &'static str,
    pub subjects: &'static [&'static str],
}

/// Exam standard used when generating a test with nothing selected.
pub const DEFAULT_EXAM_STANDARD: &str = "ncdpi";

const CATALOGUE: [ExamStandard; 8] = [
    ExamStandard {
        id: "ncdpi",
        name: "NCDPI",
        full_name: "North Carolina End-of-Grade",
        description: "K-12 standardized assessments for North Carolina students",
        color: "blue",
        region: "United States",
        subjects: &["Math", "Reading", "Science"],
    },
    ExamStandard {
        id: "neet",
        name: "NEET",
        full_name: "National Eligibility Entrance Test",
        description: "Medical entrance examination for MBBS/BDS admissions in India",
        color: "green",
        region: "India",
        subjects: &["Physics", "Chemistry", "Biology"],
    },
    ExamStandard {
        id: "jee",
        name: "JEE",
        full_name: "Joint Entrance Examination",
        description: "Engineering entrance exam for IITs, NITs, and other institutions",
        color: "orange",
        region: "India",
        subjects: &["Physics", "Chemistry", "Mathematics"],
    },
    ExamStandard {
        id: "cbse",
        name: "CBSE",
        full_name: "Central Board of Secondary Education",
        description: "National board examinations for classes 10 and 12",
        color: "purple",
        region: "India",
        subjects: &["All Subjects"],
    },
    ExamStandard {
        id: "icse",
        name: "ICSE",
        full_name: "Indian Certificate of Secondary Education",
        description: "Private board examinations with comprehensive curriculum",
        color: "teal",
        region: "India",
        subjects: &["All Subjects"],
    },
    ExamStandard {
        id: "tn_govt",
        name: "TN Govt",
        full_name: "Tamil Nadu Government Exams",
        description: "State board examinations for Tamil Nadu students",
        color: "red",
        region: "India (Tamil Nadu)",
        subjects: &["All Subjects", "Tamil"],
    },
    ExamStandard {
        id: "sat",
        name: "SAT",
        full_name: "Scholastic Assessment Test",
        description: "Standardized test for college admissions in the US",
        color: "indigo",
        region: "United States",
        subjects: &["Math", "Reading", "Writing"],
    },
    ExamStandard {
        id: "act",
        name: "ACT",
        full_name: "American College Testing",
        description: "Alternative standardized test for US college admissions",
        color: "rose",
        region: "United States",
        subjects: &["English", "Math", "Reading", "Science"],
    },
];

impl ExamStandard {
    #[must_use]
    pub fn catalogue() -> &'static [ExamStandard] {
        &CATALOGUE
    }

    #[must_use]
    pub fn find(id: &str) -> Option<&'static ExamStandard> {
        CATALOGUE.iter().find(|exam| exam.id == id)
    }
}
