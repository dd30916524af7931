use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Percent, Subject};
use crate::time::days_between;

/// Rolling mastery for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProgress {
    subject: Subject,
    mastery: Percent,
    tests_completed: u32,
    /// Unrounded sum of every recorded score. Absent in records written
    /// before it existed; treated as `mastery * tests_completed` then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score_total: Option<u64>,
}

impl SubjectProgress {
    #[must_use]
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            mastery: Percent::ZERO,
            tests_completed: 0,
            score_total: Some(0),
        }
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn mastery(&self) -> Percent {
        self.mastery
    }

    #[must_use]
    pub fn tests_completed(&self) -> u32 {
        self.tests_completed
    }

    /// Exact mean of all recorded scores, free of the rounding drift in
    /// `mastery`. `None` before the first completion.
    #[must_use]
    pub fn exact_average(&self) -> Option<f64> {
        if self.tests_completed == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(self.score_total() as f64 / f64::from(self.tests_completed))
    }

    fn score_total(&self) -> u64 {
        self.score_total.unwrap_or_else(|| {
            u64::from(self.mastery.value()) * u64::from(self.tests_completed)
        })
    }

    fn record(&mut self, score: Percent) {
        let total = self.score_total() + u64::from(score.value());
        self.mastery = self.mastery.rolling_average(self.tests_completed, score);
        self.tests_completed = self.tests_completed.saturating_add(1);
        self.score_total = Some(total);
    }
}

/// Durable cross-session statistics: streak, totals and per-subject mastery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    streak: u32,
    last_practice_date: Option<NaiveDate>,
    total_questions_solved: u64,
    subject_mastery: Vec<SubjectProgress>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            streak: 0,
            last_practice_date: None,
            total_questions_solved: 0,
            subject_mastery: Subject::ALL.into_iter().map(SubjectProgress::new).collect(),
        }
    }
}

impl ProgressState {
    /// Applies one completed test as a single transition.
    ///
    /// Streak: first completion sets 1; a one-day gap adds 1; a longer gap
    /// restarts at 1; the same day (or a date before the last one) leaves it
    /// as is. Mastery of `subject` becomes the rounded rolling average with
    /// `score`. `questions_count` is added to the running total.
    pub fn record_completion(
        &mut self,
        today: NaiveDate,
        subject: Subject,
        score: Percent,
        questions_count: u32,
    ) {
        self.streak = match self.last_practice_date {
            None => 1,
            Some(last) => match days_between(last, today) {
                1 => self.streak.saturating_add(1),
                diff if diff > 1 => 1,
                _ => self.streak,
            },
        };

        if let Some(entry) = self
            .subject_mastery
            .iter_mut()
            .find(|entry| entry.subject == subject)
        {
            entry.record(score);
        }

        self.total_questions_solved = self
            .total_questions_solved
            .saturating_add(u64::from(questions_count));
        self.last_practice_date = Some(today);
    }

    /// Unconditional manual bump, independent of the date logic.
    pub fn increment_streak(&mut self) {
        self.streak = self.streak.saturating_add(1);
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn last_practice_date(&self) -> Option<NaiveDate> {
        self.last_practice_date
    }

    #[must_use]
    pub fn total_questions_solved(&self) -> u64 {
        self.total_questions_solved
    }

    #[must_use]
    pub fn subject_mastery(&self) -> &[SubjectProgress] {
        &self.subject_mastery
    }

    #[must_use]
    pub fn mastery_for(&self, subject: Subject) -> Option<&SubjectProgress> {
        self.subject_mastery
            .iter()
            .find(|entry| entry.subject == subject)
    }

    /// Mean mastery over subjects with at least one completed test.
    #[must_use]
    pub fn overall_mastery(&self) -> Option<Percent> {
        let practiced: Vec<_> = self
            .subject_mastery
            .iter()
            .filter(|entry| entry.tests_completed > 0)
            .collect();
        if practiced.is_empty() {
            return None;
        }
        let sum: u64 = practiced
            .iter()
            .map(|entry| u64::from(entry.mastery.value()))
            .sum();
        Some(Percent::from_ratio(sum, practiced.len() as u64 * 100))
    }
}
