use std::collections::BTreeMap;
use std::path::Path;

use prep_core::model::{ExamStandard, LearningMode, ProgressState, Subject, TestId};
use serde::Deserialize;
use services::{AppServices, TestResults};
use tracing::info;

use crate::args::NewTestDraftArgs;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Answers as written by hand: either `{"0": "A", "2": "text"}` or an array
/// in question order where `null` skips a question.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerSheet {
    ByIndex(BTreeMap<String, String>),
    InOrder(Vec<Option<String>>),
}

impl AnswerSheet {
    fn into_map(self) -> Result<BTreeMap<usize, String>, String> {
        match self {
            AnswerSheet::ByIndex(map) => map
                .into_iter()
                .map(|(key, answer)| {
                    key.trim()
                        .parse::<usize>()
                        .map(|index| (index, answer))
                        .map_err(|_| format!("answer key is not a question index: {key}"))
                })
                .collect(),
            AnswerSheet::InOrder(list) => Ok(list
                .into_iter()
                .enumerate()
                .filter_map(|(index, answer)| answer.map(|a| (index, a)))
                .collect()),
        }
    }
}

fn parse_answer_sheet(raw: &str) -> Result<BTreeMap<usize, String>, Box<dyn std::error::Error>> {
    let sheet: AnswerSheet = serde_json::from_str(raw)?;
    Ok(sheet.into_map()?)
}

pub fn status(services: &AppServices) {
    let exam = services.exam_context().current();
    match (exam.exam_name(), exam.exam_id()) {
        (Some(name), Some(id)) => println!("Exam:       {name} ({id})"),
        _ => println!("Exam:       none selected (run `exam set <id>`)"),
    }
    print_progress(&services.progress().get());
}

fn print_progress(progress: &ProgressState) {
    println!("Streak:     {} day(s)", progress.streak());
    match progress.last_practice_date() {
        Some(date) => println!("Last study: {date}"),
        None => println!("Last study: never"),
    }
    println!("Solved:     {} question(s)", progress.total_questions_solved());
    match progress.overall_mastery() {
        Some(overall) => println!("Mastery:    {}%", overall.value()),
        None => println!("Mastery:    no tests yet"),
    }
    println!();
    println!("{:<16} {:>8} {:>6}", "Subject", "Mastery", "Tests");
    for subject in Subject::ALL {
        if let Some(record) = progress.mastery_for(subject) {
            println!(
                "{:<16} {:>7}% {:>6}",
                subject.label(),
                record.mastery().value(),
                record.tests_completed()
            );
        }
    }
}

pub fn exams(services: &AppServices) {
    let selected = services.exam_context().current();
    for exam in ExamStandard::catalogue() {
        let marker = if selected.exam_id() == Some(exam.id) { "*" } else { " " };
        println!("{marker} {:<8} {:<8} {} ({})", exam.id, exam.name, exam.full_name, exam.region);
    }
}

pub async fn exam_set(services: &AppServices, id: &str) -> CmdResult {
    let exam = ExamStandard::find(id).ok_or_else(|| format!("unknown exam: {id}"))?;
    services
        .exam_context()
        .set_exam(exam.id, exam.name, exam.color)
        .await?;
    println!("Selected {}", exam.full_name);
    Ok(())
}

pub async fn exam_clear(services: &AppServices) -> CmdResult {
    services.exam_context().clear_exam().await?;
    println!("Exam selection cleared");
    Ok(())
}

pub async fn recent(services: &AppServices, limit: u32) -> CmdResult {
    let tests = services.api().recent_tests(limit).await?;
    if tests.is_empty() {
        println!("No tests yet");
    }
    for test in tests {
        println!(
            "{}  {:<32} grade {:>2}  {:<14} {} question(s)",
            test.id,
            test.title,
            test.grade_level,
            test.subject.label(),
            test.question_count
        );
    }
    Ok(())
}

pub async fn generate(services: &AppServices, args: NewTestDraftArgs) -> CmdResult {
    let test = services.generate_test(args.into_draft()).await?;
    println!("Generated {} ({} question(s))", test.id, test.len());
    Ok(())
}

pub async fn take(
    services: &AppServices,
    test_id: TestId,
    answers_path: &Path,
    mode: LearningMode,
) -> CmdResult {
    let answers = parse_answer_sheet(&std::fs::read_to_string(answers_path)?)?;
    let test = services.api().get_test(test_id).await?;
    let timer = services.start_timer(mode);
    let mut runner = services.start_test(test, mode)?;

    let count = runner.test().len();
    for (index, value) in answers.range(..count) {
        runner.go_to(*index)?;
        let outcome = runner.answer_current(value)?;
        if let Some(correct) = outcome.correct {
            let verdict = if correct { "correct" } else { "incorrect" };
            println!("Q{}: {verdict}", index + 1);
            if let Some(explanation) = outcome.explanation {
                println!("    {explanation}");
            }
        }
    }
    let skipped = answers.keys().filter(|index| **index >= count).count();
    if skipped > 0 {
        info!(skipped, "ignoring answers past the last question");
    }

    if let Some(timer) = &timer {
        println!("Time left:  {}", timer.remaining().display());
    }
    let completed = runner.submit(&services.api()).await?;
    drop(timer);
    let results = completed.record(&services.progress()).await?;
    print_results(&results);
    Ok(())
}

fn print_results(results: &TestResults) {
    println!();
    println!("{}: {}%", results.test.title, results.score.value());
    if let Some(mcq) = results.mcq_score {
        println!(
            "Multiple choice: {}/{} ({mcq:.0}%)",
            results.correct_count, results.total_mcq
        );
    }
    println!("{}", results.summary());
    for review in results.question_reviews() {
        let mark = if review.is_correct { "+" } else { "-" };
        println!(
            "{mark} Q{} {}  [{}]",
            review.index + 1,
            review.question_text,
            review.given.unwrap_or("no answer")
        );
        if let Some(evaluation) = review.evaluation {
            println!("    {}", evaluation.feedback);
            if let Some(suggestion) = &evaluation.suggestion {
                println!("    Try: {suggestion}");
            }
        }
    }
    println!();
    println!(
        "Streak {} day(s), {} question(s) solved",
        results.progress.streak(),
        results.progress.total_questions_solved()
    );
}

pub async fn report(
    services: &AppServices,
    test_id: TestId,
    out: &Path,
    score: Option<u8>,
    feedback: Option<&str>,
) -> CmdResult {
    let api = services.api();
    let bytes = match score {
        Some(score) => {
            api.download_results_report(test_id, score, feedback.unwrap_or("Good effort!"))
                .await?
        }
        None => api.download_test_pdf(test_id).await?,
    };
    std::fs::write(out, &bytes)?;
    println!("Wrote {} byte(s) to {}", bytes.len(), out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_sheet_accepts_map_or_list() {
        let by_index = parse_answer_sheet(r#"{"0": "A", "2": "photosynthesis"}"#).unwrap();
        assert_eq!(by_index.get(&2).map(String::as_str), Some("photosynthesis"));
        assert_eq!(by_index.len(), 2);

        let in_order = parse_answer_sheet(r#"["B", null, "C"]"#).unwrap();
        assert_eq!(
            in_order,
            BTreeMap::from([(0, "B".to_string()), (2, "C".to_string())])
        );

        assert!(parse_answer_sheet(r#"{"first": "A"}"#).is_err());
    }
}
