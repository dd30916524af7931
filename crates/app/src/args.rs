use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use prep_core::model::{Difficulty, LearningMode, NewTestDraft, QuestionType, Subject, TestId};

pub const DEFAULT_DB_URL: &str = "sqlite://prep.sqlite3";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingArgument { name: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "a subcommand is required"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { name } => write!(f, "missing <{name}>"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app status");
    eprintln!("  app exams");
    eprintln!("  app exam set <exam-id>");
    eprintln!("  app exam clear");
    eprintln!("  app recent   [--limit <n>]");
    eprintln!("  app generate --title <text> [--subject <s>] [--grade <3-12>] [--count <1-50>]");
    eprintln!("               [--difficulty easy|medium|hard] [--type mcq|open_ended|mixed]");
    eprintln!("               [--standard <focus>]");
    eprintln!("  app take     <test-id> --answers <file.json> [--mode learn|practice|assessment]");
    eprintln!("  app report   <test-id> --out <file.pdf> [--score <0-100> [--feedback <text>]]");
    eprintln!();
    eprintln!("Global flags:");
    eprintln!("  --db <sqlite_url>   (default {DEFAULT_DB_URL})");
    eprintln!("  --api <base_url>    (default http://localhost:8000/api/v1)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PREP_DB_URL, PREP_API_URL, LOG_LEVEL, LOG_FORMAT=json");
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Status,
    Exams,
    ExamSet { id: String },
    ExamClear,
    Recent { limit: u32 },
    Generate(Box<NewTestDraftArgs>),
    Take {
        test_id: TestId,
        answers: PathBuf,
        mode: LearningMode,
    },
    Report {
        test_id: TestId,
        out: PathBuf,
        score: Option<u8>,
        feedback: Option<String>,
    },
}

/// Generation request as typed on the command line.
#[derive(Debug, PartialEq, Eq)]
pub struct NewTestDraftArgs {
    pub title: String,
    pub subject: Subject,
    pub grade_level: u8,
    pub question_count: u32,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub standard_focus: Option<String>,
}

impl NewTestDraftArgs {
    pub fn into_draft(self) -> NewTestDraft {
        NewTestDraft {
            title: self.title,
            grade_level: self.grade_level,
            subject: self.subject,
            standard_focus: self.standard_focus,
            question_count: self.question_count,
            question_type: self.question_type,
            difficulty: self.difficulty,
            exam_standard: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Cli {
    pub db_url: String,
    pub api_url: Option<String>,
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    Help,
    Run(Cli),
}

#[derive(Default)]
struct Flags {
    db_url: Option<String>,
    api_url: Option<String>,
    answers: Option<String>,
    mode: Option<String>,
    out: Option<String>,
    limit: Option<String>,
    score: Option<String>,
    feedback: Option<String>,
    title: Option<String>,
    subject: Option<String>,
    grade: Option<String>,
    count: Option<String>,
    difficulty: Option<String>,
    question_type: Option<String>,
    standard: Option<String>,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: FromStr>(raw: Option<String>, flag: &'static str) -> Result<Option<T>, ArgsError> {
    raw.map(|value| {
        value
            .parse::<T>()
            .map_err(|_| ArgsError::InvalidValue { flag, raw: value })
    })
    .transpose()
}

fn take_positional(
    positionals: &mut std::vec::IntoIter<String>,
    name: &'static str,
) -> Result<String, ArgsError> {
    positionals.next().ok_or(ArgsError::MissingArgument { name })
}

fn parse_test_id(raw: String) -> Result<TestId, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidValue {
        flag: "<test-id>",
        raw,
    })
}

impl Cli {
    /// Parse everything after the program name. `env_db_url` is the value of
    /// `PREP_DB_URL`, overridden by `--db`.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Parsed, ArgsError> {
        let mut args = argv.into_iter();
        let name = match args.next() {
            None => return Err(ArgsError::MissingCommand),
            Some(first) if matches!(first.as_str(), "--help" | "-h" | "help") => {
                return Ok(Parsed::Help);
            }
            Some(first) => first,
        };

        let mut flags = Flags::default();
        let mut positionals = Vec::new();
        while let Some(arg) = args.next() {
            let slot = match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    flags.db_url = Some(normalize_sqlite_url(value));
                    continue;
                }
                "--api" => (&mut flags.api_url, "--api"),
                "--answers" => (&mut flags.answers, "--answers"),
                "--mode" => (&mut flags.mode, "--mode"),
                "--out" => (&mut flags.out, "--out"),
                "--limit" => (&mut flags.limit, "--limit"),
                "--score" => (&mut flags.score, "--score"),
                "--feedback" => (&mut flags.feedback, "--feedback"),
                "--title" => (&mut flags.title, "--title"),
                "--subject" => (&mut flags.subject, "--subject"),
                "--grade" => (&mut flags.grade, "--grade"),
                "--count" => (&mut flags.count, "--count"),
                "--difficulty" => (&mut flags.difficulty, "--difficulty"),
                "--type" => (&mut flags.question_type, "--type"),
                "--standard" => (&mut flags.standard, "--standard"),
                "--help" | "-h" => return Ok(Parsed::Help),
                _ if arg.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
                _ => {
                    positionals.push(arg);
                    continue;
                }
            };
            let (target, flag) = slot;
            *target = Some(require_value(&mut args, flag)?);
        }

        let mut positionals = positionals.into_iter();
        let command = match name.as_str() {
            "status" => Command::Status,
            "exams" => Command::Exams,
            "exam" => match take_positional(&mut positionals, "set|clear")?.as_str() {
                "set" => Command::ExamSet {
                    id: take_positional(&mut positionals, "exam-id")?,
                },
                "clear" => Command::ExamClear,
                other => return Err(ArgsError::UnknownCommand(format!("exam {other}"))),
            },
            "recent" => Command::Recent {
                limit: parse_value(flags.limit, "--limit")?.unwrap_or(10),
            },
            "generate" => Command::Generate(Box::new(NewTestDraftArgs {
                title: flags.title.ok_or(ArgsError::MissingValue { flag: "--title" })?,
                subject: parse_value(flags.subject, "--subject")?.unwrap_or(Subject::Mathematics),
                grade_level: parse_value(flags.grade, "--grade")?.unwrap_or(5),
                question_count: parse_value(flags.count, "--count")?.unwrap_or(10),
                difficulty: parse_value(flags.difficulty, "--difficulty")?.unwrap_or_default(),
                question_type: parse_value(flags.question_type, "--type")?
                    .unwrap_or(QuestionType::Mcq),
                standard_focus: flags.standard,
            })),
            "take" => Command::Take {
                test_id: parse_test_id(take_positional(&mut positionals, "test-id")?)?,
                answers: flags
                    .answers
                    .map(PathBuf::from)
                    .ok_or(ArgsError::MissingValue { flag: "--answers" })?,
                mode: parse_value(flags.mode, "--mode")?.unwrap_or_default(),
            },
            "report" => {
                let score: Option<u8> = parse_value(flags.score, "--score")?;
                if let Some(score) = score.filter(|s| *s > 100) {
                    return Err(ArgsError::InvalidValue {
                        flag: "--score",
                        raw: score.to_string(),
                    });
                }
                Command::Report {
                    test_id: parse_test_id(take_positional(&mut positionals, "test-id")?)?,
                    out: flags
                        .out
                        .map(PathBuf::from)
                        .ok_or(ArgsError::MissingValue { flag: "--out" })?,
                    score,
                    feedback: flags.feedback,
                }
            }
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        if let Some(extra) = positionals.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        let db_url = flags
            .db_url
            .or_else(|| env_db_url.map(normalize_sqlite_url))
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        Ok(Parsed::Run(Cli {
            db_url,
            api_url: flags.api_url,
            command,
        }))
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, ArgsError> {
        Cli::parse(args.iter().map(ToString::to_string), None)
    }

    fn run(args: &[&str]) -> Cli {
        match parse(args).unwrap() {
            Parsed::Run(cli) => cli,
            Parsed::Help => panic!("expected a command"),
        }
    }

    const ID: &str = "6f1d2c3b-4a59-4e7f-8d10-2b3c4d5e6f70";

    #[test]
    fn take_with_mode_and_global_flags() {
        let cli = run(&[
            "take",
            ID,
            "--answers",
            "answers.json",
            "--mode",
            "practice",
            "--db",
            "sqlite::memory:",
            "--api",
            "http://backend/api/v1",
        ]);
        assert_eq!(cli.db_url, "sqlite::memory:");
        assert_eq!(cli.api_url.as_deref(), Some("http://backend/api/v1"));
        assert_eq!(
            cli.command,
            Command::Take {
                test_id: ID.parse().unwrap(),
                answers: PathBuf::from("answers.json"),
                mode: LearningMode::Practice,
            }
        );
    }

    #[test]
    fn exam_subcommands() {
        assert_eq!(
            run(&["exam", "set", "jee"]).command,
            Command::ExamSet { id: "jee".into() }
        );
        assert_eq!(run(&["exam", "clear"]).command, Command::ExamClear);
        assert_eq!(
            parse(&["exam", "drop"]).unwrap_err(),
            ArgsError::UnknownCommand("exam drop".into())
        );
        assert_eq!(
            parse(&["exam", "set"]).unwrap_err(),
            ArgsError::MissingArgument { name: "exam-id" }
        );
    }

    #[test]
    fn defaults_and_env_db() {
        let cli = run(&["status"]);
        assert_eq!(cli.db_url, DEFAULT_DB_URL);
        assert_eq!(run(&["recent"]).command, Command::Recent { limit: 10 });

        let parsed = Cli::parse(["status".to_string()], Some("sqlite::memory:".into())).unwrap();
        assert_eq!(
            parsed,
            Parsed::Run(Cli {
                db_url: "sqlite::memory:".into(),
                api_url: None,
                command: Command::Status,
            })
        );
    }

    #[test]
    fn generate_fills_defaults() {
        let Command::Generate(draft) =
            run(&["generate", "--title", "Cell biology", "--subject", "science"]).command
        else {
            panic!("expected generate");
        };
        assert_eq!(draft.subject, Subject::Science);
        assert_eq!(draft.grade_level, 5);
        assert_eq!(draft.difficulty, Difficulty::Medium);
        let draft = draft.into_draft();
        assert_eq!(draft.exam_standard, None);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::MissingCommand);
        assert_eq!(parse(&["--help"]).unwrap(), Parsed::Help);
        assert_eq!(
            parse(&["take", ID]).unwrap_err(),
            ArgsError::MissingValue { flag: "--answers" }
        );
        assert_eq!(
            parse(&["take", "nope", "--answers", "a.json"]).unwrap_err(),
            ArgsError::InvalidValue {
                flag: "<test-id>",
                raw: "nope".into()
            }
        );
        assert_eq!(
            parse(&["recent", "--limit"]).unwrap_err(),
            ArgsError::MissingValue { flag: "--limit" }
        );
        assert_eq!(
            parse(&["status", "--verbose"]).unwrap_err(),
            ArgsError::UnknownArg("--verbose".into())
        );
        assert_eq!(
            parse(&["report", ID, "--out", "r.pdf", "--score", "120"]).unwrap_err(),
            ArgsError::InvalidValue {
                flag: "--score",
                raw: "120".into()
            }
        );
        assert_eq!(
            parse(&["status", "extra"]).unwrap_err(),
            ArgsError::UnknownArg("extra".into())
        );
    }

    #[test]
    fn relative_db_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/prep.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/prep.db"));
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/x.db".into()),
            "sqlite:///tmp/x.db"
        );
    }
}
