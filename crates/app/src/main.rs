mod args;
mod commands;
mod telemetry;

use prep_core::model::ClientSettingsDraft;
use services::{AppServices, Clock};

use args::{ArgsError, Cli, Command, Parsed, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cli = match Cli::parse(argv, std::env::var("PREP_DB_URL").ok()) {
        Ok(Parsed::Run(cli)) => cli,
        Ok(Parsed::Help) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    let settings = ClientSettingsDraft {
        api_base_url: cli.api_url.or_else(|| std::env::var("PREP_API_URL").ok()),
        time_limit_secs: None,
    }
    .validate()?;

    // Open + migrate SQLite here so the library crates never touch the filesystem.
    prepare_sqlite_file(&cli.db_url)?;
    let services = AppServices::new_sqlite(&cli.db_url, Clock::default_clock(), settings).await?;

    match cli.command {
        Command::Status => {
            commands::status(&services);
            Ok(())
        }
        Command::Exams => {
            commands::exams(&services);
            Ok(())
        }
        Command::ExamSet { id } => commands::exam_set(&services, &id).await,
        Command::ExamClear => commands::exam_clear(&services).await,
        Command::Recent { limit } => commands::recent(&services, limit).await,
        Command::Generate(draft) => commands::generate(&services, *draft).await,
        Command::Take {
            test_id,
            answers,
            mode,
        } => commands::take(&services, test_id, &answers, mode).await,
        Command::Report {
            test_id,
            out,
            score,
            feedback,
        } => commands::report(&services, test_id, &out, score, feedback.as_deref()).await,
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
