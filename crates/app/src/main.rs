use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use quiz_core::model::{DifficultyFilter, QuizFilters, QuizMode, TopicFilter};
use services::sessions::DEFAULT_QUIZ_SIZE;
use services::{Clock, QuizRequest, QuizServices};
use tracing::info;

mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingImportPath,
    InvalidDbUrl { raw: String },
    InvalidCount { raw: String },
    InvalidFilter(quiz_core::Error),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingImportPath => write!(f, "import requires a file path"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidCount { raw } => {
                write!(f, "invalid --count value: {raw} (expected a positive integer)")
            }
            ArgsError::InvalidFilter(err) => write!(f, "invalid filter: {err}"),
        }
    }
}

impl std::error::Error for ArgsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArgsError::InvalidFilter(err) => Some(err),
            _ => None,
        }
    }
}

impl From<quiz_core::Error> for ArgsError {
    fn from(err: quiz_core::Error) -> Self {
        ArgsError::InvalidFilter(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_filter<T>(raw: &str) -> Result<T, ArgsError>
where
    T: std::str::FromStr,
    quiz_core::Error: From<T::Err>,
{
    raw.parse::<T>()
        .map_err(|err| ArgsError::from(quiz_core::Error::from(err)))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play]  [--topic <name|all>] [--difficulty <1-4|all>] [--mode <mode>] [--count <n>]");
    eprintln!("  quiz retry   [--topic <name|all>] [--difficulty <1-4|all>] [--count <n>]");
    eprintln!("  quiz topics");
    eprintln!("  quiz stats");
    eprintln!("  quiz export");
    eprintln!("  quiz import <file>");
    eprintln!("  quiz reset   [--yes]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url|path>   (default sqlite://quiz.sqlite3)");
    eprintln!("  --bank <path>            (default data/questions.json)");
    eprintln!();
    eprintln!("Modes: mixed, paper1, paper2, reviewWrong");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_BANK_PATH, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play,
    Retry,
    Topics,
    Stats,
    Export,
    Import(PathBuf),
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "retry" => Some(Self::Retry),
            "topics" => Some(Self::Topics),
            "stats" => Some(Self::Stats),
            "export" => Some(Self::Export),
            "reset" => Some(Self::Reset),
            // The path is filled in by the parser.
            "import" => Some(Self::Import(PathBuf::new())),
            _ => None,
        }
    }
}

struct Args {
    command: Command,
    db_url: String,
    bank_path: PathBuf,
    request: QuizRequest,
    assume_yes: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut args = args.into_iter().peekable();

        let command = match args.peek().map(String::as_str) {
            None => Command::Play,
            Some(first) if first.starts_with('-') => Command::Play,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?;
                args.next();
                command
            }
        };

        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "quiz.sqlite3".into());
        let mut bank_path = std::env::var("QUIZ_BANK_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("data/questions.json"), PathBuf::from);
        let mut topic = TopicFilter::All;
        let mut difficulty = DifficultyFilter::All;
        let mut mode = QuizMode::Mixed;
        let mut count: NonZeroUsize = DEFAULT_QUIZ_SIZE;
        let mut import_path: Option<PathBuf> = None;
        let mut assume_yes = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--bank" => bank_path = PathBuf::from(require_value(&mut args, "--bank")?),
                "--topic" => topic = parse_filter(&require_value(&mut args, "--topic")?)?,
                "--difficulty" => {
                    difficulty = parse_filter(&require_value(&mut args, "--difficulty")?)?;
                }
                "--mode" => mode = parse_filter(&require_value(&mut args, "--mode")?)?,
                "--count" => {
                    let value = require_value(&mut args, "--count")?;
                    count = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                }
                "--yes" | "-y" => assume_yes = true,
                "--help" | "-h" => {
                    print_usage();
                    return Ok(None);
                }
                _ if matches!(command, Command::Import(_))
                    && import_path.is_none()
                    && !arg.starts_with('-') =>
                {
                    import_path = Some(PathBuf::from(arg));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match command {
            Command::Import(_) => Command::Import(import_path.ok_or(ArgsError::MissingImportPath)?),
            other => other,
        };

        Ok(Some(Self {
            command,
            db_url: normalize_sqlite_url(&db_url),
            bank_path,
            request: QuizRequest::new(QuizFilters::new(topic, difficulty, mode), count),
            assume_yes,
        }))
    }
}

/// Turn a bare path (or `sqlite:` path) into an absolute `sqlite://` URL that
/// creates the database file when missing.
fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_string();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}?mode=rwc", absolute.display())
}

fn prepare_sqlite_dir(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => return Ok(()),
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    prepare_sqlite_dir(&parsed.db_url)?;
    let services =
        QuizServices::new_sqlite(&parsed.db_url, &parsed.bank_path, Clock::default()).await?;
    info!(command = ?parsed.command, "running");

    match parsed.command {
        Command::Play => play::run_quiz(&services, &parsed.request, false).await,
        Command::Retry => play::run_quiz(&services, &parsed.request, true).await,
        Command::Topics => {
            for topic in services.bank().topics() {
                println!("{topic}");
            }
            Ok(())
        }
        Command::Stats => play::print_stats(&services).await,
        Command::Export => {
            println!("{}", services.stats().export_json().await?);
            Ok(())
        }
        Command::Import(path) => {
            let raw = tokio::fs::read_to_string(&path).await?;
            let summary = services.stats().import_json(&raw).await?;
            println!(
                "Imported {} (stats: {}, profile: {}).",
                path.display(),
                if summary.stats_replaced { "replaced" } else { "kept" },
                if summary.profile_replaced { "replaced" } else { "kept" },
            );
            Ok(())
        }
        Command::Reset => {
            let confirmed = parsed.assume_yes
                || play::confirm("Reset all stats and XP? This cannot be undone.").await?;
            if confirmed {
                services.stats().reset().await?;
                println!("Stats reset.");
            } else {
                println!("Reset cancelled.");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
