use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use quiz_core::model::{MockTest, MockTestId};
use services::{AppServices, Clock, QuizLoopService, QuizOptions, SubmissionService};
use storage::repository::Storage;
use storage::sample::{SAMPLE_MOCK_TEST_ID, mock_test_from_json, sample_mock_test};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMockTestId { raw: String },
    InvalidDuration { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMockTestId { raw } => write!(f, "invalid --mock-test value: {raw}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn current_mock_test_id(&self) -> MockTestId {
        self.services.mock_test_id()
    }

    fn quiz_loop(&self) -> Arc<QuizLoopService> {
        self.services.quiz_loop()
    }

    fn submissions(&self) -> Arc<SubmissionService> {
        self.services.submissions()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    mock_test_id: MockTestId,
    duration_secs: Option<u32>,
    shuffle: bool,
    title: Option<String>,
    from_json: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui   [--db <sqlite_url>] [--mock-test <id>] [--duration <secs>] [--shuffle]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>] [--mock-test <id>] [--duration <secs>]");
    eprintln!("                           [--title <text>] [--from-json <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!("  --mock-test 1");
    eprintln!("  seed writes the built-in sample unless --from-json is given");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_MOCK_TEST_ID, QUIZ_DURATION_SECS, QUIZ_SHUFFLE, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .is_ok_and(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut mock_test_id = std::env::var("QUIZ_MOCK_TEST_ID")
            .ok()
            .and_then(|value| value.parse::<MockTestId>().ok())
            .unwrap_or_else(|| MockTestId::new(SAMPLE_MOCK_TEST_ID));
        let mut duration_secs = std::env::var("QUIZ_DURATION_SECS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok());
        let mut shuffle = env_flag("QUIZ_SHUFFLE");
        let mut title = None;
        let mut from_json = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--mock-test" => {
                    let value = require_value(args, "--mock-test")?;
                    mock_test_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMockTestId { raw: value.clone() })?;
                }
                "--duration" => {
                    let value = require_value(args, "--duration")?;
                    duration_secs = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidDuration { raw: value.clone() })?,
                    );
                }
                "--shuffle" => shuffle = true,
                "--title" => title = Some(require_value(args, "--title")?),
                "--from-json" => from_json = Some(require_value(args, "--from-json")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            mock_test_id,
            duration_secs,
            shuffle,
            title,
            from_json,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
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
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    prepare_sqlite_dir(&parsed.db_url)?;
    tracing::info!(command = ?cmd, db = %parsed.db_url, "starting");

    match cmd {
        Command::Ui => {
            let services = AppServices::new_sqlite(
                &parsed.db_url,
                Clock::system(),
                parsed.mock_test_id,
                QuizOptions {
                    duration_override: parsed.duration_secs,
                    shuffle_questions: parsed.shuffle,
                },
            )
            .await?;

            let app: Arc<dyn UiApp> = Arc::new(DesktopApp { services });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Mock Tests")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Seed => {
            let base = match parsed.from_json.as_deref() {
                Some(path) => {
                    mock_test_from_json(parsed.mock_test_id, &std::fs::read_to_string(path)?)?
                }
                None => sample_mock_test(),
            };
            let duration = parsed.duration_secs.unwrap_or(base.duration_secs());
            let title = parsed.title.unwrap_or_else(|| base.title().to_string());
            let (questions, _) = base.into_parts();
            let test = MockTest::new(parsed.mock_test_id, title, duration, questions)?;

            let storage = Storage::sqlite(&parsed.db_url).await?;
            storage.mock_tests.upsert_mock_test(&test).await?;
            tracing::info!(
                id = %test.id(),
                questions = test.question_count(),
                duration_secs = test.duration_secs(),
                "seeded mock test"
            );
            Ok(())
        }
    }
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

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(&mut args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_flags() {
        let args = parse(&[
            "--db",
            "sqlite:///tmp/q.sqlite3",
            "--mock-test",
            "7",
            "--duration",
            "90",
            "--shuffle",
            "--title",
            "Capitals",
            "--from-json",
            "capitals.json",
        ])
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/q.sqlite3");
        assert_eq!(args.mock_test_id, MockTestId::new(7));
        assert_eq!(args.duration_secs, Some(90));
        assert!(args.shuffle);
        assert_eq!(args.title.as_deref(), Some("Capitals"));
        assert_eq!(args.from_json.as_deref(), Some("capitals.json"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--duration", "soon"]),
            Err(ArgsError::InvalidDuration { .. })
        ));
        assert!(matches!(
            parse(&["--mock-test"]),
            Err(ArgsError::MissingValue { flag: "--mock-test" })
        ));
        assert!(matches!(parse(&["--nope"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:quiz.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("quiz.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }
}
