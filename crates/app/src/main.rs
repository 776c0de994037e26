use std::fmt;

use brain_core::i18n::{LanguageCode, TableCatalog};
use brain_core::model::{
    Category, ChallengeKind, ChallengeSettings, ChallengeSettingsDraft, Feedback, SettingsError,
};
use brain_core::time::format_seconds;
use services::session::format_record;
use services::{
    ActiveChallenge, ChallengeScreen, Clock, ScreenProps, SessionError, SessionEvent,
    SessionLoopService, SessionProgress,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingChallenge,
    UnknownArg(String),
    InvalidChallenge { raw: String },
    InvalidLanguage { raw: String },
    InvalidSeed { raw: String },
    InvalidTable { raw: String },
    InvalidDbUrl { raw: String },
    Settings(SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingChallenge => write!(f, "play requires a challenge id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidChallenge { raw } => {
                write!(f, "unknown challenge: {raw} (see `brain list`)")
            }
            ArgsError::InvalidLanguage { raw } => write!(f, "invalid --lang value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidTable { raw } => write!(f, "invalid --table value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  brain list");
    eprintln!("  brain play <challenge-id> [--lang <code>] [--seed <n>]");
    eprintln!("             [--difficulty easy|medium|hard] [--table <2..12>] [--db <sqlite_url>]");
    eprintln!("  brain records [--db <sqlite_url>] [--json]");
    eprintln!();
    eprintln!("Records are kept in memory unless a database is given.");
    eprintln!("While playing, type an answer and press enter; `q` ends the run.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BRAIN_DB_URL, BRAIN_LANG, BRAIN_SEED, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Play,
    Records,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "play" => Some(Self::Play),
            "records" => Some(Self::Records),
            _ => None,
        }
    }
}

/// Values read from `BRAIN_*` variables; unparsable values are ignored.
#[derive(Debug, Default)]
struct EnvDefaults {
    db_url: Option<String>,
    language: Option<LanguageCode>,
    seed: Option<u64>,
}

impl EnvDefaults {
    fn from_env() -> Self {
        Self {
            db_url: std::env::var("BRAIN_DB_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(normalize_sqlite_url),
            language: std::env::var("BRAIN_LANG")
                .ok()
                .and_then(|value| value.parse().ok()),
            seed: std::env::var("BRAIN_SEED")
                .ok()
                .and_then(|value| value.parse().ok()),
        }
    }
}

#[derive(Debug)]
struct PlayArgs {
    challenge: ChallengeKind,
    language: LanguageCode,
    seed: Option<u64>,
    settings: ChallengeSettings,
    db_url: Option<String>,
}

impl PlayArgs {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: EnvDefaults,
    ) -> Result<Self, ArgsError> {
        let mut challenge = None;
        let mut language = env.language.unwrap_or_default();
        let mut seed = env.seed;
        let mut db_url = env.db_url;
        let mut draft = ChallengeSettingsDraft::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--lang" => {
                    let value = require_value(args, "--lang")?;
                    language = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLanguage { raw: value.clone() })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?,
                    );
                }
                "--difficulty" => {
                    draft.difficulty = Some(require_value(args, "--difficulty")?);
                }
                "--table" => {
                    let value = require_value(args, "--table")?;
                    draft.table = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidTable { raw: value.clone() })?,
                    );
                }
                "--db" => db_url = Some(parse_db_flag(args)?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if other.starts_with("--") || challenge.is_some() => {
                    return Err(ArgsError::UnknownArg(arg));
                }
                _ => {
                    challenge = Some(
                        arg.parse::<ChallengeKind>()
                            .map_err(|_| ArgsError::InvalidChallenge { raw: arg.clone() })?,
                    );
                }
            }
        }

        Ok(Self {
            challenge: challenge.ok_or(ArgsError::MissingChallenge)?,
            language,
            seed,
            settings: draft.validate().map_err(ArgsError::Settings)?,
            db_url,
        })
    }
}

#[derive(Debug)]
struct RecordsArgs {
    db_url: Option<String>,
    json: bool,
}

impl RecordsArgs {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: EnvDefaults,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env.db_url;
        let mut json = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = Some(parse_db_flag(args)?),
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self { db_url, json })
    }
}

fn parse_db_flag(args: &mut impl Iterator<Item = String>) -> Result<String, ArgsError> {
    let value = require_value(args, "--db")?;
    if value.trim().is_empty() {
        return Err(ArgsError::InvalidDbUrl { raw: value });
    }
    Ok(normalize_sqlite_url(value))
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

async fn open_storage(db_url: Option<&str>) -> Result<Storage, Box<dyn std::error::Error>> {
    match db_url {
        Some(url) => {
            prepare_sqlite_file(url)?;
            Ok(Storage::sqlite(url).await?)
        }
        None => Ok(Storage::in_memory()),
    }
}

// ─── Commands ───────────────────────────────────────────────────────────────

fn list_challenges() {
    for category in Category::ALL {
        println!("{}", category.title());
        for kind in ChallengeKind::in_category(category) {
            println!("  {:<18} {:<20} {}", kind.id(), kind.name(), kind.description());
        }
        println!();
    }
}

async fn show_records(args: RecordsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(args.db_url.as_deref()).await?;
    let loop_svc = SessionLoopService::from_storage(Clock::default_clock(), &storage);
    let records = loop_svc.records().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("no records yet");
        return Ok(());
    }
    for record in records {
        if let Some(value) = record.value() {
            println!(
                "{:<20} {}",
                record.challenge().name(),
                format_record(record.kind(), value)
            );
        }
    }
    Ok(())
}

fn feedback_mark(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::Success => "✓",
        Feedback::Error => "✗",
        Feedback::Step => "·",
        Feedback::Warning => "too slow!",
    }
}

fn status_line(progress: &SessionProgress) -> String {
    let mut parts = vec![
        format!("score {}", progress.score),
        format!("streak {}", progress.streak),
    ];
    if let Some(lives) = progress.lives {
        parts.push(format!("lives {lives}"));
    }
    if let Some(remaining) = progress.remaining_ms {
        parts.push(format!("{} left", format_seconds(remaining)));
    }
    parts.join(" | ")
}

async fn show_prompt(active: &ActiveChallenge) {
    let progress = active.progress().await;
    if let Some(prompt) = active.prompt().await {
        println!("\n[{}]\n{prompt}", status_line(&progress));
    }
}

async fn play(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(args.db_url.as_deref()).await?;
    let loop_svc = SessionLoopService::from_storage(Clock::default_clock(), &storage);
    let session = loop_svc
        .prepare(args.challenge, &args.settings, args.seed)
        .await?;

    let catalog = TableCatalog::builtin();
    let mut screen = ChallengeScreen::new(ScreenProps {
        language: args.language,
        on_back: Box::new(|| tracing::debug!("left challenge screen")),
    });
    let (active, mut events) = ActiveChallenge::spawn(session)?;
    screen.attach(active);

    println!("{}: {}", args.challenge.name(), args.challenge.description());
    let mut locked = false;
    if let Some(active) = screen.active() {
        locked = active.progress().await.input_locked;
        show_prompt(active).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Some(active) = screen.active() else {
            break;
        };
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.trim() {
                    "q" | "quit" => active.stop().await?,
                    input => match active.submit_text(input).await {
                        Ok(Some(result)) => {
                            println!("{}", feedback_mark(result.feedback));
                            if !result.ended {
                                show_prompt(active).await;
                            }
                        }
                        Ok(None) => println!("?"),
                        Err(SessionError::InputLocked) => println!("wait until the sequence is hidden"),
                        // the tick task reports the end
                        Err(SessionError::NotActive) => {}
                        Err(err) => return Err(err.into()),
                    },
                }
            }
            event = events.recv() => match event {
                Some(SessionEvent::Tick(progress)) => {
                    if locked && !progress.input_locked {
                        show_prompt(active).await;
                    }
                    locked = progress.input_locked;
                }
                Some(SessionEvent::RoundTimedOut(result)) => {
                    println!("{}", feedback_mark(result.feedback));
                    if !result.ended {
                        show_prompt(active).await;
                    }
                }
                Some(SessionEvent::Ended(summary)) => {
                    let record = active.best_record().await;
                    loop_svc.complete(&summary, &record).await?;
                    println!("\n{}", screen.summary_message(&summary, &catalog));
                    break;
                }
                Some(SessionEvent::Failed(message)) => return Err(message.into()),
                None => break,
            },
        }
    }

    screen.leave().await;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            ArgsError::UnknownArg(first.clone())
        })?,
    };

    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::List => {
            list_challenges();
            Ok(())
        }
        Command::Play => {
            let args = PlayArgs::parse(&mut argv, EnvDefaults::from_env()).map_err(report)?;
            play(args).await
        }
        Command::Records => {
            let args = RecordsArgs::parse(&mut argv, EnvDefaults::from_env()).map_err(report)?;
            show_records(args).await
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
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
