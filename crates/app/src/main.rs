use std::fmt;
use std::io::Write as _;
use std::time::Duration;

use count_core::input::coerce_number;
use count_core::model::{
    CoinOutcome, CrossingKind, Direction, NumberLine, Passcode, PracticeConfig,
    PracticeConfigDraft, PracticeMode, ProgressReport,
};
use count_core::time::DEFAULT_FEEDBACK_DELAY_MS;
use services::{
    Advance, AppServices, BoardCell, Clock, PracticeSession, PracticeSummaryListItem,
    RewardError,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_flag<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let value = require_value(args, flag)?;
    value
        .parse()
        .map_err(|_| ArgsError::InvalidValue { flag, raw: value })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app practice [--mode pattern|crossing] [--crossing decade|hundred]");
    eprintln!("               [--step 1|2|3|5|10] [--start <n>] [--direction forward|backward]");
    eprintln!("               [--count <n>] [--db <sqlite_url>]");
    eprintln!("  app rewards      [--db <sqlite_url>]");
    eprintln!("  app edit-rewards --coins <n> --eggs <n> [--db <sqlite_url>]");
    eprintln!("  app progress     [--db <sqlite_url>]");
    eprintln!("  app history      [--limit <n>] [--db <sqlite_url>]");
    eprintln!();
    eprintln!("While practicing, type a number to answer, or: hint, reset, quit.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://<cwd>/counting.sqlite3");
    eprintln!("  --step 1 --start 0 --direction forward --count 40 --limit 10");
    eprintln!("  in-memory: sqlite::memory: or sqlite:file:<name>?mode=memory");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COUNT_DB_URL, COUNT_PASSCODE, COUNT_FEEDBACK_MS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Rewards,
    EditRewards,
    Progress,
    History,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "rewards" => Some(Self::Rewards),
            "edit-rewards" => Some(Self::EditRewards),
            "progress" => Some(Self::Progress),
            "history" => Some(Self::History),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    practice: PracticeConfigDraft,
    coins: Option<u32>,
    eggs: Option<u32>,
    limit: u32,
}

const DEFAULT_HISTORY_LIMIT: u32 = 10;

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = None;
        let mut practice = PracticeConfigDraft::default();
        let mut mode: Option<String> = None;
        let mut crossing: Option<CrossingKind> = None;
        let mut coins = None;
        let mut eggs = None;
        let mut limit = DEFAULT_HISTORY_LIMIT;

        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value)?);
                }
                (Command::Practice, "--mode") => mode = Some(require_value(args, "--mode")?),
                (Command::Practice, "--crossing") => {
                    crossing = Some(parse_flag(args, "--crossing")?);
                }
                (Command::Practice, "--step") => practice.step = parse_flag(args, "--step")?,
                (Command::Practice, "--start") => {
                    practice.start = coerce_number(&require_value(args, "--start")?);
                }
                (Command::Practice, "--direction") => {
                    practice.direction = parse_flag::<Direction>(args, "--direction")?;
                }
                (Command::Practice, "--count") => practice.count = parse_flag(args, "--count")?,
                (Command::EditRewards, "--coins") => coins = Some(parse_flag(args, "--coins")?),
                (Command::EditRewards, "--eggs") => eggs = Some(parse_flag(args, "--eggs")?),
                (Command::History, "--limit") => limit = parse_flag(args, "--limit")?,
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        // A crossing kind on its own selects crossing mode.
        let mode = mode.unwrap_or_else(|| {
            crossing.map_or(PracticeMode::Pattern.as_str(), |_| "crossing").to_string()
        });
        let kind = match mode.as_str() {
            "crossing" => Some(crossing.unwrap_or(CrossingKind::Decade)),
            _ => crossing,
        };
        practice.mode = PracticeMode::from_parts(&mode, kind)
            .map_err(|_| ArgsError::InvalidValue { flag: "--mode", raw: mode.clone() })?;

        if cmd == Command::EditRewards && (coins.is_none() || eggs.is_none()) {
            return Err(ArgsError::MissingValue {
                flag: if coins.is_none() { "--coins" } else { "--eggs" },
            });
        }

        let db_url = match db_url {
            Some(url) => url,
            None => normalize_sqlite_url(
                std::env::var("COUNT_DB_URL").unwrap_or_else(|_| "counting.sqlite3".into()),
            )?,
        };

        Ok(Self {
            db_url,
            practice,
            coins,
            eggs,
            limit,
        })
    }
}

/// `sqlite::memory:` or a `sqlite:file:` URI opened with `mode=memory`.
fn is_memory_url(url: &str) -> bool {
    if url == "sqlite::memory:" {
        return true;
    }
    url.strip_prefix("sqlite:file:")
        .and_then(|rest| rest.split_once('?'))
        .is_some_and(|(_, query)| query.split('&').any(|pair| pair == "mode=memory"))
}

fn normalize_sqlite_url(raw: String) -> Result<String, ArgsError> {
    if is_memory_url(&raw) || raw.starts_with("sqlite://") {
        return Ok(raw);
    }
    // Only in-memory `file:` URIs are understood; a bare path covers the rest.
    if raw.starts_with("sqlite:file:") {
        return Err(ArgsError::InvalidDbUrl { raw });
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
    Ok(format!("sqlite://{}", absolute.display()))
}

fn passcode_from_env() -> Result<Passcode, Box<dyn std::error::Error>> {
    match std::env::var("COUNT_PASSCODE") {
        Ok(raw) => Ok(Passcode::new(raw)?),
        Err(_) => Ok(Passcode::default()),
    }
}

fn feedback_delay_from_env() -> Duration {
    let ms = std::env::var("COUNT_FEEDBACK_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_FEEDBACK_DELAY_MS);
    Duration::from_millis(ms)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render_board(session: &PracticeSession) -> String {
    session
        .board()
        .iter()
        .map(|cell| match cell {
            BoardCell::Revealed(value) => value.to_string(),
            BoardCell::Current => "?".to_string(),
            BoardCell::Hidden => "_".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_hint(line: &NumberLine) -> String {
    let mut out = String::new();
    for marker in line.markers() {
        if let Some(boundary) = marker.boundary {
            out.push_str(if boundary.hundred {
                " || "
            } else if boundary.decade {
                " | "
            } else {
                " "
            });
        }
        if marker.is_current {
            out.push_str(&format!("[{}]", marker.value));
        } else {
            out.push_str(&marker.value.to_string());
        }
    }
    out
}

fn render_progress(report: &ProgressReport) -> String {
    let mut out = String::from("Progress\n");
    for stat in &report.stats {
        out.push_str(&format!(
            "  {:<18} {:>3}/{:<3} {:>3}%\n",
            stat.category.label(),
            stat.completed,
            stat.total,
            stat.percentage
        ));
    }
    out.push_str("\nAchievements\n");
    for achievement in &report.achievements {
        let status = match achievement.earned_at {
            Some(at) => format!("earned {}", at.format("%Y-%m-%d")),
            None => format!(
                "{}/{}",
                achievement.progress.min(achievement.threshold),
                achievement.threshold
            ),
        };
        out.push_str(&format!(
            "  {:<8} {:<16} {:<40} {status}\n",
            format!("[{}]", achievement.kind.tier().label()),
            achievement.kind.title(),
            achievement.kind.description()
        ));
    }
    out
}

fn render_history(items: &[PracticeSummaryListItem]) -> String {
    if items.is_empty() {
        return "No finished drills yet.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let drill = match item.mode {
            PracticeMode::Pattern => format!("counting by {}s", item.step),
            PracticeMode::Crossing(kind) => format!("{} crossing by {}s", kind.as_str(), item.step),
        };
        out.push_str(&format!(
            "  #{:<4} {}  {:<26} {}/{}\n",
            item.id,
            item.completed_at.format("%Y-%m-%d %H:%M"),
            drill,
            item.score,
            item.total_attempts
        ));
    }
    out
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut out = std::io::stdout();
    write!(out, "{text}")?;
    out.flush()
}

//
// ─── COMMANDS ──────────────────────────────────────────────────────────────────
//

/// Wait out `delay`, dropping any lines typed meanwhile.
///
/// Returns how many lines were dropped. `next_line` is cancel safe, so a
/// partial line left when the timer fires is kept for the next read.
async fn pause_discarding_input<R: AsyncBufRead + Unpin>(
    input: &mut Lines<R>,
    delay: Duration,
) -> std::io::Result<usize> {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    let mut dropped = 0;
    loop {
        tokio::select! {
            () = &mut sleep => return Ok(dropped),
            line = input.next_line() => match line? {
                Some(line) => {
                    debug!(line = line.as_str(), "input ignored during feedback pause");
                    dropped += 1;
                }
                None => {
                    (&mut sleep).await;
                    return Ok(dropped);
                }
            },
        }
    }
}

async fn practice<R: AsyncBufRead + Unpin>(
    services: &AppServices,
    config: PracticeConfig,
    input: &mut Lines<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loop_svc = services.practice_loop();
    let mut session = loop_svc.start(config);

    println!("{}", config.title());
    println!("{}", config.description());
    if let (PracticeMode::Crossing(kind), Some(seq)) = (config.mode(), session.sequence()) {
        if !seq.crosses(kind) {
            println!("(this run stays inside one {})", kind.as_str());
        }
    }

    loop {
        println!();
        println!("{}", render_board(&session));
        prompt("What number comes next? ")?;
        let Some(line) = input.next_line().await? else {
            break;
        };

        match line.trim() {
            "quit" | "q" => break,
            "reset" => {
                session.reset();
                session = loop_svc.start(config);
                println!("Starting over.");
                continue;
            }
            "hint" => {
                if let Some(hint) = session.hint() {
                    println!("{}", render_hint(&hint));
                }
                continue;
            }
            _ => {}
        }

        let Some(result) = loop_svc.answer(&mut session, &line).await? else {
            continue;
        };
        if !result.outcome.is_correct() {
            println!("Not quite. Try again!");
            continue;
        }

        match result.reward {
            Some((CoinOutcome::HatchedEgg, ledger)) => {
                println!("Correct! Ten coins hatched a golden egg. Eggs: {}", ledger.eggs());
            }
            Some((CoinOutcome::Coin, ledger)) => {
                println!("Correct! +1 golden coin. Coins: {}", ledger.coins());
            }
            None => println!("Correct!"),
        }
        if let Some(delay) = result.feedback_delay {
            pause_discarding_input(input, delay).await?;
        }

        let step = loop_svc.advance(&mut session).await?;
        if let Advance::Completed(summary) = step.advance {
            debug!(summary_id = ?step.summary_id, "summary stored");
            println!();
            println!(
                "Great job! You finished with {} correct out of {} attempts.",
                summary.score(),
                summary.total_attempts()
            );
            break;
        }
    }

    print_rewards(services).await;
    Ok(())
}

async fn print_rewards(services: &AppServices) {
    let ledger = services.rewards().ledger().await;
    println!("Golden coins: {}  Golden eggs: {}", ledger.coins(), ledger.eggs());
}

async fn edit_rewards<R: AsyncBufRead + Unpin>(
    services: &AppServices,
    coins: u32,
    eggs: u32,
    input: &mut Lines<R>,
) -> Result<(), Box<dyn std::error::Error>> {
    prompt("Passcode: ")?;
    let attempt = input.next_line().await?.unwrap_or_default();
    let editor = match services.rewards().unlock(&attempt) {
        Ok(editor) => editor,
        Err(RewardError::WrongPasscode) => {
            println!("Incorrect passcode!");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let current = editor.current().await;
    println!("Current. Golden coins: {}  Golden eggs: {}", current.coins(), current.eggs());
    let ledger = editor.overwrite(coins, eggs).await?;
    println!("Saved. Golden coins: {}  Golden eggs: {}", ledger.coins(), ledger.eggs());
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Practicing is the default when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let config = parsed.practice.validate()?;

    init_tracing();
    let passcode = passcode_from_env()?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        Clock::system(),
        passcode,
        feedback_delay_from_env(),
    )
    .await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    match cmd {
        Command::Practice => practice(&services, config, &mut input).await,
        Command::Rewards => {
            print_rewards(&services).await;
            Ok(())
        }
        Command::EditRewards => {
            let (Some(coins), Some(eggs)) = (parsed.coins, parsed.eggs) else {
                return Err(ArgsError::MissingValue { flag: "--coins" }.into());
            };
            edit_rewards(&services, coins, eggs, &mut input).await
        }
        Command::Progress => {
            let report = services.history().progress_report().await?;
            print!("{}", render_progress(&report));
            Ok(())
        }
        Command::History => {
            let items = services.history().list_recent(parsed.limit).await?;
            print!("{}", render_history(&items));
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_memory_url(db_url) {
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
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
