use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use nd_core::{DigestSender, Error, HistoryStorage, Result};
use nd_digest::delivery::smtp::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use nd_digest::logging::DEFAULT_LOG_FILE;
use nd_digest::prelude::*;
use nd_inference::parser::parse_selection_detailed;
use nd_storage::{create_storage, StorageConfig};
use tracing::{error, info};

mod lock;

use lock::{LockGuard, DEFAULT_LOCKFILE};

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

fn unit_seconds(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        const OVERFLOW: &str = "Duration is too large";

        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        let mut add = |digits: &str, multiplier: u64| -> std::result::Result<(), String> {
            let num = digits
                .parse::<u64>()
                .map_err(|_| format!("Invalid number in duration: {}", digits))?;
            total_seconds = num
                .checked_mul(multiplier)
                .and_then(|secs| total_seconds.checked_add(secs))
                .ok_or_else(|| OVERFLOW.to_string())?;
            Ok(())
        };

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if c.is_whitespace() {
                continue;
            } else if current_number.is_empty() {
                return Err(format!("Invalid character in duration: {}", c));
            } else {
                let multiplier = unit_seconds(c).ok_or_else(|| format!("Invalid duration unit: {}", c))?;
                add(&current_number, multiplier)?;
                current_number.clear();
                has_unit = true;
            }
        }

        // A trailing bare number counts as seconds.
        if !current_number.is_empty() {
            add(&current_number, 1)?;
            has_unit = true;
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be positive".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Emails a ranked digest of fresh news headlines", long_about = None)]
struct Cli {
    /// History file of already-sent headlines
    #[arg(long, env = "NEWSDIGEST_HISTORY", default_value = "history.json", global = true)]
    history: PathBuf,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Append logs to a file instead of stderr
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_LOG_FILE, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, rank and email one digest
    Run(RunArgs),
    /// Recover a topic/headline selection from raw model output (a file, or - for stdin)
    Parse { input: String },
    /// Inspect or maintain the sent history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// Print stored headlines per topic
    Show,
    /// Drop entries older than the retention window
    Prune {
        #[arg(long, default_value = DEFAULT_LOCKFILE)]
        lockfile: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Print the digest instead of emailing it; history is not updated
    #[arg(long)]
    dry_run: bool,
    /// Keep running, one digest per interval (e.g. 1h, 30m, 1h15m)
    #[arg(long)]
    interval: Option<HumanDuration>,
    #[arg(long, default_value = DEFAULT_LOCKFILE)]
    lockfile: PathBuf,

    #[arg(long, env = "CONFIG_CSV_URL")]
    config_sheet: String,
    #[arg(long, env = "TOPICS_CSV_URL")]
    topics_sheet: String,
    #[arg(long, env = "KEYWORDS_CSV_URL")]
    keywords_sheet: String,
    #[arg(long, env = "OVERRIDES_CSV_URL")]
    overrides_sheet: String,
    /// Linked from the email footer
    #[arg(long, env = "PREFERENCES_URL")]
    preferences_url: Option<String>,

    /// Ranking model: gemini or dummy
    #[arg(long, env = "NEWSDIGEST_MODEL", default_value = "gemini")]
    model: String,
    #[arg(long, env = "GEMINI_MODEL")]
    model_name: Option<String>,
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GMAIL_USER", default_value = "")]
    gmail_user: String,
    #[arg(long, env = "GMAIL_APP_PASSWORD", hide_env_values = true, default_value = "")]
    gmail_app_password: String,
    /// Comma separated list of blind-copied readers
    #[arg(long, env = "MAILTO", default_value = "")]
    mailto: String,
    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    smtp_host: String,
    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT)]
    smtp_port: u16,
}

impl RunArgs {
    fn sheet_locations(&self) -> SheetLocations {
        SheetLocations {
            config: self.config_sheet.clone(),
            topics: self.topics_sheet.clone(),
            keywords: self.keywords_sheet.clone(),
            overrides: self.overrides_sheet.clone(),
        }
    }

    fn sender(&self) -> Result<Arc<dyn DigestSender>> {
        if self.dry_run {
            return Ok(Arc::new(ConsoleSender));
        }
        let config = SmtpConfig {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.gmail_user.chars().filter(char::is_ascii).collect(),
            password: self.gmail_app_password.clone(),
            recipients: SmtpConfig::parse_recipients(&self.mailto),
        };
        Ok(Arc::new(SmtpSender::new(config)?))
    }
}

async fn run_cycle(args: &RunArgs, storage: Arc<dyn HistoryStorage>, logger: &Logger) -> Result<RunOutcome> {
    let sheets = SheetSource::new()?;
    let profile = load_profile(&sheets, &args.sheet_locations()).await?;

    let model = nd_inference::create_model(nd_inference::Config {
        model: args.model.clone(),
        api_key: args.gemini_api_key.clone(),
        model_name: args.model_name.clone(),
        base_url: None,
    })?;
    info!("🧠 Ranking with {}", model.name());

    let headlines = Arc::new(GoogleNewsSource::new(profile.settings.max_article_hours)?);
    let mut options = RunOptions::new(profile.settings, profile.preferences);
    options.dry_run = args.dry_run;
    options.preferences_url = args.preferences_url.clone();

    DigestManager::new(headlines, model, args.sender()?, storage, options)
        .with_logger(logger.clone())
        .run(Utc::now())
        .await
}

async fn run(args: RunArgs, history: PathBuf, logger: Logger) -> Result<()> {
    let Some(_lock) = LockGuard::acquire(&args.lockfile)? else {
        println!("Script is already running. Exiting.");
        return Ok(());
    };
    info!("Script started at {}", chrono::Local::now());
    let storage = create_storage(StorageConfig::Json(history))?;

    let Some(interval) = args.interval.clone() else {
        let outcome = run_cycle(&args, storage, &logger).await?;
        info!("Run finished: {:?}", outcome);
        return Ok(());
    };

    info!("Running in periodic mode every {}s", interval.0.as_secs());
    loop {
        match run_cycle(&args, storage.clone(), &logger).await {
            Ok(outcome) => info!("Cycle finished: {:?}", outcome),
            Err(e) => error!("Digest cycle failed: {}", e),
        }
        info!("Waiting {}s before next digest", interval.0.as_secs());
        tokio::time::sleep(interval.0).await;
    }
}

async fn parse(input: &str) -> Result<()> {
    let raw = if input == "-" {
        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw).await?;
        raw
    } else {
        tokio::fs::read_to_string(input).await?
    };

    let outcome = parse_selection_detailed(&raw);
    info!("Recovered {} topics ({:?})", outcome.selection.len(), outcome.stage);
    println!("{}", serde_json::to_string_pretty(&outcome.selection)?);
    Ok(())
}

async fn history(command: HistoryCommands, path: PathBuf) -> Result<()> {
    let storage = create_storage(StorageConfig::Json(path))?;
    match command {
        HistoryCommands::Show => {
            let history = storage.load().await?;
            if history.is_empty() {
                println!("History is empty.");
            }
            for key in history.topic_keys() {
                let entries = history.entries(key).unwrap_or_default();
                println!("{} ({})", key, entries.len());
                for entry in entries {
                    println!("  {}  {}", entry.published_at, entry.title);
                }
            }
        }
        HistoryCommands::Prune { lockfile } => {
            let Some(_lock) = LockGuard::acquire(&lockfile)? else {
                return Err(Error::Storage(format!(
                    "{} exists; another run holds the history",
                    lockfile.display()
                )));
            };
            let mut history = storage.load().await?;
            let before = history.len();
            history.prune(Utc::now());
            storage.persist(&history).await?;
            println!("Pruned {} of {} entries.", before - history.len(), before);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let logger = init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run(args) => run(args, cli.history, logger).await,
        Commands::Parse { input } => parse(&input).await,
        Commands::History { command } => history(command, cli.history).await,
    }
}
