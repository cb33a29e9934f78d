//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use profilescout_pipeline::{DispatchObserver, RunOutcome, run_pipeline};
use profilescout_shared::{
    SubjectId, config_file_path, gateway_token, init_config, load_config, load_config_from,
    load_subjects, load_subjects_from_file,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ProfileScout — resolve, scrape, and route a batch of subjects.
#[derive(Parser)]
#[command(
    name = "profilescout",
    version,
    about = "Resolve subject identifiers through a chat bot, scrape their profiles, and notify on hits.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the batch pipeline over the configured subject list.
    Run {
        /// Config file path (defaults to ~/.profilescout/profilescout.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Subject list file, overriding the configured source.
        #[arg(long)]
        subjects: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug,hyper=info,reqwest=info",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run { config, subjects } => cmd_run(config.as_deref(), subjects.as_deref()).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn cmd_run(
    config_path: Option<&std::path::Path>,
    subjects_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let subjects: Vec<SubjectId> = match subjects_path {
        Some(path) => {
            let list = load_subjects_from_file(path)?;
            if list.is_empty() {
                return Err(eyre!("no subjects in {}", path.display()));
            }
            list
        }
        None => load_subjects(&config)?,
    };

    // Fail fast on a missing token before any network work.
    let token = gateway_token(&config)?;

    info!(
        subjects = subjects.len(),
        lookup_channel = %config.channels.lookup_channel,
        "starting batch run"
    );

    let total = subjects.len();
    let progress = BatchProgress::new(total);
    let outcome = run_pipeline(&config, token, subjects, &progress).await?;

    println!();
    match outcome {
        RunOutcome::Completed => println!("  Batch complete: {total} subjects dispatched."),
        RunOutcome::Interrupted => println!("  Interrupted; session released cleanly."),
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    println!("# {}", config_file_path()?.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Batch progress reporter
// ---------------------------------------------------------------------------

/// Dispatch progress bar using indicatif.
struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("  {bar:30} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        Self { bar }
    }
}

impl DispatchObserver for BatchProgress {
    fn dispatched(&self, subject: &SubjectId, _position: usize, _total: usize) {
        self.bar.set_message(format!("sent {subject}"));
        self.bar.inc(1);
    }

    fn skipped(&self, subject: &SubjectId, _position: usize, _total: usize) {
        self.bar.set_message(format!("skipped {subject}"));
        self.bar.inc(1);
    }

    fn done(&self, _total: usize) {
        self.bar.finish_with_message("dispatch complete");
    }
}
