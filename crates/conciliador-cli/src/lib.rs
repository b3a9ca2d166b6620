mod config;
mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, CommandFactory as _, Parser, Subcommand};
use conciliador::{ReconcileConfig, ReconciliationResult, Source, import};

use config::Config;

#[derive(Parser)]
#[command(
    name = "conciliador",
    about = "Reconcile an internal payment ledger against a bank statement"
)]
#[command(disable_help_subcommand = true)]
struct Args {
    #[command(flatten)]
    files: FileArgs,

    /// Config file, defaults to conciliador.toml in the current directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ClapArgs)]
struct FileArgs {
    /// Internal ledger export (payment processor)
    #[arg(short, long, global = true)]
    internal: Option<PathBuf>,

    /// Bank statement export
    #[arg(short, long, global = true)]
    bank: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show matches and a summary of the reconciliation (default)
    Diff {
        /// Also list transactions found in only one ledger
        #[arg(short, long)]
        unmatched: bool,
    },
    /// Write the reconciliation report as CSV
    Export {
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Start web server exposing the reconciliation
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = conciliador_web::DEFAULT_PORT)]
        port: u16,
    },
}

pub async fn run(args: impl IntoIterator<Item = String>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "conciliador=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    clap_complete::CompleteEnv::with_factory(Args::command).complete();

    let args = Args::parse_from(args);
    let (base_dir, config) = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::find_and_load()?.unwrap_or_default(),
    };
    let internal = ledger_path(args.files.internal, config.ledgers.internal, &base_dir)
        .context("No internal ledger given, pass --internal or set ledgers.internal")?;
    let bank = ledger_path(args.files.bank, config.ledgers.bank, &base_dir)
        .context("No bank ledger given, pass --bank or set ledgers.bank")?;
    let reconcile_config = config.matching.0;

    let command = args.command.unwrap_or(Commands::Diff { unmatched: false });
    match command {
        Commands::Diff { unmatched } => {
            let result = reconcile_files(&internal, &bank, &reconcile_config)?;
            show::show_diff(&result, unmatched)
        }
        Commands::Export { output } => {
            let result = reconcile_files(&internal, &bank, &reconcile_config)?;
            export(&result, output.as_deref())
        }
        Commands::Serve { port } => {
            conciliador_web::run(internal, bank, reconcile_config, port).await
        }
    }
}

/// Command line paths are taken as given, config paths are relative to the config file.
fn ledger_path(
    flag: Option<PathBuf>,
    configured: Option<PathBuf>,
    base_dir: &Path,
) -> Option<PathBuf> {
    flag.or_else(|| configured.map(|path| base_dir.join(path)))
}

fn reconcile_files(
    internal: &Path,
    bank: &Path,
    config: &ReconcileConfig,
) -> Result<ReconciliationResult> {
    let internal = import::read_ledger(internal, Source::Internal)?;
    let bank = import::read_ledger(bank, Source::Bank)?;
    Ok(config.reconcile(&internal, &bank))
}

fn export(result: &ReconciliationResult, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            conciliador::export::write_report(std::io::BufWriter::new(file), result)?;
            tracing::info!("Wrote report to {}", path.display());
        }
        None => conciliador::export::write_report(std::io::stdout().lock(), result)?,
    }
    Ok(())
}
