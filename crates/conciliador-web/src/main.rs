use clap::Parser;
use conciliador::ReconcileConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "conciliador-web")]
#[command(about = "Web server exposing a live bank reconciliation")]
struct Args {
    /// Internal ledger export
    #[arg(short, long)]
    internal: PathBuf,

    /// Bank statement export
    #[arg(short, long)]
    bank: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = conciliador_web::DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    conciliador_web::run(args.internal, args.bank, ReconcileConfig::default(), args.port).await
}
