#[tokio::main]
async fn main() -> anyhow::Result<()> {
    conciliador_cli::run(std::env::args()).await
}
