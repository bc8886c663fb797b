use anyhow::Context;
use clap::Parser;
use codeweld::logging::init_logging;
use codeweld::tooling::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config().context("loading configuration")?;
    init_logging(&config.logging).context("initializing logging")?;
    execute(&cli, &config).await?;
    Ok(())
}
