mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use relsync_lib::logging::initialize_logging;
use relsync_lib::ui;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    initialize_logging();
    let cli = Cli::parse();

    // Failures are reported, not turned into an exit status.
    if let Err(e) = cli.run().await {
        ui::error(&format!("{e:#}"));
    }
    Ok(())
}
