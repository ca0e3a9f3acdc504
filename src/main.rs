//! procmon CLI entry point.

use procmon::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli).await?;
    Ok(())
}
