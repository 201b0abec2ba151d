use clap::Parser;
use stepler_link_lib::app::{run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if !run(cli).await? {
        std::process::exit(1);
    }
    Ok(())
}
