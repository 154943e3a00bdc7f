use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = ziman::cli::Cli::parse();
    ziman::cli::init_logging(cli.verbose);
    cli.run()
}
