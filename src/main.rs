use clap::Parser;
use tracing_subscriber::EnvFilter;

use ref_checker::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("ref_checker=debug,info")
    } else {
        EnvFilter::new("ref_checker=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Check(args) => {
            cli::check::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Summarize(args) => {
            cli::summarize::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
