use clap::Parser;
use page_testgen::cli::commands::{cmd_generate, cmd_inspect};
use page_testgen::cli::config::{Cli, Commands, load_config, merge_cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout carries generated output, so logs go to stderr. RUST_LOG wins over -v.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Resolve settings: CLI > config > env > defaults
    let config = merge_cli(load_config(cli.config.as_deref()), &cli);

    match &cli.command {
        Commands::Generate(args) => cmd_generate(args, &config)?,
        Commands::Inspect {
            url,
            all,
            navigation_timeout_ms,
        } => cmd_inspect(url, *all, *navigation_timeout_ms, &config)?,
    }

    Ok(())
}
