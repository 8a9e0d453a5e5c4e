//! `lensctl`: CLI wrapper over the lens engine and COEF (spec §6).

mod cli;
mod commands;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("lensctl error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &cli::Cli) -> anyhow::Result<i32> {
    let config = lens_config::load()?;

    match &cli.command {
        cli::Commands::Bake(args) => commands::bake(args, &config),
        cli::Commands::Scan(args) => commands::scan(args, &config),
        cli::Commands::Compress(args) => commands::compress(args, &config),
        cli::Commands::ListLenses(args) => commands::list_lenses(args, &config),
        cli::Commands::DescribeLens(args) => commands::describe_lens(args, &config),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
