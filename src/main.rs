use clap::Parser;

use daylit::cli::Cli;
use daylit::commands::{self, AppContext};
use daylit::config;
use daylit::feedback;
use daylit::logger;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> daylit::error::AppResult<()> {
    let cli = Cli::parse();

    let resolved = config::resolve(cli.config.clone())?;
    let config_dir = config::config_dir_for(&resolved)?;
    logger::init_logging(&config_dir)?;

    feedback::assert_weights_are_sane()?;

    let ctx = AppContext::new(&resolved, config_dir)?;
    commands::dispatch(cli, &ctx)
}
