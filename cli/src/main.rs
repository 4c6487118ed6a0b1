mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, check, diff, fmt, imports, list, resolve};
use pinlist_common::config::{Config, Settings};
use terminal::{logging, print};
use tracing::error;

/// Exit code for usage, IO and configuration failures.
const EXIT_TROUBLE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.json);

    match run(commands).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_TROUBLE)
        }
    }
}

async fn run(commands: CommandLine) -> anyhow::Result<ExitCode> {
    let cfg = Config {
        no_banner: commands.no_banner,
        quiet: commands.quiet,
        json: commands.json,
        settings: Settings::load(commands.config.as_deref())?,
    };

    print::banner(cfg.no_banner || cfg.json, cfg.quiet);

    match commands.command {
        Commands::List { manifest } => list::list(&manifest, &cfg),
        Commands::Check { manifest, strict } => check::check(&manifest, strict, &cfg),
        Commands::Diff { old, new } => diff::diff(&old, &new, &cfg),
        Commands::Fmt {
            manifest,
            sort,
            check,
        } => fmt::fmt(&manifest, sort, check, &cfg),
        Commands::Resolve {
            manifest,
            index_url,
            concurrency,
        } => resolve::resolve(&manifest, index_url, concurrency, &cfg).await,
        Commands::Imports { manifest, source } => imports::imports(&manifest, &source, &cfg),
    }
}
