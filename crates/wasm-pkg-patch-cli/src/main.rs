//! wasm-pkg-patch CLI
//!
//! Rewrites a wasm-pack output directory so it can be published as a
//! self-contained ES module package: patches `package.json` and inlines the
//! `_bg.wasm` image into the JS loader.

mod commands;
mod output;

use clap::{ArgAction, Parser};
use commands::ConfigArgs;
use output::StyledOutput;

#[derive(Parser)]
#[command(name = "wasm-pkg-patch")]
#[command(about = "Patch a wasm-pack package for publishing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Report whether the package is patched, without writing
    #[arg(long)]
    check: bool,

    /// Compute every change but write nothing
    #[arg(long, conflicts_with = "check")]
    dry_run: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// When to use colors
    #[arg(long, default_value = "auto", value_parser = ["auto", "always", "never"])]
    color: String,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, _) => log::LevelFilter::Debug,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = cli.config.resolve()?;
    let mut out = StyledOutput::new(output::resolve_color_choice(Some(&cli.color)));

    if cli.check {
        if !commands::check::execute(config, &mut out)? {
            std::process::exit(1);
        }
        return Ok(());
    }

    commands::patch::execute(config, cli.dry_run, &mut out)
}
