use anyhow::Result;
use clap::Parser;
use fishtank_lib::RunOptions;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file overriding simulation constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file replacing the stock species, decorations and medicines
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long)]
    db: Option<PathBuf>,

    /// Discard any saved tank
    #[arg(long)]
    fresh: bool,

    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Step as fast as possible with a fixed delta
    #[arg(long)]
    fast: bool,

    /// Simulated seconds to run before exiting
    #[arg(long)]
    seconds: Option<f32>,

    #[arg(long, default_value_t = 30.0)]
    autosave: f32,

    /// Collect coins and feed fish without a player
    #[arg(long)]
    autoplay: bool,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();
    log::debug!("{args:#?}");

    fishtank_lib::run(RunOptions {
        config_path: args.config,
        catalog_path: args.catalog,
        db_path: args.db,
        fresh: args.fresh,
        fps: args.fps,
        fast: args.fast,
        seconds: args.seconds,
        autosave_secs: args.autosave,
        autoplay: args.autoplay,
    })
}
