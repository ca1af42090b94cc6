//! cubewalk-host binary
//!
//! Runs the game headless: inbound host messages as JSON lines on stdin,
//! outbound messages as JSON lines on stdout, logs on stderr.
//!
//! ## Configuration
//!
//! | Flag / env                               | Default      | Description                      |
//! |------------------------------------------|--------------|----------------------------------|
//! | `--config` / `CUBEWALK_CONFIG`           | –            | TOML file layered over defaults  |
//! | `--levels` / `CUBEWALK_LEVELS`           | built-in     | JSON level catalog               |
//! | `--level` / `CUBEWALK_LEVEL`             | `start_level`| Level to start on                |
//! | `--tick-rate-hz` / `CUBEWALK_TICK_RATE_HZ` | `tick_rate_hz` | Tick rate                      |
//! | `--script` / `CUBEWALK_SCRIPT`           | –            | JSON lines queued before stdin   |
//!
//! Any `GameConfig` key can also be set as `CUBEWALK_<SECTION>__<KEY>`.

use anyhow::{Context, Result};
use clap::Parser;
use cubewalk::config::GameConfig;
use cubewalk::game::Game;
use cubewalk::host::{self, HostOptions, StdoutTransport};
use cubewalk::level::LevelCatalog;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "cubewalk-host", about = "Cubewalk headless host", version)]
struct Args {
    /// TOML configuration file
    #[arg(long, env = "CUBEWALK_CONFIG")]
    config: Option<PathBuf>,

    /// JSON level catalog (built-in levels when absent)
    #[arg(long, env = "CUBEWALK_LEVELS")]
    levels: Option<PathBuf>,

    /// Level to start on
    #[arg(long, env = "CUBEWALK_LEVEL")]
    level: Option<u32>,

    /// Tick rate (Hz)
    #[arg(long, env = "CUBEWALK_TICK_RATE_HZ")]
    tick_rate_hz: Option<f32>,

    /// JSON lines of host messages to queue before reading stdin
    #[arg(long, env = "CUBEWALK_SCRIPT")]
    script: Option<PathBuf>,

    /// Keep running after stdin closes
    #[arg(long)]
    stay_alive: bool,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cubewalk=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = GameConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(level) = args.level {
        config.start_level = level;
    }
    if let Some(hz) = args.tick_rate_hz {
        config.tick_rate_hz = hz;
    }

    let catalog = match &args.levels {
        Some(path) => LevelCatalog::load(path).context("loading level catalog")?,
        None => LevelCatalog::builtin(),
    };

    log::info!(
        "Starting cubewalk-host (level={}, {} level(s), {} Hz)",
        config.start_level,
        catalog.len(),
        config.tick_rate_hz,
    );

    let options = HostOptions {
        tick_rate_hz: config.tick_rate_hz,
        exit_when_idle: !args.stay_alive,
    };

    let game = Game::new(config, catalog).context("starting game")?;
    if let Some(script) = &args.script {
        host::load_script(&game, script)?;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stats = host::run(game, StdoutTransport::new(), stdin, &options).await?;

    log::info!(
        "Stopped after {} frame(s), {} action(s) completed",
        stats.frame,
        stats.completed_actions
    );
    Ok(())
}
