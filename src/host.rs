//! Headless host – drives a [`Game`] from JSON lines.
//!
//! ## I/O
//!
//! | Stream | Content                                         |
//! |--------|-------------------------------------------------|
//! | input  | one inbound host message per line               |
//! | stdout | one outbound message per line (`ready`, `setData`, `levelPass`) |
//!
//! Logging goes to stderr so stdout stays machine-readable.

use crate::bridge::{self, BridgeError, HostTransport};
use crate::game::Game;
use crate::scheduler::SchedulerState;
use crate::types::GameStats;
use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

// ---------------------------------------------------------------------------
// Stdout transport
// ---------------------------------------------------------------------------

pub struct StdoutTransport {
    out: Mutex<io::Stdout>,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(io::stdout()),
        }
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTransport for StdoutTransport {
    fn attach(&mut self) -> Result<(), BridgeError> {
        Ok(())
    }

    fn post(&self, json: &str) -> Result<(), BridgeError> {
        let mut out = self.out.lock();
        writeln!(out, "{}", json)
            .and_then(|_| out.flush())
            .map_err(|e| BridgeError::Post(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Tick rate in Hz; each tick advances the game by `1 / tick_rate_hz`.
    pub tick_rate_hz: f32,
    /// Stop once input is closed and every queued action has played out.
    pub exit_when_idle: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            exit_when_idle: true,
        }
    }
}

/// Queue every message in a JSON-lines script before input is read.
/// Returns how many commands were queued; bad lines are skipped.
pub fn load_script(game: &Game, path: &Path) -> Result<usize> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;

    let sender = game.command_sender();
    let mut queued = 0;
    for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(command) = bridge::receive(line) {
            sender.send(command).context("game inbox closed")?;
            queued += 1;
        }
    }
    info!("Queued {} command(s) from {}", queued, path.display());
    Ok(queued)
}

/// Run `game` until shutdown, reading host messages from `input` and
/// publishing through `transport`.
pub async fn run<T, R>(mut game: Game, transport: T, input: R, options: &HostOptions) -> Result<GameStats>
where
    T: HostTransport,
    R: AsyncBufRead + Unpin,
{
    anyhow::ensure!(
        options.tick_rate_hz.is_finite() && options.tick_rate_hz > 0.0,
        "tick rate must be positive, got {}",
        options.tick_rate_hz
    );

    let bridge = game.connect(transport);
    if bridge.is_none() {
        warn!("No host attached, running offline");
        game.resume();
    }

    let sender = game.command_sender();
    let dt = 1.0 / options.tick_rate_hz;
    let mut timer = tokio::time::interval(Duration::from_secs_f32(dt));
    let mut lines = input.lines();
    let mut input_open = true;

    info!("Host running at {} Hz", options.tick_rate_hz);

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line.context("reading host input")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        if let Some(command) = bridge::receive(&line) {
                            sender.send(command).context("game inbox closed")?;
                        }
                    }
                    None => {
                        info!("Host input closed");
                        input_open = false;
                    }
                }
            }
            _ = timer.tick() => {
                let tick = game.tick(dt);
                if let Some(bridge) = &bridge {
                    bridge.publish_all(&tick.events);
                }
                for report in &tick.reports {
                    info!("#{} {} → {:?}", report.seq, report.action.label(), report.outcome);
                }

                if !input_open
                    && options.exit_when_idle
                    && game.scheduler().state() == SchedulerState::Idle
                {
                    info!("Idle with input closed, stopping");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Host shutting down (SIGINT)");
                break;
            }
        }
    }

    Ok(game.stats())
}
