//! Game session – owns the active level, the player and the scheduler.
//!
//! ## Frame contract
//!
//! ```text
//! host ──receive()──► HostCommand ──(inbox)──┐
//!                                            ▼
//!                 tick(dt): drain inbox → scheduler.tick → TickEvents
//!                                                              │
//! host ◄──publish_all()────────────────────────────────────────┘
//! ```
//!
//! Commands may be sent from any thread through [`Game::command_sender`];
//! only `tick` touches game state.

use crate::action::{Action, ActionReport};
use crate::bridge::{HostBridge, HostTransport};
use crate::config::GameConfig;
use crate::grid::{BlockStates, GridRegistry};
use crate::level::{Level, LevelCatalog, LevelError};
use crate::player::Player;
use crate::protocol::{GameEvent, HostCommand};
use crate::scheduler::{Scheduler, SchedulerState, Stage};
use crate::types::GameStats;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};

/// Telemetry variable names.
pub mod telemetry {
    pub const LEVEL_ID: &str = "levelId";
    pub const LEVEL_HASH: &str = "levelHash";
}

/// Everything produced by one call to [`Game::tick`].
#[derive(Debug, Default)]
pub struct TickEvents {
    pub frame: u64,
    pub events: Vec<GameEvent>,
    pub reports: Vec<ActionReport>,
}

impl TickEvents {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.reports.is_empty()
    }
}

pub struct Game {
    config: GameConfig,
    catalog: LevelCatalog,
    level: Level,
    block_states: BlockStates,
    player: Player,
    scheduler: Scheduler,
    inbox_tx: Sender<HostCommand>,
    inbox: Receiver<HostCommand>,
    outbox: Vec<GameEvent>,
    paused: bool,
    frame: u64,
}

impl Game {
    /// Start a session on `config.start_level`.
    pub fn new(config: GameConfig, catalog: LevelCatalog) -> Result<Self, LevelError> {
        let level = Level::build(catalog.get(config.start_level)?, &config.spacing, config.rules)?;
        let player = Player::spawn(level.spawn, &config.spacing);
        let (inbox_tx, inbox) = crossbeam_channel::unbounded();

        info!(
            "Game started on level {} '{}' ({} blocks)",
            level.id,
            level.name,
            level.grid.len()
        );

        Ok(Self {
            config,
            catalog,
            level,
            block_states: BlockStates::new(),
            player,
            scheduler: Scheduler::new(),
            inbox_tx,
            inbox,
            outbox: Vec::new(),
            paused: false,
            frame: 0,
        })
    }

    /// Default configuration and the built-in levels.
    pub fn with_defaults() -> Result<Self, LevelError> {
        Self::new(GameConfig::default(), LevelCatalog::builtin())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn grid(&self) -> &GridRegistry {
        &self.level.grid
    }

    pub fn block_states(&self) -> &BlockStates {
        &self.block_states
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn stats(&self) -> GameStats {
        GameStats {
            level_id: Some(self.level.id),
            frame: self.frame,
            pending_actions: self.scheduler.pending(),
            completed_actions: self.scheduler.completed(),
            paused: self.paused,
        }
    }

    // -----------------------------------------------------------------------
    // Host bridge
    // -----------------------------------------------------------------------

    /// Attach a host transport, announcing `ready` and the current level.
    /// If the host is unavailable the game pauses and runs without one.
    pub fn connect<T: HostTransport>(&mut self, transport: T) -> Option<HostBridge<T>> {
        match HostBridge::attach(transport) {
            Ok(bridge) => {
                bridge.publish_all(&[GameEvent::set_data(telemetry::LEVEL_ID, self.level.id)]);
                Some(bridge)
            }
            Err(e) => {
                warn!("Host bridge unavailable, pausing: {}", e);
                self.pause();
                None
            }
        }
    }

    /// Sender for commands arriving outside the game loop.
    pub fn command_sender(&self) -> Sender<HostCommand> {
        self.inbox_tx.clone()
    }

    /// Apply a host command immediately.
    pub fn submit(&mut self, command: HostCommand) {
        match command {
            HostCommand::Enqueue(action) => self.enqueue(action),
            HostCommand::RestartLevel => self.restart_level(),
            HostCommand::SetLevel(id) => {
                if let Err(e) = self.load_level(id) {
                    warn!("Keeping level {}: {}", self.level.id, e);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Actions and levels
    // -----------------------------------------------------------------------

    /// Queue an action. An idle scheduler starts it right away.
    pub fn enqueue(&mut self, action: Action) {
        self.scheduler.enqueue(action);
        if !self.paused {
            self.advance_scheduler(0.0);
        }
    }

    /// Replace the active level, abandoning any in-flight action.
    pub fn load_level(&mut self, id: u32) -> Result<(), LevelError> {
        let level = Level::build(self.catalog.get(id)?, &self.config.spacing, self.config.rules)?;

        let dropped = self.scheduler.interrupt();
        if dropped > 0 {
            debug!("Level change dropped {} pending action(s)", dropped);
        }

        info!("Loading level {} '{}'", level.id, level.name);
        self.player = Player::spawn(level.spawn, &self.config.spacing);
        self.block_states.clear();
        self.outbox.push(GameEvent::set_data(telemetry::LEVEL_ID, level.id));
        self.outbox
            .push(GameEvent::set_data(telemetry::LEVEL_HASH, level.fingerprint.clone()));
        self.level = level;
        Ok(())
    }

    pub fn restart_level(&mut self) {
        let id = self.level.id;
        if let Err(e) = self.load_level(id) {
            error!("Failed to restart level {}: {}", id, e);
        }
    }

    pub fn pause(&mut self) {
        if !self.paused {
            info!("Game paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("Game resumed");
            self.paused = false;
        }
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Advance the session by `dt` seconds.
    ///
    /// Queued host commands are applied first. While paused, commands are
    /// still applied but simulated time stands still.
    pub fn tick(&mut self, dt: f32) -> TickEvents {
        while let Ok(command) = self.inbox.try_recv() {
            self.submit(command);
        }

        if !self.paused {
            self.frame += 1;
            self.advance_scheduler(dt);
        }

        TickEvents {
            frame: self.frame,
            events: std::mem::take(&mut self.outbox),
            reports: self.scheduler.drain_reports(),
        }
    }

    fn advance_scheduler(&mut self, dt: f32) -> SchedulerState {
        let mut stage = Stage::new(
            &self.level.grid,
            &mut self.block_states,
            &mut self.player,
            self.config.spacing,
            &self.config.motion,
            &self.level.rules,
            &mut self.outbox,
        );
        self.scheduler.tick(&mut stage, dt)
    }
}
