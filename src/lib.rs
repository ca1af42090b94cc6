//! Cubewalk
//!
//! A grid puzzle action engine: a player piece on an integer lattice of
//! blocks, driven by queued actions and choreographed with eased tweens.
//! A host page (or process) talks to it through JSON messages.
//!
//! ## Architecture
//!
//! ```text
//! host  (host.rs | clients/wasm)
//!   └── HostBridge  (bridge.rs, protocol.rs)  ← JSON in / out
//!         └── Game  (game.rs)                 ← level, inbox, outbox
//!               ├── LevelCatalog  (level.rs)
//!               │     └── GridRegistry  (grid.rs)
//!               └── Scheduler  (scheduler.rs) ← one action at a time
//!                     ├── simulate_move  (movement.rs)
//!                     ├── interaction    (interaction.rs)
//!                     └── Choreography   (animation.rs)
//! ```
//!
//! Everything advances from [`Game::tick`]; nothing blocks or sleeps.

pub mod action;
pub mod animation;
pub mod bridge;
pub mod config;
pub mod game;
pub mod grid;
pub mod interaction;
pub mod level;
pub mod movement;
pub mod player;
pub mod protocol;
pub mod scheduler;
pub mod types;

// Headless host requires the `server` feature.
#[cfg(feature = "server")]
pub mod host;

pub use action::{Action, ActionOutcome, ActionReport};
pub use bridge::{BridgeError, HostBridge, HostTransport, MemoryTransport};
pub use config::{ConfigError, GameConfig, RulePolicy};
pub use game::{Game, TickEvents};
pub use grid::{Block, BlockKind, GridRegistry};
pub use level::{LevelCatalog, LevelError};
pub use protocol::{GameEvent, HostCommand};
pub use types::{CellCoord, Direction, GridSpacing, Pose, Vec3};
