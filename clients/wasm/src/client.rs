//! `CubewalkGame` – the primary wasm-bindgen export.
//!
//! ## JavaScript usage
//!
//! ```js
//! import init, { CubewalkGame } from './pkg/cubewalk_wasm.js';
//!
//! await init();
//!
//! const game = new CubewalkGame(null, 1);
//! game.attach((json) => window.parent.postMessage(JSON.parse(json), '*'));
//!
//! window.addEventListener('message', (e) => game.receive(JSON.stringify(e.data)));
//!
//! let last = performance.now();
//! function frame(now) {
//!   game.tick((now - last) / 1000);
//!   last = now;
//!   const [x, y, z, yaw] = game.playerPose();
//!   drawPlayer(x, y, z, yaw);
//!   requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

use cubewalk::bridge::{self, HostBridge};
use cubewalk::config::GameConfig;
use cubewalk::game::Game;
use cubewalk::level::LevelCatalog;
use wasm_bindgen::prelude::*;

use crate::transport::JsTransport;

// ---------------------------------------------------------------------------
// CubewalkGame
// ---------------------------------------------------------------------------

/// Instantiate with `new CubewalkGame(levelsJson | null, startLevel | null)`,
/// call `attach(callback)` once, then `tick(dt)` every animation frame.
#[wasm_bindgen]
pub struct CubewalkGame {
    game: Game,
    bridge: Option<HostBridge<JsTransport>>,
}

#[wasm_bindgen]
impl CubewalkGame {
    /// @param levelsJson - JSON array of level definitions, or `null` for the built-in set
    /// @param startLevel - level to start on, or `null` for the default
    #[wasm_bindgen(constructor)]
    pub fn new(levels_json: Option<String>, start_level: Option<u32>) -> Result<CubewalkGame, JsValue> {
        let catalog = match levels_json {
            Some(json) => LevelCatalog::from_json_str(&json).map_err(to_js)?,
            None => LevelCatalog::builtin(),
        };

        let mut config = GameConfig::default();
        if let Some(level) = start_level {
            config.start_level = level;
        }

        let game = Game::new(config, catalog).map_err(to_js)?;
        Ok(Self { game, bridge: None })
    }

    /// Attach the outbound callback, `callback(json: string)`.
    ///
    /// Sends `ready` on success. Without a browser window the game stays
    /// paused; call `resume()` to play offline.
    #[wasm_bindgen]
    pub fn attach(&mut self, callback: js_sys::Function) -> bool {
        if self.bridge.is_some() {
            return true;
        }
        self.bridge = self.game.connect(JsTransport::new(callback));
        self.bridge.is_some()
    }

    /// Single inbound entry point for host messages. Bad messages are
    /// logged and dropped.
    #[wasm_bindgen]
    pub fn receive(&mut self, json: &str) {
        if let Some(command) = bridge::receive(json) {
            self.game.submit(command);
        }
    }

    /// Advance by `dt` seconds and deliver any outbound messages.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f32) {
        let tick = self.game.tick(dt);
        if let Some(bridge) = &self.bridge {
            bridge.publish_all(&tick.events);
        }
        for report in &tick.reports {
            log::debug!("#{} {} → {:?}", report.seq, report.action.label(), report.outcome);
        }
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.game.pause();
    }

    #[wasm_bindgen]
    pub fn resume(&mut self) {
        self.game.resume();
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.game.is_paused()
    }

    // -----------------------------------------------------------------------
    // Render queries
    // -----------------------------------------------------------------------

    /// `[x, y, z, yaw]` of the player piece.
    #[wasm_bindgen(js_name = playerPose)]
    pub fn player_pose(&self) -> Vec<f32> {
        let pose = self.game.player().pose;
        vec![pose.position.x, pose.position.y, pose.position.z, pose.yaw]
    }

    /// `[{ cell, kind, position, activated }]` of every block in the level.
    #[wasm_bindgen(js_name = blocksJson)]
    pub fn blocks_json(&self) -> Result<String, JsValue> {
        let blocks: Vec<_> = self
            .game
            .grid()
            .blocks()
            .map(|b| {
                serde_json::json!({
                    "cell": b.cell,
                    "kind": b.kind,
                    "position": b.position,
                    "activated": self.game.block_states().is_activated(b.cell),
                })
            })
            .collect();
        serde_json::to_string(&blocks).map_err(to_js)
    }

    #[wasm_bindgen(js_name = levelId)]
    pub fn level_id(&self) -> u32 {
        self.game.level().id
    }

    #[wasm_bindgen(js_name = pendingActions)]
    pub fn pending_actions(&self) -> u32 {
        u32::try_from(self.game.scheduler().pending()).unwrap_or(u32::MAX)
    }

    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.stats()).map_err(to_js)
    }
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
