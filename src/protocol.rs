//! Host message protocol.
//!
//! This module owns **every message that crosses the bridge** between the
//! game and the page (or process) hosting it.
//!
//! ## Envelope
//!
//! | Direction      | Shape                                            |
//! |----------------|--------------------------------------------------|
//! | host → game    | `{ "action": string, "args": { key: value } }`  |
//! | game → host    | `{ "action": string, "args": object \| null }`  |
//!
//! ## Inbound actions
//!
//! | Action                            | Args                                    |
//! |-----------------------------------|-----------------------------------------|
//! | `forward` `back` `left` `right`   | `distance` (int, 1), `speed` (float, 1) |
//! | `turn_left` `turn_right`          | –                                       |
//! | `interact`                        | –                                       |
//! | `setLevel`                        | `levelId` (int)                         |
//! | `restartLevel`                    | –                                       |
//!
//! Arg values may arrive as JSON strings or numbers. Bad values fall back to
//! their defaults with a warning; unknown actions are ignored.
//!
//! ## Outbound actions
//!
//! `ready` (once, after the bridge attaches), `setData` (telemetry),
//! `levelPass` (on a win, args `null`).

use crate::action::{Action, Heading, Turn};
use crate::bridge::BridgeError;
use crate::types::RelativeDirection;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// All action names used by the protocol, as constants.
pub mod actions {
    pub const FORWARD: &str = "forward";
    pub const BACK: &str = "back";
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const TURN_LEFT: &str = "turn_left";
    pub const TURN_RIGHT: &str = "turn_right";
    pub const INTERACT: &str = "interact";
    pub const SET_LEVEL: &str = "setLevel";
    pub const RESTART_LEVEL: &str = "restartLevel";

    pub const READY: &str = "ready";
    pub const SET_DATA: &str = "setData";
    pub const LEVEL_PASS: &str = "levelPass";
}

const DEFAULT_DISTANCE: u32 = 1;
const DEFAULT_SPEED: f32 = 1.0;

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Game → host envelope. `args` serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub action: String,
    pub args: Option<Value>,
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events the game reports to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Ready,
    /// Telemetry value; `kind` is the host-facing type tag.
    SetData {
        name: String,
        value: Value,
        kind: String,
    },
    LevelPass,
}

impl GameEvent {
    /// Telemetry event with the type tag derived from `value`.
    pub fn set_data(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        let kind = match &value {
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "int",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Null => "null",
            Value::Array(_) | Value::Object(_) => "json",
        };
        GameEvent::SetData {
            name: name.into(),
            value,
            kind: kind.to_string(),
        }
    }

    pub fn to_message(&self) -> OutboundMessage {
        match self {
            GameEvent::Ready => OutboundMessage {
                action: actions::READY.into(),
                args: None,
            },
            GameEvent::SetData { name, value, kind } => OutboundMessage {
                action: actions::SET_DATA.into(),
                args: Some(serde_json::json!({
                    "variableName": name,
                    "variableValue": value,
                    "variableType": kind,
                })),
            },
            GameEvent::LevelPass => OutboundMessage {
                action: actions::LEVEL_PASS.into(),
                args: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// What an inbound message asks the game to do.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Enqueue(Action),
    SetLevel(u32),
    RestartLevel,
}

/// Host → game envelope after framing checks.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub action: String,
    pub args: Map<String, Value>,
}

impl InboundMessage {
    /// Parse the envelope. Fails on bad JSON or a missing/non-string
    /// `action`; a non-object `args` is dropped with a warning.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(mut object) = value else {
            return Err(BridgeError::MissingAction);
        };

        let action = match object.remove("action") {
            Some(Value::String(action)) => action,
            _ => return Err(BridgeError::MissingAction),
        };

        let args = match object.remove("args") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(args)) => args,
            Some(other) => {
                warn!("Ignoring non-object args for '{}': {}", action, other);
                Map::new()
            }
        };

        Ok(Self { action, args })
    }

    /// Map the message onto a game command. Unknown actions yield `None`.
    pub fn into_command(self) -> Option<HostCommand> {
        let relative = match self.action.as_str() {
            actions::FORWARD => Some(RelativeDirection::Forward),
            actions::BACK => Some(RelativeDirection::Back),
            actions::LEFT => Some(RelativeDirection::Left),
            actions::RIGHT => Some(RelativeDirection::Right),
            _ => None,
        };

        if let Some(relative) = relative {
            return Some(HostCommand::Enqueue(Action::Move {
                heading: Heading::Relative(relative),
                distance: distance_arg(&self.args),
                speed: speed_arg(&self.args),
            }));
        }

        match self.action.as_str() {
            actions::TURN_LEFT => Some(HostCommand::Enqueue(Action::turn(Turn::Left))),
            actions::TURN_RIGHT => Some(HostCommand::Enqueue(Action::turn(Turn::Right))),
            actions::INTERACT => Some(HostCommand::Enqueue(Action::Interact)),
            actions::RESTART_LEVEL => Some(HostCommand::RestartLevel),
            actions::SET_LEVEL => match arg_number(&self.args, "levelId").and_then(as_whole) {
                Some(id) => Some(HostCommand::SetLevel(id)),
                None => {
                    warn!("setLevel without a valid levelId, restarting current level");
                    Some(HostCommand::RestartLevel)
                }
            },
            other => {
                warn!("Ignoring unknown host action '{}'", other);
                None
            }
        }
    }
}

/// Parse and map a raw inbound message in one go.
pub fn decode(raw: &str) -> Result<Option<HostCommand>, BridgeError> {
    Ok(InboundMessage::parse(raw)?.into_command())
}

// ---------------------------------------------------------------------------
// Arg helpers
// ---------------------------------------------------------------------------

/// Numeric value of `key`, accepting numbers and numeric strings.
fn arg_number(args: &Map<String, Value>, key: &str) -> Option<f64> {
    match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_whole(n: f64) -> Option<u32> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64).then_some(n as u32)
}

fn distance_arg(args: &Map<String, Value>) -> u32 {
    if !args.contains_key("distance") {
        return DEFAULT_DISTANCE;
    }
    match arg_number(args, "distance").and_then(as_whole) {
        Some(d) => d,
        None => {
            warn!(
                "Invalid distance {:?}, using {}",
                args.get("distance"),
                DEFAULT_DISTANCE
            );
            DEFAULT_DISTANCE
        }
    }
}

fn speed_arg(args: &Map<String, Value>) -> f32 {
    if !args.contains_key("speed") {
        return DEFAULT_SPEED;
    }
    match arg_number(args, "speed") {
        Some(s) if s.is_finite() && s > 0.0 => s as f32,
        _ => {
            warn!(
                "Invalid speed {:?}, using {}",
                args.get("speed"),
                DEFAULT_SPEED
            );
            DEFAULT_SPEED
        }
    }
}
