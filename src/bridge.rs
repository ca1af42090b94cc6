//! Host bridge – the seam between the game and whatever hosts it.
//!
//! ## Transport contract
//!
//! | Call        | Direction     | Semantics                                      |
//! |-------------|---------------|------------------------------------------------|
//! | `attach()`  | –             | Hook up the inbound listener; fails if absent  |
//! | `post(json)`| game → host   | One-way call-out, no reply                     |
//! | `receive()` | host → game   | Single inbound entry point, never fails the bridge |
//!
//! Transports: stdout JSON lines (headless host), a JS callback (wasm
//! client) and [`MemoryTransport`] for tests and offline runs.

use crate::protocol::{self, GameEvent, HostCommand};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("message has no string `action` field")]
    MissingAction,
    #[error("host unavailable: {0}")]
    Unavailable(String),
    #[error("failed to post message: {0}")]
    Post(String),
}

/// Delivery mechanism for outbound JSON.
pub trait HostTransport {
    /// Connect to the host. An error means the game runs without a host.
    fn attach(&mut self) -> Result<(), BridgeError>;

    /// Deliver one serialized outbound message.
    fn post(&self, json: &str) -> Result<(), BridgeError>;
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

pub struct HostBridge<T: HostTransport> {
    transport: T,
}

impl<T: HostTransport> HostBridge<T> {
    /// Attach `transport` and announce `ready`.
    pub fn attach(mut transport: T) -> Result<Self, BridgeError> {
        transport.attach()?;
        let bridge = Self { transport };
        bridge.publish(&GameEvent::Ready)?;
        Ok(bridge)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn publish(&self, event: &GameEvent) -> Result<(), BridgeError> {
        let json = event.to_message().to_json()?;
        debug!("→ host {}", json);
        self.transport.post(&json)
    }

    /// Publish every event. Failures are logged and swallowed – a single
    /// failed post should not stop the game loop.
    pub fn publish_all<'e>(&self, events: impl IntoIterator<Item = &'e GameEvent>) {
        for event in events {
            if let Err(e) = self.publish(event) {
                warn!("Failed to publish {:?}: {}", event, e);
            }
        }
    }

    /// Inbound entry point. Bad messages are reported and dropped.
    pub fn receive(&self, raw: &str) -> Option<HostCommand> {
        receive(raw)
    }
}

/// Decode one inbound message, logging and dropping it if it is bad.
pub fn receive(raw: &str) -> Option<HostCommand> {
    debug!("← host {}", raw);
    match protocol::decode(raw) {
        Ok(command) => command,
        Err(e) => {
            warn!("Dropping host message: {}", e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory transport
// ---------------------------------------------------------------------------

/// Records outbound JSON in memory. Clones share the same log.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    sent: Rc<RefCell<Vec<String>>>,
    available: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            sent: Rc::new(RefCell::new(Vec::new())),
            available: true,
        }
    }

    /// A transport whose `attach` fails, as when no host page is present.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTransport for MemoryTransport {
    fn attach(&mut self) -> Result<(), BridgeError> {
        if self.available {
            Ok(())
        } else {
            Err(BridgeError::Unavailable("no host listener".into()))
        }
    }

    fn post(&self, json: &str) -> Result<(), BridgeError> {
        self.sent.borrow_mut().push(json.to_string());
        Ok(())
    }
}
