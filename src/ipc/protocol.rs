//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.
//! Subscribed clients additionally receive every `DaemonEvent` as it happens.

use serde::{Deserialize, Serialize};

use crate::gesture::{SessionMode, SessionStatus};

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Requests from a client to the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current daemon status
    GetStatus,

    /// Switch the gesture session between Active and Dormant
    SetMode { mode: SessionMode },

    /// Ping to check connectivity
    Ping,

    /// Subscribe to gesture and mode notifications
    Subscribe,
}

/// Responses from the daemon to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current daemon status
    Status(DaemonStatus),

    /// Mode change was forwarded to the session
    ModeChange { mode: SessionMode },

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Full daemon status snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Daemon version
    pub version: String,

    /// Uptime in seconds
    pub uptime_secs: u64,

    /// Gesture session mode, zoom latch and counters
    pub session: SessionStatus,
}

impl DaemonStatus {
    pub fn new(uptime_secs: u64, session: SessionStatus) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
            session,
        }
    }
}
