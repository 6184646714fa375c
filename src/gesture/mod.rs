//! Gesture debouncing and validation
//!
//! Turns per-frame head and eye symbols into debounced, validated gesture
//! events:
//! - Debounce: each channel must hold a symbol for N frames before leaving it counts
//! - Validation: only recognized departure/arrival pairs become events
//! - Zoom latch: Zoom and Unzoom alternate
//! - Session: Active/Dormant wrapper that publishes events and status

mod debounce;
mod engine;
mod latch;
mod session;
mod stats;
mod symbols;
mod transitions;

pub use engine::Thresholds;
pub use session::{ControlCommand, GestureSession, SessionMode, SessionStatus};
pub use symbols::{EyeSymbol, Event, Frame, HeadSymbol};
