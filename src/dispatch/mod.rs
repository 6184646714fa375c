//! Macro dispatch for accepted gestures
//!
//! Maps each gesture to a desktop macro and its key chord, and hands the
//! resulting key sequence to a sink. Injecting the keystrokes into the OS is
//! left to whatever consumes the sink's output.

mod dispatcher;
mod macros;

pub use dispatcher::{Dispatcher, JsonLinesSink};
pub use macros::Shortcuts;
