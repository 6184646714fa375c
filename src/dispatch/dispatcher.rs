//! Gesture-to-keystroke dispatcher

use std::io::Write;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::events::DaemonEvent;
use crate::gesture::Event;

use super::macros::{KeySequence, Macro, Shortcuts};

/// One dispatched macro
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub event: Event,
    pub frame: u64,
    #[serde(rename = "macro")]
    pub action: Macro,
    pub keys: KeySequence,
}

/// Receives key sequences to execute
pub trait KeystrokeSink {
    fn execute(&mut self, record: &DispatchRecord) -> std::io::Result<()>;
}

/// Writes each dispatch as a JSON line for an external keystroke injector
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> KeystrokeSink for JsonLinesSink<W> {
    fn execute(&mut self, record: &DispatchRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Turns accepted gestures into macro executions
pub struct Dispatcher<S> {
    shortcuts: Shortcuts,
    sink: S,
}

impl<S: KeystrokeSink> Dispatcher<S> {
    pub fn new(shortcuts: Shortcuts, sink: S) -> Self {
        Self { shortcuts, sink }
    }

    /// Resolve the macro for a gesture
    pub fn resolve(&self, event: Event, frame: u64) -> DispatchRecord {
        let action = Macro::for_event(event);
        DispatchRecord {
            event,
            frame,
            action,
            keys: self.shortcuts.key_sequence(action),
        }
    }

    /// Dispatch a single daemon event. Mode changes are ignored.
    pub fn handle(&mut self, event: &DaemonEvent) -> std::io::Result<()> {
        let DaemonEvent::Gesture { event, frame } = *event else {
            return Ok(());
        };

        let record = self.resolve(event, frame);
        info!(
            gesture = %event,
            action = record.action.shortcut_name(),
            keys = %record.keys.press.join("+"),
            "dispatching macro"
        );
        self.sink.execute(&record)
    }

    /// Dispatch events until the session's channel closes
    pub async fn run(&mut self, mut event_rx: broadcast::Receiver<DaemonEvent>) {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event) {
                        error!(?e, "failed to dispatch macro");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "dispatcher lagged, gestures dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("event channel closed");
                    break;
                }
            }
        }
    }

    #[cfg(test)]
    pub fn into_sink(self) -> S {
        self.sink
    }
}
