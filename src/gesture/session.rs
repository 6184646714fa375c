//! Capture session driving the gesture engine
//!
//! Wraps the engine with an explicit Active/Dormant mode, keeps counters,
//! and publishes accepted gestures and status to the rest of the daemon.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info};

use crate::events::DaemonEvent;
use crate::source::SourceEvent;

use super::engine::{GestureEngine, Thresholds};
use super::stats::GestureStats;
use super::symbols::{Event, Frame};
use super::transitions::TransitionTable;

/// Gesture that wakes a dormant session
pub const WAKE_GESTURE: Event = Event::BothBlink;

/// Whether accepted gestures are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Gestures are latched and dispatched
    Active,
    /// Only the wake gesture is recognized
    Dormant,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionMode::Active => write!(f, "Active"),
            SessionMode::Dormant => write!(f, "Dormant"),
        }
    }
}

/// Snapshot of the session published after every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub mode: SessionMode,
    pub zoomed: bool,
    pub stats: GestureStats,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            mode: SessionMode::Active,
            zoomed: false,
            stats: GestureStats::default(),
        }
    }
}

/// Commands sent to a running session from outside the capture loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    SetMode(SessionMode),
}

pub struct GestureSession {
    engine: GestureEngine<'static>,
    mode: SessionMode,
    stats: GestureStats,
    /// Channel for accepted gestures and mode changes
    event_tx: broadcast::Sender<DaemonEvent>,
    status_tx: watch::Sender<SessionStatus>,
}

impl GestureSession {
    /// Create a session. With `require_wake` it starts Dormant.
    pub fn new(
        thresholds: Thresholds,
        require_wake: bool,
        event_tx: broadcast::Sender<DaemonEvent>,
        status_tx: watch::Sender<SessionStatus>,
    ) -> Self {
        let mode = if require_wake {
            SessionMode::Dormant
        } else {
            SessionMode::Active
        };

        let session = Self {
            engine: GestureEngine::new(TransitionTable::standard(), thresholds),
            mode,
            stats: GestureStats::default(),
            event_tx,
            status_tx,
        };
        session.publish_status();
        session
    }

    #[cfg(test)]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.mode,
            zoomed: self.engine.is_zoomed(),
            stats: self.stats.clone(),
        }
    }

    /// Run the session until the symbol source closes
    pub async fn run(
        &mut self,
        mut source_rx: mpsc::Receiver<SourceEvent>,
        mut control_rx: mpsc::Receiver<ControlCommand>,
    ) {
        let thresholds = self.engine.thresholds();
        info!(
            mode = %self.mode,
            head_frames = thresholds.head_frames.get(),
            eye_frames = thresholds.eye_frames.get(),
            "gesture session started"
        );

        loop {
            tokio::select! {
                Some(command) = control_rx.recv() => {
                    match command {
                        ControlCommand::SetMode(mode) => self.set_mode(mode),
                    }
                }
                source_event = source_rx.recv() => {
                    match source_event {
                        Some(SourceEvent::Frame(frame)) => {
                            self.handle_frame(frame);
                        }
                        Some(SourceEvent::NoFace) => self.handle_skip(),
                        None => break,
                    }
                }
            }
        }

        info!(
            frames = self.stats.frames,
            skipped = self.stats.skipped_frames,
            gestures = self.stats.emitted_total(),
            "gesture session stopped"
        );
    }

    /// Process one frame of observations
    pub fn handle_frame(&mut self, frame: Frame) -> Option<Event> {
        self.stats.record_frame(frame);

        let emitted = match self.mode {
            SessionMode::Active => self.engine.step_frame(frame),
            SessionMode::Dormant => {
                // The latch stays untouched so it only reflects dispatched zooms
                if self.engine.observe(frame.head, frame.eye) == Some(WAKE_GESTURE) {
                    info!(gesture = %WAKE_GESTURE, "wake gesture recognized");
                    self.set_mode(SessionMode::Active);
                }
                None
            }
        };

        if let Some(event) = emitted {
            self.stats.record_event(event);
            self.emit(DaemonEvent::Gesture {
                event,
                frame: self.stats.frames,
            });
        }

        self.publish_status();
        emitted
    }

    /// Account for a frame in which no face was found
    pub fn handle_skip(&mut self) {
        self.stats.record_skip();
        self.publish_status();
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        let previous = self.mode;
        if previous == mode {
            return;
        }

        info!(from = %previous, to = %mode, "session mode changed");
        self.mode = mode;
        self.emit(DaemonEvent::ModeChanged { mode, previous });
        self.publish_status();
    }

    fn emit(&self, event: DaemonEvent) {
        debug!(?event, "emitting daemon event");
        let _ = self.event_tx.send(event);
    }

    fn publish_status(&self) {
        self.status_tx.send_replace(self.status());
    }
}
