//! Per-session counters

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::symbols::{EyeSymbol, Event, Frame, HeadSymbol};

/// Counts of observed symbols and emitted events for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureStats {
    /// Frames handed to the engine
    pub frames: u64,
    /// Frames dropped because no face was found
    pub skipped_frames: u64,
    pub head_observed: HashMap<HeadSymbol, u64>,
    pub eye_observed: HashMap<EyeSymbol, u64>,
    pub emitted: HashMap<Event, u64>,
}

impl GestureStats {
    pub fn record_frame(&mut self, frame: Frame) {
        self.frames += 1;
        *self.head_observed.entry(frame.head).or_default() += 1;
        *self.eye_observed.entry(frame.eye).or_default() += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_frames += 1;
    }

    pub fn record_event(&mut self, event: Event) {
        *self.emitted.entry(event).or_default() += 1;
    }

    pub fn emitted_total(&self) -> u64 {
        self.emitted.values().sum()
    }
}
