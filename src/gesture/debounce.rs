//! Per-channel debouncing
//!
//! A channel is "stable" on the frame its symbol changes, provided the run
//! it is leaving lasted at least the channel's required number of frames.

use std::num::NonZeroU32;

use super::symbols::ChannelSymbol;

/// Debounce bookkeeping for one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState<S> {
    previous_symbol: S,
    /// Frames in the current run of `previous_symbol`
    repeat_count: u32,
}

impl<S: ChannelSymbol> ChannelState<S> {
    /// Start at the rest symbol with no frames seen
    pub fn new() -> Self {
        Self {
            previous_symbol: S::REST,
            repeat_count: 0,
        }
    }

    /// Symbol observed on the previous frame
    pub fn previous_symbol(&self) -> S {
        self.previous_symbol
    }

    #[cfg(test)]
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Feed one observation. Returns true when the symbol changed away from a
    /// run of at least `required_frames`.
    pub fn advance(&mut self, observed: S, required_frames: NonZeroU32) -> bool {
        if observed == self.previous_symbol {
            self.repeat_count = self.repeat_count.saturating_add(1);
            return false;
        }

        let run_length = self.repeat_count;
        self.previous_symbol = observed;
        // Counting the changing frame as the first of the new run is what
        // lets the wink and Zoom-then-Center scenarios emit on their last frame
        self.repeat_count = 1;

        run_length >= required_frames.get()
    }

    /// Track the observation without evaluating stability
    pub fn suspend(&mut self, observed: S) {
        self.previous_symbol = observed;
        self.repeat_count = 0;
    }

    /// Discard the in-flight run
    pub fn reset_count(&mut self) {
        self.repeat_count = 0;
    }
}

impl<S: ChannelSymbol> Default for ChannelState<S> {
    fn default() -> Self {
        Self::new()
    }
}
