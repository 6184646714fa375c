//! Zoom/unzoom toggle

use tracing::debug;

use super::symbols::Event;

/// Turns the Zoom/Unzoom pose pair into an edge-triggered toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoomLatch {
    zoomed: bool,
}

impl ZoomLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    /// Returns whether `event` may be emitted, flipping the latch if it is
    /// an admitted Zoom or Unzoom.
    pub fn admit(&mut self, event: Event) -> bool {
        if !event.is_zoom_family() {
            return true;
        }

        let target = event == Event::Zoom;

        if self.zoomed == target {
            debug!(%event, zoomed = self.zoomed, "redundant zoom toggle suppressed");
            return false;
        }

        self.zoomed = target;
        true
    }
}
