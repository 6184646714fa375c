//! Gesture debouncing and validation engine
//!
//! Called once per frame with both channels' raw symbols. Debounces each
//! channel, arbitrates between them (head wins ties), validates the winning
//! transition and passes it through the zoom latch. Emits at most one event
//! per frame.

use std::num::NonZeroU32;

use tracing::{debug, trace};

use super::debounce::ChannelState;
use super::latch::ZoomLatch;
use super::symbols::{ChannelSymbol, EyeSymbol, Event, Frame, HeadSymbol};
use super::transitions::TransitionTable;

const DEFAULT_FRAMES: NonZeroU32 = match NonZeroU32::new(2) {
    Some(frames) => frames,
    None => unreachable!(),
};

/// Consecutive-frame thresholds for each channel. A zero threshold would
/// make the first frame of a run stable, so both are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub head_frames: NonZeroU32,
    pub eye_frames: NonZeroU32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            head_frames: DEFAULT_FRAMES,
            eye_frames: DEFAULT_FRAMES,
        }
    }
}

/// Engine state for one capture session
#[derive(Debug, Clone)]
pub struct GestureEngine<'t> {
    table: &'t TransitionTable,
    thresholds: Thresholds,
    head: ChannelState<HeadSymbol>,
    eye: ChannelState<EyeSymbol>,
    latch: ZoomLatch,
}

impl<'t> GestureEngine<'t> {
    pub fn new(table: &'t TransitionTable, thresholds: Thresholds) -> Self {
        Self {
            table,
            thresholds,
            head: ChannelState::new(),
            eye: ChannelState::new(),
            latch: ZoomLatch::new(),
        }
    }

    #[cfg(test)]
    pub fn head(&self) -> &ChannelState<HeadSymbol> {
        &self.head
    }

    #[cfg(test)]
    pub fn eye(&self) -> &ChannelState<EyeSymbol> {
        &self.eye
    }

    pub fn is_zoomed(&self) -> bool {
        self.latch.is_zoomed()
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Process one frame, returning the validated event if any
    pub fn step(&mut self, head: HeadSymbol, eye: EyeSymbol) -> Option<Event> {
        let event = self.observe(head, eye)?;

        if self.latch.admit(event) {
            debug!(%event, zoomed = self.latch.is_zoomed(), "gesture accepted");
            Some(event)
        } else {
            None
        }
    }

    pub fn step_frame(&mut self, frame: Frame) -> Option<Event> {
        self.step(frame.head, frame.eye)
    }

    /// Debounce, arbitrate and validate one frame without consulting the
    /// zoom latch. Channel bookkeeping is always committed.
    pub fn observe(&mut self, head: HeadSymbol, eye: EyeSymbol) -> Option<Event> {
        let head_prev = self.head.previous_symbol();
        let eye_prev = self.eye.previous_symbol();

        // Blinks are not interpreted while the head is away from rest
        let eye_stable = if head_prev == HeadSymbol::REST {
            self.eye.advance(eye, self.thresholds.eye_frames)
        } else {
            self.eye.suspend(eye);
            false
        };
        let head_stable = self.head.advance(head, self.thresholds.head_frames);

        if head_stable {
            self.eye.reset_count();
            let candidate = self.table.head.validate(head_prev, head);
            trace!(from = ?head_prev, to = ?head, ?candidate, "head transition");
            candidate
        } else if eye_stable {
            self.head.reset_count();
            let candidate = self.table.eye.validate(eye_prev, eye);
            trace!(from = ?eye_prev, to = ?eye, ?candidate, "eye transition");
            candidate
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::symbols::EyeSymbol::*;
    use crate::gesture::symbols::HeadSymbol::*;

    fn new_engine(head_frames: u32, eye_frames: u32) -> GestureEngine<'static> {
        let thresholds = Thresholds {
            head_frames: NonZeroU32::new(head_frames).unwrap(),
            eye_frames: NonZeroU32::new(eye_frames).unwrap(),
        };
        GestureEngine::new(TransitionTable::standard(), thresholds)
    }

    fn run_head(engine: &mut GestureEngine<'_>, symbols: &[HeadSymbol]) -> Vec<Option<Event>> {
        symbols.iter().map(|&h| engine.step(h, BothOpen)).collect()
    }

    fn run_eye(engine: &mut GestureEngine<'_>, symbols: &[EyeSymbol]) -> Vec<Option<Event>> {
        symbols.iter().map(|&e| engine.step(Center, e)).collect()
    }

    #[test]
    fn test_initial_state() {
        let engine = new_engine(2, 2);
        assert_eq!(engine.head().previous_symbol(), Center);
        assert_eq!(engine.eye().previous_symbol(), BothOpen);
        assert_eq!(engine.head().repeat_count(), 0);
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn test_center_to_left_is_not_a_gesture() {
        let mut engine = new_engine(2, 2);
        let events = run_head(&mut engine, &[Center, Center, Left, Left, Left]);
        assert_eq!(events, vec![None; 5]);
        assert_eq!(engine.head().previous_symbol(), Left);
        assert_eq!(engine.head().repeat_count(), 3);
    }

    #[test]
    fn test_left_turn_returning_to_center() {
        let mut engine = new_engine(2, 2);
        let events = run_head(&mut engine, &[Left, Left, Center]);
        assert_eq!(events, vec![None, None, Some(Event::Left)]);
    }

    #[test]
    fn test_left_wink() {
        let mut engine = new_engine(2, 3);
        let events = run_eye(&mut engine, &[BothOpen, LeftClosed, LeftClosed, LeftClosed, BothOpen]);
        assert_eq!(events, vec![None, None, None, None, Some(Event::LeftWink)]);
    }

    #[test]
    fn test_short_run_never_emits() {
        let mut engine = new_engine(2, 3);
        let events = run_eye(&mut engine, &[LeftClosed, LeftClosed, BothOpen, BothOpen]);
        assert_eq!(events, vec![None; 4]);

        let mut engine = new_engine(3, 2);
        let events = run_head(&mut engine, &[Up, Up, Center, Center]);
        assert_eq!(events, vec![None; 4]);
    }

    #[test]
    fn test_zoom_unzoom_cycle() {
        let mut engine = new_engine(2, 2);
        let events = run_head(&mut engine, &[Center, Center, Zoom, Zoom, Center, Center, Zoom]);
        assert_eq!(
            events,
            vec![
                None,
                None,
                Some(Event::Zoom),
                None,
                Some(Event::Unzoom),
                None,
                // Unzoom re-armed the latch
                Some(Event::Zoom),
            ]
        );
        assert!(engine.is_zoomed());
    }

    #[test]
    fn test_zoom_emitted_once_without_unzoom() {
        let mut engine = new_engine(2, 2);
        // The single Zoom frame before returning to Center is too short to
        // count as Unzoom, so the second Center->Zoom is a duplicate.
        let events = run_head(&mut engine, &[Center, Center, Zoom, Center, Center, Zoom]);
        assert_eq!(events, vec![None, None, Some(Event::Zoom), None, None, None]);
        assert!(engine.is_zoomed());

        let events = run_head(&mut engine, &[Zoom, Center]);
        assert_eq!(events, vec![None, Some(Event::Unzoom)]);
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn test_unzoom_suppressed_before_zoom() {
        let mut engine = new_engine(2, 2);
        let events = run_head(&mut engine, &[Zoom, Zoom, Center]);
        assert_eq!(events, vec![None, None, None]);
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn test_eye_suspended_while_head_turned() {
        let mut engine = new_engine(2, 2);
        engine.step(Left, BothOpen);
        for eye in [BothClosed, BothClosed, BothClosed, BothOpen] {
            assert_eq!(engine.step(Left, eye), None);
            assert_eq!(engine.eye().repeat_count(), 0);
            assert_eq!(engine.eye().previous_symbol(), eye);
        }
    }

    #[test]
    fn test_eye_gesture_requires_head_at_rest() {
        let eye_run = [BothClosed, BothClosed, BothClosed, BothOpen];

        let mut turned = new_engine(2, 2);
        turned.step(Down, BothOpen);
        for eye in eye_run {
            assert_eq!(turned.step(Down, eye), None);
        }

        let mut resting = new_engine(2, 2);
        resting.step(Center, BothOpen);
        let events: Vec<_> = eye_run.iter().map(|&e| resting.step(Center, e)).collect();
        assert_eq!(events, vec![None, None, None, Some(Event::BothBlink)]);
    }

    #[test]
    fn test_head_wins_simultaneous_transition() {
        let mut engine = new_engine(2, 2);
        assert_eq!(engine.step(Center, RightClosed), None);
        assert_eq!(engine.step(Center, RightClosed), None);
        assert_eq!(engine.eye().repeat_count(), 2);

        // Both channels leave a full run on the same frame
        assert_eq!(engine.step(Zoom, BothOpen), Some(Event::Zoom));
        assert_eq!(engine.eye().previous_symbol(), BothOpen);
        assert_eq!(engine.eye().repeat_count(), 0);

        // The discarded eye run does not carry over once the head is back
        assert_eq!(engine.step(Center, BothOpen), None);
        assert_eq!(engine.step(Center, RightClosed), None);
        assert_eq!(engine.eye().repeat_count(), 1);
    }

    #[test]
    fn test_eye_transition_resets_head_count() {
        let mut engine = new_engine(2, 2);
        engine.step(Center, LeftClosed);
        engine.step(Center, LeftClosed);
        assert_eq!(engine.step(Center, BothOpen), Some(Event::LeftWink));
        assert_eq!(engine.head().repeat_count(), 0);
    }

    #[test]
    fn test_suppression_keeps_bookkeeping() {
        let mut engine = new_engine(2, 2);
        run_head(&mut engine, &[Zoom, Zoom]);
        assert_eq!(engine.step(Center, BothOpen), None);
        assert_eq!(engine.head().previous_symbol(), Center);
        assert_eq!(engine.head().repeat_count(), 1);
    }

    #[test]
    fn test_observe_skips_latch() {
        let mut engine = new_engine(2, 2);
        run_head(&mut engine, &[Zoom, Zoom]);
        assert_eq!(engine.observe(Center, BothOpen), Some(Event::Unzoom));
        assert!(!engine.is_zoomed());
    }

    #[test]
    fn test_single_frame_threshold() {
        let mut engine = new_engine(1, 1);
        // The first Left frame leaves a Center run of zero frames
        let events = run_head(&mut engine, &[Left, Left, Center]);
        assert_eq!(events, vec![None, None, Some(Event::Left)]);

        let events = run_eye(&mut engine, &[RightClosed, BothOpen]);
        assert_eq!(events, vec![None, Some(Event::RightWink)]);
    }
}
