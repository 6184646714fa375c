//! Recognized departure/arrival transitions

use std::collections::HashMap;
use std::sync::OnceLock;

use super::symbols::{ChannelSymbol, EyeSymbol, Event, HeadSymbol};

/// Arrivals accepted after one departure symbol, and the event they yield
#[derive(Debug, Clone)]
struct Transition<S> {
    arrivals: Vec<S>,
    event: Event,
}

/// Transitions for a single channel, keyed by departure symbol
#[derive(Debug, Clone)]
pub struct TransitionSet<S> {
    entries: HashMap<S, Transition<S>>,
}

impl<S: ChannelSymbol> TransitionSet<S> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn with(mut self, departure: S, arrivals: &[S], event: Event) -> Self {
        self.entries.insert(
            departure,
            Transition {
                arrivals: arrivals.to_vec(),
                event,
            },
        );
        self
    }

    /// Look up the event for a debounced transition, if it is a gesture
    pub fn validate(&self, departure: S, arrival: S) -> Option<Event> {
        let transition = self.entries.get(&departure)?;
        if transition.arrivals.contains(&arrival) {
            Some(transition.event)
        } else {
            None
        }
    }
}

/// All recognized transitions, one set per channel
#[derive(Debug, Clone)]
pub struct TransitionTable {
    pub head: TransitionSet<HeadSymbol>,
    pub eye: TransitionSet<EyeSymbol>,
}

impl TransitionTable {
    /// The process-wide table, built on first use
    pub fn standard() -> &'static TransitionTable {
        static TABLE: OnceLock<TransitionTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        use crate::gesture::symbols::EyeSymbol::*;
        use crate::gesture::symbols::HeadSymbol::*;

        let head_return = [Center, Zoom];

        Self {
            head: TransitionSet::new()
                .with(Left, &head_return, Event::Left)
                .with(Right, &head_return, Event::Right)
                .with(Up, &head_return, Event::Up)
                .with(Down, &head_return, Event::Down)
                .with(Center, &[Zoom], Event::Zoom)
                .with(Zoom, &[Center], Event::Unzoom),
            eye: TransitionSet::new()
                .with(LeftClosed, &[BothOpen], Event::LeftWink)
                .with(RightClosed, &[BothOpen], Event::RightWink)
                .with(BothClosed, &[BothOpen], Event::BothBlink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_transitions() {
        let table = TransitionTable::standard();
        assert_eq!(
            table.eye.validate(EyeSymbol::LeftClosed, EyeSymbol::BothOpen),
            Some(Event::LeftWink)
        );
        assert_eq!(
            table.eye.validate(EyeSymbol::RightClosed, EyeSymbol::BothOpen),
            Some(Event::RightWink)
        );
        assert_eq!(
            table.eye.validate(EyeSymbol::BothClosed, EyeSymbol::BothOpen),
            Some(Event::BothBlink)
        );
    }

    #[test]
    fn test_head_transitions() {
        let table = TransitionTable::standard();
        for (departure, event) in [
            (HeadSymbol::Left, Event::Left),
            (HeadSymbol::Right, Event::Right),
            (HeadSymbol::Up, Event::Up),
            (HeadSymbol::Down, Event::Down),
        ] {
            assert_eq!(table.head.validate(departure, HeadSymbol::Center), Some(event));
            assert_eq!(table.head.validate(departure, HeadSymbol::Zoom), Some(event));
        }
        assert_eq!(
            table.head.validate(HeadSymbol::Center, HeadSymbol::Zoom),
            Some(Event::Zoom)
        );
        assert_eq!(
            table.head.validate(HeadSymbol::Zoom, HeadSymbol::Center),
            Some(Event::Unzoom)
        );
    }

    #[test]
    fn test_unrecognized_departure() {
        let table = TransitionTable::standard();
        assert_eq!(table.eye.validate(EyeSymbol::BothOpen, EyeSymbol::LeftClosed), None);
        assert_eq!(table.head.validate(HeadSymbol::Unzoom, HeadSymbol::Center), None);
    }

    #[test]
    fn test_disallowed_arrival() {
        let table = TransitionTable::standard();
        assert_eq!(table.head.validate(HeadSymbol::Center, HeadSymbol::Left), None);
        assert_eq!(table.head.validate(HeadSymbol::Left, HeadSymbol::Right), None);
        assert_eq!(table.head.validate(HeadSymbol::Zoom, HeadSymbol::Up), None);
        assert_eq!(
            table.eye.validate(EyeSymbol::LeftClosed, EyeSymbol::RightClosed),
            None
        );
    }

    #[test]
    fn test_standard_is_shared() {
        assert!(std::ptr::eq(TransitionTable::standard(), TransitionTable::standard()));
    }
}
