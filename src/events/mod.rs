//! Events broadcast by the gesture session

use serde::{Deserialize, Serialize};

use crate::gesture::{Event, SessionMode};

/// Events emitted by the gesture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DaemonEvent {
    /// A validated gesture was accepted
    Gesture {
        event: Event,
        /// Index of the frame that completed the gesture (1-based)
        frame: u64,
    },

    /// The session switched between Active and Dormant
    ModeChanged {
        mode: SessionMode,
        previous: SessionMode,
    },
}

impl std::fmt::Display for DaemonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonEvent::Gesture { event, frame } => {
                write!(f, "GESTURE {} (frame {})", event, frame)
            }
            DaemonEvent::ModeChanged { mode, previous } => {
                write!(f, "MODE_CHANGED {} -> {}", previous, mode)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DaemonEvent::Gesture {
            event: Event::LeftWink,
            frame: 42,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"gesture""#));
        assert!(json.contains("left_wink"));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"mode_changed","mode":"dormant","previous":"active"}"#;
        let event: DaemonEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            DaemonEvent::ModeChanged {
                mode: SessionMode::Dormant,
                previous: SessionMode::Active,
            }
        );
    }

    #[test]
    fn test_display() {
        let event = DaemonEvent::Gesture {
            event: Event::Zoom,
            frame: 7,
        };
        assert_eq!(event.to_string(), "GESTURE ZOOM (frame 7)");
    }
}
