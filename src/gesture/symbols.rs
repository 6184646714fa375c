//! Per-channel observation symbols and the events they resolve to

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A symbol observed on one channel. Each channel has a rest state that
/// its debouncer starts from.
pub trait ChannelSymbol: Copy + Eq + Hash + fmt::Debug {
    /// Symbol the channel holds when the user is not gesturing
    const REST: Self;
}

/// Instantaneous classification of head pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadSymbol {
    Left,
    Right,
    Up,
    Down,
    /// Rest pose
    Center,
    /// Head leaned towards the camera
    Zoom,
    /// Head leaned back from the camera. A pose, not the zoomed mode.
    Unzoom,
}

impl ChannelSymbol for HeadSymbol {
    const REST: Self = HeadSymbol::Center;
}

/// Instantaneous classification of eye state.
///
/// `BothBlink`, `LeftWink` and `RightWink` name accepted gestures; a symbol
/// source never reports them, so they never depart a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeSymbol {
    /// Rest state
    BothOpen,
    BothClosed,
    BothBlink,
    LeftWink,
    LeftClosed,
    RightWink,
    RightClosed,
}

impl ChannelSymbol for EyeSymbol {
    const REST: Self = EyeSymbol::BothOpen;
}

/// A validated gesture, handed to the macro dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Left,
    Right,
    Up,
    Down,
    Zoom,
    Unzoom,
    LeftWink,
    RightWink,
    BothBlink,
}

impl Event {
    /// Events guarded by the zoom latch
    pub fn is_zoom_family(&self) -> bool {
        matches!(self, Event::Zoom | Event::Unzoom)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Left => write!(f, "LEFT"),
            Event::Right => write!(f, "RIGHT"),
            Event::Up => write!(f, "UP"),
            Event::Down => write!(f, "DOWN"),
            Event::Zoom => write!(f, "ZOOM"),
            Event::Unzoom => write!(f, "UNZOOM"),
            Event::LeftWink => write!(f, "LEFT_WINK"),
            Event::RightWink => write!(f, "RIGHT_WINK"),
            Event::BothBlink => write!(f, "BOTH_BLINK"),
        }
    }
}

/// The pair of observations for one video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub head: HeadSymbol,
    pub eye: EyeSymbol,
}

impl Frame {
    pub fn new(head: HeadSymbol, eye: EyeSymbol) -> Self {
        Self { head, eye }
    }
}
