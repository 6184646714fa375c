//! Desktop macros and their key chords

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gesture::Event;

/// Window-management and editing actions triggered by gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    MoveLeft,
    MoveRight,
    Expose,
    Fullscreen,
    Minimize,
    TabForward,
    TabBack,
    Copy,
}

impl Macro {
    pub const ALL: [Macro; 8] = [
        Macro::MoveLeft,
        Macro::MoveRight,
        Macro::Expose,
        Macro::Fullscreen,
        Macro::Minimize,
        Macro::TabForward,
        Macro::TabBack,
        Macro::Copy,
    ];

    /// Default macro for each gesture
    pub fn for_event(event: Event) -> Self {
        match event {
            Event::Left => Macro::MoveLeft,
            Event::Right => Macro::MoveRight,
            Event::Up => Macro::Expose,
            Event::Down => Macro::Minimize,
            // Fullscreen is itself a toggle
            Event::Zoom | Event::Unzoom => Macro::Fullscreen,
            Event::LeftWink => Macro::TabBack,
            Event::RightWink => Macro::TabForward,
            Event::BothBlink => Macro::Copy,
        }
    }

    /// Name of the macro in a shortcuts file
    pub fn shortcut_name(&self) -> &'static str {
        match self {
            Macro::MoveLeft => "MoveToLeftHalf",
            Macro::MoveRight => "MoveToRightHalf",
            Macro::Expose => "MissionControl",
            Macro::Fullscreen => "MoveToFullscreen",
            Macro::Minimize => "Minimize",
            Macro::TabForward => "NextTab",
            Macro::TabBack => "PreviousTab",
            Macro::Copy => "Copy",
        }
    }

    pub fn from_shortcut_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.shortcut_name() == name)
    }

    fn default_chord(&self) -> &'static str {
        match self {
            Macro::MoveLeft => "cmd+alt+left",
            Macro::MoveRight => "cmd+alt+right",
            Macro::Expose => "ctrl+up",
            Macro::Fullscreen => "cmd+alt+f",
            Macro::Minimize => "cmd+m",
            Macro::TabForward => "ctrl+tab",
            Macro::TabBack => "ctrl+shift+tab",
            Macro::Copy => "cmd+c",
        }
    }
}

/// Keys to press in order, then release in reverse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySequence {
    pub press: Vec<String>,
    pub release: Vec<String>,
}

impl KeySequence {
    pub fn from_chord(keys: &[String]) -> Self {
        Self {
            press: keys.to_vec(),
            release: keys.iter().rev().cloned().collect(),
        }
    }
}

/// Errors that can occur while loading shortcuts
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("failed to read shortcuts file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse shortcuts: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("shortcut {0} has an empty key chord")]
    EmptyChord(String),
}

/// Key chord bound to each macro
#[derive(Debug, Clone)]
pub struct Shortcuts {
    chords: HashMap<Macro, Vec<String>>,
}

impl Shortcuts {
    /// Built-in chords
    pub fn defaults() -> Self {
        let chords = Macro::ALL
            .into_iter()
            .map(|m| (m, split_chord(m.default_chord())))
            .collect();
        Self { chords }
    }

    /// Parse `{ "MoveToLeftHalf": "cmd+alt+left", ... }`, overriding the defaults
    pub fn from_json(json: &str) -> Result<Self, ShortcutError> {
        let overrides: HashMap<String, String> = serde_json::from_str(json)?;
        let mut shortcuts = Self::defaults();

        for (name, chord) in overrides {
            let Some(action) = Macro::from_shortcut_name(&name) else {
                debug!(%name, "ignoring unknown shortcut");
                continue;
            };

            let keys = split_chord(&chord);
            if keys.is_empty() {
                return Err(ShortcutError::EmptyChord(name));
            }
            shortcuts.chords.insert(action, keys);
        }

        Ok(shortcuts)
    }

    pub fn load(path: &Path) -> Result<Self, ShortcutError> {
        let json = std::fs::read_to_string(path).map_err(|source| ShortcutError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn chord(&self, action: Macro) -> &[String] {
        self.chords.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn key_sequence(&self, action: Macro) -> KeySequence {
        KeySequence::from_chord(self.chord(action))
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self::defaults()
    }
}

fn split_chord(chord: &str) -> Vec<String> {
    chord
        .split('+')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .collect()
}
