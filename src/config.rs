//! Configuration loading and management

use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::gesture::Thresholds;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Consecutive frames each channel must hold before a transition counts
    pub thresholds: Thresholds,

    /// Start dormant until the wake gesture is seen
    pub require_wake: bool,

    /// Optional shortcuts file overriding the built-in key chords
    pub shortcuts_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let home = lookup("HOME").context("HOME is not set")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("gesture-daemon");

        let socket_path = lookup("GESTURE_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            head_frames: parse_frames(&lookup, "GESTURE_HEAD_FRAMES", defaults.head_frames)?,
            eye_frames: parse_frames(&lookup, "GESTURE_EYE_FRAMES", defaults.eye_frames)?,
        };

        let require_wake = match lookup("GESTURE_WAKE").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => bail!("GESTURE_WAKE must be true or false, got {other:?}"),
        };

        Ok(Self {
            socket_path,
            data_dir,
            thresholds,
            require_wake,
            shortcuts_path: lookup("GESTURE_SHORTCUTS").map(PathBuf::from),
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

fn parse_frames<F>(lookup: &F, key: &str, default: NonZeroU32) -> Result<NonZeroU32>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be a frame count of at least 1, got {raw:?}"))
}
