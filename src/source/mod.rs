//! Symbol source adapter
//!
//! Reads per-frame head and eye classifications produced by an external
//! landmark tracker, one JSON record per line.

mod reader;

pub use reader::{FrameReader, SourceEvent};
