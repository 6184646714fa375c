//! Line-delimited JSON frame reader
//!
//! Each line is either `{"type":"frame","head":"left","eye":"both_open"}`
//! or `{"type":"no_face"}`. Malformed lines, including ones that are not
//! valid UTF-8, are logged and skipped.

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::gesture::{EyeSymbol, Frame, HeadSymbol};

/// Events sent from the symbol source to the gesture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    /// Classifications for one frame
    Frame(Frame),
    /// No face was found in the frame
    NoFace,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SourceRecord {
    Frame { head: HeadSymbol, eye: EyeSymbol },
    NoFace,
}

impl From<SourceRecord> for SourceEvent {
    fn from(record: SourceRecord) -> Self {
        match record {
            SourceRecord::Frame { head, eye } => SourceEvent::Frame(Frame::new(head, eye)),
            SourceRecord::NoFace => SourceEvent::NoFace,
        }
    }
}

/// Errors that can occur while reading the symbol source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read symbol source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record on line {line}: {source}")]
    Parse {
        line: u64,
        source: serde_json::Error,
    },
}

/// Reads frame records from a buffered async reader
pub struct FrameReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Read the next record. Returns `Ok(None)` at end of input.
    ///
    /// Lines are read as raw bytes, so a line that is not UTF-8 surfaces as
    /// `SourceError::Parse` and the following line can still be read.
    pub async fn next_event(&mut self) -> Result<Option<SourceEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let line_no = self.line_no;

            let line = self.buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let record: SourceRecord = serde_json::from_slice(line)
                .map_err(|source| SourceError::Parse { line: line_no, source })?;
            return Ok(Some(record.into()));
        }
    }

    /// Forward records to the session until input ends or the session goes away
    pub async fn run(mut self, event_tx: mpsc::Sender<SourceEvent>) -> Result<(), SourceError> {
        loop {
            match self.next_event().await {
                Ok(Some(event)) => {
                    if event_tx.send(event).await.is_err() {
                        debug!("session closed, stopping frame reader");
                        break;
                    }
                }
                Ok(None) => {
                    info!(lines = self.line_no, "symbol source closed");
                    break;
                }
                Err(e @ SourceError::Parse { .. }) => {
                    warn!(error = %e, "skipping source record");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;
    use tokio_test::io::Builder;

    fn reader(input: &[u8]) -> FrameReader<BufReader<tokio_test::io::Mock>> {
        FrameReader::new(BufReader::new(Builder::new().read(input).build()))
    }

    #[tokio::test]
    async fn test_reads_frames() {
        let mut reader = reader(
            b"{\"type\":\"frame\",\"head\":\"left\",\"eye\":\"both_open\"}\n\n{\"type\":\"no_face\"}\n",
        );

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(SourceEvent::Frame(Frame::new(HeadSymbol::Left, EyeSymbol::BothOpen)))
        );
        assert_eq!(reader.next_event().await.unwrap(), Some(SourceEvent::NoFace));
        assert_eq!(reader.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_line_reports_line_number() {
        let mut reader = reader(b"{\"type\":\"no_face\"}\n{\"type\":\"frame\",\"head\":\"sideways\"}\n");

        reader.next_event().await.unwrap();
        match reader.next_event().await {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_skips_bad_records() {
        let reader = reader(
            b"not json\n{\"type\":\"frame\",\"head\":\"center\",\"eye\":\"left_closed\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(4);

        reader.run(tx).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(SourceEvent::Frame(Frame::new(HeadSymbol::Center, EyeSymbol::LeftClosed)))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let reader = reader(
            b"\xff\xfe garbage\n{\"type\":\"frame\",\"head\":\"center\",\"eye\":\"left_closed\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(4);

        reader.run(tx).await.unwrap();

        assert_eq!(
            rx.recv().await,
            Some(SourceEvent::Frame(Frame::new(HeadSymbol::Center, EyeSymbol::LeftClosed)))
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_invalid_utf8_inside_string() {
        let mut reader = reader(b"{\"type\":\"frame\",\"head\":\"le\xfft\",\"eye\":\"both_open\"}\n{\"type\":\"no_face\"}\n");

        match reader.next_event().await {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(reader.next_event().await.unwrap(), Some(SourceEvent::NoFace));
    }
}
