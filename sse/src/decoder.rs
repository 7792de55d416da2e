//! Line-oriented SSE decoder.
//!
//! Each call to [`Decoder::next_frame`] consumes exactly one line from the
//! underlying reader and yields at most one event. Only two line shapes are
//! meaningful:
//!
//! - `data: <json-object>` - decoded into an [`Event`]
//! - any line whose field name contains `keepalive` (e.g. `:keepalive`) -
//!   turned into `{"event": "keepalive"}` without touching the payload
//!
//! Everything else (`id:`, `retry:`, `event:`, blank lines, other comments) is
//! ignored. Invalid JSON is logged and dropped; only I/O errors are returned.

use crate::message::{keepalive_event, Event, KEEPALIVE};
use log::*;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const DELIMITER: &[u8] = b": ";
const DATA_FIELD: &[u8] = b"data";

/// One unit read from the stream.
#[derive(Debug, PartialEq)]
pub enum Frame {
    Event(Event),
    /// A line was consumed but carried nothing to dispatch.
    Empty,
    /// The reader is exhausted.
    EndOfStream,
}

pub struct Decoder<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
        }
    }

    /// Reads one line (up to and including `\n`, or up to the end of the
    /// reader) and decodes it.
    pub async fn next_frame(&mut self) -> io::Result<Frame> {
        self.line.clear();
        let read = self.reader.read_until(b'\n', &mut self.line).await?;
        if read == 0 {
            return Ok(Frame::EndOfStream);
        }

        trace!("LINE: {}", String::from_utf8_lossy(&self.line).trim_end());

        Ok(decode_line(&self.line).map_or(Frame::Empty, Frame::Event))
    }
}

/// Decodes a single raw line, trailing newline included or not.
pub fn decode_line(line: &[u8]) -> Option<Event> {
    if line.len() < 2 {
        return None;
    }

    let (field, value) = split_field(line);

    if contains(field, KEEPALIVE.as_bytes()) {
        return Some(keepalive_event());
    }

    if field != DATA_FIELD {
        return None;
    }

    let raw = value?.trim_ascii();
    match serde_json::from_slice::<Event>(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            error!("Error parsing event: {e}");
            None
        }
    }
}

/// Splits at the first `": "`. A line without the delimiter is all field name.
fn split_field(line: &[u8]) -> (&[u8], Option<&[u8]>) {
    match line
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
    {
        Some(at) => (&line[..at], Some(&line[at + DELIMITER.len()..])),
        None => (line, None),
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
