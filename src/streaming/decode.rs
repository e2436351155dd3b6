//! Incremental event-stream framing (Bytes -> frame payloads).
//!
//! Follows the `text/event-stream` line rules: `data:` lines accumulate, a blank line
//! ends the event, `:` lines are comments, and other fields (`event:`, `id:`, `retry:`)
//! are ignored. Bytes are buffered raw and only decoded as UTF-8 one complete line at a
//! time, so chunk boundaries may fall anywhere, including inside a character.

use crate::{Error, ErrorContext, Result};
use bytes::BytesMut;

/// Payload that marks the clean end of a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Data of one event, multiple `data:` lines joined with `\n`.
    Data(String),
    /// The sentinel event.
    Done,
}

#[derive(Debug, Default)]
pub struct SseFramer {
    buf: BytesMut,
    // Bytes of `buf` already known to contain no newline.
    scanned: usize,
    data: Option<String>,
}

impl SseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete frame in the buffer, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            let pos = match self.buf[self.scanned..].iter().position(|b| *b == b'\n') {
                Some(p) => self.scanned + p,
                None => {
                    self.scanned = self.buf.len();
                    return Ok(None);
                }
            };
            let raw = self.buf.split_to(pos + 1);
            self.scanned = 0;
            let line = decode_line(&raw[..pos])?;
            if let Some(frame) = self.process_line(line) {
                return Ok(Some(frame));
            }
        }
    }

    /// Flush at end of input: a trailing unterminated line or event still counts.
    pub fn finish(&mut self) -> Result<Option<Frame>> {
        if !self.buf.is_empty() {
            let raw = self.buf.split();
            self.scanned = 0;
            let line = decode_line(&raw)?.to_string();
            if let Some(frame) = self.process_line(&line) {
                return Ok(Some(frame));
            }
        }
        Ok(self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };
        if field == "data" {
            match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        None
    }

    fn dispatch(&mut self) -> Option<Frame> {
        let data = self.data.take()?;
        let trimmed = data.trim();
        if trimmed.is_empty() {
            // Keep-alive events carry no payload.
            return None;
        }
        if trimmed == DONE_SENTINEL {
            return Some(Frame::Done);
        }
        Some(Frame::Data(data))
    }
}

fn decode_line(raw: &[u8]) -> Result<&str> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    std::str::from_utf8(raw).map_err(|e| {
        Error::decode_with_context(
            format!("event stream line is not valid UTF-8: {}", e),
            ErrorContext::new().with_source("sse_decoder"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(input: &[&[u8]]) -> Vec<Frame> {
        let mut framer = SseFramer::new();
        let mut out = Vec::new();
        for chunk in input {
            framer.push(chunk);
            while let Some(f) = framer.next_frame().unwrap() {
                out.push(f);
            }
        }
        if let Some(f) = framer.finish().unwrap() {
            out.push(f);
        }
        out
    }

    #[test]
    fn splits_frames_on_blank_lines() {
        let out = frames(&[b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\ndata: [DONE]\n\n"]);
        assert_eq!(
            out,
            vec![
                Frame::Data("{\"a\":1}".into()),
                Frame::Data("{\"a\":2}".into()),
                Frame::Done
            ]
        );
    }

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let out = frames(&[b"da", b"ta: {\"a\"", b":1}\r", b"\n\r\n"]);
        assert_eq!(out, vec![Frame::Data("{\"a\":1}".into())]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "data: {\"t\":\"héllo\"}\n\n".as_bytes();
        let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let out = frames(&[&text[..split], &text[split..]]);
        assert_eq!(out, vec![Frame::Data("{\"t\":\"héllo\"}".into())]);
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let out = frames(&[b": keep-alive\n\nevent: completion\nid: 7\nretry: 100\ndata:{\"x\":true}\n\n"]);
        assert_eq!(out, vec![Frame::Data("{\"x\":true}".into())]);
    }

    #[test]
    fn joins_multiple_data_lines() {
        let out = frames(&[b"data: {\"a\":\ndata: 1}\n\n"]);
        assert_eq!(out, vec![Frame::Data("{\"a\":\n1}".into())]);
    }

    #[test]
    fn skips_empty_data_and_flushes_unterminated_tail() {
        let out = frames(&[b"data:\n\ndata: {\"tail\":1}"]);
        assert_eq!(out, vec![Frame::Data("{\"tail\":1}".into())]);
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let mut framer = SseFramer::new();
        framer.push(b"data: \xff\xfe\n\n");
        assert!(matches!(framer.next_frame(), Err(Error::Decode { .. })));
    }
}
