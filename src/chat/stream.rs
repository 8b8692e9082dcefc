//! Incremental decoding of a streamed orchestrator turn
//!
//! The first JSON value in the body is `{"alert": [...]}`, usually followed
//! by a newline. Everything after it is reply text, delivered in arbitrary
//! byte chunks that may split UTF-8 sequences.

use serde::Deserialize;
use serde_json::Deserializer;

use crate::models::Alert;

/// Give up waiting for a complete alert header past this many bytes
const MAX_HEADER_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
struct AlertHeader {
    #[serde(default)]
    alert: Vec<Alert>,
}

#[derive(Debug, Default)]
pub struct StreamAccumulator {
    /// Set once the header has been consumed (or given up on)
    header_done: bool,
    header: String,
    alert: Vec<Alert>,
    text: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
    /// The newline ending the header has not been seen yet
    expect_newline: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert(&self) -> &[Alert] {
        &self.alert
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn header_done(&self) -> bool {
        self.header_done
    }

    /// Feed raw bytes; returns the reply text they added
    pub fn push_bytes(&mut self, bytes: &[u8]) -> String {
        self.partial.extend_from_slice(bytes);
        let decoded = take_utf8(&mut self.partial);
        self.push_str(&decoded)
    }

    /// Feed decoded text; returns the reply text it added
    pub fn push_str(&mut self, chunk: &str) -> String {
        if self.header_done {
            return self.append_text(chunk);
        }

        self.header.push_str(chunk);
        let mut values = Deserializer::from_str(&self.header).into_iter::<AlertHeader>();
        let rest = match values.next() {
            Some(Ok(header)) => {
                self.alert = header.alert;
                let offset = values.byte_offset();
                self.expect_newline = true;
                Some(self.header[offset..].to_string())
            }
            Some(Err(e)) if e.is_eof() && self.header.len() < MAX_HEADER_BYTES => {
                // Header split across chunks; wait for more
                None
            }
            Some(Err(e)) => {
                tracing::debug!("Unreadable alert header, continuing without it: {}", e);
                // Drop the header line; anything after a newline is reply text
                Some(match self.header.find('\n') {
                    Some(pos) => self.header[pos + 1..].to_string(),
                    None => {
                        self.expect_newline = true;
                        String::new()
                    }
                })
            }
            None => None,
        };

        let Some(rest) = rest else {
            return String::new();
        };
        self.header_done = true;
        self.header.clear();
        self.append_text(&rest)
    }

    fn append_text(&mut self, chunk: &str) -> String {
        let mut chunk = chunk;
        if self.expect_newline && !chunk.is_empty() {
            chunk = chunk
                .strip_prefix("\r\n")
                .or_else(|| chunk.strip_prefix('\n'))
                .unwrap_or(chunk);
            self.expect_newline = false;
        }
        self.text.push_str(chunk);
        chunk.to_string()
    }

    /// Flush undecodable leftovers and return `(text, alert)`
    pub fn finish(mut self) -> (String, Vec<Alert>) {
        if !self.partial.is_empty() {
            let tail = String::from_utf8_lossy(&self.partial).into_owned();
            self.partial.clear();
            self.push_str(&tail);
        }
        (self.text, self.alert)
    }
}

/// Decode as much of `buf` as is complete UTF-8, leaving an unfinished
/// trailing sequence in place. Invalid bytes become U+FFFD.
fn take_utf8(buf: &mut Vec<u8>) -> String {
    let mut out = String::new();
    loop {
        match std::str::from_utf8(buf) {
            Ok(s) => {
                out.push_str(s);
                buf.clear();
                return out;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&buf[..valid]));
                match e.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        buf.drain(..valid + bad);
                    }
                    None => {
                        buf.drain(..valid);
                        return out;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(chunks: &[&str]) -> (String, Vec<Alert>) {
        let mut acc = StreamAccumulator::new();
        for chunk in chunks {
            acc.push_str(chunk);
        }
        acc.finish()
    }

    #[test]
    fn test_alert_then_tokens() {
        let (text, alert) = run(&[r#"{"alert":[{"type":"info","message":"hi"}]}"#, "Hello", " world"]);
        assert_eq!(text, "Hello world");
        assert_eq!(
            alert,
            vec![Alert {
                kind: "info".to_string(),
                message: "hi".to_string()
            }]
        );
    }

    #[test]
    fn test_header_newline_and_text_in_one_chunk() {
        let (text, alert) = run(&["{\"alert\": []}\nHi", " there"]);
        assert_eq!(text, "Hi there");
        assert!(alert.is_empty());
    }

    #[test]
    fn test_header_split_across_chunks() {
        let (text, alert) = run(&[r#"{"alert":[{"type":"profile_upd"#, r#"ate","message":"x"}]}"#, "\n", "ok"]);
        assert_eq!(text, "ok");
        assert_eq!(alert[0].kind, "profile_update");
    }

    #[test]
    fn test_bad_header_degrades_to_empty_alert() {
        let (text, alert) = run(&["not json at all", "Hello"]);
        assert!(alert.is_empty());
        assert_eq!(text, "Hello");
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let mut acc = StreamAccumulator::new();
        acc.push_bytes(b"{\"alert\":[]}\n");
        let bytes = "café ☕".as_bytes();
        let (a, b) = bytes.split_at(bytes.len() - 2);
        let first = acc.push_bytes(a);
        assert_eq!(first, "café ");
        acc.push_bytes(b);
        let (text, _) = acc.finish();
        assert_eq!(text, "café ☕");
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut buf = vec![b'a', 0xff, b'b'];
        assert_eq!(take_utf8(&mut buf), "a\u{FFFD}b");
        assert!(buf.is_empty());
    }
}
