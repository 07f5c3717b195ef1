// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Server-sent event decoding
//!
//! Incremental `text/event-stream` parser. Bytes arrive in arbitrary chunks;
//! complete messages come out once their terminating blank line is seen.

/// One dispatched server-sent message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseMessage {
    pub id: Option<String>,
    /// The `event:` field
    pub name: Option<String>,
    /// All `data:` lines joined with newlines
    pub data: String,
}

/// Incremental decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    id: Option<String>,
    name: Option<String>,
    data: Vec<String>,
    has_fields: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every message completed by them
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseMessage> {
        self.buffer.extend_from_slice(bytes);

        let mut messages = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            if let Some(message) = self.process_line(&String::from_utf8_lossy(&line)) {
                messages.push(message);
            }
        }

        messages
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }

        // comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "id" => self.id = Some(value.to_string()),
            "event" => self.name = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            _ => return None,
        }
        self.has_fields = true;

        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        if !self.has_fields {
            return None;
        }
        self.has_fields = false;

        Some(SseMessage {
            id: self.id.take(),
            name: self.name.take(),
            data: std::mem::take(&mut self.data).join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_split_across_chunks() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.feed(b"id: 0\nevent: ev").is_empty());
        let messages = decoder.feed(b"ent\ndata: {\"event\":\"log\"}\n\nevent: end\n\n");

        assert_eq!(
            messages,
            vec![
                SseMessage {
                    id: Some("0".into()),
                    name: Some("event".into()),
                    data: r#"{"event":"log"}"#.into(),
                },
                SseMessage {
                    id: None,
                    name: Some("end".into()),
                    data: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_multiline_data_and_crlf() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"data: one\r\ndata:two\r\n\r\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].data, "one\ntwo");
    }

    #[test]
    fn test_comments_and_stray_blank_lines_ignored() {
        let mut decoder = SseDecoder::new();
        let messages = decoder.feed(b"\n: keep-alive\n\n\nevent: end\n\n");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].name.as_deref(), Some("end"));
    }
}
