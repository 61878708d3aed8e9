//! Incremental decoding of server-sent-events bodies.
//!
//! Only `data:` fields matter for the generation stream; every event carries
//! one JSON document. Lines can be split at arbitrary points across network
//! chunks, and so can multi-byte UTF-8 sequences.

/// Incremental SSE parser that yields the data payload of each event.
#[derive(Debug, Default)]
pub struct SseParser {
    /// Bytes of an incomplete UTF-8 sequence carried over from the last chunk.
    pending: Vec<u8>,
    /// Text of an incomplete line.
    buffer: String,
    data_lines: Vec<String>,
    has_data: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Returns the data payloads of all events completed by
    /// this chunk.
    pub fn feed_bytes(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut text = String::with_capacity(self.pending.len());
        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    text.push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            consumed = valid_end + len;
                        }
                        // Incomplete sequence at the end: wait for the next chunk.
                        None => {
                            consumed = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        self.feed(&text)
    }

    /// Feed a chunk of text. Returns the data payloads of completed events.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches('\n').trim_end_matches('\r');

            if line.is_empty() {
                if let Some(event) = self.emit_event() {
                    events.push(event);
                }
            } else {
                self.process_line(line);
            }
        }

        events
    }

    /// Flushes an event left open when the body ended without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.buffer.push_str(&rest);
        }
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(line.trim_end_matches('\r'));
        }
        self.emit_event()
    }

    fn process_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }

        if let Some((field, value)) = line.split_once(':') {
            if field == "data" {
                let value = value.strip_prefix(' ').unwrap_or(value);
                self.data_lines.push(value.to_string());
                self.has_data = true;
            }
        }
    }

    fn emit_event(&mut self) -> Option<String> {
        if !self.has_data {
            return None;
        }
        self.has_data = false;
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut parser = SseParser::new();
        let events = parser.feed("data: {\"a\":1}\n\n");
        assert_eq!(events, vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut parser = SseParser::new();
        assert!(parser.feed("da").is_empty());
        assert!(parser.feed("ta: hel").is_empty());
        assert!(parser.feed("lo\n").is_empty());
        assert_eq!(parser.feed("\n"), vec!["hello"]);
    }

    #[test]
    fn test_crlf_and_multiple_events() {
        let mut parser = SseParser::new();
        let events = parser.feed("data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(events, vec!["one", "two"]);
    }

    #[test]
    fn test_multiline_data_and_ignored_fields() {
        let mut parser = SseParser::new();
        let events = parser.feed(": keepalive\nevent: message\nid: 7\ndata: a\ndata: b\n\n");
        assert_eq!(events, vec!["a\nb"]);
    }

    #[test]
    fn test_blank_lines_without_data_emit_nothing() {
        let mut parser = SseParser::new();
        assert!(parser.feed("\n\n: comment\n\n").is_empty());
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed("data: tail").is_empty());
        assert_eq!(parser.finish(), Some("tail".to_string()));
        assert_eq!(parser.finish(), None);
    }

    #[test]
    fn test_utf8_split_across_byte_chunks() {
        let mut parser = SseParser::new();
        let bytes = "data: héllo ✓\n\n".as_bytes();
        // Split inside the two-byte 'é'.
        let split = "data: h".len() + 1;
        assert!(parser.feed_bytes(&bytes[..split]).is_empty());
        assert_eq!(parser.feed_bytes(&bytes[split..]), vec!["héllo ✓"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut parser = SseParser::new();
        let events = parser.feed_bytes(b"data: a\xffb\n\n");
        assert_eq!(events, vec!["a\u{fffd}b"]);
    }

    #[test]
    fn test_long_run_of_invalid_bytes() {
        let mut parser = SseParser::new();
        let mut body = b"data: ".to_vec();
        body.extend(std::iter::repeat_n(0xff, 200_000));
        body.extend_from_slice(b"\n\n");

        let events = parser.feed_bytes(&body);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].chars().count(), 200_000);
        assert!(events[0].chars().all(|c| c == char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_invalid_byte_before_split_sequence() {
        let mut parser = SseParser::new();
        let bytes = "data: \u{2713}\n\n".as_bytes();
        let mut first = b"data: \xff".to_vec();
        first.extend_from_slice(&bytes[6..7]);
        assert!(parser.feed_bytes(&first).is_empty());
        assert_eq!(parser.feed_bytes(&bytes[7..]), vec!["\u{fffd}\u{2713}"]);
    }
}
