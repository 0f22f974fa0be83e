//! Incremental parser for `text/event-stream` payloads.
//!
//! Network chunks can split events anywhere, so the buffer keeps the
//! trailing partial line and releases only complete `data:` payloads.

/// Buffering line parser for SSE `data:` events.
#[derive(Debug, Default)]
pub struct SseBuffer {
    pending: String,
}

impl SseBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body; returns the `data:` payloads of
    /// every line completed by this chunk, in order.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let mut payloads = Vec::new();
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if !data.is_empty() {
                    payloads.push(data.to_owned());
                }
            }
        }
        payloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_events_in_one_chunk() {
        let mut buffer = SseBuffer::new();
        let payloads = buffer.push("data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut buffer = SseBuffer::new();
        assert!(buffer.push("data: {\"par").is_empty());
        let payloads = buffer.push("tial\":true}\n");
        assert_eq!(payloads, vec!["{\"partial\":true}"]);
    }

    #[test]
    fn test_non_data_lines_are_skipped() {
        let mut buffer = SseBuffer::new();
        let payloads = buffer.push(": keep-alive\nevent: ping\ndata: x\n");
        assert_eq!(payloads, vec!["x"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut buffer = SseBuffer::new();
        let payloads = buffer.push("data: one\r\ndata: two\r\n");
        assert_eq!(payloads, vec!["one", "two"]);
    }

    #[test]
    fn test_done_marker_passes_through() {
        let mut buffer = SseBuffer::new();
        let payloads = buffer.push("data: [DONE]\n\n");
        assert_eq!(payloads, vec!["[DONE]"]);
    }
}
