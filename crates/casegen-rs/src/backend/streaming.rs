//! Server-Sent Events (SSE) decoding for the Messages streaming API.
//!
//! [`SseDecoder`] is fed raw body chunks as they arrive and turns complete
//! `data:` lines into [`StreamEvent`]s. Lines are split on bytes before
//! UTF-8 decoding so a multi-byte character straddling two chunks (`£`, the
//! RAG dots) is never mangled.

use serde::Deserialize;
use tracing::{trace, warn};

/// A single event from an SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental text content delta.
    TextDelta(String),
    /// Token counts reported by the provider.
    Usage {
        input_tokens: Option<u64>,
        output_tokens: Option<u64>,
    },
    /// The stream is complete.
    Done,
    /// The provider reported an error mid-stream.
    Error(String),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    MessageStart {
        message: WireMessage,
    },
    ContentBlockDelta {
        delta: WireDelta,
    },
    MessageDelta {
        usage: Option<WireUsage>,
    },
    MessageStop,
    Error {
        error: WireError,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct WireMessage {
    usage: Option<WireUsage>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct WireUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct WireError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// Error message for a stream that closed before its terminal event.
pub const TRUNCATED_STREAM: &str = "stream ended before message_stop";

/// Incremental SSE line decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    events: Vec<StreamEvent>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body chunk and decode every complete line it finishes.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.done {
            return;
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.process_line(line.trim());
            if self.done {
                self.buffer.clear();
                break;
            }
        }
    }

    /// Whether a terminal event has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Flush any unterminated final line and return all events, ending in
    /// [`StreamEvent::Done`].
    ///
    /// A stream that closes without `message_stop`, `[DONE]` or an error
    /// event is truncated: a [`StreamEvent::Error`] is appended so the
    /// partial text is never mistaken for a complete reply.
    pub fn finish(mut self) -> Vec<StreamEvent> {
        if !self.done && !self.buffer.is_empty() {
            let remaining = std::mem::take(&mut self.buffer);
            let remaining = String::from_utf8_lossy(&remaining);
            self.process_line(remaining.trim());
        }
        if !self.done {
            warn!("Stream closed before a terminal event");
            self.events
                .push(StreamEvent::Error(TRUNCATED_STREAM.to_string()));
            self.events.push(StreamEvent::Done);
        }
        self.events
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() || line.starts_with(':') || line.starts_with("event:") {
            return;
        }
        if line == "data: [DONE]" {
            self.mark_done();
            return;
        }
        if let Some(data) = line.strip_prefix("data:") {
            parse_sse_data(data.trim_start(), &mut self.events);
            if matches!(self.events.last(), Some(StreamEvent::Done)) {
                self.done = true;
            }
        }
    }

    fn mark_done(&mut self) {
        self.events.push(StreamEvent::Done);
        self.done = true;
    }
}

/// Parse a single SSE `data:` payload into stream events.
fn parse_sse_data(data: &str, events: &mut Vec<StreamEvent>) {
    match serde_json::from_str::<WireEvent>(data) {
        Ok(WireEvent::ContentBlockDelta {
            delta: WireDelta::TextDelta { text },
        }) => {
            if !text.is_empty() {
                events.push(StreamEvent::TextDelta(text));
            }
        }
        Ok(WireEvent::ContentBlockDelta { .. }) => {}
        Ok(WireEvent::MessageStart { message }) => {
            if let Some(usage) = message.usage {
                events.push(StreamEvent::Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                });
            }
        }
        Ok(WireEvent::MessageDelta { usage }) => {
            if let Some(usage) = usage {
                events.push(StreamEvent::Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                });
            }
        }
        Ok(WireEvent::MessageStop) => {
            trace!("message_stop received");
            events.push(StreamEvent::Done);
        }
        Ok(WireEvent::Error { error }) => {
            let kind = error.kind.unwrap_or_else(|| "error".into());
            let message = error.message.unwrap_or_default();
            events.push(StreamEvent::Error(format!("{kind}: {message}")));
            events.push(StreamEvent::Done);
        }
        Ok(WireEvent::Other) => {}
        Err(e) => {
            warn!("Failed to parse SSE chunk: {e}; data: {data}");
            events.push(StreamEvent::Error(format!("unparseable stream data: {e}")));
            events.push(StreamEvent::Done);
        }
    }
}

/// Assemble the complete text from a sequence of stream events, in order.
pub fn collect_text(events: &[StreamEvent]) -> String {
    let mut text = String::new();
    for event in events {
        if let StreamEvent::TextDelta(delta) = event {
            text.push_str(delta);
        }
    }
    text
}

/// The first provider error in the stream, if any.
pub fn stream_error(events: &[StreamEvent]) -> Option<&str> {
    events.iter().find_map(|e| match e {
        StreamEvent::Error(message) => Some(message.as_str()),
        _ => None,
    })
}

/// Output token count from the last usage report that carried one.
pub fn output_tokens(events: &[StreamEvent]) -> Option<u64> {
    events.iter().rev().find_map(|e| match e {
        StreamEvent::Usage { output_tokens, .. } => *output_tokens,
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = "event: message_start\n\
data: {\"type\":\"message_start\",\"message\":{\"id\":\"m1\",\"usage\":{\"input_tokens\":12,\"output_tokens\":1}}}\n\n\
event: content_block_start\n\
data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n\
event: ping\n\
data: {\"type\":\"ping\"}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"{\\\"content\\\": \"}}\n\n\
event: content_block_delta\n\
data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"\\\"<p>Hi</p>\\\"}\"}}\n\n\
event: message_delta\n\
data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":9}}\n\n\
event: message_stop\n\
data: {\"type\":\"message_stop\"}\n\n";

    #[test]
    fn deltas_concatenate_in_order() {
        let mut decoder = SseDecoder::new();
        decoder.feed(STREAM.as_bytes());
        assert!(decoder.is_done());
        let events = decoder.finish();
        assert_eq!(collect_text(&events), "{\"content\": \"<p>Hi</p>\"}");
        assert_eq!(output_tokens(&events), Some(9));
        assert!(stream_error(&events).is_none());
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }

    #[test]
    fn chunk_boundaries_do_not_matter() {
        let bytes = STREAM.as_bytes();
        let mut decoder = SseDecoder::new();
        for piece in bytes.chunks(7) {
            decoder.feed(piece);
        }
        let events = decoder.finish();
        assert_eq!(collect_text(&events), "{\"content\": \"<p>Hi</p>\"}");
    }

    #[test]
    fn multibyte_text_split_across_chunks() {
        let line = "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"£4 million 🟢\"}}\n";
        let bytes = line.as_bytes();
        let pound = line.find('£').unwrap();
        let (a, b) = bytes.split_at(pound + 1);
        let mut decoder = SseDecoder::new();
        decoder.feed(a);
        decoder.feed(b);
        let events = decoder.finish();
        assert_eq!(collect_text(&events), "£4 million 🟢");
    }

    #[test]
    fn error_event_is_reported() {
        let mut decoder = SseDecoder::new();
        decoder.feed(
            b"event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n",
        );
        let events = decoder.finish();
        assert_eq!(stream_error(&events), Some("overloaded_error: Overloaded"));
    }

    #[test]
    fn done_sentinel_and_trailing_line() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"a\"}}");
        assert!(!decoder.is_done());
        decoder.feed(b"\ndata: {\"type\":\"message_stop\"}");
        let events = decoder.finish();
        assert_eq!(collect_text(&events), "a");
        assert!(stream_error(&events).is_none());
        assert_eq!(events.last(), Some(&StreamEvent::Done));

        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: [DONE]\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"late\"}}\n");
        let events = decoder.finish();
        assert_eq!(collect_text(&events), "");
        assert!(stream_error(&events).is_none());
    }

    #[test]
    fn stream_without_terminal_event_is_truncated() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"partial\"}}\n\n");
        assert!(!decoder.is_done());
        let events = decoder.finish();
        assert_eq!(stream_error(&events), Some(TRUNCATED_STREAM));
        assert_eq!(events.last(), Some(&StreamEvent::Done));

        let events = SseDecoder::new().finish();
        assert_eq!(stream_error(&events), Some(TRUNCATED_STREAM));
    }

    #[test]
    fn unparseable_data_ends_the_stream_with_an_error() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b": keep-alive\ndata: {not json\ndata: {\"type\":\"message_stop\"}\n");
        assert!(decoder.is_done());
        let events = decoder.finish();
        let message = stream_error(&events).unwrap();
        assert!(message.starts_with("unparseable stream data"), "{message}");
        assert_eq!(events.last(), Some(&StreamEvent::Done));
    }
}
