//! Incremental decoder for the `text/event-stream` framing used by
//! `/eth/v1/events`.

use crate::error::{
    BeaconError,
    Result,
};

const DEFAULT_EVENT: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub(crate) event: String,
    pub(crate) data: String,
}

/// Largest event block buffered while waiting for its terminating blank line.
pub(crate) const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// Buffers partial chunks until a full event block (terminated by a blank
/// line) is available.
#[derive(Debug)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a terminator.
    scanned: usize,
    max_event_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_EVENT_BYTES)
    }
}

impl SseDecoder {
    pub(crate) fn with_limit(max_event_bytes: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_event_bytes,
        }
    }

    /// Feeds a chunk and returns every event completed by it. Fails once an
    /// unterminated block outgrows the limit; the buffer is discarded and the
    /// stream should be reopened.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));

        let mut events = Vec::new();
        loop {
            // Step back one byte so a terminator split across chunks is found.
            let from = self.scanned.saturating_sub(1);
            let Some(offset) = self.buffer[from..]
                .windows(2)
                .position(|window| window == b"\n\n")
            else {
                self.scanned = self.buffer.len();
                break;
            };

            let end = from + offset;
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            self.scanned = 0;
            if let Some(event) = parse_block(&block[..end]) {
                events.push(event);
            }
        }

        if self.buffer.len() > self.max_event_bytes {
            self.buffer = Vec::new();
            self.scanned = 0;
            return Err(BeaconError::EventTooLarge {
                limit: self.max_event_bytes,
            });
        }

        Ok(events)
    }
}

fn parse_block(block: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(block);

    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }

    Some(SseEvent {
        event: event.unwrap_or_else(|| DEFAULT_EVENT.to_string()),
        data: data.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::default();

        let events = decoder.push(b"event: head\ndata: {\"slot\":\"1\"}\n\n").unwrap();

        assert_eq!(
            events,
            vec![SseEvent {
                event: "head".to_string(),
                data: "{\"slot\":\"1\"}".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::default();

        assert!(decoder.push(b"event: fina").unwrap().is_empty());
        assert!(decoder.push(b"lized_checkpoint\ndata: {}").unwrap().is_empty());
        let events = decoder.push(b"\n\nevent: head\n").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "finalized_checkpoint");

        let events = decoder.push(b"data: {}\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "head");
    }

    #[test]
    fn test_crlf_and_comments() {
        let mut decoder = SseDecoder::default();

        let events = decoder.push(b": keepalive\r\n\r\nevent:head\r\ndata:{}\r\n\r\n").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "head");
        assert_eq!(events[0].data, "{}");
    }

    #[test]
    fn test_multiline_data_and_default_event() {
        let mut decoder = SseDecoder::default();

        let events = decoder.push(b"data: first\ndata: second\n\n").unwrap();

        assert_eq!(events[0].event, "message");
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut decoder = SseDecoder::default();

        assert!(decoder.push(b"event: head\ndata: {}\n").unwrap().is_empty());
        let events = decoder.push(b"\n").unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "head");
    }

    #[test]
    fn test_unterminated_block_over_limit_is_rejected() {
        let mut decoder = SseDecoder::with_limit(16);

        assert!(decoder.push(b"data: 0123456").unwrap().is_empty());
        assert_matches!(
            decoder.push(b"789abcdef"),
            Err(BeaconError::EventTooLarge { limit: 16 })
        );

        // The decoder starts over after rejecting the oversized block.
        let events = decoder.push(b"event: head\ndata: {}\n\n").unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "head");
    }

    #[test]
    fn test_complete_events_do_not_count_towards_limit() {
        let mut decoder = SseDecoder::with_limit(32);
        let chunk = b"event: head\ndata: {}\n\n".repeat(8);

        let events = decoder.push(&chunk).unwrap();

        assert_eq!(events.len(), 8);
    }
}
