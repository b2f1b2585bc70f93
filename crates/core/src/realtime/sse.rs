//! Incremental parsing of the server-sent-events text format.

/// A parsed SSE message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseMessage {
    /// Event type, empty when the server omits the field.
    pub event_type: String,
    /// Data payload. Multiple `data:` lines are joined with `\n`.
    pub data: String,
    /// Event ID for reconnection tracking.
    pub id: Option<String>,
}

impl SseMessage {
    /// Keepalives and comment-only frames carry no data.
    pub fn is_heartbeat(&self) -> bool {
        self.data.is_empty()
    }
}

/// Parse a single SSE message from buffer.
///
/// SSE format:
/// ```text
/// event: change
/// data: {"type":"INSERT","schema":"public","table":"desk_bookings"}
/// id: 7
///
/// ```
///
/// Returns `Some((message, remaining_buffer))` if a complete message was parsed,
/// or `None` if the buffer doesn't contain a complete message yet. Expects
/// `\n` line endings; [`SseDecoder`] normalizes them.
pub fn parse_sse_message(buffer: &str) -> Option<(SseMessage, String)> {
    let end_pos = buffer.find("\n\n")?;

    let message_text = &buffer[..end_pos];
    let remaining = buffer[end_pos + 2..].to_string();

    let mut message = SseMessage::default();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in message_text.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            message.event_type = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim());
        } else if let Some(value) = line.strip_prefix("id:") {
            message.id = Some(value.trim().to_string());
        }
        // Comments (':') and unknown fields are ignored
    }
    message.data = data_lines.join("\n");

    Some((message, remaining))
}

/// Buffers raw stream chunks and yields complete messages.
///
/// Chunk boundaries can fall inside a multi-byte character or between the
/// `\r` and `\n` of a line ending. Undecodable tail bytes wait for the next
/// chunk, and line endings are normalized on the accumulated text.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    text: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and drains every message it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.pending.extend_from_slice(chunk);

        let decodable = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            // Incomplete trailing character
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(_) => self.pending.len(),
        };
        let bytes: Vec<u8> = self.pending.drain(..decodable).collect();
        self.text.push_str(&String::from_utf8_lossy(&bytes));
        if self.text.contains("\r\n") {
            self.text = self.text.replace("\r\n", "\n");
        }

        let mut messages = Vec::new();
        while let Some((message, remaining)) = parse_sse_message(&self.text) {
            self.text = remaining;
            messages.push(message);
        }
        messages
    }
}
