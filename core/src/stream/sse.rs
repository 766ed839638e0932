use log::warn;

/// Longest line buffered before it is dropped.
pub const MAX_LINE_BYTES: usize = 1 << 20;

/// Incremental decoder for a `text/event-stream` body.
///
/// Bytes may be split anywhere; complete events are returned as their joined
/// `data` payload. Comments and `event`/`id`/`retry` fields are skipped since
/// the feed only ever sends unnamed data events. A line longer than the limit
/// is dropped together with the event it belongs to.
#[derive(Debug)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Option<String>,
    max_line_bytes: usize,
    discarding: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_line_limit(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_limit(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            data: None,
            max_line_bytes: max_line_bytes.max(1),
            discarding: false,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut messages = Vec::new();
        while let Some(newline) = self.pending.iter().position(|&byte| byte == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
            if self.discarding {
                // tail of a line that was already dropped
                self.discarding = false;
                continue;
            }
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_line_bytes {
                self.drop_line(line.len());
                continue;
            }
            let line = String::from_utf8_lossy(&line);
            self.process_line(&line, &mut messages);
        }
        if self.pending.len() > self.max_line_bytes {
            self.drop_line(self.pending.len());
            self.pending.clear();
            self.discarding = true;
        }
        messages
    }

    fn drop_line(&mut self, length: usize) {
        warn!("dropping oversized event-stream line ({length} bytes)");
        self.data = None;
    }

    fn process_line(&mut self, line: &str, messages: &mut Vec<String>) {
        if line.is_empty() {
            if let Some(data) = self.data.take() {
                messages.push(data);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            match &mut self.data {
                Some(buffer) => {
                    buffer.push('\n');
                    buffer.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
    }
}
