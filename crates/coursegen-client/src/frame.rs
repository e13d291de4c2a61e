use std::borrow::Cow;

/// Line framer for the chunked progress stream.
///
/// Accumulates raw chunks and yields complete lines in arrival order. Bytes
/// are buffered until a line terminator arrives, so a chunk boundary may
/// fall anywhere, including inside a multi-byte character. The trailing
/// unterminated segment is retained so the session can attempt a final
/// flush after the transport closes.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every fully terminated line extracted so
    /// far. Trailing `\r` is stripped, no line is ever returned twice, and
    /// an empty chunk is a no-op.
    pub fn append(&mut self, chunk: &[u8]) -> Vec<String> {
        if chunk.is_empty() {
            return Vec::new();
        }
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let frame_bytes: Vec<u8> = self.buf.drain(..=idx).collect();
            let mut line = String::from_utf8_lossy(&frame_bytes[..idx]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Bytes received after the last line terminator.
    pub fn remainder(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    /// Consumes the unterminated tail, leaving the buffer empty.
    pub fn take_remainder(&mut self) -> String {
        let tail = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&tail).into_owned()
    }
}
