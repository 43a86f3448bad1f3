//! Incremental Frame Decoder
//!
//! Recovers complete JSON frames from a chunked byte stream. The transport
//! delivers bytes in arbitrarily sized chunks: a chunk may split a frame
//! mid-boundary or carry several frames, so the decoder keeps a residue
//! buffer of undecoded bytes and extracts frames as they complete. Frame
//! output is identical for any chunking of the same byte sequence.
//!
//! A frame is one syntactically complete JSON value starting with `{` or
//! `[`. The scanner tracks string/escape state and bracket depth; a frame
//! ends when depth returns to zero. Inter-frame whitespace (the newline
//! separators ksqlDB emits) is skipped.

use bytes::{Buf, Bytes, BytesMut};

/// Frame decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A frame started with something other than `{` or `[`.
    #[error("frame must begin with '{{' or '[', got byte {0:#04x}")]
    InvalidFrameStart(u8),
}

/// Incremental decoder with a residue buffer spanning chunk boundaries.
///
/// Feed chunks with [`extend`](Self::extend) and drain complete frames with
/// [`next_frame`](Self::next_frame). Scan state persists across calls, so
/// no byte is examined twice.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
    /// Scan position within `buf`.
    pos: usize,
    /// Offset of the current frame's first byte, once seen.
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl FrameDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of upstream bytes to the residue buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extract the next complete frame, if one is available.
    ///
    /// Returns `Ok(None)` when the residue holds no complete frame yet; a
    /// trailing partial frame stays buffered for the next chunk.
    ///
    /// # Errors
    ///
    /// Returns an error when a frame begins with an unexpected byte.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>, CodecError> {
        while self.pos < self.buf.len() {
            let byte = self.buf[self.pos];

            if self.start.is_none() {
                if byte.is_ascii_whitespace() {
                    self.pos += 1;
                    continue;
                }
                if byte != b'{' && byte != b'[' {
                    return Err(CodecError::InvalidFrameStart(byte));
                }
                self.start = Some(self.pos);
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
            } else {
                match byte {
                    b'"' => self.in_string = true,
                    b'{' | b'[' => self.depth += 1,
                    b'}' | b']' => {
                        self.depth = self.depth.saturating_sub(1);
                        if self.depth == 0 {
                            let start = self.start.take().unwrap_or(0);
                            let end = self.pos + 1;
                            let consumed = self.buf.split_to(end).freeze();
                            self.pos = 0;
                            return Ok(Some(consumed.slice(start..)));
                        }
                    }
                    _ => {}
                }
            }

            self.pos += 1;
        }

        // No frame in progress: everything scanned so far was inter-frame
        // whitespace. Discard it so a quiet upstream cannot grow the residue.
        if self.start.is_none() && self.pos > 0 {
            self.buf.advance(self.pos);
            self.pos = 0;
        }

        Ok(None)
    }

    /// Whether a partially received frame is still buffered.
    #[must_use]
    pub const fn has_partial(&self) -> bool {
        self.start.is_some()
    }
}
