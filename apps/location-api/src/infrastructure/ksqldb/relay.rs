//! Push Query Relay
//!
//! Bridges one upstream chunked response to one downstream event stream,
//! frame by frame, with no full-body buffering. Each downstream request
//! owns exactly one [`PushSession`]: the upstream chunk stream, the frame
//! decoder residue, and the header-consumed flag. Nothing is shared or
//! pooled across sessions.
//!
//! # Session lifecycle
//!
//! `AwaitingHeader -> Streaming -> Closed`. `Closed` is reached from either
//! state on upstream EOF, upstream error, or downstream cancellation; no
//! transition returns to `AwaitingHeader`. Dropping the event stream drops
//! the upstream chunk stream with it, which closes the upstream connection
//! without draining it.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde_json::Value;

use super::codec::FrameDecoder;
use super::frames::PushHeader;
use crate::domain::location::VehicleLocation;

/// Boxed stream of relayed vehicle events, one per upstream data frame.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<VehicleLocation, RelayError>> + Send>>;

/// Errors terminating a push session.
///
/// All are fatal to the current session only; events already forwarded are
/// not retracted, and other sessions are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Transport failure while the stream was open.
    #[error("upstream transport error: {0}")]
    Transport(String),

    /// The upstream broke the header-then-data framing contract.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// A frame's content could not be decoded into the expected shape.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// No upstream data arrived within the idle window.
    #[error("no upstream data within {}s", .0.as_secs())]
    UpstreamTimeout(Duration),
}

/// Per-session relay state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Nothing decoded yet; the next frame must be query metadata.
    AwaitingHeader,
    /// Header consumed; every further frame is a data row.
    Streaming,
    /// Terminal: upstream ended, errored, or the consumer went away.
    Closed,
}

/// One push query session: upstream chunks in, vehicle events out.
///
/// Generic over the chunk stream so the relay core can be exercised
/// without a network connection.
pub struct PushSession<S> {
    chunks: S,
    decoder: FrameDecoder,
    state: SessionState,
    frames_seen: u64,
    idle_timeout: Duration,
}

impl<S, E> PushSession<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    /// Create a session over an upstream chunk stream.
    pub fn new(chunks: S, idle_timeout: Duration) -> Self {
        Self {
            chunks,
            decoder: FrameDecoder::new(),
            state: SessionState::AwaitingHeader,
            frames_seen: 0,
            idle_timeout,
        }
    }

    /// Await the next vehicle event.
    ///
    /// Returns `Ok(None)` on clean upstream EOF. Any error closes the
    /// session; subsequent calls return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// See [`RelayError`] for the termination causes.
    pub async fn next_event(&mut self) -> Result<Option<VehicleLocation>, RelayError> {
        loop {
            if self.state == SessionState::Closed {
                return Ok(None);
            }

            if let Some(event) = self.decode_available()? {
                return Ok(Some(event));
            }

            // Residue exhausted; wait for the next chunk.
            let Ok(chunk) = tokio::time::timeout(self.idle_timeout, self.chunks.next()).await
            else {
                self.state = SessionState::Closed;
                return Err(RelayError::UpstreamTimeout(self.idle_timeout));
            };

            match chunk {
                Some(Ok(bytes)) => self.decoder.extend(&bytes),
                Some(Err(e)) => {
                    self.state = SessionState::Closed;
                    return Err(RelayError::Transport(e.to_string()));
                }
                None => return self.finish(),
            }
        }
    }

    /// Turn the session into a lazy, unbounded, single-pass event stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<VehicleLocation, RelayError>> {
        futures_util::stream::try_unfold(self, |mut session| async move {
            let event = session.next_event().await?;
            Ok(event.map(|event| (event, session)))
        })
    }

    /// Drain complete frames already sitting in the decoder.
    fn decode_available(&mut self) -> Result<Option<VehicleLocation>, RelayError> {
        loop {
            let frame = match self.decoder.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => return Ok(None),
                Err(e) => {
                    self.state = SessionState::Closed;
                    return Err(RelayError::MalformedFrame(e.to_string()));
                }
            };

            self.frames_seen += 1;

            match self.state {
                SessionState::AwaitingHeader => match serde_json::from_slice::<PushHeader>(&frame)
                {
                    Ok(header) => {
                        tracing::debug!(
                            query_id = header.query_id.as_deref().unwrap_or_default(),
                            columns = header.column_names.len(),
                            "push query header consumed"
                        );
                        self.state = SessionState::Streaming;
                    }
                    Err(e) => {
                        self.state = SessionState::Closed;
                        return Err(RelayError::ProtocolViolation(format!(
                            "first frame is not query metadata: {e}"
                        )));
                    }
                },
                SessionState::Streaming => {
                    let columns: Vec<Value> = match serde_json::from_slice(&frame) {
                        Ok(columns) => columns,
                        Err(e) => {
                            self.state = SessionState::Closed;
                            return Err(RelayError::MalformedFrame(format!(
                                "row frame is not a JSON array: {e}"
                            )));
                        }
                    };
                    let Some(event) = VehicleLocation::from_columns(&columns) else {
                        self.state = SessionState::Closed;
                        return Err(RelayError::MalformedFrame(format!(
                            "row has {} columns, expected at least 2",
                            columns.len()
                        )));
                    };
                    return Ok(Some(event));
                }
                SessionState::Closed => return Ok(None),
            }
        }
    }

    /// Handle upstream EOF.
    fn finish(&mut self) -> Result<Option<VehicleLocation>, RelayError> {
        let awaiting_header = self.state == SessionState::AwaitingHeader;
        self.state = SessionState::Closed;

        if awaiting_header {
            return Err(RelayError::ProtocolViolation(
                "upstream closed before the header frame".to_string(),
            ));
        }
        if self.decoder.has_partial() {
            return Err(RelayError::MalformedFrame(
                "truncated frame at end of stream".to_string(),
            ));
        }

        tracing::debug!(frames = self.frames_seen, "push session ended cleanly");
        Ok(None)
    }
}
