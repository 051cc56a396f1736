//! Frame-level access to a streaming response body
//!
//! `reqwest::Response::chunk()` hides HTTP trailers, but the servers this
//! client talks to put their authoritative error message there when a failure
//! happens after the status line was sent. [`ResponseStream`] reads the body
//! frame by frame, hands data frames to the caller as they arrive, and keeps
//! the trailer frame for [`DiagnosticSource::recover_diagnostic`].

use crate::diagnostics::{DiagnosticSource, diagnostic_from_trailers};
use crate::error::{BoxError, Error, Result};
use bytes::Bytes;
use http::HeaderMap;
use http_body::Body;
use http_body_util::BodyExt;

/// Upper bound on body bytes discarded while looking for trailers
pub(crate) const MAX_DRAIN_BYTES: usize = 8 * 1024 * 1024;

/// Streaming response body with trailer capture
pub(crate) struct ResponseStream<B> {
    body: B,
    endpoint: String,
    trailers: Option<HeaderMap>,
    finished: bool,
}

impl<B> ResponseStream<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    pub(crate) fn new(body: B, endpoint: impl Into<String>) -> Self {
        Self {
            body,
            endpoint: endpoint.into(),
            trailers: None,
            finished: false,
        }
    }

    /// Next data chunk, or `None` at end of body
    ///
    /// Trailer frames are stored rather than returned.
    pub(crate) async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        while !self.finished {
            match self.body.frame().await {
                None => self.finished = true,
                Some(Err(e)) => {
                    self.finished = true;
                    return Err(Error::transport(self.endpoint.clone(), e));
                }
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) if data.is_empty() => {}
                    Ok(data) => return Ok(Some(data)),
                    Err(frame) => {
                        if let Ok(trailers) = frame.into_trailers() {
                            self.trailers = Some(trailers);
                        }
                    }
                },
            }
        }
        Ok(None)
    }

    /// Discard the rest of the body so the trailers (if any) are read
    ///
    /// Stops after [`MAX_DRAIN_BYTES`] or on the first transport error; either
    /// way the caller already has a failure to report.
    pub(crate) async fn drain(&mut self) {
        let mut discarded = 0usize;
        while discarded <= MAX_DRAIN_BYTES {
            match self.next_chunk().await {
                Ok(Some(chunk)) => discarded += chunk.len(),
                Ok(None) | Err(_) => return,
            }
        }
        tracing::debug!(
            endpoint = %self.endpoint,
            discarded,
            "Gave up draining response body while looking for trailers"
        );
    }

    /// Trailers received so far
    pub(crate) fn trailers(&self) -> Option<&HeaderMap> {
        self.trailers.as_ref()
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl<B> DiagnosticSource for ResponseStream<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    fn recover_diagnostic(&self) -> Option<String> {
        self.trailers().and_then(diagnostic_from_trailers)
    }
}
