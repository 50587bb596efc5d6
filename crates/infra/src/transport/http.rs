//! HTTP stream source
//!
//! Opens one streaming POST request per invocation and exposes the response
//! body as a pull-based `ChunkStream`. The adapter performs **no retries of
//! its own**: reconnection is owned exclusively by the recovery manager, so
//! a transport-level retry here would silently multiply the retry budget.
//!
//! Error mapping keeps the message text classifier-compatible: timeouts
//! render as "timed out", connect failures as network errors, and upstream
//! status codes keep their numeric form.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use rivulet_core::ports::{stream_factory, BoxChunkStream, ChunkStream, StreamFactory};
use rivulet_domain::StreamError;
use tracing::debug;

/// Streaming HTTP source for one provider endpoint.
///
/// Each [`HttpStreamSource::open`] call issues a fresh request; wrap the
/// source in a factory via [`HttpStreamSource::into_factory`] to feed a
/// `RecoverableStream`.
pub struct HttpStreamSource {
    client: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
    body: serde_json::Value,
}

impl HttpStreamSource {
    /// Start building a source.
    pub fn builder(url: impl Into<String>) -> HttpStreamSourceBuilder {
        HttpStreamSourceBuilder::new(url)
    }

    /// Open a fresh streaming connection.
    pub async fn open(&self) -> Result<BoxChunkStream, StreamError> {
        let mut request = self.client.post(&self.url).json(&self.body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "stream request answered");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => StreamError::Authentication(message),
                429 => StreamError::RateLimited(message),
                code => StreamError::provider(code, message),
            });
        }

        Ok(Box::new(HttpChunkStream { inner: Box::pin(response.bytes_stream()) }))
    }

    /// Turn this source into a factory for the streaming runtime.
    pub fn into_factory(self) -> StreamFactory {
        let source = Arc::new(self);
        stream_factory(move || {
            let source = Arc::clone(&source);
            async move { source.open().await }
        })
    }
}

/// Builder for [`HttpStreamSource`].
#[derive(Debug)]
pub struct HttpStreamSourceBuilder {
    url: String,
    bearer_token: Option<String>,
    body: serde_json::Value,
    connect_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl HttpStreamSourceBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            body: serde_json::Value::Object(serde_json::Map::new()),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }

    /// Bearer token sent with each request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// JSON request body sent with each request.
    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = body;
        self
    }

    /// Connection establishment timeout (default 10 s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Overall request deadline, covering the entire body stream.
    ///
    /// Unset by default: long-lived streams outlive any sensible total
    /// deadline, and stall detection is the watchdog's job.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpStreamSource, StreamError> {
        let mut client = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        if let Some(timeout) = self.request_timeout {
            client = client.timeout(timeout);
        }
        let client = client
            .build()
            .map_err(|err| StreamError::internal(format!("http client: {err}")))?;

        Ok(HttpStreamSource {
            client,
            url: self.url,
            bearer_token: self.bearer_token,
            body: self.body,
        })
    }
}

/// Pull-based reader over one live response body.
struct HttpChunkStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
}

#[async_trait]
impl ChunkStream for HttpChunkStream {
    async fn next_chunk(&mut self) -> rivulet_domain::Result<Option<Bytes>> {
        match self.inner.next().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(err)) => Err(map_transport_error(err)),
            None => Ok(None),
        }
    }

    async fn release(&mut self) {
        // Dropping the body stream closes the connection.
    }
}

fn map_transport_error(err: reqwest::Error) -> StreamError {
    if err.is_timeout() {
        StreamError::timeout(format!("request timed out: {err}"))
    } else if err.is_connect() {
        StreamError::network(format!("connection failed: {err}"))
    } else {
        StreamError::network(err.to_string())
    }
}
