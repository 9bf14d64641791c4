//! HTTP probe.
//!
//! Connects to one (address, port) pair, sends a minimal `GET /`, reads a
//! bounded amount of the response and classifies it. Every socket operation
//! is wrapped in a timeout so a probe can never hang a worker.

use crate::classify::Classifier;
use crate::error::{ProbeError, ProbeResult};
use crate::scanner::control::ScanControl;
use crate::scanner::traits::{Finding, Probe};
use crate::scanner::UrlStyle;
use crate::types::WorkItem;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::trace;

/// Size of each socket read.
const READ_CHUNK: usize = 4096;

/// How the request line and headers are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStyle {
    /// `Host:` set to the target address, `Connection: close` so the peer
    /// ends the response promptly.
    TargetHost,
    /// Fixed `Host: example.com`, connection left to the peer.
    Generic,
}

impl RequestStyle {
    pub fn render(self, item: &WorkItem) -> String {
        match self {
            Self::TargetHost => format!(
                "GET / HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
                item.address
            ),
            Self::Generic => "GET / HTTP/1.1\r\nHost: example.com\r\n\r\n".to_string(),
        }
    }
}

/// Timeouts and limits for one probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub connect_timeout: Duration,
    /// Deadline for the whole read phase, measured from the first read.
    pub read_timeout: Duration,
    /// Reading stops once this many bytes have arrived.
    pub max_response_bytes: usize,
    pub request: RequestStyle,
}

impl ProbeConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Network implementation of [`Probe`].
pub struct HttpProbe {
    config: ProbeConfig,
    classifier: Box<dyn Classifier>,
    url_style: UrlStyle,
    control: ScanControl,
}

impl HttpProbe {
    pub fn new(
        config: ProbeConfig,
        classifier: Box<dyn Classifier>,
        url_style: UrlStyle,
        control: ScanControl,
    ) -> Self {
        Self {
            config,
            classifier,
            url_style,
            control,
        }
    }

    async fn connect(&self, item: &WorkItem) -> ProbeResult<TcpStream> {
        match timeout(self.config.connect_timeout, TcpStream::connect(item.socket_addr())).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(ProbeError::ConnectRefused)
            }
            Ok(Err(e)) => Err(ProbeError::ConnectFailed(e)),
            Err(_) => Err(ProbeError::ConnectTimeout),
        }
    }

    /// Read until the peer closes, the byte ceiling is hit or the deadline
    /// passes. Whatever arrived before a timeout or reset is kept.
    async fn read_response(&self, stream: &mut TcpStream) -> ProbeResult<Vec<u8>> {
        let deadline = Instant::now() + self.config.read_timeout;
        let limit = self.config.max_response_bytes;
        let mut response = Vec::with_capacity(READ_CHUNK.min(limit));
        let mut chunk = [0u8; READ_CHUNK];

        while response.len() < limit {
            match timeout_at(deadline, stream.read(&mut chunk)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => response.extend_from_slice(&chunk[..n]),
                Ok(Err(e)) if response.is_empty() => return Err(ProbeError::ReadFailed(e)),
                Err(_) if response.is_empty() => return Err(ProbeError::ReadTimeout),
                Ok(Err(_)) | Err(_) => break,
            }
        }

        if response.is_empty() {
            return Err(ProbeError::EmptyResponse);
        }
        response.truncate(limit);
        Ok(response)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, item: WorkItem) -> ProbeResult<Option<Finding>> {
        if self.control.is_stopped() {
            return Ok(None);
        }
        if self.control.is_paused() && !self.control.wait_while_paused().await {
            return Ok(None);
        }

        let mut stream = self.connect(&item).await?;
        trace!(%item, "connected");

        let request = self.config.request.render(&item);
        timeout(self.config.connect_timeout, stream.write_all(request.as_bytes()))
            .await
            .map_err(|_| ProbeError::WriteFailed(io::ErrorKind::TimedOut.into()))?
            .map_err(ProbeError::WriteFailed)?;

        let response = self.read_response(&mut stream).await?;
        let text = String::from_utf8_lossy(&response);
        let classification = self.classifier.classify(&text);

        let Some(camera_type) = classification.camera_type else {
            trace!(%item, title = %classification.title, "not a camera");
            return Ok(None);
        };

        Ok(Some(Finding::new(
            item,
            classification.title,
            classification.server,
            self.url_style.format(&item),
            camera_type,
        )))
    }
}
