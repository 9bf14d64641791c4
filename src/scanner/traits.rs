//! Probe trait abstraction and the finding record it produces.
//!
//! The worker pool only talks to [`Probe`], which keeps the scheduling logic
//! testable without a network.

use crate::error::ProbeResult;
use crate::types::WorkItem;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// A positively classified camera endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub address: Ipv4Addr,
    pub port: u16,
    /// Page title, or the "No Title Found" sentinel.
    pub title: String,
    /// `Server:` header value, or "Unknown".
    pub server: String,
    pub url: String,
    pub camera_type: String,
    pub detected_at: DateTime<Local>,
}

impl Finding {
    /// Create a finding stamped with the current local time.
    pub fn new(
        item: WorkItem,
        title: impl Into<String>,
        server: impl Into<String>,
        url: impl Into<String>,
        camera_type: impl Into<String>,
    ) -> Self {
        Self {
            address: item.address,
            port: item.port,
            title: title.into(),
            server: server.into(),
            url: url.into(),
            camera_type: camera_type.into(),
            detected_at: Local::now(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.camera_type, self.url)
    }
}

/// One connect, request, read and classify cycle.
///
/// `Ok(None)` means the endpoint answered but is not a camera, or the probe
/// was abandoned because the scan is stopping.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, item: WorkItem) -> ProbeResult<Option<Finding>>;
}
