//! Scanner module - the concurrent scan engine.
//!
//! A scan run enumerates work items into a [`WorkQueue`], a fixed pool of
//! workers drains it through a [`Probe`], and positive findings go to a
//! [`ResultsSink`](crate::sink::ResultsSink). A [`ScanControl`] handle gates
//! every stage with cooperative stop and pause.
//!
//! Two scan modes bundle the engine's knobs:
//!
//! | | Fast | Live |
//! |---|---|---|
//! | classifier | keyword | signature |
//! | results | batch report at the end | appended as found |
//! | workers | `min(500, cores × 50)` | 100 |
//! | URL | port shown unless 80 | port shown only for 8080 |

pub mod control;
pub mod pool;
pub mod probe;
pub mod queue;
pub mod traits;

pub use control::ScanControl;
pub use pool::{run_scan, ScanJob, ScanSummary};
pub use probe::{HttpProbe, ProbeConfig, RequestStyle};
pub use queue::WorkQueue;
pub use traits::{Finding, Probe};

use crate::classify::ClassifierKind;
use crate::types::WorkItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Flat worker count used by live scans.
pub const LIVE_WORKERS: usize = 100;

/// Upper bound on auto-scaled worker counts.
pub const MAX_AUTO_WORKERS: usize = 500;

/// Workers started per CPU core when auto-scaling.
pub const WORKERS_PER_CORE: usize = 50;

/// Scan profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Keyword classifier, auto-scaled workers, report written at the end
    Fast,
    /// Signature classifier, fixed workers, results appended as found
    Live,
}

impl ScanMode {
    pub fn classifier(self) -> ClassifierKind {
        match self {
            Self::Fast => ClassifierKind::Keyword,
            Self::Live => ClassifierKind::Signature,
        }
    }

    pub fn url_style(self) -> UrlStyle {
        match self {
            Self::Fast => UrlStyle::OmitDefaultPort,
            Self::Live => UrlStyle::ExplicitAltPort,
        }
    }

    /// Probe timeouts and limits for this mode.
    pub fn probe_config(self) -> ProbeConfig {
        match self {
            Self::Fast => ProbeConfig {
                connect_timeout: Duration::from_millis(500),
                read_timeout: Duration::from_millis(2000),
                max_response_bytes: 30_000,
                request: RequestStyle::TargetHost,
            },
            Self::Live => ProbeConfig {
                connect_timeout: Duration::from_millis(250),
                read_timeout: Duration::from_millis(500),
                max_response_bytes: 4096,
                request: RequestStyle::Generic,
            },
        }
    }

    /// Whether findings are written through to the results log as they occur.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "Fast"),
            Self::Live => write!(f, "Live"),
        }
    }
}

/// How a finding's URL is written. The two modes disagree on when the port
/// appears; both rules are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlStyle {
    /// `http://ip` for port 80, `http://ip:port` otherwise.
    OmitDefaultPort,
    /// `http://ip:port` for port 8080, `http://ip` otherwise.
    ExplicitAltPort,
}

impl UrlStyle {
    pub fn format(self, item: &WorkItem) -> String {
        let show_port = match self {
            Self::OmitDefaultPort => item.port != 80,
            Self::ExplicitAltPort => item.port == 8080,
        };

        if show_port {
            format!("http://{}:{}", item.address, item.port)
        } else {
            format!("http://{}", item.address)
        }
    }
}

/// Worker count that scales with the machine: `per_core` workers per core,
/// capped at `max`.
pub fn auto_workers(cores: usize, per_core: usize, max: usize) -> usize {
    cores.saturating_mul(per_core).min(max).max(1)
}

/// Number of CPU cores available to this process.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
