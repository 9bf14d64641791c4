//! # camsweep - Concurrent IP Camera Discovery
//!
//! camsweep probes HTTP ports across an IPv4 range and flags endpoints whose
//! responses look like camera, DVR or NVR web interfaces.
//!
//! ## Features
//!
//! - **Two scan modes**: a fast batch scan and a live scan that writes each
//!   finding to disk as it is found
//! - **Cooperative control**: stop with Ctrl+C, pause and resume with Ctrl+Z
//! - **Flexible targeting**: single addresses, start/end ranges and CIDR blocks
//! - **Reports**: plain text, JSON and CSV
//! - **Network helpers**: local address, default gateway and trace route
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use camsweep::scanner::{run_scan, HttpProbe, ScanControl, ScanJob, ScanMode};
//! use camsweep::sink::{FindingEcho, ResultsSink, SinkMode};
//! use camsweep::types::{AddressRange, PortList};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mode = ScanMode::Fast;
//!     let (range, _) = AddressRange::parse("192.168.1.1", Some("192.168.1.254")).unwrap();
//!     let job = ScanJob::new(mode, range, PortList::default(), 200);
//!
//!     let control = ScanControl::new();
//!     let probe = Arc::new(HttpProbe::new(
//!         mode.probe_config(),
//!         mode.classifier().build(),
//!         mode.url_style(),
//!         control.clone(),
//!     ));
//!     let sink = Arc::new(ResultsSink::new(SinkMode::Batch, FindingEcho::Console));
//!
//!     let summary = run_scan(job, probe, sink, control, None).await;
//!     println!("{} cameras found", summary.findings.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Address ranges, port lists and work items
//! - [`classify`] - Response classifiers
//! - [`scanner`] - Worker pool, probe and control plane
//! - [`sink`] - Deduplicating results collector and live log
//! - [`config`] - Settings
//! - [`output`] - Console output and batch reports
//! - [`error`] - Error types

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod signals;
pub mod sink;
pub mod system;
pub mod trace;
pub mod types;

// Re-export commonly used types
pub use classify::{Classifier, ClassifierKind};
pub use error::{CliError, ProbeError};
pub use scanner::{Finding, Probe, ScanControl, ScanMode};
pub use types::{AddressRange, PortList, WorkItem};
