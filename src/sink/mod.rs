//! Results sink.
//!
//! Every worker hands its findings here. One mutex guards the dedup set, the
//! in-memory findings and the live log handle, so the first finding for an
//! address wins and later ones are dropped.

mod live_log;

pub use live_log::{format_record, LiveLog, DETECTION_TIME_FORMAT};

use crate::output;
use crate::scanner::Finding;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// When findings reach disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMode {
    /// Append each finding to the given log as soon as it is recorded.
    Live(PathBuf),
    /// Keep findings in memory for a report written after the run.
    Batch,
}

/// Where findings are echoed at detection time.
#[derive(Clone)]
pub enum FindingEcho {
    Silent,
    Console,
    /// Print above an active progress bar.
    Progress(ProgressBar),
}

impl FindingEcho {
    fn show(&self, finding: &Finding) {
        match self {
            Self::Silent => {}
            Self::Console => println!("{}", output::finding_line(finding)),
            Self::Progress(pb) => pb.println(output::finding_line(finding)),
        }
    }
}

#[derive(Debug, Default)]
struct SinkState {
    seen: HashSet<Ipv4Addr>,
    findings: Vec<Finding>,
    live_log: Option<LiveLog>,
}

/// Deduplicating, thread-safe collector of findings for one scan run.
pub struct ResultsSink {
    state: Mutex<SinkState>,
    echo: FindingEcho,
}

impl ResultsSink {
    pub fn new(mode: SinkMode, echo: FindingEcho) -> Self {
        let live_log = match mode {
            SinkMode::Live(path) => Some(LiveLog::new(path)),
            SinkMode::Batch => None,
        };

        Self {
            state: Mutex::new(SinkState {
                live_log,
                ..SinkState::default()
            }),
            echo,
        }
    }

    /// Record a finding. Returns `false` if its address was already credited.
    ///
    /// Log write failures are swallowed: a missing record is preferable to an
    /// aborted scan.
    pub fn record(&self, finding: Finding) -> bool {
        let mut state = self.lock();

        if !state.seen.insert(finding.address) {
            debug!(address = %finding.address, port = finding.port, "duplicate finding dropped");
            return false;
        }

        self.echo.show(&finding);

        if let Some(log) = state.live_log.as_mut() {
            if let Err(e) = log.append(&finding) {
                debug!(path = %log.path().display(), error = %e, "failed to append finding");
            }
        }

        state.findings.push(finding);
        true
    }

    /// Number of distinct addresses recorded.
    pub fn len(&self) -> usize {
        self.lock().findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all findings in detection order.
    pub fn findings(&self) -> Vec<Finding> {
        self.lock().findings.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
