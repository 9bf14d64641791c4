//! Worker pool and scheduler.
//!
//! Workers start before enumeration does, so probing overlaps with queueing.
//! Each worker loops on a timed dequeue, probes, and hands positives to the
//! sink. The run ends when the queue is closed and drained, or when a stop is
//! requested and the grace period for in-flight probes has passed.

use crate::scanner::control::ScanControl;
use crate::scanner::queue::WorkQueue;
use crate::scanner::traits::{Finding, Probe};
use crate::scanner::ScanMode;
use crate::sink::ResultsSink;
use crate::types::{AddressRange, PortList, RunId};
use futures::future::join_all;
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Bounded wait for one dequeue attempt.
const DEQUEUE_WAIT: Duration = Duration::from_millis(500);

/// Items queued between cooperative yields while enumerating.
const ENQUEUE_BATCH: u64 = 1024;

/// Everything one scan run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub run_id: RunId,
    pub mode: ScanMode,
    pub range: AddressRange,
    pub ports: PortList,
    pub workers: usize,
    /// Time allowed for in-flight probes after a stop.
    pub grace: Duration,
}

impl ScanJob {
    pub fn new(mode: ScanMode, range: AddressRange, ports: PortList, workers: usize) -> Self {
        Self {
            run_id: RunId::new(),
            mode,
            range,
            ports,
            workers: workers.max(1),
            grace: Duration::from_secs(1),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Total number of work items the range expands to.
    pub fn work_items(&self) -> u64 {
        self.range.len() * self.ports.len() as u64
    }
}

/// Outcome of a scan run.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub run_id: RunId,
    pub mode: ScanMode,
    pub range: AddressRange,
    pub addresses: u64,
    pub queued: u64,
    pub processed: u64,
    pub findings: Vec<Finding>,
    pub elapsed: Duration,
    /// True when the run ended on a stop request rather than a drained queue.
    pub stopped: bool,
}

impl ScanSummary {
    /// Probes completed per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

struct WorkerContext {
    queue: Arc<WorkQueue>,
    probe: Arc<dyn Probe>,
    sink: Arc<ResultsSink>,
    control: ScanControl,
    processed: Arc<AtomicU64>,
    progress: Option<ProgressBar>,
}

impl Clone for WorkerContext {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            probe: Arc::clone(&self.probe),
            sink: Arc::clone(&self.sink),
            control: self.control.clone(),
            processed: Arc::clone(&self.processed),
            progress: self.progress.clone(),
        }
    }
}

/// Execute a complete scan run.
#[tracing::instrument(skip_all, fields(run = %job.run_id.short(), mode = %job.mode))]
pub async fn run_scan(
    job: ScanJob,
    probe: Arc<dyn Probe>,
    sink: Arc<ResultsSink>,
    control: ScanControl,
    progress: Option<ProgressBar>,
) -> ScanSummary {
    let started = Instant::now();
    let queue = Arc::new(WorkQueue::new());
    let processed = Arc::new(AtomicU64::new(0));

    let ctx = WorkerContext {
        queue: Arc::clone(&queue),
        probe,
        sink: Arc::clone(&sink),
        control: control.clone(),
        processed: Arc::clone(&processed),
        progress,
    };

    info!(range = %job.range, workers = job.workers, items = job.work_items(), "starting scan");

    let handles: Vec<JoinHandle<()>> = (0..job.workers)
        .map(|id| tokio::spawn(worker(id, ctx.clone())))
        .collect();

    let queued = enqueue(&job, &queue, &control).await;
    queue.close();
    debug!(queued, "enumeration complete");

    drain(handles, &control, job.grace).await;

    let summary = ScanSummary {
        run_id: job.run_id,
        mode: job.mode,
        range: job.range,
        addresses: job.range.len(),
        queued,
        processed: processed.load(Ordering::Relaxed),
        findings: sink.findings(),
        elapsed: started.elapsed(),
        stopped: control.is_stopped(),
    };

    info!(
        processed = summary.processed,
        findings = summary.findings.len(),
        stopped = summary.stopped,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "scan finished"
    );

    summary
}

/// Feed every work item into the queue, stopping early on request.
async fn enqueue(job: &ScanJob, queue: &WorkQueue, control: &ScanControl) -> u64 {
    let mut queued = 0u64;

    for item in job.range.work_items(job.ports.as_slice()) {
        if control.is_stopped() {
            debug!(queued, "stop requested during enumeration");
            break;
        }
        queue.push(item);
        queued += 1;
        if queued % ENQUEUE_BATCH == 0 {
            tokio::task::yield_now().await;
        }
    }

    queued
}

/// Wait for workers to finish. After a stop, in-flight probes get `grace`
/// to complete before the remaining workers are aborted.
async fn drain(handles: Vec<JoinHandle<()>>, control: &ScanControl, grace: Duration) {
    let aborts: Vec<_> = handles.iter().map(JoinHandle::abort_handle).collect();
    let mut joined = Box::pin(join_all(handles));

    tokio::select! {
        _ = &mut joined => {}
        _ = control.stopped() => {
            if tokio::time::timeout(grace, &mut joined).await.is_err() {
                warn!(grace_ms = grace.as_millis() as u64, "workers still busy after grace period, abandoning them");
                for abort in &aborts {
                    abort.abort();
                }
            }
        }
    }
}

async fn worker(id: usize, ctx: WorkerContext) {
    let mut handled = 0u64;

    loop {
        if ctx.control.is_stopped() {
            break;
        }
        // Wait before dequeuing so a paused worker holds no item.
        if ctx.control.is_paused() && !ctx.control.wait_while_paused().await {
            break;
        }

        let Some(item) = ctx.queue.pop_timeout(DEQUEUE_WAIT).await else {
            if ctx.queue.is_closed() && ctx.queue.is_empty() {
                break;
            }
            continue;
        };

        match ctx.probe.probe(item).await {
            Ok(Some(finding)) => {
                ctx.sink.record(finding);
            }
            Ok(None) => {}
            Err(e) => trace!(%item, error = %e, "probe failed"),
        }

        handled += 1;
        ctx.processed.fetch_add(1, Ordering::Relaxed);
        if let Some(pb) = &ctx.progress {
            pb.inc(1);
        }
    }

    trace!(worker = id, handled, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProbeError, ProbeResult};
    use crate::sink::{FindingEcho, SinkMode};
    use crate::types::WorkItem;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    /// Flags every address ending in a multiple of ten as a camera on every
    /// port, and records which items it saw.
    #[derive(Default)]
    struct FakeProbe {
        seen: Mutex<Vec<WorkItem>>,
        delay: Duration,
    }

    #[async_trait]
    impl Probe for FakeProbe {
        async fn probe(&self, item: WorkItem) -> ProbeResult<Option<Finding>> {
            self.seen.lock().unwrap().push(item);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if item.address.octets()[3] % 10 == 0 {
                Ok(Some(Finding::new(item, "DVR", "Unknown", "http://x", "Camera - DVR")))
            } else {
                Err(ProbeError::ConnectRefused)
            }
        }
    }

    /// Requests a stop on its first call, then dawdles.
    struct StoppingProbe {
        control: ScanControl,
    }

    #[async_trait]
    impl Probe for StoppingProbe {
        async fn probe(&self, _item: WorkItem) -> ProbeResult<Option<Finding>> {
            self.control.request_stop();
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(None)
        }
    }

    fn range(start: &str, end: &str) -> AddressRange {
        AddressRange::parse(start, Some(end)).unwrap().0
    }

    fn batch_sink() -> Arc<ResultsSink> {
        Arc::new(ResultsSink::new(SinkMode::Batch, FindingEcho::Silent))
    }

    #[tokio::test]
    async fn test_every_item_probed_once() {
        let probe = Arc::new(FakeProbe::default());
        let job = ScanJob::new(ScanMode::Fast, range("10.0.0.1", "10.0.0.50"), PortList::default(), 8);
        assert_eq!(job.work_items(), 100);

        let summary = run_scan(job, probe.clone(), batch_sink(), ScanControl::new(), None).await;

        let seen = probe.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 100);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 100);
        assert_eq!(summary.queued, 100);
        assert_eq!(summary.processed, 100);
        assert_eq!(summary.addresses, 50);
        assert!(!summary.stopped);
    }

    #[tokio::test]
    async fn test_findings_deduplicated_by_address() {
        let probe = Arc::new(FakeProbe::default());
        let job = ScanJob::new(ScanMode::Fast, range("10.0.0.1", "10.0.0.30"), PortList::default(), 4);

        let summary = run_scan(job, probe, batch_sink(), ScanControl::new(), None).await;

        // .10, .20 and .30 answer on both ports but count once each.
        let mut addresses: Vec<Ipv4Addr> = summary.findings.iter().map(|f| f.address).collect();
        addresses.sort();
        assert_eq!(
            addresses,
            vec![
                Ipv4Addr::new(10, 0, 0, 10),
                Ipv4Addr::new(10, 0, 0, 20),
                Ipv4Addr::new(10, 0, 0, 30)
            ]
        );
    }

    #[tokio::test]
    async fn test_stop_bounds_dequeues_by_worker_count() {
        let control = ScanControl::new();
        let probe = Arc::new(StoppingProbe {
            control: control.clone(),
        });
        let workers = 4;
        let job = ScanJob::new(ScanMode::Live, range("10.0.0.1", "10.0.0.200"), PortList::default(), workers)
            .with_grace(Duration::from_secs(2));

        let sink = batch_sink();
        let summary = run_scan(job, probe, sink, control, None).await;

        assert!(summary.stopped);
        assert!(summary.processed >= 1);
        assert!(summary.processed <= workers as u64, "processed {}", summary.processed);
    }

    #[tokio::test]
    async fn test_stop_before_start_probes_nothing() {
        let control = ScanControl::new();
        control.request_stop();
        let probe = Arc::new(FakeProbe::default());
        let job = ScanJob::new(ScanMode::Fast, range("10.0.0.1", "10.0.0.9"), PortList::default(), 2);

        let summary = run_scan(job, probe.clone(), batch_sink(), control, None).await;

        assert!(probe.seen.lock().unwrap().is_empty());
        assert_eq!(summary.queued, 0);
        assert!(summary.stopped);
    }

    #[tokio::test]
    async fn test_grace_period_abandons_slow_workers() {
        let control = ScanControl::new();
        let probe = Arc::new(FakeProbe {
            delay: Duration::from_secs(30),
            ..FakeProbe::default()
        });
        let job = ScanJob::new(ScanMode::Fast, range("10.0.0.1", "10.0.0.4"), PortList::default(), 2)
            .with_grace(Duration::from_millis(100));

        let stopper = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.request_stop();
        });

        let summary = tokio::time::timeout(
            Duration::from_secs(5),
            run_scan(job, probe, batch_sink(), control, None),
        )
        .await
        .expect("run should end shortly after the grace period");

        assert!(summary.stopped);
        assert_eq!(summary.processed, 0);
    }

    #[tokio::test]
    async fn test_paused_run_resumes() {
        let control = ScanControl::new();
        control.toggle_pause();

        struct PausingProbe {
            control: ScanControl,
            inner: FakeProbe,
        }

        #[async_trait]
        impl Probe for PausingProbe {
            async fn probe(&self, item: WorkItem) -> ProbeResult<Option<Finding>> {
                if !self.control.wait_while_paused().await {
                    return Ok(None);
                }
                self.inner.probe(item).await
            }
        }

        let probe = Arc::new(PausingProbe {
            control: control.clone(),
            inner: FakeProbe::default(),
        });
        let job = ScanJob::new(ScanMode::Live, range("10.0.0.1", "10.0.0.10"), PortList::default(), 3);

        let resumer = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            resumer.toggle_pause();
        });

        let summary = run_scan(job, probe, batch_sink(), control, None).await;
        assert!(summary.elapsed >= Duration::from_millis(50));
        assert_eq!(summary.processed, 20);
        assert_eq!(summary.findings.len(), 1);
        assert!(!summary.stopped);
    }
}
