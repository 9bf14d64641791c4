//! Scan subcommand implementation.
//!
//! Handles `camsweep scan` and the scan entry of the interactive menu. Both
//! build a [`ScanPlan`] and hand it to [`run_plan`].

use crate::classify::ClassifierKind;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::{self, ReportFormat};
use crate::scanner::{
    auto_workers, available_cores, run_scan, HttpProbe, ProbeConfig, ScanControl, ScanJob,
    ScanMode, ScanSummary,
};
use crate::signals;
use crate::sink::{FindingEcho, ResultsSink, SinkMode};
use crate::types::{AddressRange, PortList};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Scan an IPv4 range for camera web interfaces.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// First address of the range
    ///
    /// Examples:
    ///   192.168.1.1                  Single IP address
    ///   192.168.1.1 192.168.1.255    Inclusive range
    #[arg(value_name = "START", required_unless_present = "cidr")]
    pub start: Option<String>,

    /// Last address of the range (omit for a single address)
    #[arg(value_name = "END")]
    pub end: Option<String>,

    /// Scan a CIDR block instead of START/END (e.g., 192.168.1.0/24)
    #[arg(long, value_name = "CIDR", conflicts_with_all = ["start", "end"])]
    pub cidr: Option<String>,

    /// Scan mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ScanMode>,

    /// Override the mode's classifier
    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierKind>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Ports to probe (e.g., "80,8080", "80,8000-8010")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Results file (live log or batch report, depending on mode)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Batch report format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Connection timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub read_timeout: Option<u64>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let plan = self.plan(settings)?;
        run_plan(plan, quiet).await?;
        Ok(())
    }

    /// Resolve arguments against `settings` into a runnable plan.
    pub fn plan(&self, settings: &AppSettings) -> CliResult<ScanPlan> {
        let range = match (&self.cidr, &self.start) {
            (Some(cidr), _) => AddressRange::parse_cidr(cidr)?,
            (None, Some(start)) => {
                let (range, warning) = AddressRange::parse(start, self.end.as_deref())?;
                if let Some(w) = warning {
                    output::print_warning(&w.to_string());
                }
                range
            }
            (None, None) => {
                return Err(crate::error::CliError::Other(
                    "a START address or --cidr is required".to_string(),
                ))
            }
        };

        let mode = self.mode.unwrap_or(settings.default_mode);
        let mut plan = ScanPlan::new(settings, mode, range);

        if let Some(ports) = &self.ports {
            plan.job.ports = ports.parse::<PortList>()?;
        }
        if let Some(workers) = self.workers {
            plan.job.workers = workers.max(1);
        }
        if let Some(kind) = self.classifier {
            plan.classifier = kind;
        }
        if let Some(path) = &self.output {
            plan.output = path.clone();
        }
        if let Some(format) = self.format {
            plan.format = format;
        }
        if let Some(ms) = self.connect_timeout {
            plan.probe = plan.probe.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.read_timeout {
            plan.probe = plan.probe.with_read_timeout(Duration::from_millis(ms));
        }

        Ok(plan)
    }
}

/// A fully resolved scan run.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub job: ScanJob,
    pub classifier: ClassifierKind,
    pub probe: ProbeConfig,
    /// Live log in live mode, batch report otherwise.
    pub output: PathBuf,
    pub format: ReportFormat,
}

impl ScanPlan {
    /// Mode defaults, adjusted by `settings`.
    pub fn new(settings: &AppSettings, mode: ScanMode, range: AddressRange) -> Self {
        let workers = if mode.is_live() {
            settings.live_workers
        } else {
            auto_workers(
                available_cores(),
                settings.workers_per_core,
                settings.max_auto_workers,
            )
        };

        let mut probe = mode.probe_config();
        if let Some(t) = settings.connect_timeout() {
            probe = probe.with_connect_timeout(t);
        }
        if let Some(t) = settings.read_timeout() {
            probe = probe.with_read_timeout(t);
        }

        let output = if mode.is_live() {
            settings.live_log_path.clone()
        } else {
            settings.report_path.clone()
        };

        Self {
            job: ScanJob::new(mode, range, PortList::default(), workers)
                .with_grace(settings.grace_period()),
            classifier: mode.classifier(),
            probe,
            output,
            format: settings.report_format,
        }
    }
}

/// Run a plan to completion or until stopped, then report.
///
/// A failed batch report is shown to the operator; the run itself still
/// counts.
pub async fn run_plan(plan: ScanPlan, quiet: bool) -> CliResult<ScanSummary> {
    let ScanPlan {
        job,
        classifier,
        probe,
        output: output_path,
        format,
    } = plan;
    let mode = job.mode;

    let control = ScanControl::new();
    let _signals = signals::install(&control);

    if !quiet {
        output::print_scan_header(&job, available_cores(), Some(&output_path));
        output::print_controls(signals::pause_supported());
    }

    let progress = if quiet {
        None
    } else {
        Some(progress_bar(job.work_items()))
    };
    let echo = match &progress {
        Some(pb) => FindingEcho::Progress(pb.clone()),
        None => FindingEcho::Silent,
    };

    let sink_mode = if mode.is_live() {
        SinkMode::Live(output_path.clone())
    } else {
        SinkMode::Batch
    };
    let sink = Arc::new(ResultsSink::new(sink_mode, echo));
    let probe = Arc::new(HttpProbe::new(
        probe,
        classifier.build(),
        mode.url_style(),
        control.clone(),
    ));

    let summary = run_scan(job, probe, sink, control, progress.clone()).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if !quiet {
        output::print_summary(&summary);
    }

    if summary.findings.is_empty() {
        return Ok(summary);
    }

    if mode.is_live() {
        if !quiet {
            output::print_success(&format!("Results saved to {}", output_path.display()));
        }
    } else {
        match output::write_report(&output_path, &summary, format) {
            Ok(()) => {
                info!(path = %output_path.display(), %format, "report written");
                if !quiet {
                    output::print_success(&format!(
                        "Results saved to {}",
                        output_path.display()
                    ));
                }
            }
            Err(e) => output::print_error(&e.to_string()),
        }
    }

    Ok(summary)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
