//! Batch report written after a fast scan.

use crate::error::{ReportError, ReportResult};
use crate::scanner::{Finding, ScanMode, ScanSummary};
use crate::types::RunId;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

const HEAVY_RULE: &str = "============================================================";
const LIGHT_RULE: &str = "------------------------------------------------------------";

/// Report file encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text blocks
    #[default]
    Plain,
    /// JSON document
    Json,
    /// CSV table, one row per finding
    Csv,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    run_id: RunId,
    mode: ScanMode,
    range: String,
    generated_at: DateTime<Local>,
    findings: &'a [Finding],
}

/// Render findings in the plain text layout.
pub fn render_plain(findings: &[Finding]) -> String {
    let mut out = format!("{HEAVY_RULE}\nCAMERA SCAN - CAMERAS FOUND\n{HEAVY_RULE}\n\n");
    for f in findings {
        out.push_str(&format!(
            "IP: {}:{}\nTitle: {}\nServer: {}\nType: {}\nURL: {}\n{LIGHT_RULE}\n\n",
            f.address, f.port, f.title, f.server, f.camera_type, f.url
        ));
    }
    out
}

/// Render the run as a JSON document.
pub fn render_json(summary: &ScanSummary) -> ReportResult<String> {
    let doc = ReportDocument {
        run_id: summary.run_id,
        mode: summary.mode,
        range: summary.range.to_string(),
        generated_at: Local::now(),
        findings: &summary.findings,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Render findings as CSV with a header row.
pub fn render_csv(findings: &[Finding]) -> ReportResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for finding in findings {
        wtr.serialize(finding)?;
    }
    wtr.into_inner()
        .map_err(|e| ReportError::Csv(csv::Error::from(e.into_error())))
}

/// Write the report for `summary` to `path`, replacing any previous file.
pub fn write_report(path: &Path, summary: &ScanSummary, format: ReportFormat) -> ReportResult<()> {
    let bytes = match format {
        ReportFormat::Plain => render_plain(&summary.findings).into_bytes(),
        ReportFormat::Json => render_json(summary)?.into_bytes(),
        ReportFormat::Csv => render_csv(&summary.findings)?,
    };

    fs::write(path, bytes).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddressRange, WorkItem};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn summary() -> ScanSummary {
        let findings = vec![
            Finding::new(
                WorkItem::new(Ipv4Addr::new(192, 168, 1, 10), 80),
                "Network Camera",
                "Boa/0.94",
                "http://192.168.1.10",
                "Camera - Network Camera",
            ),
            Finding::new(
                WorkItem::new(Ipv4Addr::new(192, 168, 1, 11), 8080),
                "No Title Found",
                "Unknown",
                "http://192.168.1.11:8080",
                "Camera - Login",
            ),
        ];
        ScanSummary {
            run_id: RunId::new(),
            mode: ScanMode::Fast,
            range: AddressRange::single(Ipv4Addr::new(192, 168, 1, 10)),
            addresses: 1,
            queued: 2,
            processed: 2,
            findings,
            elapsed: Duration::from_millis(10),
            stopped: false,
        }
    }

    #[test]
    fn test_plain_layout() {
        let text = render_plain(&summary().findings);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], HEAVY_RULE);
        assert_eq!(lines[1], "CAMERA SCAN - CAMERAS FOUND");
        assert_eq!(lines[2], HEAVY_RULE);
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "IP: 192.168.1.10:80");
        assert_eq!(lines[5], "Title: Network Camera");
        assert_eq!(lines[6], "Server: Boa/0.94");
        assert_eq!(lines[7], "Type: Camera - Network Camera");
        assert_eq!(lines[8], "URL: http://192.168.1.10");
        assert_eq!(lines[9], LIGHT_RULE);
        assert_eq!(lines[10], "");
        assert_eq!(lines[11], "IP: 192.168.1.11:8080");
        assert_eq!(LIGHT_RULE.len(), 60);
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["mode"], "fast");
        assert_eq!(value["range"], "192.168.1.10");
        assert_eq!(value["findings"].as_array().unwrap().len(), 2);
        assert_eq!(value["findings"][1]["url"], "http://192.168.1.11:8080");
    }

    #[test]
    fn test_csv_report() {
        let bytes = render_csv(&summary().findings).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("address,port,title,server,url,camera_type,detected_at")
        );
        assert!(lines.next().unwrap().starts_with("192.168.1.10,80,Network Camera,Boa/0.94,"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_write_report_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SuperFastScan_Results.txt");
        fs::write(&path, "stale").unwrap();

        write_report(&path, &summary(), ReportFormat::Plain).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HEAVY_RULE));
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_write_report_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.json");

        let err = write_report(&path, &summary(), ReportFormat::Json).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
