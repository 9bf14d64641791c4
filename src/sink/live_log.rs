//! Append-only results log used by live scans.
//!
//! Each finding becomes one fixed-field block, written in a single call and
//! synced to disk before `append` returns, so a forced stop leaves only
//! complete records behind.

use crate::scanner::Finding;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Rule line delimiting each record.
const RULE: &str = "============================================================";

/// Timestamp layout of the `Detection Time` field.
pub const DETECTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render one record, trailing blank line included.
pub fn format_record(finding: &Finding) -> String {
    format!(
        "{rule}\nCamera Type: {}\nIP Address: {}\nPort: {}\nURL: {}\nDetection Time: {}\n{rule}\n\n",
        finding.camera_type,
        finding.address,
        finding.port,
        finding.url,
        finding.detected_at.format(DETECTION_TIME_FORMAT),
        rule = RULE,
    )
}

/// Lazily opened, append-mode results file.
#[derive(Debug)]
pub struct LiveLog {
    path: PathBuf,
    file: Option<File>,
}

impl LiveLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and flush it to durable storage.
    ///
    /// On failure the handle is dropped so the next record retries the open.
    pub fn append(&mut self, finding: &Finding) -> io::Result<()> {
        let file = match self.file.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?,
        };

        let result = {
            let file = self.file.insert(file);
            file.write_all(format_record(finding).as_bytes())
                .and_then(|()| file.flush())
                .and_then(|()| file.sync_data())
        };

        if result.is_err() {
            self.file = None;
        }
        result
    }
}
