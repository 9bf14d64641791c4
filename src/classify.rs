//! Response classification.
//!
//! Turns the decoded text of an HTTP response into a page title, a server
//! banner and, when the content looks like a camera's web interface, a camera
//! type label. Two independent rule sets exist and are kept apart because each
//! feeds its own scan mode and results file:
//!
//! - [`KeywordClassifier`] inspects the page title for keywords (fast sweeps).
//! - [`SignatureClassifier`] looks for two vendor login-page signatures (live scans).

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel title for responses without a `<title>` element.
pub const NO_TITLE: &str = "No Title Found";

/// Sentinel server for responses without a `Server:` header.
pub const UNKNOWN_SERVER: &str = "Unknown";

/// Exact title markup served by Dahua-family web interfaces.
const WEB_SERVICE_TITLE: &str = "<title>WEB SERVICE</title>";

/// Login page served by Hikvision-family web interfaces.
const HIK_LOGIN_PAGE: &str = "login.asp";

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern is valid")
});

static SERVER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Server: ([^\r\n]+)").expect("server pattern is valid"));

/// Outcome of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub title: String,
    pub server: String,
    /// `None` when the response is not a camera.
    pub camera_type: Option<String>,
}

impl Classification {
    pub fn is_camera(&self) -> bool {
        self.camera_type.is_some()
    }
}

/// A camera detection rule set.
///
/// Implementations are pure: the same text always yields the same result.
pub trait Classifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Classify decoded response text.
    fn classify(&self, text: &str) -> Classification;
}

/// Title-keyword rules, evaluated top to bottom, first match wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn camera_type(title: &str, text: &str) -> Option<&'static str> {
        let title = title.to_lowercase();

        if title.contains("web service") || text.contains(WEB_SERVICE_TITLE) {
            Some("Camera - WEB SERVICE")
        } else if title.contains("web") {
            Some("Camera - WEB")
        } else if title.contains("login") {
            Some("Camera - Login")
        } else if text.contains(HIK_LOGIN_PAGE) {
            Some("Camera - HIK Vision")
        } else if title.contains("dvr") || title.contains("camera") {
            Some("Camera - DVR")
        } else if title.contains("ipcam") || title.contains("ip cam") {
            Some("Camera - IP Camera")
        } else {
            None
        }
    }
}

impl Classifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn classify(&self, text: &str) -> Classification {
        let title = extract_title(text);
        let camera_type = Self::camera_type(&title, text).map(str::to_string);

        Classification {
            title,
            server: extract_server(text),
            camera_type,
        }
    }
}

/// Vendor signature rules for Dahua and Hikvision login pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureClassifier;

impl SignatureClassifier {
    fn camera_type(text: &str) -> Option<&'static str> {
        if !text.contains("HTTP") {
            return None;
        }

        if text.contains(WEB_SERVICE_TITLE) {
            Some("Anjhua-Dahua Technology Camera")
        } else if text.contains(HIK_LOGIN_PAGE) {
            Some("HIK Vision Camera")
        } else {
            None
        }
    }
}

impl Classifier for SignatureClassifier {
    fn name(&self) -> &'static str {
        "signature"
    }

    fn classify(&self, text: &str) -> Classification {
        Classification {
            title: extract_title(text),
            server: extract_server(text),
            camera_type: Self::camera_type(text).map(str::to_string),
        }
    }
}

/// Selectable rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Title keyword heuristics
    Keyword,
    /// Dahua/Hikvision login page signatures
    Signature,
}

impl ClassifierKind {
    /// Instantiate the rule set.
    pub fn build(self) -> Box<dyn Classifier> {
        match self {
            Self::Keyword => Box::new(KeywordClassifier),
            Self::Signature => Box::new(SignatureClassifier),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Signature => write!(f, "signature"),
        }
    }
}

/// Inner text of the first `<title>` element, trimmed.
pub fn extract_title(text: &str) -> String {
    TITLE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Value of the first `Server:` header.
pub fn extract_server(text: &str) -> String {
    SERVER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_SERVER.to_string())
}
