//! idcapture configuration schema, typed for serde YAML/JSON deserialization.
//!
//! Every leaf is optional in the file; [`crate::defaults`] fills the gaps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCaptureConfig {
    /// Document extraction (vision model) settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Where records are persisted
    #[serde(default)]
    pub backend: BackendConfig,

    /// Form behaviour
    #[serde(default)]
    pub form: FormConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Inference API credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Which persistence backend is active. Exactly one is used per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Mock,
    Remote,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => f.write_str("mock"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend \"{other}\" (expected mock or remote)")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Script endpoint URL (remote backend only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Simulated latency of the mock backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_latency_ms: Option<u64>,

    /// Seed the mock table with the sample record VAE99999
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_sample_record: Option<bool>,
}

// ---------------------------------------------------------------------------
// Form / logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    /// Delay before a successful form is cleared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_delay_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for the rolling NDJSON log file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}
