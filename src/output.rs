//! JSON output types for CLI responses.
//!
//! Responses carry `status` as their first field and serialize
//! deterministically so callers can script against them.

use serde::{Deserialize, Serialize};

use crate::error::LitfmtError;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Successful run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatReport {
    /// Always `"ok"`.
    pub status: String,
    pub schema_version: String,
    /// Input path as given.
    pub input: String,
    /// Output path, absent in check mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Number of marked regions located.
    pub region_count: usize,
    /// Whether the spliced text differs from the input.
    pub changed: bool,
    pub elapsed_ms: u64,
    pub regions: Vec<RegionReport>,
}

/// Per-region summary, ordered by region index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionReport {
    pub index: usize,
    /// Inner content span in the original text (delimiters excluded).
    pub start: usize,
    pub end: usize,
    /// 1-indexed position of the region start.
    pub line: u32,
    pub col: u32,
    pub old_len: usize,
    pub new_len: usize,
}

/// Error envelope for `--json` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `"error"`.
    pub status: String,
    pub schema_version: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code name (e.g. `"FormatError"`).
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn from_error(err: &LitfmtError) -> Self {
        ErrorEnvelope {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorBody {
                code: err.error_code().name().to_string(),
                message: err.to_string(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
