use serde::{Deserialize, Serialize};

fn default_stdout_marker() -> String {
    "[STDOUT]\n".to_string()
}

fn default_stderr_marker() -> String {
    "\n[STDERR]\n".to_string()
}

fn default_error_marker() -> String {
    "[STDERR]".to_string()
}

fn default_detect_marker() -> String {
    "FullDetectTime".to_string()
}

fn default_failure_marker() -> String {
    "recognition failed".to_string()
}

fn default_empty_sentinel() -> String {
    "no text recognized".to_string()
}

fn default_fallback_encoding() -> String {
    "GBK".to_string()
}

/// Literal tokens used to demarcate and classify engine output.
///
/// These depend on the engine build; a different engine version only needs a
/// different profile, not new code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Prepended to captured stdout
    #[serde(default = "default_stdout_marker")]
    pub stdout_marker: String,
    /// Inserted between stdout and stderr
    #[serde(default = "default_stderr_marker")]
    pub stderr_marker: String,
    /// Everything from the first occurrence on is diagnostics
    #[serde(default = "default_error_marker")]
    pub error_marker: String,
    /// Start of the timing line printed before the recognized text
    #[serde(default = "default_detect_marker")]
    pub detect_marker: String,
    /// Engine reports failure in-band with this text
    #[serde(default = "default_failure_marker")]
    pub failure_marker: String,
    /// Returned when nothing survives parsing
    #[serde(default = "default_empty_sentinel")]
    pub empty_sentinel: String,
    /// WHATWG label tried when the output is not UTF-8
    #[serde(default = "default_fallback_encoding")]
    pub fallback_encoding: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            stdout_marker: default_stdout_marker(),
            stderr_marker: default_stderr_marker(),
            error_marker: default_error_marker(),
            detect_marker: default_detect_marker(),
            failure_marker: default_failure_marker(),
            empty_sentinel: default_empty_sentinel(),
            fallback_encoding: default_fallback_encoding(),
        }
    }
}
