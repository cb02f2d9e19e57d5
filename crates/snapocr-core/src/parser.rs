//! Extraction of recognized text from the engine's console output.
//!
//! The engine writes text and diagnostics to the same console and signals
//! failure in-band, so the exit status says nothing about success. All
//! decisions here are made on raw bytes first because the output is not
//! guaranteed to be UTF-8.

use encoding_rs::Encoding;
use snapocr_config::markers::MarkerConfig;
use snapocr_types::OcrOutcome;

use crate::error::{OcrError, Result};

/// Captured engine streams, kept apart until [`OutputParser::combine`]
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct OutputParser {
    markers: MarkerConfig,
    fallback: &'static Encoding,
}

impl OutputParser {
    pub fn new(markers: MarkerConfig) -> Self {
        let fallback = Encoding::for_label(markers.fallback_encoding.as_bytes()).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown fallback encoding '{}', using GBK",
                markers.fallback_encoding
            );
            encoding_rs::GBK
        });

        Self { markers, fallback }
    }

    /// Join both streams with provenance markers into one buffer
    pub fn combine(&self, output: &RawOutput) -> Vec<u8> {
        let stdout_marker = self.markers.stdout_marker.as_bytes();
        let stderr_marker = self.markers.stderr_marker.as_bytes();

        let mut buffer = Vec::with_capacity(
            stdout_marker.len() + output.stdout.len() + stderr_marker.len() + output.stderr.len(),
        );
        buffer.extend_from_slice(stdout_marker);
        buffer.extend_from_slice(&output.stdout);
        buffer.extend_from_slice(stderr_marker);
        buffer.extend_from_slice(&output.stderr);
        buffer
    }

    /// Recognized text, or the empty sentinel when nothing usable remains
    pub fn parse(&self, raw: &[u8]) -> String {
        let mut bytes = raw;

        if let Some(pos) = find(bytes, self.markers.error_marker.as_bytes()) {
            bytes = &bytes[..pos];
        }

        if let Some(rest) = bytes.strip_prefix(self.markers.stdout_marker.as_bytes()) {
            bytes = rest;
        }

        if let Some(pos) = find(bytes, self.markers.detect_marker.as_bytes()) {
            bytes = match bytes[pos..].iter().position(|&b| b == b'\n') {
                Some(newline) => &bytes[pos + newline + 1..],
                None => &[],
            };
        }

        let text = self.decode(bytes);
        let lines: Vec<&str> = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            self.markers.empty_sentinel.clone()
        } else {
            lines.join("\n")
        }
    }

    /// Decide success from the parsed text itself
    pub fn classify(&self, text: String) -> Result<String> {
        if text == self.markers.empty_sentinel {
            return Err(OcrError::RecognitionEmpty(text));
        }
        if !self.markers.failure_marker.is_empty() && text.contains(&self.markers.failure_marker) {
            return Err(OcrError::RecognitionFailed(text));
        }
        Ok(text)
    }

    /// combine, parse and classify in one go
    pub fn outcome(&self, output: &RawOutput) -> OcrOutcome {
        let text = self.parse(&self.combine(output));
        match self.classify(text) {
            Ok(text) => OcrOutcome::Success(text),
            Err(e) => {
                tracing::debug!("Engine reported failure in output: {e}");
                e.into()
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                let (text, had_errors) = self.fallback.decode_without_bom_handling(bytes);
                if had_errors {
                    tracing::debug!(
                        "Output is neither UTF-8 nor clean {}, replaced invalid sequences",
                        self.fallback.name()
                    );
                }
                text.into_owned()
            }
        }
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
