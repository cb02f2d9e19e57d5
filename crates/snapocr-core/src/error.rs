use std::path::PathBuf;

use snapocr_types::OcrOutcome;

pub type Result<T> = std::result::Result<T, OcrError>;

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Display capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("Invalid crop region ({x1}, {y1}) -> ({x2}, {y2})")]
    InvalidCropRegion { x1: i64, y1: i64, x2: i64, y2: i64 },

    #[error("OCR engine not found: {}", .0.display())]
    EngineNotFound(PathBuf),

    #[error("Models directory missing: {}", .0.display())]
    ModelsMissing(PathBuf),

    #[error("OCR execution failed: {0}")]
    InvocationFailed(String),

    #[error("{0}")]
    RecognitionEmpty(String),

    #[error("{0}")]
    RecognitionFailed(String),

    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("Missing required files:\n{}", format_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    #[error("Another OCR request is still running")]
    RequestInFlight,
}

impl OcrError {
    /// Only a broken installation stops the program; everything else ends one request
    pub fn is_fatal(&self) -> bool {
        matches!(self, OcrError::MissingFiles(_))
    }

    /// Aborted silently, the user sees nothing but an idle UI again
    pub fn is_silent(&self) -> bool {
        matches!(self, OcrError::InvalidCropRegion { .. })
    }
}

impl From<OcrError> for OcrOutcome {
    fn from(err: OcrError) -> Self {
        OcrOutcome::Failure(err.to_string())
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_lists_every_path() {
        let err = OcrError::MissingFiles(vec![
            PathBuf::from("/a/engine"),
            PathBuf::from("/a/models/det.onnx"),
        ]);
        let message = err.to_string();

        assert!(message.contains("/a/engine"));
        assert!(message.contains("/a/models/det.onnx"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_recognition_errors_carry_engine_text() {
        let outcome: OcrOutcome = OcrError::RecognitionEmpty("no text recognized".into()).into();
        assert_eq!(outcome, OcrOutcome::Failure("no text recognized".into()));
    }

    #[test]
    fn test_only_invalid_crop_is_silent() {
        let crop = OcrError::InvalidCropRegion {
            x1: 5,
            y1: 5,
            x2: 5,
            y2: 9,
        };
        assert!(crop.is_silent());
        assert!(!crop.is_fatal());
        assert!(!OcrError::CaptureUnavailable("x".into()).is_silent());
    }
}
