use std::fmt;
use std::path::PathBuf;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Front end asks for a new OCR request
    TriggerOcr(ImageSource),
    /// Worker progress for a request, consumed by the event loop
    OcrProgress {
        id: RequestId,
        state: RequestState,
    },
    /// Worker finished, consumed by the event loop
    OcrFinished {
        id: RequestId,
        outcome: OcrOutcome,
    },
    ShowResult {
        id: RequestId,
        text: String,
    },
    ShowError {
        id: Option<RequestId>,
        message: String,
    },
    OcrStatusUpdate {
        status: String,
        capturing: bool,
    },
    /// Backend is idle and accepts a new trigger
    BackendReady,
}

/// Where the pixels of a request come from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Region {
        frame: Box<CapturedFrame>,
        selection: SelectionRect,
    },
    File(PathBuf),
}

impl ImageSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            ImageSource::Region { .. } => SourceKind::Region,
            ImageSource::File(_) => SourceKind::File,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Region,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Created,
    Preprocessing,
    Invoking,
    Parsing,
    Completed,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Failed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Created => "created",
            RequestState::Preprocessing => "preprocessing",
            RequestState::Invoking => "invoking",
            RequestState::Parsing => "parsing",
            RequestState::Completed => "completed",
            RequestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Final result of one request, delivered exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrOutcome {
    Success(String),
    Failure(String),
}

impl OcrOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OcrOutcome::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            OcrOutcome::Success(text) | OcrOutcome::Failure(text) => text,
        }
    }
}

/// Drag selection in logical (UI) coordinates, always normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SelectionRect {
    /// Bounding box of two points
    pub fn from_points(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: span(x1, x2),
            height: span(y1, y2),
        }
    }

    /// Right edge, widened so extreme coordinates cannot overflow
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// True if both sides are strictly larger than `min_size`
    pub fn exceeds(&self, min_size: i32) -> bool {
        self.width > min_size && self.height > min_size
    }
}

/// Distance between two coordinates, saturated at `i32::MAX`
fn span(a: i32, b: i32) -> i32 {
    i32::try_from(a.abs_diff(b)).unwrap_or(i32::MAX)
}

/// Crop rectangle in captured-buffer pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalCropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Physical and logical size of one display.
///
/// Scale factors are derived per axis so non-uniform scaling is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    pub physical_width: u32,
    pub physical_height: u32,
    pub logical_width: u32,
    pub logical_height: u32,
}

impl MonitorDescriptor {
    /// Returns `None` if any dimension is zero
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        logical_width: u32,
        logical_height: u32,
    ) -> Option<Self> {
        if physical_width == 0 || physical_height == 0 || logical_width == 0 || logical_height == 0
        {
            return None;
        }

        Some(Self {
            physical_width,
            physical_height,
            logical_width,
            logical_height,
        })
    }

    pub fn scale_x(&self) -> f64 {
        self.physical_width as f64 / self.logical_width as f64
    }

    pub fn scale_y(&self) -> f64 {
        self.physical_height as f64 / self.logical_height as f64
    }
}

/// Full-monitor capture at physical resolution
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: DynamicImage,
    pub monitor: MonitorDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_normalizes() {
        let rect = SelectionRect::from_points(50, 40, 10, 90);
        assert_eq!(
            rect,
            SelectionRect {
                x: 10,
                y: 40,
                width: 40,
                height: 50,
            }
        );
        assert_eq!((rect.right(), rect.bottom()), (50, 90));
    }

    #[test]
    fn test_from_points_extreme_coordinates_saturate() {
        let rect = SelectionRect::from_points(-2_000_000_000, 0, 2_000_000_000, 50);
        assert_eq!(rect.x, -2_000_000_000);
        assert_eq!(rect.width, i32::MAX);
        assert_eq!(rect.height, 50);

        let rect = SelectionRect::from_points(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!((rect.width, rect.height), (i32::MAX, i32::MAX));
    }

    #[test]
    fn test_edges_do_not_overflow() {
        let rect = SelectionRect {
            x: i32::MAX - 5,
            y: i32::MAX,
            width: 100,
            height: i32::MAX,
        };
        assert_eq!(rect.right(), i32::MAX as i64 + 95);
        assert_eq!(rect.bottom(), 2 * i32::MAX as i64);
    }

    #[test]
    fn test_monitor_descriptor_rejects_zero() {
        assert!(MonitorDescriptor::new(0, 10, 10, 10).is_none());
        assert!(MonitorDescriptor::new(10, 10, 10, 0).is_none());

        let monitor = MonitorDescriptor::new(300, 200, 200, 100).unwrap();
        assert_eq!((monitor.scale_x(), monitor.scale_y()), (1.5, 2.0));
    }
}
