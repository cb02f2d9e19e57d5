use image::{DynamicImage, RgbaImage};
use snapocr_core::{OcrError, Result};
use snapocr_types::{CapturedFrame, MonitorDescriptor};
use xcap::Monitor;

/// Source of full-monitor screenshots
pub trait DisplayCapture: Send + Sync {
    /// Capture the whole monitor at physical resolution
    fn capture(&self, monitor_index: usize) -> Result<CapturedFrame>;
}

#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub index: usize,
    pub name: String,
    pub is_primary: bool,
    pub scale_factor: f32,
    pub descriptor: Option<MonitorDescriptor>,
}

/// xcap backed capture, stateless between calls
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenCapture;

impl DisplayCapture for ScreenCapture {
    fn capture(&self, monitor_index: usize) -> Result<CapturedFrame> {
        let monitor = select_monitor(all_monitors()?, monitor_index)?;

        let shot = monitor
            .capture_image()
            .map_err(|e| OcrError::CaptureUnavailable(format!("failed to capture screen: {e}")))?;

        let (width, height) = (shot.width(), shot.height());
        let descriptor = describe(&monitor, width, height).ok_or_else(|| {
            OcrError::CaptureUnavailable(format!(
                "monitor {monitor_index} reported an empty area ({width}x{height})"
            ))
        })?;
        let image = rgba_from_raw(width, height, shot.into_raw())?;

        tracing::debug!(
            "Captured monitor {} '{}': {}x{} physical, {}x{} logical",
            monitor_index,
            monitor.name(),
            descriptor.physical_width,
            descriptor.physical_height,
            descriptor.logical_width,
            descriptor.logical_height
        );

        Ok(CapturedFrame {
            image: DynamicImage::ImageRgba8(image),
            monitor: descriptor,
        })
    }
}

/// List all monitors with their geometry
pub fn list_monitors() -> Result<Vec<MonitorInfo>> {
    let monitors = all_monitors()?;
    Ok(monitors
        .iter()
        .enumerate()
        .map(|(index, m)| {
            let ratio = physical_ratio(m.scale_factor());
            let physical_width = (m.width() as f32 * ratio).round() as u32;
            let physical_height = (m.height() as f32 * ratio).round() as u32;
            MonitorInfo {
                index,
                name: m.name().to_string(),
                is_primary: m.is_primary(),
                scale_factor: m.scale_factor(),
                descriptor: describe(m, physical_width, physical_height),
            }
        })
        .collect())
}

fn all_monitors() -> Result<Vec<Monitor>> {
    let monitors = Monitor::all()
        .map_err(|e| OcrError::CaptureUnavailable(format!("failed to get monitors: {e}")))?;
    if monitors.is_empty() {
        return Err(OcrError::CaptureUnavailable("no monitor found".to_string()));
    }
    Ok(monitors)
}

fn select_monitor<T>(monitors: Vec<T>, index: usize) -> Result<T> {
    let count = monitors.len();
    monitors.into_iter().nth(index).ok_or_else(|| {
        OcrError::CaptureUnavailable(format!("monitor {index} not found ({count} available)"))
    })
}

fn describe(monitor: &Monitor, physical_width: u32, physical_height: u32) -> Option<MonitorDescriptor> {
    logical_size(
        physical_width,
        physical_height,
        monitor.scale_factor(),
        (monitor.width(), monitor.height()),
    )
}

/// Logical size is the captured size divided by the scale factor.
///
/// A scale that is not a positive number falls back to the size the
/// backend reports for the monitor.
fn logical_size(
    physical_width: u32,
    physical_height: u32,
    scale: f32,
    fallback: (u32, u32),
) -> Option<MonitorDescriptor> {
    let (logical_width, logical_height) = if scale.is_finite() && scale > 0.0 {
        (
            (physical_width as f32 / scale).round() as u32,
            (physical_height as f32 / scale).round() as u32,
        )
    } else {
        fallback
    };

    MonitorDescriptor::new(physical_width, physical_height, logical_width, logical_height)
}

/// Rebuild from raw bytes so our image version does not have to match xcap's
fn rgba_from_raw(width: u32, height: u32, raw: Vec<u8>) -> Result<RgbaImage> {
    RgbaImage::from_raw(width, height, raw).ok_or_else(|| {
        OcrError::CaptureUnavailable("captured buffer has an unexpected size".to_string())
    })
}

/// Backends report monitor size in logical points on macOS and pixels elsewhere
fn physical_ratio(scale: f32) -> f32 {
    if cfg!(target_os = "macos") {
        scale.max(1.0)
    } else {
        1.0
    }
}
