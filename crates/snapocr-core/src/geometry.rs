//! Logical selection to physical pixel mapping.
//!
//! UI toolkits report drag coordinates in logical units while the captured
//! buffer is in physical pixels. The two differ whenever display scaling is
//! not 100%, and may differ by a different factor per axis.

use image::DynamicImage;
use snapocr_types::{CapturedFrame, MonitorDescriptor, PhysicalCropRect, SelectionRect};

use crate::error::{OcrError, Result};

/// Map a logical selection into the physical buffer, clamped to its bounds
pub fn map_to_physical(
    rect: &SelectionRect,
    scale_x: f64,
    scale_y: f64,
    physical_width: u32,
    physical_height: u32,
) -> Result<PhysicalCropRect> {
    let pw = physical_width as i64;
    let ph = physical_height as i64;

    let x1 = scale(rect.x as i64, scale_x);
    let y1 = scale(rect.y as i64, scale_y);
    let x2 = scale(rect.right(), scale_x);
    let y2 = scale(rect.bottom(), scale_y);

    let invalid = OcrError::InvalidCropRegion { x1, y1, x2, y2 };
    if pw == 0 || ph == 0 {
        return Err(invalid);
    }

    let x1 = x1.clamp(0, pw - 1);
    let y1 = y1.clamp(0, ph - 1);
    let x2 = x2.clamp(1, pw);
    let y2 = y2.clamp(1, ph);

    if x2 <= x1 || y2 <= y1 {
        return Err(invalid);
    }

    Ok(PhysicalCropRect {
        x: x1 as u32,
        y: y1 as u32,
        width: (x2 - x1) as u32,
        height: (y2 - y1) as u32,
    })
}

/// Same as [`map_to_physical`] with the scale factors of `monitor`
pub fn map_selection(monitor: &MonitorDescriptor, rect: &SelectionRect) -> Result<PhysicalCropRect> {
    map_to_physical(
        rect,
        monitor.scale_x(),
        monitor.scale_y(),
        monitor.physical_width,
        monitor.physical_height,
    )
}

/// Copy the selected region out of a full-monitor capture
pub fn crop_selection(frame: &CapturedFrame, rect: &SelectionRect) -> Result<DynamicImage> {
    let crop = map_selection(&frame.monitor, rect)?;
    tracing::debug!(
        "Selection {:?} -> physical {:?} (scale {:.3} x {:.3})",
        rect,
        crop,
        frame.monitor.scale_x(),
        frame.monitor.scale_y()
    );
    Ok(crop_image(&frame.image, crop))
}

pub fn crop_image(image: &DynamicImage, rect: PhysicalCropRect) -> DynamicImage {
    image.crop_imm(rect.x, rect.y, rect.width, rect.height)
}

fn scale(value: i64, factor: f64) -> i64 {
    (value as f64 * factor).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn rect(x: i32, y: i32, width: i32, height: i32) -> SelectionRect {
        SelectionRect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_identity_scale() {
        let crop = map_to_physical(&rect(10, 20, 100, 50), 1.0, 1.0, 1920, 1080).unwrap();
        assert_eq!(
            crop,
            PhysicalCropRect {
                x: 10,
                y: 20,
                width: 100,
                height: 50
            }
        );
    }

    #[test]
    fn test_fractional_scale() {
        // 200x100 logical at 150% is 300x150 physical
        let crop = map_to_physical(&rect(40, 60, 200, 100), 1.5, 1.5, 2880, 1620).unwrap();
        assert_eq!(
            crop,
            PhysicalCropRect {
                x: 60,
                y: 90,
                width: 300,
                height: 150
            }
        );
    }

    #[test]
    fn test_non_uniform_scale() {
        let crop = map_to_physical(&rect(10, 10, 100, 100), 2.0, 1.25, 4000, 4000).unwrap();
        assert_eq!(crop.x, 20);
        assert_eq!(crop.y, 13);
        assert_eq!(crop.width, 200);
        assert_eq!(crop.height, 125);
    }

    #[test]
    fn test_clamps_past_right_and_bottom_edges() {
        let crop = map_to_physical(&rect(1800, 1000, 400, 400), 1.0, 1.0, 1920, 1080).unwrap();
        assert_eq!(crop.x, 1800);
        assert_eq!(crop.y, 1000);
        assert_eq!(crop.x + crop.width, 1920);
        assert_eq!(crop.y + crop.height, 1080);
    }

    #[test]
    fn test_clamps_negative_origin() {
        let crop = map_to_physical(&rect(-50, -50, 100, 100), 1.0, 1.0, 800, 600).unwrap();
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.width, 50);
        assert_eq!(crop.height, 50);
    }

    #[test]
    fn test_offscreen_collapses_to_edge_strip() {
        let crop = map_to_physical(&rect(900, 100, 50, 50), 1.0, 1.0, 800, 600).unwrap();
        assert_eq!((crop.x, crop.width), (799, 1));

        let crop = map_to_physical(&rect(-200, 100, 50, 50), 1.0, 1.0, 800, 600).unwrap();
        assert_eq!((crop.x, crop.width), (0, 1));
    }

    #[test]
    fn test_degenerate_rect_is_invalid() {
        let result = map_to_physical(&rect(100, 100, 0, 50), 1.0, 1.0, 800, 600);
        assert!(matches!(result, Err(OcrError::InvalidCropRegion { .. })));

        // 1 logical px shrinks to nothing at 40%
        let result = map_to_physical(&rect(100, 100, 50, 1), 0.4, 0.4, 800, 600);
        assert!(matches!(result, Err(OcrError::InvalidCropRegion { .. })));
    }

    #[test]
    fn test_extreme_coordinates_clamp_without_overflow() {
        let crop = map_to_physical(&rect(i32::MAX - 5, 0, 100, 100), 1.0, 1.0, 1920, 1080).unwrap();
        assert_eq!((crop.x, crop.width), (1919, 1));

        let wide = SelectionRect::from_points(-2_000_000_000, 0, 2_000_000_000, 50);
        let crop = map_to_physical(&wide, 1.5, 1.5, 1920, 1080).unwrap();
        assert_eq!(
            crop,
            PhysicalCropRect {
                x: 0,
                y: 0,
                width: 1920,
                height: 75
            }
        );

        // entirely above and left of the buffer, collapses onto the corner
        let crop = map_to_physical(&rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX), 3.0, 3.0, 800, 600);
        assert_eq!(
            crop.unwrap(),
            PhysicalCropRect {
                x: 0,
                y: 0,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn test_zero_sized_buffer_is_invalid() {
        let result = map_to_physical(&rect(0, 0, 50, 50), 1.0, 1.0, 0, 600);
        assert!(matches!(result, Err(OcrError::InvalidCropRegion { .. })));
    }

    #[test]
    fn test_crop_always_inside_buffer() {
        let (pw, ph) = (1366u32, 768u32);
        for &scale in &[1.0, 1.25, 1.5, 1.75, 2.0, 3.0] {
            for x in (-300..1600).step_by(97) {
                for y in (-300..900).step_by(83) {
                    for &(w, h) in &[(11, 11), (200, 100), (1500, 900)] {
                        if let Ok(crop) = map_to_physical(&rect(x, y, w, h), scale, scale, pw, ph) {
                            assert!(crop.width > 0 && crop.height > 0);
                            assert!(crop.x < pw && crop.y < ph);
                            assert!(crop.x + crop.width <= pw, "x overflow at {x},{y} {scale}");
                            assert!(crop.y + crop.height <= ph, "y overflow at {x},{y} {scale}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_crop_selection_uses_monitor_scale() {
        let monitor = MonitorDescriptor::new(300, 150, 200, 100).unwrap();
        let frame = CapturedFrame {
            image: DynamicImage::ImageRgba8(RgbaImage::new(300, 150)),
            monitor,
        };

        let cropped = crop_selection(&frame, &rect(20, 10, 100, 50)).unwrap();
        assert_eq!(cropped.width(), 150);
        assert_eq!(cropped.height(), 75);
    }
}
