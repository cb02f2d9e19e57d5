//! Software rendering of the selection overlay: screenshot, dark mask with a
//! hole over the selection (even-odd fill), and a border around the hole.

use image::{Rgba, RgbaImage};
use snapocr_config::ui::UiConfig;
use snapocr_types::{CapturedFrame, PhysicalCropRect, SelectionRect};

use crate::geometry::map_selection;

#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub mask_opacity: f32,
    pub border_width: u32,
    pub border_color: [u8; 3],
}

impl From<&UiConfig> for OverlayStyle {
    fn from(config: &UiConfig) -> Self {
        Self {
            mask_opacity: config.mask_opacity.clamp(0.0, 1.0),
            border_width: config.border_width,
            border_color: config.border_color,
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

/// Render one overlay frame at the capture's physical resolution
pub fn compose_overlay(
    frame: &CapturedFrame,
    selection: Option<&SelectionRect>,
    style: &OverlayStyle,
) -> RgbaImage {
    let mut canvas = frame.image.to_rgba8();
    let hole = selection.and_then(|rect| map_selection(&frame.monitor, rect).ok());

    apply_mask(&mut canvas, hole, style.mask_opacity);
    if let Some(hole) = hole {
        draw_border(&mut canvas, hole, style);
    }

    canvas
}

fn apply_mask(canvas: &mut RgbaImage, hole: Option<PhysicalCropRect>, opacity: f32) {
    let keep = 1.0 - opacity;
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        // even-odd: every pixel is inside the outer bound, so only the hole stays clear
        let in_hole = hole.is_some_and(|r| contains(r, x, y));
        if !in_hole {
            let Rgba([r, g, b, a]) = *pixel;
            *pixel = Rgba([darken(r, keep), darken(g, keep), darken(b, keep), a]);
        }
    }
}

fn draw_border(canvas: &mut RgbaImage, hole: PhysicalCropRect, style: &OverlayStyle) {
    if style.border_width == 0 {
        return;
    }

    let [r, g, b] = style.border_color;
    let color = Rgba([r, g, b, 255]);
    let bw = style.border_width as i64;
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);

    let left = hole.x as i64;
    let top = hole.y as i64;
    let right = left + hole.width as i64;
    let bottom = top + hole.height as i64;

    // ring of `bw` pixels just outside the hole
    for y in (top - bw).max(0)..(bottom + bw).min(height) {
        for x in (left - bw).max(0)..(right + bw).min(width) {
            let inside = x >= left && x < right && y >= top && y < bottom;
            if !inside {
                canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

fn contains(rect: PhysicalCropRect, x: u32, y: u32) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn darken(channel: u8, keep: f32) -> u8 {
    (channel as f32 * keep).round() as u8
}
