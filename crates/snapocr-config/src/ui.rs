use serde::{Deserialize, Serialize};

fn default_min_selection_size() -> i32 {
    10
}

fn default_mask_opacity() -> f32 {
    0.5
}

fn default_border_width() -> u32 {
    2
}

fn default_border_color() -> [u8; 3] {
    [0x21, 0x96, 0xF3]
}

/// Selection overlay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Selections with a side at or below this many logical px are discarded
    #[serde(default = "default_min_selection_size")]
    pub min_selection_size: i32,
    #[serde(default = "default_mask_opacity")]
    pub mask_opacity: f32,
    #[serde(default = "default_border_width")]
    pub border_width: u32,
    #[serde(default = "default_border_color")]
    pub border_color: [u8; 3],
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_selection_size: default_min_selection_size(),
            mask_opacity: default_mask_opacity(),
            border_width: default_border_width(),
            border_color: default_border_color(),
        }
    }
}
