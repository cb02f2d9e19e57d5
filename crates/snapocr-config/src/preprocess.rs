use serde::{Deserialize, Serialize};

fn default_max_width() -> u32 {
    1280
}

fn default_max_height() -> u32 {
    720
}

/// Upper bound on the image handed to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}
