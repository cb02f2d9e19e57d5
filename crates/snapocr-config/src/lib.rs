use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::markers::MarkerConfig;
use self::ocr::OcrConfig;
use self::preprocess::PreprocessConfig;
use self::ui::UiConfig;

pub mod logging;
pub mod markers;
pub mod ocr;
pub mod preprocess;
pub mod ui;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
    pub ui: UiConfig,
    pub markers: MarkerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Some(path) = env_var("SNAPOCR_ENGINE_PATH") {
            self.ocr.engine_path = Some(PathBuf::from(path));
        }
        if let Some(path) = env_var("SNAPOCR_MODELS_DIR") {
            self.ocr.models_dir = Some(PathBuf::from(path));
        }
        if let Some(threads) = env_parse("SNAPOCR_NUM_THREADS") {
            self.ocr.num_threads = threads;
        }
        if let Some(gpu) = env_parse("SNAPOCR_GPU_INDEX") {
            self.ocr.gpu_index = gpu;
        }
        if let Some(width) = env_parse("SNAPOCR_MAX_WIDTH") {
            self.preprocess.max_width = width;
        }
        if let Some(height) = env_parse("SNAPOCR_MAX_HEIGHT") {
            self.preprocess.max_height = height;
        }
        if let Some(level) = env_var("SNAPOCR_LOG") {
            self.logging.level = level;
        }
        if let Some(json) = env_parse("SNAPOCR_LOG_JSON") {
            self.logging.json = json;
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {key}={raw}: not a valid value");
            None
        }
    }
}
