use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Folder next to the executable that holds the engine and its models
pub const ENGINE_DIR: &str = "rapidocr";

fn default_det_model() -> String {
    "ch_PP-OCRv4_det_infer.onnx".to_string()
}

fn default_cls_model() -> String {
    "ch_ppocr_mobile_v2.0_cls_infer.onnx".to_string()
}

fn default_rec_model() -> String {
    "ch_PP-OCRv4_rec_infer.onnx".to_string()
}

fn default_keys_file() -> String {
    "ppocr_keys_v1.txt".to_string()
}

fn default_num_threads() -> u32 {
    4
}

/// Negative index means CPU only
fn default_gpu_index() -> i32 {
    -1
}

pub fn default_engine_binary() -> &'static str {
    if cfg!(windows) {
        "RapidOcrOnnx.exe"
    } else {
        "RapidOcrOnnx"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Overrides `<install>/rapidocr/<binary>`
    pub engine_path: Option<PathBuf>,
    /// Overrides `<install>/rapidocr/models`
    pub models_dir: Option<PathBuf>,
    #[serde(default = "default_det_model")]
    pub det_model: String,
    #[serde(default = "default_cls_model")]
    pub cls_model: String,
    #[serde(default = "default_rec_model")]
    pub rec_model: String,
    #[serde(default = "default_keys_file")]
    pub keys_file: String,
    #[serde(default = "default_num_threads")]
    pub num_threads: u32,
    #[serde(default = "default_gpu_index")]
    pub gpu_index: i32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine_path: None,
            models_dir: None,
            det_model: default_det_model(),
            cls_model: default_cls_model(),
            rec_model: default_rec_model(),
            keys_file: default_keys_file(),
            num_threads: default_num_threads(),
            gpu_index: default_gpu_index(),
        }
    }
}

impl OcrConfig {
    pub fn resolve_engine_path(&self, install_dir: &Path) -> PathBuf {
        self.engine_path
            .clone()
            .unwrap_or_else(|| install_dir.join(ENGINE_DIR).join(default_engine_binary()))
    }

    pub fn resolve_models_dir(&self, install_dir: &Path) -> PathBuf {
        self.models_dir
            .clone()
            .unwrap_or_else(|| install_dir.join(ENGINE_DIR).join("models"))
    }
}

/// Directory of the running executable, or the working directory if unknown
pub fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
