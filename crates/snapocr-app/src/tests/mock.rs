use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use image::{DynamicImage, RgbaImage};
use snapocr_core::parser::RawOutput;
use snapocr_core::{OcrError, Result};
use snapocr_ocr::Recognizer;

pub enum Reply {
    Stdout(&'static [u8]),
    SpawnError,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub path: PathBuf,
    pub existed: bool,
    pub dimensions: Option<(u32, u32)>,
}

/// Stands in for the engine process
pub struct MockRecognizer {
    reply: Reply,
    delay: Duration,
    calls: Mutex<Vec<Call>>,
}

impl MockRecognizer {
    pub fn replying(reply: Reply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Recognizer for MockRecognizer {
    fn run(&self, image_path: &Path) -> Result<RawOutput> {
        std::thread::sleep(self.delay);

        self.calls.lock().unwrap().push(Call {
            path: image_path.to_path_buf(),
            existed: image_path.exists(),
            dimensions: image::image_dimensions(image_path).ok(),
        });

        match self.reply {
            Reply::Stdout(stdout) => Ok(RawOutput {
                stdout: stdout.to_vec(),
                stderr: b"noise".to_vec(),
                exit_code: Some(0),
            }),
            Reply::SpawnError => Err(OcrError::InvocationFailed(
                "failed to run engine: not found".to_string(),
            )),
        }
    }
}

pub fn blank(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
}
