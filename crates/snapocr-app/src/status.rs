use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// OCR status information
#[derive(Clone, Debug, Default)]
pub struct OcrStatus {
    pub busy: bool,
    pub last_request_time: Option<SystemTime>,
    pub request_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub current_message: String,
}

/// Application status
pub struct AppStatus {
    pub ocr: Arc<RwLock<OcrStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            ocr: Arc::new(RwLock::new(OcrStatus::default())),
        }
    }

    pub async fn begin(&self, message: impl Into<String>) {
        let mut ocr = self.ocr.write().await;
        ocr.busy = true;
        ocr.request_count += 1;
        ocr.last_request_time = Some(SystemTime::now());
        ocr.current_message = message.into();
    }

    pub async fn finish(&self, success: bool, message: impl Into<String>) {
        let mut ocr = self.ocr.write().await;
        ocr.busy = false;
        if success {
            ocr.success_count += 1;
        } else {
            ocr.failure_count += 1;
        }
        ocr.current_message = message.into();
    }

    pub async fn snapshot(&self) -> OcrStatus {
        self.ocr.read().await.clone()
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
