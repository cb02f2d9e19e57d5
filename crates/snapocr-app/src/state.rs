use std::sync::Arc;

use snapocr_config::Config;
use snapocr_core::parser::OutputParser;
use snapocr_ocr::Recognizer;

use crate::status::AppStatus;

pub struct AppState {
    pub config: Config,
    pub recognizer: Arc<dyn Recognizer>,
    pub parser: Arc<OutputParser>,
    pub status: AppStatus,
}

impl AppState {
    pub fn new(config: Config, recognizer: Arc<dyn Recognizer>) -> Self {
        let parser = OutputParser::new(config.markers.clone());

        Self {
            config,
            recognizer,
            parser: Arc::new(parser),
            status: AppStatus::new(),
        }
    }
}
