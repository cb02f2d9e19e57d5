//! Lifecycle of the single in-flight OCR request.
//!
//! Preprocessing runs on the event loop, the engine runs on a blocking
//! worker, and the outcome comes back as an [`AppEvent::OcrFinished`] on the
//! loop's own inbox. Events for anything but the active request are dropped.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use kanal::AsyncSender;
use snapocr_core::parser::OutputParser;
use snapocr_core::preprocess::ImagePreprocessor;
use snapocr_core::{OcrError, Result};
use snapocr_ocr::Recognizer;
use snapocr_types::{AppEvent, OcrOutcome, RequestId, RequestState, SourceKind};
use tempfile::TempPath;

#[derive(Debug)]
pub struct OcrRequest {
    pub id: RequestId,
    pub kind: SourceKind,
    pub state: RequestState,
    /// Normalized image handed to the engine
    pub image: DynamicImage,
    /// Staged copy of `image`, removed by the worker when the engine exits
    pub temp_path: PathBuf,
    pub started: Instant,
    /// Every state entered so far, `state` is the last one
    pub history: Vec<RequestState>,
}

impl OcrRequest {
    fn new(id: RequestId, kind: SourceKind, image: DynamicImage) -> Self {
        tracing::debug!(
            "Request {id} {}: {:?} {}x{}",
            RequestState::Created,
            kind,
            image.width(),
            image.height()
        );
        Self {
            id,
            kind,
            state: RequestState::Created,
            image,
            temp_path: PathBuf::new(),
            started: Instant::now(),
            history: vec![RequestState::Created],
        }
    }

    fn enter(&mut self, state: RequestState) {
        self.state = state;
        self.history.push(state);
    }
}

/// A request that reached a terminal state
#[derive(Debug)]
pub struct FinishedRequest {
    pub request: OcrRequest,
    pub outcome: OcrOutcome,
}

pub struct RequestController {
    active: Option<OcrRequest>,
    preprocessor: ImagePreprocessor,
    recognizer: Arc<dyn Recognizer>,
    parser: Arc<OutputParser>,
    inbox: AsyncSender<AppEvent>,
}

impl RequestController {
    pub fn new(
        preprocessor: ImagePreprocessor,
        recognizer: Arc<dyn Recognizer>,
        parser: Arc<OutputParser>,
        inbox: AsyncSender<AppEvent>,
    ) -> Self {
        Self {
            active: None,
            preprocessor,
            recognizer,
            parser,
            inbox,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&OcrRequest> {
        self.active.as_ref()
    }

    /// Normalize and stage the image, then start the engine off-thread.
    ///
    /// Must be called from within the tokio runtime.
    pub fn submit(&mut self, image: DynamicImage, kind: SourceKind) -> Result<RequestId> {
        if let Some(active) = &self.active {
            tracing::warn!("Request {} still {}, rejecting new one", active.id, active.state);
            return Err(OcrError::RequestInFlight);
        }

        let id = RequestId::new();
        let mut request = OcrRequest::new(id, kind, image);

        request.enter(RequestState::Preprocessing);
        tracing::debug!("Request {id} {}", request.state);
        request.image = self.preprocessor.normalize(request.image);
        let temp = match self.preprocessor.persist(&request.image) {
            Ok(temp) => temp,
            Err(e) => {
                request.enter(RequestState::Failed);
                tracing::error!("Request {id} {}: {e}", request.state);
                return Err(e);
            }
        };
        request.temp_path = temp.to_path_buf();

        self.spawn_worker(id, temp);

        request.enter(RequestState::Invoking);
        tracing::debug!("Request {id} {} on {}", request.state, request.temp_path.display());
        self.active = Some(request);

        Ok(id)
    }

    /// Record worker progress; returns false for stale ids
    pub fn advance(&mut self, id: RequestId, state: RequestState) -> bool {
        match self.active.as_mut() {
            Some(active) if active.id == id && !state.is_terminal() => {
                tracing::debug!("Request {id} {state}");
                active.enter(state);
                true
            }
            _ => {
                tracing::debug!("Ignoring {state} for inactive request {id}");
                false
            }
        }
    }

    /// Close the active request if `id` matches it
    pub fn complete(&mut self, id: RequestId, outcome: OcrOutcome) -> Option<FinishedRequest> {
        if self.active.as_ref().map(|active| active.id) != Some(id) {
            tracing::warn!("Dropping result of stale request {id}");
            return None;
        }

        let mut request = self.active.take()?;
        request.enter(if outcome.is_success() {
            RequestState::Completed
        } else {
            RequestState::Failed
        });
        tracing::debug!(
            "Request {id} {} after {:?}",
            request.state,
            request.started.elapsed()
        );

        Some(FinishedRequest { request, outcome })
    }

    fn spawn_worker(&self, id: RequestId, temp: TempPath) {
        let recognizer = self.recognizer.clone();
        let parser = self.parser.clone();
        let inbox = self.inbox.clone();

        tokio::spawn(async move {
            // The temp file lives exactly as long as the engine run
            let run = tokio::task::spawn_blocking(move || {
                let result = recognizer.run(&temp);
                if let Err(e) = temp.close() {
                    tracing::warn!("Failed to remove temp image: {e}");
                }
                result
            })
            .await;

            let outcome = match run {
                Ok(Ok(output)) => {
                    let progress = AppEvent::OcrProgress {
                        id,
                        state: RequestState::Parsing,
                    };
                    if inbox.send(progress).await.is_err() {
                        tracing::debug!("Event loop gone, request {id} parses unobserved");
                    }
                    parser.outcome(&output)
                }
                Ok(Err(e)) => {
                    tracing::error!("Request {id} engine error: {e}");
                    e.into()
                }
                Err(e) => {
                    tracing::error!("Request {id} worker task error: {e}");
                    OcrError::InvocationFailed(format!("worker task failed: {e}")).into()
                }
            };

            if inbox.send(AppEvent::OcrFinished { id, outcome }).await.is_err() {
                tracing::warn!("Event loop gone, dropping result of request {id}");
            }
        });
    }
}
