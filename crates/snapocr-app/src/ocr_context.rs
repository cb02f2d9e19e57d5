use std::sync::Arc;

use kanal::AsyncSender;
use snapocr_core::OcrError;
use snapocr_types::{AppEvent, RequestId};

use crate::state::AppState;

/// Shared dependencies of the event handlers
#[derive(Clone)]
pub struct OcrContext {
    pub state: Arc<AppState>,
    pub event_tx: AsyncSender<AppEvent>,
}

impl OcrContext {
    pub fn new(state: Arc<AppState>, event_tx: AsyncSender<AppEvent>) -> Self {
        Self { state, event_tx }
    }

    pub async fn send_status(&self, status: impl Into<String>, capturing: bool) -> anyhow::Result<()> {
        self.event_tx
            .send(AppEvent::OcrStatusUpdate {
                status: status.into(),
                capturing,
            })
            .await?;
        Ok(())
    }

    /// Tell the front end a new trigger is accepted
    pub async fn ready(&self) -> anyhow::Result<()> {
        self.send_status("Ready", false).await?;
        self.event_tx.send(AppEvent::BackendReady).await?;
        Ok(())
    }

    /// Deliver a failure that happened before or outside a worker, then go idle
    pub async fn fail(&self, id: Option<RequestId>, error: OcrError) -> anyhow::Result<()> {
        tracing::error!("OCR request failed: {error}");
        self.state.status.finish(false, error.to_string()).await;
        self.event_tx
            .send(AppEvent::ShowError {
                id,
                message: error.to_string(),
            })
            .await?;
        self.ready().await
    }
}
