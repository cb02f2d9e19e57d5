use kanal::{AsyncReceiver, AsyncSender};
use snapocr_core::preprocess::ImagePreprocessor;
use snapocr_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::ocr_context::OcrContext;
use crate::request::RequestController;

pub mod finish_ocr;
pub mod trigger_ocr;

use finish_ocr::{handle_ocr_finished, handle_ocr_progress};
use trigger_ocr::handle_ocr_trigger;

/// App's main loop
///
/// `inbox_tx` feeds worker results back into `inbox`.
pub async fn event_loop(
    ctx: OcrContext,
    inbox: AsyncReceiver<AppEvent>,
    inbox_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut requests = RequestController::new(
        ImagePreprocessor::from(&ctx.state.config.preprocess),
        ctx.state.recognizer.clone(),
        ctx.state.parser.clone(),
        inbox_tx,
    );

    tracing::info!("Event loop started, waiting for events");
    ctx.ready().await?;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Event loop shutting down");
                break;
            }
            event = inbox.recv() => event?,
        };

        handle_events(&ctx, &mut requests, event).await?;
    }

    Ok(())
}

async fn handle_events(
    ctx: &OcrContext,
    requests: &mut RequestController,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::TriggerOcr(source) => {
            tracing::debug!("[OCR] Triggered from {:?}", source.kind());
            handle_ocr_trigger(ctx, requests, source).await?;
        }
        AppEvent::OcrProgress { id, state } => {
            handle_ocr_progress(ctx, requests, id, state).await?;
        }
        AppEvent::OcrFinished { id, outcome } => {
            handle_ocr_finished(ctx, requests, id, outcome).await?;
        }
        AppEvent::ShowResult { .. }
        | AppEvent::ShowError { .. }
        | AppEvent::OcrStatusUpdate { .. }
        | AppEvent::BackendReady => {
            // UI-only event, ignore in backend
        }
    }

    Ok(())
}
