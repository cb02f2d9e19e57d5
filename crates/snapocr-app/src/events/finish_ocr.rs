use snapocr_types::{AppEvent, OcrOutcome, RequestId, RequestState};

use crate::ocr_context::OcrContext;
use crate::request::RequestController;

pub async fn handle_ocr_progress(
    ctx: &OcrContext,
    requests: &mut RequestController,
    id: RequestId,
    state: RequestState,
) -> anyhow::Result<()> {
    if requests.advance(id, state) && state == RequestState::Parsing {
        ctx.send_status("Parsing...", true).await?;
    }
    Ok(())
}

/// Deliver the outcome exactly once, then accept new triggers
pub async fn handle_ocr_finished(
    ctx: &OcrContext,
    requests: &mut RequestController,
    id: RequestId,
    outcome: OcrOutcome,
) -> anyhow::Result<()> {
    let Some(finished) = requests.complete(id, outcome) else {
        return Ok(());
    };
    let elapsed = finished.request.started.elapsed();

    match finished.outcome {
        OcrOutcome::Success(text) => {
            tracing::info!(
                "[OCR] Request {id} ({:?}, {}x{}) recognized {} chars in {:?}",
                finished.request.kind,
                finished.request.image.width(),
                finished.request.image.height(),
                text.chars().count(),
                elapsed
            );
            ctx.state.status.finish(true, "Ready").await;
            ctx.event_tx.send(AppEvent::ShowResult { id, text }).await?;
        }
        OcrOutcome::Failure(message) => {
            tracing::warn!("[OCR] Request {id} failed after {elapsed:?}: {message}");
            ctx.state.status.finish(false, message.clone()).await;
            ctx.event_tx
                .send(AppEvent::ShowError {
                    id: Some(id),
                    message,
                })
                .await?;
        }
    }

    ctx.ready().await
}
