use image::DynamicImage;
use snapocr_core::geometry::crop_selection;
use snapocr_core::preprocess::load_image;
use snapocr_core::Result;
use snapocr_types::ImageSource;

use crate::ocr_context::OcrContext;
use crate::request::RequestController;

pub async fn handle_ocr_trigger(
    ctx: &OcrContext,
    requests: &mut RequestController,
    source: ImageSource,
) -> anyhow::Result<()> {
    if requests.is_busy() {
        tracing::warn!("[OCR] Busy, ignoring trigger");
        return ctx.send_status("Busy", true).await;
    }

    let kind = source.kind();
    let image = match source_image(source) {
        Ok(image) => image,
        Err(e) if e.is_silent() => {
            // degenerate selection, close quietly
            tracing::debug!("[OCR] Selection discarded: {e}");
            return ctx.ready().await;
        }
        Err(e) => {
            ctx.state.status.begin("Preprocessing").await;
            return ctx.fail(None, e).await;
        }
    };

    ctx.state.status.begin("Recognizing").await;
    match requests.submit(image, kind) {
        Ok(id) => {
            tracing::info!("[OCR] Request {id} started");
            ctx.send_status("Recognizing...", true).await
        }
        Err(e) => ctx.fail(None, e).await,
    }
}

fn source_image(source: ImageSource) -> Result<DynamicImage> {
    match source {
        ImageSource::Region { frame, selection } => crop_selection(&frame, &selection),
        ImageSource::File(path) => {
            tracing::debug!("[OCR] Loading {}", path.display());
            load_image(&path)
        }
    }
}
