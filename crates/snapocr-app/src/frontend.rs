//! Console front end: submits one request and waits for its outcome.

use snapocr_types::{AppEvent, ImageSource};

use crate::controller::UiHandle;

/// What the user ends up seeing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Text(String),
    Error(String),
    /// Selection was discarded before any request started
    Discarded,
}

/// Block until the backend accepts triggers
pub async fn wait_ready(ui: &UiHandle) -> anyhow::Result<()> {
    loop {
        match ui.from_app.recv().await? {
            AppEvent::BackendReady => return Ok(()),
            event => handle_ui_event(&event),
        }
    }
}

/// Submit one source and collect what is delivered before the backend goes idle
pub async fn run_once(ui: &UiHandle, source: ImageSource) -> anyhow::Result<Delivery> {
    wait_ready(ui).await?;
    ui.to_app.send(AppEvent::TriggerOcr(source)).await?;

    let mut delivery = Delivery::Discarded;
    loop {
        let event = ui.from_app.recv().await?;
        match event {
            AppEvent::ShowResult { text, .. } => delivery = Delivery::Text(text),
            AppEvent::ShowError { message, .. } => delivery = Delivery::Error(message),
            AppEvent::BackendReady => break,
            other => handle_ui_event(&other),
        }
    }

    Ok(delivery)
}

fn handle_ui_event(event: &AppEvent) {
    match event {
        AppEvent::OcrStatusUpdate { status, capturing } => {
            tracing::info!("OCR status: {} (capturing: {})", status, capturing);
        }
        other => tracing::trace!("Ignoring {:?}", std::mem::discriminant(other)),
    }
}
