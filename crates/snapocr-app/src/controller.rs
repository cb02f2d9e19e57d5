use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use snapocr_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::ocr_context::OcrContext;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(64), // status and results
            ui_to_app: kanal::bounded_async(64), // triggers and worker results
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Front end side of the channels
#[derive(Clone)]
pub struct UiHandle {
    pub to_app: AsyncSender<AppEvent>,
    pub from_app: AsyncReceiver<AppEvent>,
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            OcrContext::new(self.state.clone(), self.channels.app_to_ui.0.clone()),
            self.channels.ui_to_app.1.clone(),
            self.channels.ui_to_app.0.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn ui_handle(&self) -> UiHandle {
        UiHandle {
            to_app: self.channels.ui_to_app.0.clone(),
            from_app: self.channels.app_to_ui.1.clone(),
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
