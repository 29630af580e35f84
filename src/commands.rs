//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Pages return commands, and the App spawns them and tracks them in the
//! status bar until they finish.

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMessage;

/// Async commands that perform side effects.
///
/// A command reports its result to the page that issued it through the
/// page's own channel. App-level effects such as toasts go through
/// `app_tx`. Returning `Err` makes the App log the error and show an alert.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for status display.
    fn name(&self) -> String;

    async fn execute(self: Box<Self>, app_tx: UnboundedSender<AppMessage>) -> Result<()>;
}
