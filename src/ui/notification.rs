use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::ui::view::{SharedPage, lock};

/// Shows notifications and hides them after a fixed delay.
///
/// A new notification replaces the visible one and restarts the timer; the
/// superseded timer is aborted so it can never hide the newer message.
pub struct Notifier {
    page: SharedPage,
    dismiss_after: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    generation: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(page: SharedPage, dismiss_after: Duration) -> Self {
        Self {
            page,
            dismiss_after,
            timer: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, false);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, true);
    }

    pub fn show(&self, message: impl Into<String>, is_error: bool) {
        let message = message.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut page = lock(&self.page);
            page.notification.message = message.clone();
            page.notification.is_error = is_error;
            page.notification.visible = true;
        }

        if is_error {
            tracing::debug!("🔔 Error notification: {}", message);
        } else {
            tracing::debug!("🔔 Notification: {}", message);
        }

        let page = self.page.clone();
        let latest = self.generation.clone();
        let delay = self.dismiss_after;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == generation {
                lock(&page).notification.visible = false;
            }
        });

        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = timer.replace(handle) {
            previous.abort();
        }
        tracing::trace!("Notification timer {} armed", generation);
    }

    /// How many notifications have been shown so far.
    pub fn shown_count(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
