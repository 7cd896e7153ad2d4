use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::ui::view::{SharedPage, lock};

/// An awaitable confirmation dialog.
///
/// At most one request is pending. Opening a new one resolves the previous
/// request as declined.
pub struct ConfirmGate {
    page: SharedPage,
    pending: Mutex<Option<oneshot::Sender<bool>>>,
}

impl ConfirmGate {
    pub fn new(page: SharedPage) -> Self {
        Self {
            page,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<oneshot::Sender<bool>>> {
        self.pending.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Opens the dialog and waits for the user's answer.
    pub async fn request(&self, title: &str, message: &str) -> bool {
        let (tx, rx) = oneshot::channel();
        {
            let mut page = lock(&self.page);
            page.modal.title = title.to_string();
            page.modal.message = message.to_string();
            page.modal.visible = true;
        }
        if let Some(previous) = self.pending().replace(tx) {
            let _ = previous.send(false);
        }

        rx.await.unwrap_or(false)
    }

    pub fn is_open(&self) -> bool {
        self.pending().is_some()
    }

    pub fn confirm(&self) {
        self.resolve(true);
    }

    pub fn cancel(&self) {
        self.resolve(false);
    }

    /// Closes the dialog and answers the pending request, if any.
    fn resolve(&self, answer: bool) {
        let pending = self.pending().take();
        {
            let mut page = lock(&self.page);
            page.modal.visible = false;
        }
        if let Some(tx) = pending {
            let _ = tx.send(answer);
        }
    }
}
