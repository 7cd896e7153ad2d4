use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::api::client::{ApiClient, is_auth_rejection};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::session::Session;
use crate::router::{Location, Router, Transition};
use crate::session::store::SessionStore;
use crate::storage::file::FileStore;
use crate::storage::kv::KeyValueStore;
use crate::storage::playback::PlaybackPositions;
use crate::ui::modal::ConfirmGate;
use crate::ui::notification::Notifier;
use crate::ui::render::{self, FormKind};
use crate::ui::view::{self, Page, SharedPage};

/// How a user action ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The action failed and an error notification was shown.
    Failed,
    /// The user declined the confirmation.
    Cancelled,
    /// Dropped without effect, e.g. a duplicate submission.
    Ignored,
}

/// Allows one in-flight submission per form.
#[derive(Clone)]
pub struct FormGuard {
    semaphore: Arc<Semaphore>,
}

impl FormGuard {
    /// Creates a new `FormGuard`.
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }

    /// Takes the slot, or `None` while a submission is already in flight.
    pub fn try_acquire(&self) -> Option<SemaphorePermit<'_>> {
        self.semaphore.try_acquire().ok()
    }
}

impl Default for FormGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a form's submit control disabled until dropped.
pub struct Submission<'a> {
    _permit: SemaphorePermit<'a>,
    page: &'a SharedPage,
    form: FormKind,
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        render::set_form_busy(&mut view::lock(self.page).forms, self.form, false);
    }
}

/// The client's state, shared by every handler.
pub struct AppState {
    /// The client's configuration.
    pub config: Config,
    /// The catalog API client.
    pub api: ApiClient,
    /// The rendered page.
    pub page: SharedPage,
    /// Transient notifications.
    pub notifier: Notifier,
    /// The confirmation dialog.
    pub confirm: ConfirmGate,
    /// Saved playback positions.
    pub playback: PlaybackPositions,
    session: Mutex<SessionStore>,
    router: Mutex<Router>,
    location: Mutex<Location>,
    login_guard: FormGuard,
    register_guard: FormGuard,
    upload_guard: FormGuard,
    player_request: AtomicU64,
}

fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl AppState {
    /// Creates a new `AppState` over an existing key-value store.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let api = ApiClient::new(config.api_base_url.clone());
        tracing::info!("✅ API client targeting {}", api.base_url());

        let session = SessionStore::load(store.clone());
        let playback = PlaybackPositions::new(store);

        let page = Page::shared();
        let notifier = Notifier::new(page.clone(), config.notification_dismiss);
        let confirm = ConfirmGate::new(page.clone());
        tracing::info!("✅ Page mounted");

        Self {
            config,
            api,
            page,
            notifier,
            confirm,
            playback,
            session: Mutex::new(session),
            router: Mutex::new(Router::new()),
            location: Mutex::new(Location::new("")),
            login_guard: FormGuard::new(),
            register_guard: FormGuard::new(),
            upload_guard: FormGuard::new(),
            player_request: AtomicU64::new(0),
        }
    }

    /// Creates a new `AppState` persisting to the configured state file.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.state_file)?;
        tracing::info!("✅ State file {} opened", store.path().display());
        Ok(Self::new(config, Arc::new(store)))
    }

    /// A snapshot of the current session.
    pub fn session(&self) -> Session {
        recover(&self.session).session().clone()
    }

    pub fn with_session<T>(&self, f: impl FnOnce(&mut SessionStore) -> T) -> T {
        f(&mut recover(&self.session))
    }

    pub fn with_page<T>(&self, f: impl FnOnce(&mut Page) -> T) -> T {
        f(&mut view::lock(&self.page))
    }

    /// A snapshot of the page.
    pub fn snapshot(&self) -> Page {
        view::lock(&self.page).clone()
    }

    pub fn location(&self) -> String {
        recover(&self.location).fragment().to_string()
    }

    /// Rewrites the location without routing.
    pub fn replace_location(&self, fragment: &str) {
        recover(&self.location).replace(fragment);
    }

    pub(crate) fn route_current(&self) -> Transition {
        let fragment = self.location();
        let session = self.session();
        recover(&self.router).navigate(&fragment, &session)
    }

    pub(crate) fn router_is_current(&self, transition: &Transition) -> bool {
        recover(&self.router).is_current(transition.epoch, transition.section)
    }

    /// Marks `form` busy, or returns `None` when a submission is already in flight.
    pub fn begin_submission(&self, form: FormKind) -> Option<Submission<'_>> {
        let guard = match form {
            FormKind::Login => &self.login_guard,
            FormKind::Register => &self.register_guard,
            FormKind::Upload => &self.upload_guard,
        };
        let permit = guard.try_acquire()?;
        self.with_page(|page| render::set_form_busy(&mut page.forms, form, true));
        Some(Submission {
            _permit: permit,
            page: &self.page,
            form,
        })
    }

    /// Starts a new player request, invalidating any earlier one.
    pub(crate) fn next_player_request(&self) -> u64 {
        self.player_request.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn is_latest_player_request(&self, request: u64) -> bool {
        self.player_request.load(Ordering::SeqCst) == request
    }

    /// The bearer token, or an `Unauthorized` error naming what needed it.
    pub fn require_token(&self, action: &str) -> Result<String> {
        self.session()
            .token
            .ok_or_else(|| AppError::Unauthorized(format!("Please log in to {}.", action)))
    }

    /// The bearer token of an admin session.
    pub fn require_admin_token(&self) -> Result<String> {
        let session = self.session();
        match (session.is_admin(), session.token) {
            (true, Some(token)) => Ok(token),
            _ => Err(AppError::Unauthorized(
                "Administrator access is required.".to_string(),
            )),
        }
    }

    /// Terminates an error at the controller: logs it and shows one notification.
    ///
    /// A rejected bearer token also ends the local session.
    pub fn report(&self, err: AppError, context: &str) {
        err.log(context);

        if is_auth_rejection(&err) && self.session().is_authenticated() {
            if let Err(e) = self.with_session(|s| s.logout()) {
                e.log("session expiry");
                self.with_session(|s| s.forget());
            }
            let session = self.session();
            self.with_page(|page| render::update_auth_ui(page, &session));
            self.notifier.error("Your session has expired. Please log in again.");
            return;
        }

        self.notifier.error(err.user_message());
    }
}
