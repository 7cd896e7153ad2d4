use crate::error::Result;
use crate::handlers::navigation;
use crate::models::session::Claims;
use crate::router::Transition;
use crate::state::{AppState, Outcome};
use crate::ui::dom::Element;
use crate::ui::render::{self, FormKind};
use crate::ui::view::{VerifyStatus, VerifyView};
use crate::validation::forms::{LoginForm, RegisterForm};

/// Handles the login form.
///
/// A second submission while one is in flight is ignored. The session is
/// only written once the issued token decodes.
pub async fn login(state: &AppState, form: LoginForm) -> Outcome {
    if let Err(e) = form.check() {
        state.report(e, "login");
        return Outcome::Failed;
    }

    let Some(submission) = state.begin_submission(FormKind::Login) else {
        tracing::debug!("Login already in flight, ignoring duplicate submission");
        return Outcome::Ignored;
    };

    tracing::info!("🔐 Login attempt for {}", form.email);
    let result = authenticate(state, &form).await;
    drop(submission);

    match result {
        Ok(claims) => {
            let session = state.session();
            state.with_page(|page| render::update_auth_ui(page, &session));
            navigation::navigate(state, "#catalog").await;
            state.notifier.success(format!("Welcome, {}!", claims.username));
            tracing::info!("✅ Logged in as {}", claims.username);
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "login");
            Outcome::Failed
        }
    }
}

async fn authenticate(state: &AppState, form: &LoginForm) -> Result<Claims> {
    let response = state.api.login(&form.email, &form.password).await?;
    state.with_session(|s| s.login(&response.token))
}

/// Handles the registration form.
pub async fn register(state: &AppState, form: RegisterForm) -> Outcome {
    if let Err(e) = form.check() {
        state.report(e, "register");
        return Outcome::Failed;
    }

    let Some(submission) = state.begin_submission(FormKind::Register) else {
        tracing::debug!("Registration already in flight, ignoring duplicate submission");
        return Outcome::Ignored;
    };

    tracing::info!("📝 Register attempt for {}", form.username);
    let result = state
        .api
        .register(&form.username, &form.email, &form.password)
        .await;
    drop(submission);

    match result {
        Ok(response) => {
            let message = response
                .message
                .unwrap_or_else(|| "Registration successful. You can now log in.".to_string());
            state.notifier.success(message);
            navigation::navigate(state, "#login").await;
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "register");
            Outcome::Failed
        }
    }
}

/// Ends the session, wipes persisted state and returns to the login section.
pub async fn logout(state: &AppState) -> Outcome {
    if let Err(e) = state.with_session(|s| s.logout()) {
        state.report(e, "logout");
        return Outcome::Failed;
    }

    let session = state.session();
    state.next_player_request();
    state.with_page(|page| {
        render::update_auth_ui(page, &session);
        render::close_player(page);
        page.admin_user_list.clear();
        page.admin_video_list.clear();
    });
    navigation::navigate(state, "#login").await;
    state.notifier.success("You have logged out.");
    Outcome::Completed
}

/// Delegated click handler for the auth menu.
pub async fn handle_auth_click(state: &AppState, target: &Element) -> Outcome {
    match target.get_id() {
        Some("logout-link") => logout(state).await,
        _ => Outcome::Ignored,
    }
}

/// Verifies an email token once, then scrubs it from the location.
pub async fn verify_email(state: &AppState, token: &str, transition: &Transition) {
    state.with_page(|page| {
        page.verify = VerifyView {
            title: "Verifying your account…".to_string(),
            message: String::new(),
            status: VerifyStatus::Pending,
        };
    });

    let result = state.api.verify(token).await;

    if state.router_is_current(transition) {
        let outcome = match &result {
            Ok(response) => Ok(response
                .message
                .clone()
                .unwrap_or_else(|| "Your email has been verified.".to_string())),
            Err(e) => Err(e.user_message()),
        };
        state.with_page(|page| render::render_verification(&mut page.verify, outcome));
        state.replace_location(&transition.section.fragment());
    } else {
        tracing::debug!("Discarding stale verification result");
    }

    if let Err(e) = result {
        e.log("verify");
    }
}
