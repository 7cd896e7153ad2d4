use crate::handlers::{admin, auth, videos};
use crate::router::EntryAction;
use crate::state::AppState;
use crate::ui::render;

/// Message shown when a non-admin opens the dashboard.
pub const ADMIN_REQUIRED_MESSAGE: &str = "Administrator access is required to view the dashboard.";

/// Sets the location fragment and routes to it.
pub async fn navigate(state: &AppState, fragment: &str) {
    state.replace_location(fragment);
    route(state).await;
}

/// Shows the section for the current location and runs its entry action.
pub async fn route(state: &AppState) {
    let transition = state.route_current();
    state.with_page(|page| render::show_section(page, transition.section));

    match &transition.entry {
        EntryAction::None => {}
        EntryAction::LoadDashboard => {
            state.with_page(|page| page.dashboard_notice = None);
            admin::load_dashboard(state, &transition).await;
        }
        EntryAction::DenyDashboard => {
            tracing::warn!("🚫 Dashboard requested without an admin session");
            state.with_page(|page| {
                page.admin_user_list.clear();
                page.admin_video_list.clear();
                page.dashboard_notice = Some(ADMIN_REQUIRED_MESSAGE.to_string());
            });
            state.notifier.error(ADMIN_REQUIRED_MESSAGE);
        }
        EntryAction::Verify(token) => {
            auth::verify_email(state, token, &transition).await;
        }
    }
}

/// Renders the initial page: auth menu, current route and the catalog.
pub async fn start(state: &AppState) {
    let session = state.session();
    state.with_page(|page| render::update_auth_ui(page, &session));
    route(state).await;
    videos::load_videos(state).await;
    tracing::info!("✅ Client started at {}", state.location());
}
