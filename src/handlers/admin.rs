use crate::models::session::Role;
use crate::router::Transition;
use crate::state::{AppState, Outcome};
use crate::ui::dom::Element;
use crate::ui::render;

/// Loads both admin listings for a dashboard entry.
///
/// Issues exactly one users call and one videos call, concurrently. Results
/// that arrive after the user has left the dashboard are dropped.
pub async fn load_dashboard(state: &AppState, transition: &Transition) {
    let token = match state.require_admin_token() {
        Ok(token) => token,
        Err(e) => {
            state.report(e, "dashboard");
            return;
        }
    };

    let (users, videos) = tokio::join!(
        state.api.list_users(&token),
        state.api.list_videos(Some(&token)),
    );

    if !state.router_is_current(transition) {
        tracing::debug!("Discarding stale dashboard listings");
        return;
    }

    let mut failures = Vec::new();
    match users {
        Ok(users) => state.with_page(|page| render::render_admin_users(&mut page.admin_user_list, &users)),
        Err(e) => failures.push((e, "dashboard users")),
    }
    match videos {
        Ok(videos) => state.with_page(|page| render::render_admin_videos(&mut page.admin_video_list, &videos)),
        Err(e) => failures.push((e, "dashboard videos")),
    }

    // One notification per entry; the rest are only logged.
    let mut failures = failures.into_iter();
    if let Some((e, context)) = failures.next() {
        state.report(e, context);
    }
    for (e, context) in failures {
        e.log(context);
    }
}

/// Reloads the user table.
pub async fn reload_users(state: &AppState) {
    let result = match state.require_admin_token() {
        Ok(token) => state.api.list_users(&token).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(users) => state.with_page(|page| render::render_admin_users(&mut page.admin_user_list, &users)),
        Err(e) => state.report(e, "reload users"),
    }
}

/// Reloads the video table.
pub async fn reload_videos(state: &AppState) {
    let result = match state.require_admin_token() {
        Ok(token) => state.api.list_videos(Some(&token)).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(videos) => state.with_page(|page| render::render_admin_videos(&mut page.admin_video_list, &videos)),
        Err(e) => state.report(e, "reload videos"),
    }
}

/// A row action on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    DeleteUser(i64),
    DeleteVideo(i64),
    SetRole(i64, Role),
}

impl DashboardAction {
    /// Reads the action from a clicked element's `data-*` attributes.
    pub fn from_target(target: &Element) -> Option<Self> {
        let id = target.get_data("id")?.parse::<i64>().ok()?;
        match target.get_data("action")? {
            "delete-user" => Some(DashboardAction::DeleteUser(id)),
            "delete-video" => Some(DashboardAction::DeleteVideo(id)),
            "toggle-role" => {
                let role = target.get_data("role")?.parse::<Role>().ok()?;
                Some(DashboardAction::SetRole(id, role))
            }
            _ => None,
        }
    }
}

/// Delegated click handler for both dashboard tables.
pub async fn handle_dashboard_click(state: &AppState, target: &Element) -> Outcome {
    match DashboardAction::from_target(target) {
        Some(action) => run_action(state, action).await,
        None => Outcome::Ignored,
    }
}

pub async fn run_action(state: &AppState, action: DashboardAction) -> Outcome {
    match action {
        DashboardAction::DeleteUser(id) => delete_user(state, id).await,
        DashboardAction::DeleteVideo(id) => delete_video(state, id).await,
        DashboardAction::SetRole(id, role) => set_role(state, id, role).await,
    }
}

/// Deletes a user after confirmation, then reloads the user table.
///
/// The id is fixed when the dialog opens; re-renders in between do not change it.
pub async fn delete_user(state: &AppState, id: i64) -> Outcome {
    let confirmed = state
        .confirm
        .request("Delete user", &format!("Are you sure you want to delete user #{}? This cannot be undone.", id))
        .await;
    if !confirmed {
        tracing::debug!("Deletion of user {} cancelled", id);
        return Outcome::Cancelled;
    }

    let result = match state.require_admin_token() {
        Ok(token) => state.api.delete_user(id, &token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            tracing::info!("🗑️ User {} deleted", id);
            state
                .notifier
                .success(response.message.unwrap_or_else(|| "User deleted.".to_string()));
            reload_users(state).await;
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "delete user");
            Outcome::Failed
        }
    }
}

/// Deletes a video after confirmation, then reloads the video table.
pub async fn delete_video(state: &AppState, id: i64) -> Outcome {
    let confirmed = state
        .confirm
        .request("Delete video", &format!("Are you sure you want to delete video #{}? This cannot be undone.", id))
        .await;
    if !confirmed {
        tracing::debug!("Deletion of video {} cancelled", id);
        return Outcome::Cancelled;
    }

    let result = match state.require_admin_token() {
        Ok(token) => state.api.delete_video(id, &token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            tracing::info!("🗑️ Video {} deleted", id);
            state
                .notifier
                .success(response.message.unwrap_or_else(|| "Video deleted.".to_string()));
            reload_videos(state).await;
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "delete video");
            Outcome::Failed
        }
    }
}

/// Changes a user's role after confirmation, then reloads the user table.
pub async fn set_role(state: &AppState, id: i64, role: Role) -> Outcome {
    let confirmed = state
        .confirm
        .request("Change role", &format!("Change the role of user #{} to {}?", id, role))
        .await;
    if !confirmed {
        return Outcome::Cancelled;
    }

    let result = match state.require_admin_token() {
        Ok(token) => state.api.set_user_role(id, role, &token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => {
            tracing::info!("👤 User {} is now {}", id, role);
            state.notifier.success(format!("User #{} is now {}.", id, role));
            reload_users(state).await;
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "set role");
            Outcome::Failed
        }
    }
}
