mod common;

use std::time::Duration;

use common::*;
use vidcat::handlers::{admin, auth, navigation};
use vidcat::router::Section;
use vidcat::storage::kv::KeyValueStore;
use vidcat::ui::render;
use vidcat::validation::forms::LoginForm;
use vidcat::Outcome;

async fn admin_context() -> TestContext {
    let ctx = TestContext::new().await;
    auth::login(&ctx.state, LoginForm::new(ADMIN_EMAIL, PASSWORD)).await;
    ctx
}

/// Answers the dialog once it is open, after the rows have been re-rendered.
async fn answer_dialog(ctx: &TestContext, accept: bool) {
    while !ctx.state.confirm.is_open() {
        tokio::task::yield_now().await;
    }
    assert!(ctx.state.snapshot().modal.visible);
    ctx.state
        .with_page(|page| render::render_admin_users(&mut page.admin_user_list, &[]));
    if accept {
        ctx.state.confirm.confirm();
    } else {
        ctx.state.confirm.cancel();
    }
}

#[tokio::test]
async fn test_dashboard_is_denied_without_admin_role() {
    let ctx = TestContext::new().await;
    auth::login(&ctx.state, LoginForm::new(USER_EMAIL, PASSWORD)).await;

    navigation::navigate(&ctx.state, "#dashboard").await;

    assert_eq!(ctx.backend.count("GET /admin/users"), 0);
    assert_eq!(ctx.backend.count("GET /videos"), 0);

    let page = ctx.state.snapshot();
    assert_eq!(page.active_section, Section::Dashboard);
    assert_eq!(
        page.dashboard_notice.as_deref(),
        Some(navigation::ADMIN_REQUIRED_MESSAGE)
    );
    assert!(page.notification.is_error);
    assert_eq!(page.admin_user_list.element_children().count(), 0);
}

#[tokio::test]
async fn test_dashboard_loads_each_listing_once() {
    let ctx = admin_context().await;

    navigation::navigate(&ctx.state, "#dashboard").await;

    assert_eq!(ctx.backend.count("GET /admin/users"), 1);
    assert_eq!(ctx.backend.count("GET /videos"), 1);

    let page = ctx.state.snapshot();
    assert_eq!(page.dashboard_notice, None);
    assert_eq!(page.admin_user_list.element_children().count(), 2);
    assert_eq!(page.admin_video_list.element_children().count(), 2);
    assert!(page.admin_user_list.find_action("delete-user", 2).is_some());
    assert!(page.admin_video_list.find_action("delete-video", 1).is_some());
}

#[tokio::test]
async fn test_stale_dashboard_listing_is_discarded() {
    let ctx = admin_context().await;
    *ctx.backend.users_delay.lock().unwrap() = Some(Duration::from_millis(200));

    tokio::join!(navigation::navigate(&ctx.state, "#dashboard"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        navigation::navigate(&ctx.state, "#catalog").await;
    });

    assert_eq!(ctx.backend.count("GET /admin/users"), 1);
    let page = ctx.state.snapshot();
    assert_eq!(page.active_section, Section::Catalog);
    assert_eq!(page.admin_user_list.element_children().count(), 0);
    assert_eq!(page.admin_video_list.element_children().count(), 0);
}

#[tokio::test]
async fn test_confirmed_delete_targets_the_row_that_opened_the_dialog() {
    let ctx = admin_context().await;
    navigation::navigate(&ctx.state, "#dashboard").await;

    let target = ctx
        .state
        .snapshot()
        .admin_user_list
        .find_action("delete-user", 2)
        .cloned()
        .unwrap();

    let (outcome, ()) = tokio::join!(
        admin::handle_dashboard_click(&ctx.state, &target),
        answer_dialog(&ctx, true),
    );

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(ctx.backend.count("DELETE /admin/users/2"), 1);
    assert_eq!(ctx.backend.count("GET /admin/users"), 2);

    let page = ctx.state.snapshot();
    assert!(!page.modal.visible);
    assert!(page.admin_user_list.find_action("delete-user", 2).is_none());
    assert!(page.admin_user_list.find_action("delete-user", 1).is_some());
    assert_eq!(page.notification.message, "User deleted.");
}

#[tokio::test]
async fn test_cancelled_delete_makes_no_request() {
    let ctx = admin_context().await;
    navigation::navigate(&ctx.state, "#dashboard").await;

    let target = ctx
        .state
        .snapshot()
        .admin_video_list
        .find_action("delete-video", 1)
        .cloned()
        .unwrap();

    let (outcome, ()) = tokio::join!(
        admin::handle_dashboard_click(&ctx.state, &target),
        answer_dialog(&ctx, false),
    );

    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(ctx.backend.count("DELETE /admin/videos/1"), 0);
    assert!(!ctx.state.snapshot().modal.visible);
}

#[tokio::test]
async fn test_second_dialog_declines_the_first() {
    let ctx = admin_context().await;

    let (first, second, ()) = tokio::join!(
        admin::delete_video(&ctx.state, 1),
        async {
            tokio::task::yield_now().await;
            admin::delete_video(&ctx.state, 2).await
        },
        async {
            while !ctx.state.confirm.is_open() {
                tokio::task::yield_now().await;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            ctx.state.confirm.confirm();
        },
    );

    assert_eq!(first, Outcome::Cancelled);
    assert_eq!(second, Outcome::Completed);
    assert_eq!(ctx.backend.count("DELETE /admin/videos/1"), 0);
    assert_eq!(ctx.backend.count("DELETE /admin/videos/2"), 1);
}

#[tokio::test]
async fn test_role_toggle_flips_the_rendered_target() {
    let ctx = admin_context().await;
    navigation::navigate(&ctx.state, "#dashboard").await;

    let target = ctx
        .state
        .snapshot()
        .admin_user_list
        .find_action("toggle-role", 2)
        .cloned()
        .unwrap();
    assert_eq!(target.get_data("role"), Some("admin"));

    let (outcome, ()) = tokio::join!(
        admin::handle_dashboard_click(&ctx.state, &target),
        async {
            while !ctx.state.confirm.is_open() {
                tokio::task::yield_now().await;
            }
            ctx.state.confirm.confirm();
        },
    );
    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(ctx.backend.count("PUT /admin/users/2/role"), 1);

    let toggle = ctx
        .state
        .snapshot()
        .admin_user_list
        .find_action("toggle-role", 2)
        .cloned()
        .unwrap();
    assert_eq!(toggle.get_data("role"), Some("user"));
}

#[tokio::test]
async fn test_rejected_token_ends_the_session() {
    let ctx = admin_context().await;
    *ctx.backend.reject_tokens.lock().unwrap() = true;
    let shown = ctx.state.notifier.shown_count();

    navigation::navigate(&ctx.state, "#dashboard").await;

    assert_eq!(ctx.backend.count("GET /admin/users"), 1);
    assert_eq!(ctx.backend.count("GET /videos"), 1);
    assert_eq!(ctx.state.notifier.shown_count(), shown + 1);
    assert!(!ctx.state.session().is_authenticated());
    assert!(ctx.store.is_empty());

    let page = ctx.state.snapshot();
    assert!(page.auth_section.find_by_id("logout-link").is_none());
    assert_eq!(
        page.notification.message,
        "Your session has expired. Please log in again."
    );
}

#[tokio::test]
async fn test_failed_user_listing_still_renders_videos() {
    let ctx = admin_context().await;
    *ctx.backend.users.lock().unwrap() = vec![serde_json::json!({ "id": "not-a-number" })];
    let shown = ctx.state.notifier.shown_count();

    navigation::navigate(&ctx.state, "#dashboard").await;

    assert_eq!(ctx.state.notifier.shown_count(), shown + 1);
    assert!(ctx.state.session().is_authenticated());
    let page = ctx.state.snapshot();
    assert_eq!(page.notification.message, "The server sent an unexpected response.");
    assert_eq!(page.admin_video_list.element_children().count(), 2);
}
