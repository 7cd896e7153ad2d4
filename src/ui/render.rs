//! Renderer functions. Each takes the region it owns and fully replaces its
//! content, so calling one twice with the same input yields the same tree.

use crate::models::session::{Role, Session};
use crate::models::user::User;
use crate::models::video::Video;
use crate::router::Section;
use crate::ui::dom::Element;
use crate::ui::view::{FormState, Page, PlayerView, VerifyStatus, VerifyView};

pub const EMPTY_CATALOG_MESSAGE: &str = "No videos available yet. Upload the first one!";
pub const CATALOG_LOAD_FAILED_MESSAGE: &str = "The videos could not be loaded.";

/// Shows exactly one section.
pub fn show_section(page: &mut Page, section: Section) {
    page.active_section = section;
}

/// Rebuilds the catalog grid.
///
/// An empty list renders a single placeholder paragraph.
pub fn render_video_list(container: &mut Element, videos: &[Video], stream_link: impl Fn(&Video) -> String) {
    container.clear();

    if videos.is_empty() {
        container.append(
            Element::new("p")
                .class("empty-placeholder")
                .text(EMPTY_CATALOG_MESSAGE),
        );
        return;
    }

    for video in videos {
        let card = Element::new("div")
            .class("video-card")
            .data("video-id", video.id)
            .child(
                Element::new("video")
                    .attr("controls", "")
                    .attr("preload", "metadata")
                    .child(
                        Element::new("source")
                            .attr("src", stream_link(video))
                            .attr("type", "video/mp4"),
                    ),
            )
            .child(
                Element::new("div")
                    .class("video-info")
                    .child(Element::new("h3").text(video.title.clone()))
                    .child(Element::new("p").class("category").text(format!("Category: {}", video.category)))
                    .child(Element::new("p").class("summary").text(video.summary_line()))
                    .child(
                        Element::new("button")
                            .data("action", "play-video")
                            .data("id", video.id)
                            .text("Play"),
                    ),
            );
        container.append(card);
    }
}

/// Replaces the catalog grid with a load-failure message.
pub fn render_video_list_error(container: &mut Element) {
    container.clear();
    container.append(
        Element::new("p")
            .class("load-error")
            .text(CATALOG_LOAD_FAILED_MESSAGE),
    );
}

fn empty_row(columns: usize, message: &str) -> Element {
    Element::new("tr").child(
        Element::new("td")
            .attr("colspan", columns.to_string())
            .class("empty-row")
            .text(message),
    )
}

fn delete_button(action: &str, id: i64) -> Element {
    Element::new("button")
        .data("action", action)
        .data("id", id)
        .class("danger")
        .text("Delete")
}

/// One row per user, each with a role toggle and a delete action.
pub fn render_admin_users(container: &mut Element, users: &[User]) {
    container.clear();
    if users.is_empty() {
        container.append(empty_row(5, "No users found."));
        return;
    }

    for user in users {
        let target = user.role.toggled();
        let label = match target {
            Role::Admin => "Make admin",
            Role::User => "Make user",
        };
        let row = Element::new("tr")
            .data("user-id", user.id)
            .child(Element::new("td").text(user.id.to_string()))
            .child(Element::new("td").text(user.username.clone()))
            .child(Element::new("td").text(user.email.clone()))
            .child(Element::new("td").text(user.role.as_str()))
            .child(
                Element::new("td")
                    .child(
                        Element::new("button")
                            .data("action", "toggle-role")
                            .data("id", user.id)
                            .data("role", target)
                            .text(label),
                    )
                    .child(delete_button("delete-user", user.id)),
            );
        container.append(row);
    }
}

/// One row per video with a delete action.
pub fn render_admin_videos(container: &mut Element, videos: &[Video]) {
    container.clear();
    if videos.is_empty() {
        container.append(empty_row(4, "No videos found."));
        return;
    }

    for video in videos {
        let row = Element::new("tr")
            .data("video-id", video.id)
            .child(Element::new("td").text(video.id.to_string()))
            .child(Element::new("td").text(video.title.clone()))
            .child(Element::new("td").text(video.category.clone()))
            .child(Element::new("td").child(delete_button("delete-video", video.id)));
        container.append(row);
    }
}

/// Rebuilds the auth menu and the main navigation from the session.
pub fn update_auth_ui(page: &mut Page, session: &Session) {
    page.auth_section.clear();
    page.main_nav.clear();

    page.main_nav.append(nav_link("#catalog", "Catalog"));

    match (session.is_authenticated(), session.username.as_deref()) {
        (true, username) => {
            page.auth_section.append(
                Element::new("div")
                    .class("identity")
                    .child(Element::new("p").class("username").text(username.unwrap_or_default()))
                    .child(
                        Element::new("a")
                            .id("logout-link")
                            .attr("href", "#")
                            .text("Log out"),
                    ),
            );
            if session.is_admin() {
                page.main_nav.append(nav_link("#upload", "Upload video"));
                page.main_nav.append(nav_link("#dashboard", "Dashboard"));
            }
        }
        (false, _) => {
            page.auth_section.append(
                Element::new("a")
                    .attr("href", "#login")
                    .class("cta")
                    .text("Log in"),
            );
            page.auth_section.append(
                Element::new("a")
                    .attr("href", "#register")
                    .class("cta-secondary")
                    .text("Register"),
            );
        }
    }
}

fn nav_link(href: &str, label: &str) -> Element {
    Element::new("a").attr("href", href).class("nav-link").text(label)
}

/// Fills the verification panel with the outcome of a verification call.
pub fn render_verification(view: &mut VerifyView, outcome: Result<String, String>) {
    match outcome {
        Ok(message) => {
            view.title = "Account verified!".to_string();
            view.message = message;
            view.status = VerifyStatus::Verified;
        }
        Err(message) => {
            view.title = "Verification failed".to_string();
            view.message = message;
            view.status = VerifyStatus::Failed;
        }
    }
}

pub fn render_player(page: &mut Page, player: PlayerView) {
    page.player = Some(player);
}

pub fn close_player(page: &mut Page) {
    page.player = None;
}

/// The forms whose submit control can be disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    Upload,
}

pub fn set_form_busy(forms: &mut FormState, form: FormKind, busy: bool) {
    match form {
        FormKind::Login => forms.login_busy = busy,
        FormKind::Register => forms.register_busy = busy,
        FormKind::Upload => forms.upload_busy = busy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::dom::Node;

    fn video(id: i64, title: &str) -> Video {
        Video {
            id,
            title: title.to_string(),
            category: "docs".to_string(),
            file_path: format!("{}.mp4", id),
            description: None,
            duration: None,
            size: Some("12MB".to_string()),
        }
    }

    fn link(v: &Video) -> String {
        format!("http://h/stream/{}", v.file_path)
    }

    #[test]
    fn empty_catalog_renders_placeholder() {
        let mut container = Page::mount().video_list;
        render_video_list(&mut container, &[], link);

        assert_eq!(container.children().len(), 1);
        assert_eq!(container.text_content(), EMPTY_CATALOG_MESSAGE);
    }

    #[test]
    fn catalog_cards_follow_input_order() {
        let mut container = Page::mount().video_list;
        render_video_list(&mut container, &[video(1, "First"), video(2, "Second")], link);

        let cards: Vec<_> = container.element_children().collect();
        assert_eq!(cards.len(), 2);
        assert!(cards[0].text_content().contains("First"));
        assert!(cards[1].text_content().contains("Second"));
        assert!(cards[1].text_content().contains("0:00 | 12MB"));

        let source = cards[0].find(&|el: &Element| el.tag() == "source").unwrap();
        assert_eq!(source.get_attr("src"), Some("http://h/stream/1.mp4"));
    }

    #[test]
    fn rendering_twice_is_idempotent() {
        let videos = [video(1, "First")];
        let mut a = Page::mount().video_list;
        render_video_list(&mut a, &videos, link);
        let once = a.clone();
        render_video_list(&mut a, &videos, link);
        assert_eq!(a, once);
    }

    #[test]
    fn admin_rows_carry_delegation_attributes() {
        let mut container = Page::mount().admin_user_list;
        let users = [User {
            id: 7,
            username: "ana".to_string(),
            email: "ana@x.io".to_string(),
            role: Role::User,
        }];
        render_admin_users(&mut container, &users);

        assert!(container.find_action("delete-user", 7).is_some());
        let toggle = container.find_action("toggle-role", 7).unwrap();
        assert_eq!(toggle.get_data("role"), Some("admin"));

        render_admin_users(&mut container, &[]);
        assert_eq!(container.text_content(), "No users found.");
    }

    #[test]
    fn auth_ui_is_replaced_on_every_call() {
        let mut page = Page::mount();
        let admin = Session {
            token: Some("t".to_string()),
            role: Some(Role::Admin),
            username: Some("ana".to_string()),
        };
        update_auth_ui(&mut page, &admin);
        assert!(page.auth_section.find_by_id("logout-link").is_some());
        assert_eq!(page.main_nav.element_children().count(), 3);

        update_auth_ui(&mut page, &Session::default());
        assert!(page.auth_section.find_by_id("logout-link").is_none());
        assert_eq!(page.main_nav.element_children().count(), 1);
        assert!(matches!(page.auth_section.children()[0], Node::Element(_)));
        assert_eq!(page.auth_section.element_children().count(), 2);
    }

    #[test]
    fn regular_users_get_no_admin_links() {
        let mut page = Page::mount();
        let user = Session {
            token: Some("t".to_string()),
            role: Some(Role::User),
            username: Some("bo".to_string()),
        };
        update_auth_ui(&mut page, &user);
        let html = page.main_nav.to_html();
        assert!(!html.contains("#dashboard"));
        assert!(!html.contains("#upload"));
        assert!(page.auth_section.text_content().contains("bo"));
    }
}
