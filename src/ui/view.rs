use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::video::Video;
use crate::router::Section;
use crate::ui::dom::{Element, escape};

/// The page shared between the controller, the notifier and the modal.
pub type SharedPage = Arc<Mutex<Page>>;

/// Locks the page, recovering it if a previous holder panicked.
pub fn lock(page: &SharedPage) -> MutexGuard<'_, Page> {
    page.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The transient message in the corner of the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationView {
    pub message: String,
    pub is_error: bool,
    pub visible: bool,
}

/// The confirmation dialog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalView {
    pub title: String,
    pub message: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerifyStatus {
    #[default]
    Pending,
    Verified,
    Failed,
}

/// The email verification panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyView {
    pub title: String,
    pub message: String,
    pub status: VerifyStatus,
}

/// The open video player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub video: Video,
    pub source: String,
    /// Where playback resumes, in seconds.
    pub start_at: f64,
    /// The last reported position, in seconds.
    pub position: f64,
}

/// Which forms currently have a submission in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormState {
    pub login_busy: bool,
    pub register_busy: bool,
    pub upload_busy: bool,
}

/// Typed binding to every region of the page the client renders into.
///
/// Built once at startup; renderer functions receive the region they mutate.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub active_section: Section,
    pub main_nav: Element,
    pub auth_section: Element,
    pub video_list: Element,
    pub admin_user_list: Element,
    pub admin_video_list: Element,
    pub dashboard_notice: Option<String>,
    pub notification: NotificationView,
    pub modal: ModalView,
    pub verify: VerifyView,
    pub player: Option<PlayerView>,
    pub forms: FormState,
}

impl Page {
    pub fn mount() -> Self {
        Self {
            active_section: Section::Catalog,
            main_nav: Element::new("nav").id("main-nav"),
            auth_section: Element::new("div").id("auth-section"),
            video_list: Element::new("div").id("videoList").class("video-grid"),
            admin_user_list: Element::new("tbody").id("admin-user-list"),
            admin_video_list: Element::new("tbody").id("admin-video-list"),
            dashboard_notice: None,
            notification: NotificationView::default(),
            modal: ModalView::default(),
            verify: VerifyView::default(),
            player: None,
            forms: FormState::default(),
        }
    }

    pub fn shared() -> SharedPage {
        Arc::new(Mutex::new(Self::mount()))
    }

    /// Serializes the whole page.
    pub fn to_html(&self) -> String {
        let mut body = Element::new("body")
            .child(self.main_nav.clone())
            .child(self.auth_section.clone());

        for section in Section::ALL {
            let mut el = Element::new("section")
                .id(&section.element_id())
                .class("page-section");
            if section == self.active_section {
                el = el.class("active");
            }
            body = body.child(self.section_content(section, el));
        }

        if let Some(player) = &self.player {
            body = body.child(
                Element::new("div")
                    .id("player")
                    .child(Element::new("h2").id("videoTitle").text(player.video.title.clone()))
                    .child(
                        Element::new("video")
                            .id("main-video")
                            .attr("controls", "")
                            .attr("src", player.source.clone())
                            .data("start-at", player.start_at),
                    ),
            );
        }

        let mut html = body.to_html();
        if self.notification.visible {
            let kind = if self.notification.is_error { "error" } else { "success" };
            html.push_str(&format!(
                "<div id=\"notification\" class=\"notification-{}\">{}</div>",
                kind,
                escape(&self.notification.message)
            ));
        }
        if self.modal.visible {
            html.push_str(&format!(
                "<div id=\"modal-backdrop\"><h3 id=\"modal-title\">{}</h3><p id=\"modal-message\">{}</p></div>",
                escape(&self.modal.title),
                escape(&self.modal.message)
            ));
        }
        html
    }

    fn section_content(&self, section: Section, el: Element) -> Element {
        match section {
            Section::Catalog => el.child(self.video_list.clone()),
            Section::Dashboard => match &self.dashboard_notice {
                Some(notice) => el.child(Element::new("p").class("dashboard-notice").text(notice.clone())),
                None => el
                    .child(Element::new("table").child(self.admin_user_list.clone()))
                    .child(Element::new("table").child(self.admin_video_list.clone())),
            },
            Section::Verify => el
                .child(Element::new("h2").id("verify-title").text(self.verify.title.clone()))
                .child(Element::new("p").id("verify-message").text(self.verify.message.clone())),
            Section::Login => el.child(form_element("loginForm", self.forms.login_busy)),
            Section::Register => el.child(form_element("registerForm", self.forms.register_busy)),
            Section::Upload => el.child(form_element("uploadForm", self.forms.upload_busy)),
        }
    }
}

fn form_element(id: &str, busy: bool) -> Element {
    let mut button = Element::new("button").attr("type", "submit").text("Submit");
    if busy {
        button = button.attr("disabled", "");
    }
    Element::new("form").id(id).child(button)
}
