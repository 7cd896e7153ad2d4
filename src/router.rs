use std::fmt;

use crate::models::session::Session;

/// One mutually exclusive region of the page, selected by the fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Section {
    #[default]
    Catalog,
    Login,
    Register,
    Upload,
    Dashboard,
    Verify,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Catalog,
        Section::Login,
        Section::Register,
        Section::Upload,
        Section::Dashboard,
        Section::Verify,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Section::Catalog => "catalog",
            Section::Login => "login",
            Section::Register => "register",
            Section::Upload => "upload",
            Section::Dashboard => "dashboard",
            Section::Verify => "verify",
        }
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.name() == name)
    }

    /// The id of the section element on the page.
    pub fn element_id(&self) -> String {
        format!("{}-section", self.name())
    }

    pub fn fragment(&self) -> String {
        format!("#{}", self.name())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub section: Section,
    /// The `token` query parameter, only kept on `#verify`.
    pub verify_token: Option<String>,
}

impl Route {
    /// Parses `#section?key=value`. Unknown or empty fragments map to the catalog.
    pub fn parse(fragment: &str) -> Self {
        let trimmed = fragment.trim().trim_start_matches('#');
        let (name, query) = match trimmed.split_once('?') {
            Some((name, query)) => (name, Some(query)),
            None => (trimmed, None),
        };

        let section = Section::from_name(name).unwrap_or_default();
        let verify_token = match section {
            Section::Verify => query.and_then(|q| query_param(q, "token")),
            _ => None,
        };

        Self { section, verify_token }
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| percent_decode(v))
        .filter(|v| !v.is_empty())
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b'+' => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// What the controller must do after entering a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryAction {
    None,
    /// Load the admin listings.
    LoadDashboard,
    /// Entered the dashboard without an admin session; no admin call is made.
    DenyDashboard,
    /// Verify an email token once, then scrub it from the location.
    Verify(String),
}

/// The result of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub section: Section,
    pub entry: EntryAction,
    pub epoch: u64,
}

/// The current location fragment.
///
/// `replace` rewrites it without routing, the way a history rewrite does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    fragment: String,
}

impl Location {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn replace(&mut self, fragment: impl Into<String>) {
        self.fragment = fragment.into();
    }
}

/// Fragment-driven section state machine.
#[derive(Debug, Default)]
pub struct Router {
    current: Section,
    /// Bumped on every navigation; responses started under an older epoch are stale.
    epoch: u64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while `epoch` is still the latest navigation and `section` is shown.
    pub fn is_current(&self, epoch: u64, section: Section) -> bool {
        self.epoch == epoch && self.current == section
    }

    pub fn navigate(&mut self, fragment: &str, session: &Session) -> Transition {
        let route = Route::parse(fragment);
        self.current = route.section;
        self.epoch += 1;

        let entry = match (route.section, route.verify_token) {
            (Section::Dashboard, _) if session.is_admin() => EntryAction::LoadDashboard,
            (Section::Dashboard, _) => EntryAction::DenyDashboard,
            (Section::Verify, Some(token)) => EntryAction::Verify(token),
            _ => EntryAction::None,
        };

        tracing::debug!("🧭 Routed {} -> {} (epoch {})", fragment, route.section, self.epoch);
        Transition {
            section: route.section,
            entry,
            epoch: self.epoch,
        }
    }
}
