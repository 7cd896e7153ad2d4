//! Client for a video catalog service: session handling, a rendered page
//! model, fragment routing and the admin dashboard.

pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub mod api {
    pub mod client;
    pub mod payloads;
}

pub mod models {
    pub mod session;
    pub mod user;
    pub mod video;
}

pub mod storage {
    pub mod file;
    pub mod kv;
    pub mod memory;
    pub mod playback;
}

pub mod session {
    pub mod store;
    pub mod token;
}

pub mod ui {
    pub mod dom;
    pub mod modal;
    pub mod notification;
    pub mod render;
    pub mod view;
}

pub mod validation {
    pub mod forms;
}

pub mod handlers {
    pub mod admin;
    pub mod auth;
    pub mod navigation;
    pub mod player;
    pub mod videos;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use state::{AppState, Outcome};
