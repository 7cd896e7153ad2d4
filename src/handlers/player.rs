use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::{AppState, Outcome};
use crate::ui::render;
use crate::ui::view::PlayerView;

/// Fetches a video's metadata and opens the player at the saved position.
///
/// Only the most recent request opens the player.
pub async fn open_video(state: &AppState, id: i64) -> Outcome {
    let token = match state.require_token("watch videos") {
        Ok(token) => token,
        Err(e) => {
            state.report(e, "open video");
            return Outcome::Failed;
        }
    };

    let request = state.next_player_request();
    let video = match state.api.get_video(id, &token).await {
        Ok(video) => video,
        Err(e) => {
            state.report(e, "open video");
            return Outcome::Failed;
        }
    };

    if !state.is_latest_player_request(request) {
        tracing::debug!("Discarding stale player request for video {}", id);
        return Outcome::Ignored;
    }

    let source = state.api.stream_url(video.id);
    let start_at = state.playback.resume_at(&source).unwrap_or(0.0);
    tracing::info!("▶️ Playing {} from {:.1}s", video.title, start_at);

    state.with_page(|page| {
        render::render_player(
            page,
            PlayerView {
                video,
                source,
                start_at,
                position: start_at,
            },
        )
    });
    Outcome::Completed
}

/// Records the player's position and persists it for the open source.
pub fn record_playback(state: &AppState, seconds: f64) -> Result<()> {
    let source = state.with_page(|page| {
        page.player.as_mut().map(|player| {
            player.position = seconds;
            player.source.clone()
        })
    });

    match source {
        Some(source) => state.playback.save(&source, seconds),
        None => Ok(()),
    }
}

/// Closes the player; an in-flight open is discarded.
pub fn close_player(state: &AppState) {
    state.next_player_request();
    state.with_page(render::close_player);
}

/// Streams a video to disk.
///
/// Without a destination the file lands in the download directory as `video-{id}.mp4`.
pub async fn download_video(state: &AppState, id: i64, destination: Option<PathBuf>) -> Outcome {
    let destination = destination.unwrap_or_else(|| state.config.download_dir.join(format!("video-{}.mp4", id)));
    let token = state.session().token;

    match save_stream(state, id, token.as_deref(), &destination).await {
        Ok(bytes) => {
            state
                .notifier
                .success(format!("Saved {} bytes to {}.", bytes, destination.display()));
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "download video");
            Outcome::Failed
        }
    }
}

async fn save_stream(state: &AppState, id: i64, token: Option<&str>, destination: &Path) -> Result<u64> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    state.api.download_stream(id, token, destination).await
}
