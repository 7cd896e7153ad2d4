use std::io::SeekFrom;
use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::api::payloads::VideoUpload;
use crate::error::{AppError, Result};
use crate::handlers::{navigation, player};
use crate::state::{AppState, Outcome};
use crate::ui::dom::Element;
use crate::ui::render::{self, FormKind};
use crate::validation::forms::UploadForm;

/// Fetches the catalog and rebuilds the video grid.
pub async fn load_videos(state: &AppState) -> Outcome {
    let session = state.session();
    match state.api.list_videos(session.token()).await {
        Ok(videos) => {
            tracing::debug!("🎞️ Catalog loaded ({} videos)", videos.len());
            state.with_page(|page| {
                render::render_video_list(&mut page.video_list, &videos, |v| state.api.file_url(&v.file_path))
            });
            Outcome::Completed
        }
        Err(e) => {
            state.with_page(|page| render::render_video_list_error(&mut page.video_list));
            state.report(e, "load videos");
            Outcome::Failed
        }
    }
}

/// Handles the upload form.
///
/// A missing file is rejected before anything else, without a request.
pub async fn upload(state: &AppState, form: UploadForm) -> Outcome {
    let file = match form.check() {
        Ok(file) => file.clone(),
        Err(e) => {
            state.report(e, "upload");
            return Outcome::Failed;
        }
    };

    let token = match state.require_admin_token() {
        Ok(token) => token,
        Err(e) => {
            state.report(e, "upload");
            return Outcome::Failed;
        }
    };

    let Some(submission) = state.begin_submission(FormKind::Upload) else {
        tracing::debug!("Upload already in flight, ignoring duplicate submission");
        return Outcome::Ignored;
    };

    let result = send_upload(state, form, &file, &token).await;
    drop(submission);

    match result {
        Ok(()) => {
            state.notifier.success("Video uploaded successfully.");
            load_videos(state).await;
            navigation::navigate(state, "#catalog").await;
            Outcome::Completed
        }
        Err(e) => {
            state.report(e, "upload");
            Outcome::Failed
        }
    }
}

async fn send_upload(state: &AppState, form: UploadForm, path: &Path, token: &str) -> Result<()> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    if len == 0 {
        return Err(AppError::Validation("The selected file is empty".to_string()));
    }

    let mut head = Vec::new();
    (&mut file).take(VideoUpload::SNIFF_LEN).read_to_end(&mut head).await?;
    file.seek(SeekFrom::Start(0)).await?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());

    let upload = VideoUpload {
        title: form.title,
        category: form.category,
        description: form.description,
        file_name,
        file,
        len,
        head,
    };

    tracing::info!("📤 Uploading {} ({} bytes)", upload.file_name, upload.len);
    state.api.upload_video(upload, token).await?;
    Ok(())
}

/// Delegated click handler for the catalog grid.
pub async fn handle_catalog_click(state: &AppState, target: &Element) -> Outcome {
    let id = target.get_data("id").and_then(|id| id.parse::<i64>().ok());
    match (target.get_data("action"), id) {
        (Some("play-video"), Some(id)) => player::open_video(state, id).await,
        _ => Outcome::Ignored,
    }
}
