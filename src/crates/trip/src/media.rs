//! Media file loading
//!
//! Attachments are embedded in reports as base64 data URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, TripError};
use crate::models::MediaItem;

fn mime_for(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => return None,
    };
    Some(mime)
}

/// Read a photo or video file into a [`MediaItem`]
pub async fn load_media(path: impl AsRef<Path>) -> Result<MediaItem> {
    let path = path.as_ref();

    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(mime_for)
        .ok_or_else(|| {
            TripError::Validation(format!("unsupported media type: {}", path.display()))
        })?;

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        TripError::Storage(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());
    let data = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));

    debug!(name = %name, mime, bytes = bytes.len(), "Loaded media");

    Ok(if mime.starts_with("video/") {
        MediaItem::video(name, data)
    } else {
        MediaItem::image(name, data)
    })
}
