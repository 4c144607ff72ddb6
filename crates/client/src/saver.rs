//! Fetch referenced media and write it to the destination directory.
//!
//! Files are named `{prefix}_{index}.{ext}` with a single counter
//! across all outputs: preview frames collected over the WebSocket
//! first, then the history references in enumeration order.

use std::path::{Path, PathBuf};

use crate::api::{ApiError, ComfyApi};
use crate::messages::PreviewFrame;
use crate::outputs::{MediaKind, MediaRef};

/// A file written to the destination directory.
#[derive(Debug, Clone)]
pub struct SavedFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

/// Errors from the download/write stage.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Fetching a media item from the server failed.
    #[error(transparent)]
    Fetch(#[from] ApiError),

    /// Writing to the destination directory failed.
    #[error("failed to write media file: {0}")]
    Io(#[from] std::io::Error),
}

/// Download every media reference and write all files to `dest`.
///
/// Creates `dest` if it does not exist. Returns the written files in
/// naming order.
pub async fn save_outputs(
    api: &ComfyApi,
    refs: &[MediaRef],
    previews: &[PreviewFrame],
    dest: &Path,
    prefix: &str,
) -> Result<Vec<SavedFile>, SaveError> {
    tokio::fs::create_dir_all(dest).await?;

    let mut saved = Vec::with_capacity(previews.len() + refs.len());
    let mut index = 0usize;

    for frame in previews {
        let path = dest.join(indexed_filename(prefix, index, frame.format.extension()));
        tokio::fs::write(&path, &frame.data).await?;
        tracing::info!(path = %path.display(), "Saved preview frame");
        saved.push(SavedFile {
            path,
            kind: MediaKind::Image,
        });
        index += 1;
    }

    for media in refs {
        let bytes = api
            .fetch_media(&media.filename, &media.subfolder, &media.folder_type)
            .await?;
        let ext = file_extension(&media.filename).unwrap_or("bin");
        let path = dest.join(indexed_filename(prefix, index, ext));
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(
            path = %path.display(),
            node_id = %media.node_id,
            source = %media.filename,
            "Saved media file",
        );
        saved.push(SavedFile {
            path,
            kind: media.kind,
        });
        index += 1;
    }

    Ok(saved)
}

/// Build the local filename for the `index`-th output.
pub fn indexed_filename(prefix: &str, index: usize, ext: &str) -> String {
    format!("{prefix}_{index}.{ext}")
}

/// Extension of a server-side filename, if it has one.
pub fn file_extension(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}
