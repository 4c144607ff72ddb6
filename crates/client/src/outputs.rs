//! Enumerate media references from a history payload.
//!
//! `GET /history/{prompt_id}` returns a JSON object keyed by prompt
//! id; each entry carries an `outputs` object keyed by node id. A node
//! output may hold `images`, `gifs`, or `videos` arrays whose elements
//! reference files in the server's output store.

use serde::Deserialize;

/// Output array keys that carry downloadable file references.
const MEDIA_KEYS: &[(&str, MediaKind)] = &[
    ("images", MediaKind::Image),
    ("gifs", MediaKind::Video),
    ("videos", MediaKind::Video),
];

/// Whether a reference points at a still image or a server-encoded
/// animation/video file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// One downloadable media item, addressed the way `/view` expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Node that produced the file.
    pub node_id: String,
    pub filename: String,
    pub subfolder: String,
    /// Server-side folder type, e.g. `output` or `temp`.
    pub folder_type: String,
    pub kind: MediaKind,
}

/// Wire shape of one element of an output media array.
#[derive(Debug, Deserialize)]
struct RawRef {
    filename: String,
    #[serde(default)]
    subfolder: String,
    #[serde(rename = "type", default = "default_folder_type")]
    folder_type: String,
}

fn default_folder_type() -> String {
    "output".to_string()
}

/// Errors from history enumeration.
#[derive(Debug, thiserror::Error)]
pub enum OutputsError {
    /// The history payload has no entry for the prompt.
    #[error("history contains no entry for prompt {0}")]
    PromptMissing(String),

    /// A media array element did not match the expected shape.
    #[error("malformed media reference in node {node_id}: {source}")]
    MalformedRef {
        node_id: String,
        source: serde_json::Error,
    },
}

/// Collect every media reference recorded for `prompt_id`.
///
/// Walks the per-node outputs in payload order and flattens the
/// `images`/`gifs`/`videos` arrays into a single list. Nodes without
/// media arrays contribute nothing.
pub fn collect_media_refs(
    history: &serde_json::Value,
    prompt_id: &str,
) -> Result<Vec<MediaRef>, OutputsError> {
    let entry = history
        .get(prompt_id)
        .ok_or_else(|| OutputsError::PromptMissing(prompt_id.to_string()))?;

    let Some(outputs) = entry.get("outputs").and_then(|o| o.as_object()) else {
        return Ok(Vec::new());
    };

    let mut refs = Vec::new();
    for (node_id, node_output) in outputs {
        for &(key, kind) in MEDIA_KEYS {
            let Some(items) = node_output.get(key).and_then(|v| v.as_array()) else {
                continue;
            };
            for item in items {
                let raw: RawRef = serde_json::from_value(item.clone()).map_err(|source| {
                    OutputsError::MalformedRef {
                        node_id: node_id.clone(),
                        source,
                    }
                })?;
                refs.push(MediaRef {
                    node_id: node_id.clone(),
                    filename: raw.filename,
                    subfolder: raw.subfolder,
                    folder_type: raw.folder_type,
                    kind,
                });
            }
        }
    }

    tracing::debug!(prompt_id = %prompt_id, count = refs.len(), "Enumerated media references");
    Ok(refs)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn collects_images_across_nodes() {
        let history = json!({
            "p1": {
                "outputs": {
                    "9": {
                        "images": [
                            {"filename": "out_00001_.png", "subfolder": "", "type": "output"},
                            {"filename": "out_00002_.png", "subfolder": "", "type": "output"}
                        ]
                    },
                    "12": {
                        "images": [
                            {"filename": "grid.png", "subfolder": "grids", "type": "temp"}
                        ]
                    }
                }
            }
        });

        let refs = collect_media_refs(&history, "p1").unwrap();
        assert_eq!(refs.len(), 3);
        assert!(refs.iter().all(|r| r.kind == MediaKind::Image));

        let grid = refs.iter().find(|r| r.filename == "grid.png").unwrap();
        assert_eq!(grid.node_id, "12");
        assert_eq!(grid.subfolder, "grids");
        assert_eq!(grid.folder_type, "temp");
    }

    #[test]
    fn gifs_and_videos_are_video_kind() {
        let history = json!({
            "p1": {
                "outputs": {
                    "20": {
                        "gifs": [
                            {"filename": "anim.webp", "subfolder": "", "type": "output"}
                        ],
                        "videos": [
                            {"filename": "clip.mp4", "subfolder": "", "type": "output"}
                        ]
                    }
                }
            }
        });

        let refs = collect_media_refs(&history, "p1").unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.kind == MediaKind::Video));
    }

    #[test]
    fn nodes_without_media_are_skipped() {
        let history = json!({
            "p1": {
                "outputs": {
                    "3": {"text": ["a caption"]},
                    "9": {"images": [{"filename": "a.png", "subfolder": "", "type": "output"}]}
                }
            }
        });

        let refs = collect_media_refs(&history, "p1").unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "a.png");
    }

    #[test]
    fn missing_subfolder_and_type_get_defaults() {
        let history = json!({
            "p1": {
                "outputs": {
                    "9": {"images": [{"filename": "a.png"}]}
                }
            }
        });

        let refs = collect_media_refs(&history, "p1").unwrap();
        assert_eq!(refs[0].subfolder, "");
        assert_eq!(refs[0].folder_type, "output");
    }

    #[test]
    fn missing_prompt_is_an_error() {
        let history = json!({"other": {"outputs": {}}});
        let err = collect_media_refs(&history, "p1").unwrap_err();
        assert_matches!(err, OutputsError::PromptMissing(id) => assert_eq!(id, "p1"));
    }

    #[test]
    fn entry_without_outputs_yields_nothing() {
        let history = json!({"p1": {"status": {"completed": true}}});
        assert!(collect_media_refs(&history, "p1").unwrap().is_empty());
    }

    #[test]
    fn malformed_reference_is_an_error() {
        let history = json!({
            "p1": {
                "outputs": {
                    "9": {"images": [{"subfolder": ""}]}
                }
            }
        });
        let err = collect_media_refs(&history, "p1").unwrap_err();
        assert_matches!(err, OutputsError::MalformedRef { node_id, .. } => {
            assert_eq!(node_id, "9");
        });
    }
}
