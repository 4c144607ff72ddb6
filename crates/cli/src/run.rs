//! The sequential fetch flow: submit, wait, enumerate, download.

use anyhow::Context;
use comfyfetch_client::api::ComfyApi;
use comfyfetch_client::client::Client;
use comfyfetch_client::manifest::ffconcat_playlist;
use comfyfetch_client::monitor::wait_for_completion;
use comfyfetch_client::outputs::{collect_media_refs, MediaKind};
use comfyfetch_client::saver::{save_outputs, SavedFile};

use crate::cli::{Args, MediaType};

pub async fn run(args: Args) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.workflow_path)
        .await
        .with_context(|| {
            format!(
                "failed to read workflow file {}",
                args.workflow_path.display()
            )
        })?;
    let workflow: serde_json::Value =
        serde_json::from_str(&raw).context("workflow file is not valid JSON")?;
    anyhow::ensure!(
        workflow.is_object(),
        "workflow file must contain a JSON object in API format"
    );

    let client = Client::from_address(&args.server_address);
    let api = ComfyApi::new(client.api_url().to_string());

    // Connect before submitting so the completion message cannot be missed.
    let mut conn = client.connect().await?;

    let submitted = api.submit_workflow(&workflow, &conn.client_id).await?;
    tracing::info!(
        prompt_id = %submitted.prompt_id,
        queue_position = submitted.number,
        "Workflow queued",
    );

    let previews = wait_for_completion(&mut conn.ws_stream, &submitted.prompt_id).await?;
    let _ = conn.ws_stream.close(None).await;

    let history = api.history(&submitted.prompt_id).await?;
    let refs = collect_media_refs(&history, &submitted.prompt_id)?;

    let saved = save_outputs(
        &api,
        &refs,
        &previews,
        &args.media_path,
        &args.filename_prefix,
    )
    .await?;

    if args.media_type == MediaType::Video {
        write_playlist(&args, &saved).await?;
    }

    tracing::info!(count = saved.len(), dest = %args.media_path.display(), "Media saved");
    Ok(())
}

/// Write the ffconcat playlist for the downloaded image frames.
async fn write_playlist(args: &Args, saved: &[SavedFile]) -> anyhow::Result<()> {
    let frames: Vec<String> = saved
        .iter()
        .filter(|f| f.kind == MediaKind::Image)
        .filter_map(|f| f.path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();

    if frames.is_empty() {
        tracing::warn!("No image frames downloaded; skipping playlist");
        return Ok(());
    }

    let playlist_path = args
        .media_path
        .join(format!("{}.ffconcat", args.filename_prefix));
    let playlist = ffconcat_playlist(&frames, args.frame_rate);
    tokio::fs::write(&playlist_path, playlist)
        .await
        .with_context(|| format!("failed to write playlist {}", playlist_path.display()))?;

    tracing::info!(
        path = %playlist_path.display(),
        frame_rate = args.frame_rate,
        frames = frames.len(),
        "Wrote frame-sequence playlist",
    );
    Ok(())
}
