//! Command-line arguments.
//!
//! Every flag has a `COMFYFETCH_*` environment fallback so the tool
//! can be driven from a `.env` file in batch setups.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Submit a ComfyUI workflow and download the generated media.
#[derive(Parser, Debug)]
#[command(name = "comfyfetch", version, about, long_about = None)]
pub struct Args {
    /// host:port of the ComfyUI server.
    #[arg(long, env = "COMFYFETCH_SERVER_ADDRESS", default_value = "127.0.0.1:8188")]
    pub server_address: String,

    /// Directory the downloaded media is written to.
    #[arg(long, env = "COMFYFETCH_MEDIA_PATH", default_value = ".")]
    pub media_path: PathBuf,

    /// Kind of media the workflow produces.
    #[arg(
        long,
        visible_alias = "type",
        value_enum,
        env = "COMFYFETCH_MEDIA_TYPE",
        default_value_t = MediaType::Image
    )]
    pub media_type: MediaType,

    /// Path to the workflow JSON (API format).
    #[arg(long, env = "COMFYFETCH_WORKFLOW_PATH")]
    pub workflow_path: PathBuf,

    /// Frame rate written into the VIDEO-mode playlist.
    #[arg(long, env = "COMFYFETCH_FRAME_RATE", default_value_t = 24)]
    pub frame_rate: u32,

    /// Prefix for the saved filenames.
    #[arg(long, env = "COMFYFETCH_FILENAME_PREFIX", default_value = "output")]
    pub filename_prefix: String,
}

/// What to do with the downloaded outputs.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    /// Download still images.
    #[value(name = "IMAGE")]
    Image,
    /// Download frames/videos and write a frame-sequence playlist.
    #[value(name = "VIDEO")]
    Video,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_server_conventions() {
        let args = Args::try_parse_from(["comfyfetch", "--workflow-path", "wf.json"]).unwrap();
        assert_eq!(args.server_address, "127.0.0.1:8188");
        assert_eq!(args.media_path, PathBuf::from("."));
        assert_eq!(args.media_type, MediaType::Image);
        assert_eq!(args.frame_rate, 24);
        assert_eq!(args.filename_prefix, "output");
    }

    #[test]
    fn workflow_path_is_required() {
        assert!(Args::try_parse_from(["comfyfetch"]).is_err());
    }

    #[test]
    fn media_type_accepts_upper_case_names() {
        let args = Args::try_parse_from([
            "comfyfetch",
            "--workflow-path",
            "wf.json",
            "--media-type",
            "VIDEO",
            "--frame-rate",
            "30",
        ])
        .unwrap();
        assert_eq!(args.media_type, MediaType::Video);
        assert_eq!(args.frame_rate, 30);
    }

    #[test]
    fn type_is_an_alias_for_media_type() {
        let args = Args::try_parse_from([
            "comfyfetch",
            "--workflow-path",
            "wf.json",
            "--type",
            "VIDEO",
        ])
        .unwrap();
        assert_eq!(args.media_type, MediaType::Video);
    }

    #[test]
    fn lower_case_media_type_is_rejected() {
        let result = Args::try_parse_from([
            "comfyfetch",
            "--workflow-path",
            "wf.json",
            "--media-type",
            "video",
        ]);
        assert!(result.is_err());
    }
}
