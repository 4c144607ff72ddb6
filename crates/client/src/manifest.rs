//! Frame-sequence playlist generation.
//!
//! VIDEO mode does not encode anything locally; it writes an ffconcat
//! playlist next to the downloaded frames so an external tool (ffmpeg
//! or anything that reads the concat demuxer format) can assemble the
//! sequence at the requested frame rate.

/// Build an ffconcat playlist for the given frame filenames.
///
/// Each frame is shown for `1 / frame_rate` seconds. The final frame
/// is repeated without a duration because the concat demuxer drops the
/// last duration directive otherwise. Filenames are expected to be
/// relative to the playlist's own directory.
pub fn ffconcat_playlist(frames: &[String], frame_rate: u32) -> String {
    let mut out = String::from("ffconcat version 1.0\n");
    if frames.is_empty() || frame_rate == 0 {
        return out;
    }

    let duration = frame_duration(frame_rate);
    for frame in frames {
        out.push_str(&format!("file '{frame}'\nduration {duration}\n"));
    }
    if let Some(last) = frames.last() {
        out.push_str(&format!("file '{last}'\n"));
    }
    out
}

/// Seconds per frame, formatted with enough precision for NTSC-ish rates.
fn frame_duration(frame_rate: u32) -> String {
    format!("{:.6}", 1.0 / frame_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_lists_each_frame_with_duration() {
        let frames = vec!["out_0.png".to_string(), "out_1.png".to_string()];
        let playlist = ffconcat_playlist(&frames, 25);
        assert_eq!(
            playlist,
            "ffconcat version 1.0\n\
             file 'out_0.png'\nduration 0.040000\n\
             file 'out_1.png'\nduration 0.040000\n\
             file 'out_1.png'\n"
        );
    }

    #[test]
    fn default_frame_rate_duration() {
        assert_eq!(frame_duration(24), "0.041667");
    }

    #[test]
    fn empty_sequence_is_just_the_header() {
        assert_eq!(ffconcat_playlist(&[], 24), "ffconcat version 1.0\n");
    }

    #[test]
    fn zero_frame_rate_produces_no_entries() {
        let frames = vec!["out_0.png".to_string()];
        assert_eq!(ffconcat_playlist(&frames, 0), "ffconcat version 1.0\n");
    }
}
