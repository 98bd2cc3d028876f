//! Video frame size and frame count via `ffprobe`.
//!
//! [`VideoInspector`] is the seam the pipeline uses; [`FfprobeInspector`]
//! is the production implementation that shells out to `ffprobe`.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::types::FrameSize;

/// Error type for video probing.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("ffprobe binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("no usable video stream in {0}")]
    NoVideoStream(String),
}

/// Frame geometry and length of a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoShape {
    pub size: FrameSize,
    pub frames_count: u32,
}

/// Reads the [`VideoShape`] of a local video file.
#[async_trait]
pub trait VideoInspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> Result<VideoShape, ProbeError>;
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// e.g. "30/1" or "24000/1001"
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
    pub nb_frames: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// ffprobe inspector
// ---------------------------------------------------------------------------

/// [`VideoInspector`] backed by the `ffprobe` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeInspector;

#[async_trait]
impl VideoInspector for FfprobeInspector {
    async fn inspect(&self, path: &Path) -> Result<VideoShape, ProbeError> {
        let probe = probe_video(path).await?;
        shape_from_probe(&probe).ok_or_else(|| ProbeError::NoVideoStream(path.display().to_string()))
    }
}

/// Run `ffprobe` on a video file and return the parsed JSON output.
pub async fn probe_video(path: &Path) -> Result<FfprobeOutput, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::VideoNotFound(path.display().to_string()));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(ProbeError::NotFound)?;

    if !output.status.success() {
        return Err(ProbeError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| ProbeError::ParseError(format!("{e}: {stdout}")))
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Frame size and count from ffprobe output, or `None` when there is no
/// video stream with known dimensions and a positive frame count.
pub fn shape_from_probe(probe: &FfprobeOutput) -> Option<VideoShape> {
    let stream = first_video_stream(probe)?;
    let size = FrameSize::new(stream.height?, stream.width?);
    let frames_count = u32::try_from(parse_total_frames(probe)).ok().filter(|&n| n > 0)?;
    Some(VideoShape { size, frames_count })
}

/// Find the first video stream in the ffprobe output.
fn first_video_stream(probe: &FfprobeOutput) -> Option<&FfprobeStream> {
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
}

/// Parse the video duration in seconds from ffprobe output.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    // Format-level duration first, then the video stream's.
    let from_format = probe.format.duration.as_deref().and_then(|d| d.parse::<f64>().ok());
    let from_stream = || {
        first_video_stream(probe)
            .and_then(|s| s.duration.as_deref())
            .and_then(|d| d.parse::<f64>().ok())
    };
    from_format.or_else(from_stream).unwrap_or(0.0)
}

/// Parse the video framerate from ffprobe output.
pub fn parse_framerate(probe: &FfprobeOutput) -> f64 {
    first_video_stream(probe)
        .and_then(|s| s.r_frame_rate.as_deref())
        .map(parse_fraction)
        .unwrap_or(0.0)
}

/// Parse a fraction string like `"30/1"` into a float.
fn parse_fraction(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        let num = num.parse::<f64>().unwrap_or(0.0);
        let den = den.parse::<f64>().unwrap_or(1.0);
        return if den > 0.0 { num / den } else { 0.0 };
    }
    s.parse::<f64>().unwrap_or(0.0)
}

/// Count total frames: `nb_frames` when present, else duration x framerate.
pub fn parse_total_frames(probe: &FfprobeOutput) -> i64 {
    if let Some(n) = first_video_stream(probe)
        .and_then(|s| s.nb_frames.as_deref())
        .and_then(|nb| nb.parse::<i64>().ok())
    {
        return n;
    }
    let duration = parse_duration(probe);
    let fps = parse_framerate(probe);
    if duration > 0.0 && fps > 0.0 {
        return (duration * fps).round() as i64;
    }
    0
}
