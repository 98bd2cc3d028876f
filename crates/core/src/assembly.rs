//! Building a [`VideoAnnotation`] from a mask directory and a box table.
//!
//! Each mask file contributes one frame. Its frame index is the integer
//! suffix of the file stem (`7.png`, `frame_07.png`, `mask-7.png`), never
//! its position in the directory listing. A frame holds the bitmap figure
//! loaded from the mask and the rectangle figure taken from the box row
//! at the same index.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::annotation::{Frame, VideoAnnotation, VideoFigure};
use crate::error::CoreError;
use crate::geometry::{Bitmap, MaskError, Rectangle};
use crate::probe::VideoShape;
use crate::schema::DemoSchema;

/// Rectangle rows for the ten frames of the bundled demo video, in
/// `[top, left, bottom, right]` order.
pub const DEMO_BOXES: [[i64; 4]; 10] = [
    [632, 136, 817, 350],
    [655, 139, 842, 355],
    [672, 145, 864, 361],
    [700, 158, 885, 366],
    [700, 153, 885, 367],
    [724, 156, 914, 375],
    [745, 164, 926, 385],
    [770, 177, 944, 396],
    [793, 189, 966, 410],
    [806, 199, 980, 417],
];

/// Trailing digits of a file stem.
static FRAME_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Input-data errors raised while assembling the annotation.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("failed to read mask directory {dir}: {source}")]
    ReadDir {
        dir: String,
        source: std::io::Error,
    },

    #[error("mask directory {dir} contains no mask files")]
    NoMasks { dir: String },

    #[error("mask file '{file}' has no integer frame index suffix")]
    InvalidMaskName { file: String },

    #[error("mask files '{first}' and '{second}' both map to frame {index}")]
    DuplicateFrameIndex {
        index: u32,
        first: String,
        second: String,
    },

    #[error(
        "mask file '{file}' maps to frame {index}, but only {available} rectangle rows are defined"
    )]
    BoxIndexOutOfBounds {
        file: String,
        index: u32,
        available: usize,
    },

    #[error("mask file '{file}' maps to frame {index}, but the video has only {frames_count} frames")]
    FrameOutOfRange {
        file: String,
        index: u32,
        frames_count: u32,
    },

    #[error("failed to load mask '{file}' for frame {index}: {source}")]
    Mask {
        file: String,
        index: u32,
        source: MaskError,
    },

    #[error("rectangle row {index} {row:?} is invalid: {source}")]
    InvalidBox {
        index: usize,
        row: [i64; 4],
        source: CoreError,
    },

    #[error("failed to read rectangle table {path}: {message}")]
    BoxTable { path: String, message: String },

    #[error("assembled annotation is inconsistent: {0}")]
    Annotation(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Mask discovery
// ---------------------------------------------------------------------------

/// A mask file and the frame index parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskFile {
    pub index: u32,
    pub path: PathBuf,
}

impl MaskFile {
    fn display_name(&self) -> String {
        display_name(&self.path)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the frame index encoded as the trailing digits of a file stem.
///
/// ```
/// use slyvid_core::assembly::parse_frame_index;
///
/// assert_eq!(parse_frame_index("frame_07.png"), Some(7));
/// assert_eq!(parse_frame_index("3.png"), Some(3));
/// assert_eq!(parse_frame_index("mask.png"), None);
/// ```
pub fn parse_frame_index(file_name: &str) -> Option<u32> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    FRAME_SUFFIX_RE
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// List the mask files of `dir`, sorted by parsed frame index.
///
/// Hidden files and non-files are skipped. Every remaining file must
/// carry a unique integer suffix.
pub fn discover_masks(dir: &Path) -> Result<Vec<MaskFile>, AssemblyError> {
    let read_dir_err = |source| AssemblyError::ReadDir {
        dir: dir.display().to_string(),
        source,
    };

    let mut masks = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') || !entry.file_type().map_err(read_dir_err)?.is_file() {
            continue;
        }

        let index = parse_frame_index(&file_name)
            .ok_or(AssemblyError::InvalidMaskName { file: file_name })?;
        masks.push(MaskFile {
            index,
            path: entry.path(),
        });
    }

    if masks.is_empty() {
        return Err(AssemblyError::NoMasks {
            dir: dir.display().to_string(),
        });
    }

    masks.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    for pair in masks.windows(2) {
        if pair[0].index == pair[1].index {
            return Err(AssemblyError::DuplicateFrameIndex {
                index: pair[0].index,
                first: pair[0].display_name(),
                second: pair[1].display_name(),
            });
        }
    }

    Ok(masks)
}

// ---------------------------------------------------------------------------
// Box table
// ---------------------------------------------------------------------------

/// Read a JSON array of `[top, left, bottom, right]` rows.
pub fn load_boxes(path: &Path) -> Result<Vec<[i64; 4]>, AssemblyError> {
    let table_err = |message: String| AssemblyError::BoxTable {
        path: path.display().to_string(),
        message,
    };

    let raw = std::fs::read_to_string(path).map_err(|e| table_err(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| table_err(e.to_string()))
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build one frame per mask: bitmap figure first, rectangle figure second.
pub fn assemble_frames(
    masks: &[MaskFile],
    boxes: &[[i64; 4]],
    shape: VideoShape,
    schema: &DemoSchema,
) -> Result<Vec<Frame>, AssemblyError> {
    let mut frames = Vec::with_capacity(masks.len());

    for mask in masks {
        let index = mask.index;
        let row = *boxes
            .get(index as usize)
            .ok_or_else(|| AssemblyError::BoxIndexOutOfBounds {
                file: mask.display_name(),
                index,
                available: boxes.len(),
            })?;

        if index >= shape.frames_count {
            return Err(AssemblyError::FrameOutOfRange {
                file: mask.display_name(),
                index,
                frames_count: shape.frames_count,
            });
        }

        let rect = Rectangle::from_tlbr(row).map_err(|source| AssemblyError::InvalidBox {
            index: index as usize,
            row,
            source,
        })?;
        if !rect.fits_within(shape.size) {
            tracing::warn!(
                frame = index,
                top = rect.top(),
                left = rect.left(),
                bottom = rect.bottom(),
                right = rect.right(),
                height = shape.size.height,
                width = shape.size.width,
                "Rectangle extends outside the video frame; check the row uses [top, left, bottom, right] order",
            );
        }

        let bitmap = Bitmap::from_path(&mask.path).map_err(|source| AssemblyError::Mask {
            file: mask.display_name(),
            index,
            source,
        })?;

        let figures = vec![
            VideoFigure::new(&schema.bitmap_object, bitmap.into(), index)?,
            VideoFigure::new(&schema.rectangle_object, rect.into(), index)?,
        ];
        frames.push(Frame::new(index, figures)?);

        tracing::debug!(frame = index, mask = %mask.path.display(), "Assembled frame");
    }

    Ok(frames)
}

/// Discover the masks of `masks_dir` and assemble the full annotation.
pub fn build_annotation(
    masks_dir: &Path,
    boxes: &[[i64; 4]],
    shape: VideoShape,
    schema: &DemoSchema,
) -> Result<VideoAnnotation, AssemblyError> {
    let masks = discover_masks(masks_dir)?;
    let frames = assemble_frames(&masks, boxes, shape, schema)?;
    Ok(VideoAnnotation::new(
        shape.size,
        shape.frames_count,
        schema.objects(),
        frames,
    )?)
}
