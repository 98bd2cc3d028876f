//! Binary segmentation masks.
//!
//! A [`Bitmap`] is stored cropped to the bounding box of its set pixels,
//! with the crop's top-left corner kept as the origin. On the wire the
//! mask travels as `base64(zlib(png))` plus an `[x, y]` origin.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use serde_json::{json, Value};

use crate::error::CoreError;

/// Errors raised while loading, encoding or decoding a mask.
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    #[error("mask image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("mask I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mask data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("mask has no set pixels")]
    Empty,

    #[error("mask origin ({row}, {col}) plus its crop offset overflows frame coordinates")]
    OriginOverflow { row: u32, col: u32 },

    #[error("mask buffer has {actual} pixels, expected {width}x{height}")]
    Dimensions {
        width: u32,
        height: u32,
        actual: usize,
    },
}

impl From<MaskError> for CoreError {
    fn from(err: MaskError) -> Self {
        CoreError::Format(err.to_string())
    }
}

/// Cropped binary mask positioned in frame coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    origin_row: u32,
    origin_col: u32,
    width: u32,
    height: u32,
    /// Row-major, `width * height` entries.
    data: Vec<bool>,
}

impl Bitmap {
    /// Build a bitmap from a full-frame row-major mask, cropping it to the
    /// bounding box of its set pixels.
    pub fn from_mask(width: u32, height: u32, data: Vec<bool>) -> Result<Self, MaskError> {
        Self::cropped(0, 0, width, height, data)
    }

    /// Load a mask image from disk. A pixel is set when it is opaque and
    /// any of its color channels is non-zero.
    pub fn from_path(path: &Path) -> Result<Self, MaskError> {
        let img = image::open(path)?;
        Self::from_image(&img)
    }

    /// Build a bitmap from an already decoded image.
    pub fn from_image(img: &DynamicImage) -> Result<Self, MaskError> {
        let (width, height, data) = mask_from_image(img);
        Self::from_mask(width, height, data)
    }

    pub fn origin_row(&self) -> u32 {
        self.origin_row
    }

    pub fn origin_col(&self) -> u32 {
        self.origin_col
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at crop-local `(row, col)` is set.
    pub(crate) fn is_set(&self, row: u32, col: u32) -> bool {
        row < self.height && col < self.width && self.data[(row * self.width + col) as usize]
    }

    /// Number of set pixels.
    pub fn area(&self) -> usize {
        self.data.iter().filter(|&&px| px).count()
    }

    /// Encode the cropped mask as `base64(zlib(png))`.
    pub fn to_base64(&self) -> Result<String, MaskError> {
        let img = GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.is_set(y, x) { 255 } else { 0 }])
        });

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&png)?;
        let compressed = encoder.finish()?;

        Ok(STANDARD.encode(compressed))
    }

    /// Decode a `base64(zlib(png))` mask positioned at `(origin_row, origin_col)`.
    pub fn from_base64(data: &str, origin_row: u32, origin_col: u32) -> Result<Self, MaskError> {
        let compressed = STANDARD.decode(data.trim())?;

        let mut png = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut png)?;

        let img = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
        let (width, height, mask) = mask_from_image(&img);
        Self::cropped(origin_row, origin_col, width, height, mask)
    }

    /// Serialize as `{"bitmap": {"data": ..., "origin": [x, y]}}`.
    pub fn to_json(&self) -> Result<Value, MaskError> {
        Ok(json!({
            "bitmap": {
                "data": self.to_base64()?,
                "origin": [self.origin_col, self.origin_row],
            }
        }))
    }

    /// Parse the form written by [`to_json`](Self::to_json).
    pub fn from_json(json: &Value) -> Result<Self, CoreError> {
        let bitmap = json
            .get("bitmap")
            .ok_or_else(|| CoreError::Format("bitmap geometry is missing 'bitmap'".to_string()))?;

        let data = bitmap
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::Format("bitmap is missing string 'data'".to_string()))?;

        let origin = bitmap
            .get("origin")
            .and_then(Value::as_array)
            .filter(|o| o.len() == 2)
            .ok_or_else(|| CoreError::Format("bitmap 'origin' must be an [x, y] pair".to_string()))?;

        let coord = |v: &Value| -> Result<u32, CoreError> {
            v.as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    CoreError::Format(format!("bitmap origin must be a non-negative integer, got {v}"))
                })
        };

        let origin_col = coord(&origin[0])?;
        let origin_row = coord(&origin[1])?;

        Ok(Self::from_base64(data, origin_row, origin_col)?)
    }

    /// Crop `data` to its set pixels, shifting the origin accordingly.
    fn cropped(
        origin_row: u32,
        origin_col: u32,
        width: u32,
        height: u32,
        data: Vec<bool>,
    ) -> Result<Self, MaskError> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(MaskError::Dimensions {
                width,
                height,
                actual: data.len(),
            });
        }

        let mut min_row = u32::MAX;
        let mut min_col = u32::MAX;
        let mut max_row = 0;
        let mut max_col = 0;
        let mut any = false;

        for row in 0..height {
            for col in 0..width {
                if data[(row * width + col) as usize] {
                    any = true;
                    min_row = min_row.min(row);
                    min_col = min_col.min(col);
                    max_row = max_row.max(row);
                    max_col = max_col.max(col);
                }
            }
        }

        if !any {
            return Err(MaskError::Empty);
        }

        let crop_width = max_col - min_col + 1;
        let crop_height = max_row - min_row + 1;
        let mut cropped = Vec::with_capacity((crop_width * crop_height) as usize);
        for row in min_row..=max_row {
            let start = (row * width + min_col) as usize;
            cropped.extend_from_slice(&data[start..start + crop_width as usize]);
        }

        let overflow = || MaskError::OriginOverflow {
            row: origin_row,
            col: origin_col,
        };
        Ok(Self {
            origin_row: origin_row.checked_add(min_row).ok_or_else(overflow)?,
            origin_col: origin_col.checked_add(min_col).ok_or_else(overflow)?,
            width: crop_width,
            height: crop_height,
            data: cropped,
        })
    }
}

/// Threshold an image into a row-major mask.
fn mask_from_image(img: &DynamicImage) -> (u32, u32, Vec<bool>) {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let data = rgba
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            a > 0 && (r > 0 || g > 0 || b > 0)
        })
        .collect();
    (width, height, data)
}
