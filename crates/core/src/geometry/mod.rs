//! Figure geometries supported by the annotation schema.
//!
//! Only two shapes are used: axis-aligned [`Rectangle`]s and cropped
//! [`Bitmap`] masks. Each serializes to the platform's geometry JSON and
//! is tagged on the wire with its [`GeometryKind`] string.

pub mod bitmap;
pub mod rectangle;

pub use bitmap::{Bitmap, MaskError};
pub use rectangle::Rectangle;

use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Geometry kind
// ---------------------------------------------------------------------------

/// Shape type declared by an object class and carried by its figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    Rectangle,
    Bitmap,
}

/// All valid geometry kind strings.
const VALID_KIND_STRINGS: &[&str] = &["rectangle", "bitmap"];

impl GeometryKind {
    /// Return the kind as the lowercase string used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Bitmap => "bitmap",
        }
    }

    /// Parse a kind from its wire string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "rectangle" => Ok(Self::Rectangle),
            "bitmap" => Ok(Self::Bitmap),
            _ => Err(CoreError::Validation(format!(
                "Unsupported geometry type '{s}'. Must be one of: {}",
                VALID_KIND_STRINGS.join(", ")
            ))),
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A concrete figure shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rectangle(Rectangle),
    Bitmap(Bitmap),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Rectangle(_) => GeometryKind::Rectangle,
            Self::Bitmap(_) => GeometryKind::Bitmap,
        }
    }

    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Self::Rectangle(rect) => Some(rect),
            Self::Bitmap(_) => None,
        }
    }

    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::Bitmap(bitmap) => Some(bitmap),
            Self::Rectangle(_) => None,
        }
    }

    /// Serialize the shape body (without the kind tag).
    pub fn to_json(&self) -> Result<Value, CoreError> {
        match self {
            Self::Rectangle(rect) => Ok(rect.to_json()),
            Self::Bitmap(bitmap) => Ok(bitmap.to_json()?),
        }
    }

    /// Parse a shape body whose kind is already known from the wire tag.
    pub fn from_json(kind: GeometryKind, json: &Value) -> Result<Self, CoreError> {
        match kind {
            GeometryKind::Rectangle => Ok(Self::Rectangle(Rectangle::from_json(json)?)),
            GeometryKind::Bitmap => Ok(Self::Bitmap(Bitmap::from_json(json)?)),
        }
    }
}

impl From<Rectangle> for Geometry {
    fn from(rect: Rectangle) -> Self {
        Self::Rectangle(rect)
    }
}

impl From<Bitmap> for Geometry {
    fn from(bitmap: Bitmap) -> Self {
        Self::Bitmap(bitmap)
    }
}
