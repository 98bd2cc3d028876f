//! Axis-aligned rectangles.
//!
//! The canonical coordinate order everywhere in this crate is
//! **(top, left, bottom, right)**, i.e. `(y1, x1, y2, x2)`. Rows of a box
//! table are taken verbatim in that order by [`Rectangle::from_tlbr`].

use serde_json::{json, Value};

use crate::error::CoreError;
use crate::types::FrameSize;

/// Rectangle in pixel coordinates, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    top: i64,
    left: i64,
    bottom: i64,
    right: i64,
}

impl Rectangle {
    /// Build a rectangle, rejecting inverted edges.
    pub fn new(top: i64, left: i64, bottom: i64, right: i64) -> Result<Self, CoreError> {
        if top > bottom {
            return Err(CoreError::Validation(format!(
                "rectangle top ({top}) must not exceed bottom ({bottom})"
            )));
        }
        if left > right {
            return Err(CoreError::Validation(format!(
                "rectangle left ({left}) must not exceed right ({right})"
            )));
        }
        Ok(Self {
            top,
            left,
            bottom,
            right,
        })
    }

    /// Build a rectangle from a `[top, left, bottom, right]` row.
    pub fn from_tlbr(row: [i64; 4]) -> Result<Self, CoreError> {
        let [top, left, bottom, right] = row;
        Self::new(top, left, bottom, right)
    }

    /// Coordinates as a `[top, left, bottom, right]` row.
    pub fn to_tlbr(&self) -> [i64; 4] {
        [self.top, self.left, self.bottom, self.right]
    }

    pub fn top(&self) -> i64 {
        self.top
    }

    pub fn left(&self) -> i64 {
        self.left
    }

    pub fn bottom(&self) -> i64 {
        self.bottom
    }

    pub fn right(&self) -> i64 {
        self.right
    }

    /// Whether the rectangle lies entirely inside a frame of `size`.
    pub fn fits_within(&self, size: FrameSize) -> bool {
        self.top >= 0
            && self.left >= 0
            && self.bottom < i64::from(size.height)
            && self.right < i64::from(size.width)
    }

    /// Serialize as `{"points": {"exterior": [[left, top], [right, bottom]], "interior": []}}`.
    ///
    /// Wire points are `[x, y]` pairs.
    pub fn to_json(&self) -> Value {
        json!({
            "points": {
                "exterior": [[self.left, self.top], [self.right, self.bottom]],
                "interior": [],
            }
        })
    }

    /// Parse the points form written by [`to_json`](Self::to_json).
    ///
    /// The two exterior corners may come in either order; they are
    /// normalized to min/max edges.
    pub fn from_json(json: &Value) -> Result<Self, CoreError> {
        let exterior = json
            .get("points")
            .and_then(|p| p.get("exterior"))
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CoreError::Format("rectangle is missing 'points.exterior'".to_string())
            })?;

        if exterior.len() != 2 {
            return Err(CoreError::Format(format!(
                "rectangle exterior must have exactly 2 points, got {}",
                exterior.len()
            )));
        }

        let (x1, y1) = parse_point(&exterior[0])?;
        let (x2, y2) = parse_point(&exterior[1])?;

        Self::new(y1.min(y2), x1.min(x2), y1.max(y2), x1.max(x2))
    }
}

/// Parse an `[x, y]` point. Fractional values are rounded.
fn parse_point(value: &Value) -> Result<(i64, i64), CoreError> {
    let coords = value
        .as_array()
        .filter(|arr| arr.len() == 2)
        .ok_or_else(|| CoreError::Format(format!("point must be an [x, y] pair, got {value}")))?;

    let coord = |v: &Value| -> Result<i64, CoreError> {
        v.as_i64()
            .or_else(|| v.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| CoreError::Format(format!("point coordinate must be a number, got {v}")))
    };

    Ok((coord(&coords[0])?, coord(&coords[1])?))
}
