use uuid::Uuid;

use crate::annotation::VideoObject;
use crate::error::CoreError;
use crate::geometry::Geometry;

/// One geometry of one object on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFigure {
    key: Uuid,
    object_key: Uuid,
    geometry: Geometry,
    frame_index: u32,
}

impl VideoFigure {
    /// Create a figure for `object`. The geometry kind must match the
    /// object's class.
    pub fn new(object: &VideoObject, geometry: Geometry, frame_index: u32) -> Result<Self, CoreError> {
        Self::with_key(object, geometry, frame_index, Uuid::new_v4())
    }

    pub fn with_key(
        object: &VideoObject,
        geometry: Geometry,
        frame_index: u32,
        key: Uuid,
    ) -> Result<Self, CoreError> {
        let expected = object.class().kind();
        if geometry.kind() != expected {
            return Err(CoreError::Validation(format!(
                "class '{}' expects {expected} geometry, got {}",
                object.class().name(),
                geometry.kind()
            )));
        }
        Ok(Self {
            key,
            object_key: object.key(),
            geometry,
            frame_index,
        })
    }

    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn object_key(&self) -> Uuid {
        self.object_key
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }
}
