//! The two-class schema used by the demo upload.

use crate::annotation::VideoObject;
use crate::geometry::GeometryKind;
use crate::meta::{ObjClass, ProjectMeta, ProjectType, Rgb};

/// Rectangle class name.
pub const RECTANGLE_CLASS: &str = "kiwi";

/// Bitmap class name.
pub const BITMAP_CLASS: &str = "orange";

/// Display color of [`RECTANGLE_CLASS`].
pub const RECTANGLE_COLOR: Rgb = Rgb([0, 0, 255]);

/// Display color of [`BITMAP_CLASS`].
pub const BITMAP_COLOR: Rgb = Rgb([255, 255, 0]);

/// Project meta plus the one tracked object per class.
#[derive(Debug, Clone)]
pub struct DemoSchema {
    pub meta: ProjectMeta,
    pub rectangle_object: VideoObject,
    pub bitmap_object: VideoObject,
}

impl DemoSchema {
    pub fn new() -> Self {
        let rectangle_class = ObjClass::new(RECTANGLE_CLASS, GeometryKind::Rectangle, RECTANGLE_COLOR);
        let bitmap_class = ObjClass::new(BITMAP_CLASS, GeometryKind::Bitmap, BITMAP_COLOR);

        Self {
            meta: ProjectMeta::from_distinct(
                vec![rectangle_class.clone(), bitmap_class.clone()],
                ProjectType::Videos,
            ),
            rectangle_object: VideoObject::new(rectangle_class),
            bitmap_object: VideoObject::new(bitmap_class),
        }
    }

    /// Both objects, rectangle first.
    pub fn objects(&self) -> Vec<VideoObject> {
        vec![self.rectangle_object.clone(), self.bitmap_object.clone()]
    }
}

impl Default for DemoSchema {
    fn default() -> Self {
        Self::new()
    }
}
