use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::annotation::{Frame, VideoFigure, VideoObject};
use crate::error::CoreError;
use crate::geometry::{Geometry, GeometryKind};
use crate::meta::ProjectMeta;
use crate::types::FrameSize;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationJson {
    size: FrameSize,
    frames_count: u32,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default)]
    tags: Vec<Value>,
    #[serde(default)]
    objects: Vec<ObjectJson>,
    #[serde(default)]
    frames: Vec<FrameJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectJson {
    key: String,
    class_title: String,
    #[serde(default)]
    tags: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FrameJson {
    index: u32,
    #[serde(default)]
    figures: Vec<FigureJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FigureJson {
    key: String,
    object_key: String,
    geometry_type: String,
    geometry: Value,
}

fn format_key(key: Uuid) -> String {
    key.simple().to_string()
}

fn parse_key(key: &str) -> Result<Uuid, CoreError> {
    Uuid::parse_str(key).map_err(|e| CoreError::Format(format!("invalid key '{key}': {e}")))
}

// ---------------------------------------------------------------------------
// VideoAnnotation
// ---------------------------------------------------------------------------

/// All objects and frame-indexed figures of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnnotation {
    key: Uuid,
    size: FrameSize,
    frames_count: u32,
    description: String,
    objects: Vec<VideoObject>,
    /// Sorted by index, indices unique.
    frames: Vec<Frame>,
}

impl VideoAnnotation {
    /// Assemble an annotation, checking that:
    ///
    /// - object keys are unique,
    /// - frame indices are unique and below `frames_count`,
    /// - every figure references one of `objects` with a matching class kind.
    ///
    /// Frames are stored sorted by index.
    pub fn new(
        size: FrameSize,
        frames_count: u32,
        objects: Vec<VideoObject>,
        mut frames: Vec<Frame>,
    ) -> Result<Self, CoreError> {
        for (i, object) in objects.iter().enumerate() {
            if objects[..i].iter().any(|o| o.key() == object.key()) {
                return Err(CoreError::Validation(format!(
                    "duplicate object key {}",
                    format_key(object.key())
                )));
            }
        }

        frames.sort_by_key(Frame::index);
        for pair in frames.windows(2) {
            if pair[0].index() == pair[1].index() {
                return Err(CoreError::Validation(format!(
                    "frame {} appears more than once",
                    pair[0].index()
                )));
            }
        }

        for frame in &frames {
            if frame.index() >= frames_count {
                return Err(CoreError::Validation(format!(
                    "frame index {} is out of range for a video with {frames_count} frames",
                    frame.index()
                )));
            }

            for figure in frame.figures() {
                let object = objects
                    .iter()
                    .find(|o| o.key() == figure.object_key())
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "figure on frame {} references unknown object {}",
                            frame.index(),
                            format_key(figure.object_key())
                        ))
                    })?;

                if object.class().kind() != figure.geometry().kind() {
                    return Err(CoreError::Validation(format!(
                        "figure on frame {} has {} geometry but class '{}' expects {}",
                        frame.index(),
                        figure.geometry().kind(),
                        object.class().name(),
                        object.class().kind()
                    )));
                }
            }
        }

        Ok(Self {
            key: Uuid::new_v4(),
            size,
            frames_count,
            description: String::new(),
            objects,
            frames,
        })
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    pub fn frames_count(&self) -> u32 {
        self.frames_count
    }

    pub fn objects(&self) -> &[VideoObject] {
        &self.objects
    }

    /// Frames in ascending index order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: u32) -> Option<&Frame> {
        self.frames
            .binary_search_by_key(&index, Frame::index)
            .ok()
            .map(|pos| &self.frames[pos])
    }

    pub fn object(&self, key: Uuid) -> Option<&VideoObject> {
        self.objects.iter().find(|o| o.key() == key)
    }

    /// Total number of figures across all frames.
    pub fn figures_count(&self) -> usize {
        self.frames.iter().map(|f| f.figures().len()).sum()
    }

    /// Serialize to the platform's video annotation JSON.
    pub fn to_json(&self) -> Result<Value, CoreError> {
        let objects = self
            .objects
            .iter()
            .map(|o| ObjectJson {
                key: format_key(o.key()),
                class_title: o.class().name().to_string(),
                tags: Vec::new(),
            })
            .collect();

        let frames = self
            .frames
            .iter()
            .map(|frame| {
                let figures = frame
                    .figures()
                    .iter()
                    .map(|figure| {
                        Ok(FigureJson {
                            key: format_key(figure.key()),
                            object_key: format_key(figure.object_key()),
                            geometry_type: figure.geometry().kind().as_str().to_string(),
                            geometry: figure.geometry().to_json()?,
                        })
                    })
                    .collect::<Result<Vec<_>, CoreError>>()?;
                Ok(FrameJson {
                    index: frame.index(),
                    figures,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let doc = AnnotationJson {
            size: self.size,
            frames_count: self.frames_count,
            description: self.description.clone(),
            key: Some(format_key(self.key)),
            tags: Vec::new(),
            objects,
            frames,
        };

        serde_json::to_value(doc).map_err(|e| CoreError::Internal(format!("annotation: {e}")))
    }

    /// Reconstruct an annotation from its JSON using `meta` to resolve
    /// class titles.
    pub fn from_json(json: &Value, meta: &ProjectMeta) -> Result<Self, CoreError> {
        let doc: AnnotationJson = serde_json::from_value(json.clone())
            .map_err(|e| CoreError::Format(format!("video annotation: {e}")))?;

        let objects = doc
            .objects
            .iter()
            .map(|o| {
                let class = meta.get_class(&o.class_title).ok_or_else(|| {
                    CoreError::Format(format!(
                        "object {} references class '{}' missing from project meta",
                        o.key, o.class_title
                    ))
                })?;
                Ok(VideoObject::with_key(class.clone(), parse_key(&o.key)?))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let frames = doc
            .frames
            .iter()
            .map(|frame| {
                let figures = frame
                    .figures
                    .iter()
                    .map(|figure| {
                        let object_key = parse_key(&figure.object_key)?;
                        let object = objects
                            .iter()
                            .find(|o| o.key() == object_key)
                            .ok_or_else(|| {
                                CoreError::Format(format!(
                                    "figure {} on frame {} references unknown object {}",
                                    figure.key, frame.index, figure.object_key
                                ))
                            })?;
                        let kind = GeometryKind::from_str(&figure.geometry_type)?;
                        let geometry = Geometry::from_json(kind, &figure.geometry)?;
                        VideoFigure::with_key(object, geometry, frame.index, parse_key(&figure.key)?)
                    })
                    .collect::<Result<Vec<_>, CoreError>>()?;
                Frame::new(frame.index, figures)
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let mut annotation = Self::new(doc.size, doc.frames_count, objects, frames)?;
        if let Some(key) = doc.key.as_deref() {
            annotation.key = parse_key(key)?;
        }
        annotation.description = doc.description;
        Ok(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Bitmap, Rectangle};
    use crate::meta::{ObjClass, ProjectType, Rgb};
    use serde_json::json;

    struct Fixture {
        meta: ProjectMeta,
        kiwi: VideoObject,
        orange: VideoObject,
    }

    fn fixture() -> Fixture {
        let kiwi_class = ObjClass::new("kiwi", GeometryKind::Rectangle, Rgb([0, 0, 255]));
        let orange_class = ObjClass::new("orange", GeometryKind::Bitmap, Rgb([255, 255, 0]));
        Fixture {
            meta: ProjectMeta::new(vec![kiwi_class.clone(), orange_class.clone()], ProjectType::Videos)
                .unwrap(),
            kiwi: VideoObject::new(kiwi_class),
            orange: VideoObject::new(orange_class),
        }
    }

    fn frame_with_both(fx: &Fixture, index: u32) -> Frame {
        let rect = Rectangle::new(index as i64, 0, index as i64 + 10, 20).unwrap();
        let mask = Bitmap::from_mask(2, 2, vec![true, false, false, true]).unwrap();
        Frame::new(
            index,
            vec![
                VideoFigure::new(&fx.orange, mask.into(), index).unwrap(),
                VideoFigure::new(&fx.kiwi, rect.into(), index).unwrap(),
            ],
        )
        .unwrap()
    }

    fn sample(fx: &Fixture) -> VideoAnnotation {
        VideoAnnotation::new(
            FrameSize::new(720, 1280),
            10,
            vec![fx.kiwi.clone(), fx.orange.clone()],
            vec![frame_with_both(fx, 3), frame_with_both(fx, 1)],
        )
        .unwrap()
    }

    // -- construction ----------------------------------------------------------

    #[test]
    fn frames_are_sorted_by_index() {
        let fx = fixture();
        let ann = sample(&fx);
        let indices: Vec<u32> = ann.frames().iter().map(Frame::index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert!(ann.frame(3).is_some());
        assert!(ann.frame(2).is_none());
        assert_eq!(ann.figures_count(), 4);
    }

    #[test]
    fn frame_index_must_be_below_frames_count() {
        let fx = fixture();
        let err = VideoAnnotation::new(
            FrameSize::new(720, 1280),
            10,
            vec![fx.kiwi.clone(), fx.orange.clone()],
            vec![frame_with_both(&fx, 10)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn duplicate_frames_are_rejected() {
        let fx = fixture();
        let err = VideoAnnotation::new(
            FrameSize::new(720, 1280),
            10,
            vec![fx.kiwi.clone(), fx.orange.clone()],
            vec![frame_with_both(&fx, 2), frame_with_both(&fx, 2)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn figures_must_reference_known_objects() {
        let fx = fixture();
        let err = VideoAnnotation::new(
            FrameSize::new(720, 1280),
            10,
            vec![fx.kiwi.clone()],
            vec![frame_with_both(&fx, 0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown object"));
    }

    #[test]
    fn frame_rejects_figure_from_other_index() {
        let fx = fixture();
        let rect = Rectangle::new(0, 0, 1, 1).unwrap();
        let figure = VideoFigure::new(&fx.kiwi, rect.into(), 4).unwrap();
        assert!(Frame::new(5, vec![figure]).is_err());
    }

    // -- wire format -----------------------------------------------------------

    #[test]
    fn json_layout_uses_platform_field_names() {
        let fx = fixture();
        let json = sample(&fx).to_json().unwrap();
        assert_eq!(json["size"], json!({"height": 720, "width": 1280}));
        assert_eq!(json["framesCount"], 10);
        assert_eq!(json["objects"][0]["classTitle"], "kiwi");
        assert_eq!(json["objects"][0]["key"].as_str().unwrap().len(), 32);
        assert_eq!(json["frames"][0]["index"], 1);
        assert_eq!(json["frames"][0]["figures"][0]["geometryType"], "bitmap");
        assert_eq!(json["frames"][0]["figures"][1]["geometryType"], "rectangle");
        assert_eq!(
            json["frames"][0]["figures"][1]["objectKey"],
            json["objects"][0]["key"]
        );
    }

    #[test]
    fn json_reconstructs_identical_annotation() {
        let fx = fixture();
        let ann = sample(&fx);
        let parsed = VideoAnnotation::from_json(&ann.to_json().unwrap(), &fx.meta).unwrap();
        assert_eq!(parsed, ann);
    }

    #[test]
    fn from_json_ignores_server_fields() {
        let fx = fixture();
        let mut json = sample(&fx).to_json().unwrap();
        json["videoId"] = json!(42);
        json["createdAt"] = json!("2024-01-01T00:00:00.000Z");
        json["objects"][0]["id"] = json!(7);
        assert!(VideoAnnotation::from_json(&json, &fx.meta).is_ok());
    }

    #[test]
    fn from_json_requires_classes_in_meta() {
        let fx = fixture();
        let json = sample(&fx).to_json().unwrap();
        let kiwi_only = ProjectMeta::new(
            vec![fx.kiwi.class().clone()],
            ProjectType::Videos,
        )
        .unwrap();
        let err = VideoAnnotation::from_json(&json, &kiwi_only).unwrap_err();
        assert!(err.to_string().contains("orange"));
    }

    #[test]
    fn from_json_rejects_geometry_not_matching_class() {
        let fx = fixture();
        let mut json = sample(&fx).to_json().unwrap();
        json["frames"][0]["figures"][1]["objectKey"] = json["objects"][1]["key"].clone();
        assert!(VideoAnnotation::from_json(&json, &fx.meta).is_err());
    }
}
