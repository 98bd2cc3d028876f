//! Project schema: object classes and the project meta document.
//!
//! The meta is what the server validates annotation uploads against, so
//! it must be pushed before any annotation referencing its classes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::geometry::GeometryKind;
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// Display color of an object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Format as `#RRGGBB` (uppercase).
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0;
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Parse `#RRGGBB` (either case).
    pub fn from_hex(color: &str) -> Result<Self, CoreError> {
        let hex = color.strip_prefix('#').ok_or_else(|| {
            CoreError::Validation(format!("Invalid color '{color}'. Must start with '#'"))
        })?;

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::Validation(format!(
                "Invalid color '{color}'. Must be in #RRGGBB hex format"
            )));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| CoreError::Validation(format!("Invalid color '{color}': {e}")))
        };

        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

// ---------------------------------------------------------------------------
// Object class
// ---------------------------------------------------------------------------

/// Named annotation category with a fixed geometry kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjClass {
    name: String,
    kind: GeometryKind,
    color: Rgb,
}

impl ObjClass {
    pub fn new(name: impl Into<String>, kind: GeometryKind, color: Rgb) -> Self {
        Self {
            name: name.into(),
            kind,
            color,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

// ---------------------------------------------------------------------------
// Project type
// ---------------------------------------------------------------------------

/// Media type a project holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectType {
    #[default]
    Images,
    Videos,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "images" => Ok(Self::Images),
            "videos" => Ok(Self::Videos),
            _ => Err(CoreError::Validation(format!(
                "Unsupported project type '{s}'. Must be one of: images, videos"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Project meta
// ---------------------------------------------------------------------------

/// Wire form of one class inside the meta document.
#[derive(Debug, Serialize, Deserialize)]
struct ClassJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<EntityId>,
    title: String,
    shape: String,
    color: String,
    #[serde(default)]
    geometry_config: Value,
}

/// Wire form of the whole meta document.
#[derive(Debug, Serialize, Deserialize)]
struct MetaJson {
    #[serde(default)]
    classes: Vec<ClassJson>,
    #[serde(default)]
    tags: Vec<Value>,
    #[serde(rename = "projectType", default, skip_serializing_if = "Option::is_none")]
    project_type: Option<String>,
}

/// The set of classes a project's annotations may reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectMeta {
    classes: Vec<ObjClass>,
    project_type: ProjectType,
}

impl ProjectMeta {
    /// Build a meta, rejecting duplicate class names.
    pub fn new(classes: Vec<ObjClass>, project_type: ProjectType) -> Result<Self, CoreError> {
        for (i, class) in classes.iter().enumerate() {
            if classes[..i].iter().any(|c| c.name == class.name) {
                return Err(CoreError::Validation(format!(
                    "duplicate object class '{}'",
                    class.name
                )));
            }
        }
        Ok(Self {
            classes,
            project_type,
        })
    }

    /// Build a meta from classes whose names are known to be distinct.
    pub(crate) fn from_distinct(classes: Vec<ObjClass>, project_type: ProjectType) -> Self {
        Self {
            classes,
            project_type,
        }
    }

    pub fn classes(&self) -> &[ObjClass] {
        &self.classes
    }

    pub fn project_type(&self) -> ProjectType {
        self.project_type
    }

    /// Look up a class by name.
    pub fn get_class(&self, name: &str) -> Option<&ObjClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> Value {
        let doc = MetaJson {
            classes: self
                .classes
                .iter()
                .map(|c| ClassJson {
                    id: None,
                    title: c.name.clone(),
                    shape: c.kind.as_str().to_string(),
                    color: c.color.to_hex(),
                    geometry_config: Value::Object(Default::default()),
                })
                .collect(),
            tags: Vec::new(),
            project_type: Some(self.project_type.as_str().to_string()),
        };
        // A struct of strings and JSON values always serializes.
        serde_json::to_value(doc).unwrap_or(Value::Null)
    }

    /// Parse a meta document, e.g. as returned by the server.
    ///
    /// Server-assigned class ids are accepted and dropped. Classes with a
    /// shape other than rectangle or bitmap are rejected.
    pub fn from_json(json: &Value) -> Result<Self, CoreError> {
        let doc: MetaJson = serde_json::from_value(json.clone())
            .map_err(|e| CoreError::Format(format!("project meta: {e}")))?;

        let classes = doc
            .classes
            .into_iter()
            .map(|c| {
                let kind = GeometryKind::from_str(&c.shape)?;
                let color = Rgb::from_hex(&c.color)?;
                Ok(ObjClass::new(c.title, kind, color))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let project_type = match doc.project_type.as_deref() {
            Some(s) => ProjectType::from_str(s)?,
            None => ProjectType::default(),
        };

        Self::new(classes, project_type)
    }
}
