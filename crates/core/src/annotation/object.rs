use uuid::Uuid;

use crate::meta::ObjClass;

/// A tracked entity, identified by a client-generated key.
///
/// Every figure of the same entity across frames must reference the same
/// object (and therefore the same key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoObject {
    key: Uuid,
    class: ObjClass,
}

impl VideoObject {
    /// Create an object with a fresh random key.
    pub fn new(class: ObjClass) -> Self {
        Self::with_key(class, Uuid::new_v4())
    }

    pub fn with_key(class: ObjClass, key: Uuid) -> Self {
        Self { key, class }
    }

    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn class(&self) -> &ObjClass {
        &self.class
    }
}
