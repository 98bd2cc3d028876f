use serde::{Deserialize, Serialize};

/// Server-assigned identifiers for workspaces, projects, datasets and videos.
pub type EntityId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Pixel dimensions of a video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub height: u32,
    pub width: u32,
}

impl FrameSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}
