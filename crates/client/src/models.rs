//! Entity infos returned by the platform.
//!
//! Only the fields the pipeline reads are modelled; anything else in a
//! response is ignored.

use serde::Deserialize;
use slyvid_core::types::{EntityId, Timestamp};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub team_id: Option<EntityId>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub workspace_id: Option<EntityId>,
    #[serde(default, rename = "type")]
    pub project_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<EntityId>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<EntityId>,
    #[serde(default)]
    pub frames_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

/// One page of a list method.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    #[serde(default)]
    pub pages_count: u32,
}

/// What to do when a project name is already taken in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamePolicy {
    /// Submit the name unchanged and let the server decide.
    #[default]
    Exact,
    /// Pick the first free `{name}_NNN` variant instead of failing.
    RenameOnConflict,
}
