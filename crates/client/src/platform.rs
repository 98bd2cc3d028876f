//! The remote operations the upload pipeline depends on.
//!
//! [`SuperviselyApi`](crate::api::SuperviselyApi) implements this trait
//! over HTTP. Tests substitute in-memory implementations.

use std::path::Path;

use async_trait::async_trait;
use slyvid_core::annotation::VideoAnnotation;
use slyvid_core::meta::{ProjectMeta, ProjectType};
use slyvid_core::types::EntityId;

use crate::error::ApiError;
use crate::models::{DatasetInfo, NamePolicy, ProjectInfo, VideoInfo, WorkspaceInfo};

#[async_trait]
pub trait AnnotationPlatform: Send + Sync {
    /// Workspace info, or `None` if no workspace has this id.
    async fn get_workspace(&self, id: EntityId) -> Result<Option<WorkspaceInfo>, ApiError>;

    async fn create_project(
        &self,
        workspace_id: EntityId,
        name: &str,
        project_type: ProjectType,
        policy: NamePolicy,
    ) -> Result<ProjectInfo, ApiError>;

    /// Create a dataset. Names are not deduplicated.
    async fn create_dataset(&self, project_id: EntityId, name: &str)
        -> Result<DatasetInfo, ApiError>;

    /// Replace the project's class list with `meta`.
    async fn update_project_meta(
        &self,
        project_id: EntityId,
        meta: &ProjectMeta,
    ) -> Result<(), ApiError>;

    async fn get_project_meta(&self, project_id: EntityId) -> Result<ProjectMeta, ApiError>;

    /// Upload a local video file into a dataset under `name`.
    async fn upload_video(
        &self,
        dataset_id: EntityId,
        name: &str,
        path: &Path,
    ) -> Result<VideoInfo, ApiError>;

    /// Store a whole annotation on a video in a single request.
    async fn append_annotation(
        &self,
        video_id: EntityId,
        annotation: &VideoAnnotation,
    ) -> Result<(), ApiError>;

    /// The video's annotation in wire format.
    async fn download_annotation(&self, video_id: EntityId) -> Result<serde_json::Value, ApiError>;
}
