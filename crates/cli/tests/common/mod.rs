//! Shared fixtures for pipeline tests: an in-memory platform that records
//! every call, a fixed video inspector and mask files on disk.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{GrayImage, Luma};
use serde_json::Value;
use slyvid_cli::config::CliConfig;
use slyvid_cli::context::RunContext;
use slyvid_client::models::{DatasetInfo, NamePolicy, ProjectInfo, VideoInfo, WorkspaceInfo};
use slyvid_client::{AnnotationPlatform, ApiError};
use slyvid_core::annotation::VideoAnnotation;
use slyvid_core::meta::{ProjectMeta, ProjectType};
use slyvid_core::naming::free_name;
use slyvid_core::probe::{ProbeError, VideoInspector, VideoShape};
use slyvid_core::types::{EntityId, FrameSize};

pub const WORKSPACE_ID: EntityId = 11;

/// Everything the recording platform has seen and stored.
#[derive(Default)]
pub struct Recorded {
    /// Trait method names in call order.
    pub calls: Vec<String>,
    pub project_names: HashSet<String>,
    pub meta: Option<ProjectMeta>,
    pub annotation: Option<Value>,
    next_id: EntityId,
}

/// In-memory [`AnnotationPlatform`]. Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingPlatform {
    pub record: Arc<Mutex<Recorded>>,
    /// Whether [`WORKSPACE_ID`] exists.
    pub workspace_exists: bool,
    /// Drop the last frame from downloaded annotations.
    pub truncate_download: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            workspace_exists: true,
            ..Self::default()
        }
    }

    pub fn with_existing_projects(self, names: &[&str]) -> Self {
        self.record
            .lock()
            .unwrap()
            .project_names
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.record.lock().unwrap().calls.clone()
    }

    fn log(&self, call: &str) -> EntityId {
        let mut record = self.record.lock().unwrap();
        record.calls.push(call.to_string());
        record.next_id += 1;
        record.next_id
    }
}

#[async_trait]
impl AnnotationPlatform for RecordingPlatform {
    async fn get_workspace(&self, id: EntityId) -> Result<Option<WorkspaceInfo>, ApiError> {
        self.log("get_workspace");
        Ok((self.workspace_exists && id == WORKSPACE_ID).then(|| WorkspaceInfo {
            id,
            name: "First Workspace".into(),
            description: None,
            team_id: Some(1),
            created_at: None,
        }))
    }

    async fn create_project(
        &self,
        workspace_id: EntityId,
        name: &str,
        project_type: ProjectType,
        policy: NamePolicy,
    ) -> Result<ProjectInfo, ApiError> {
        let id = self.log("create_project");
        let mut record = self.record.lock().unwrap();
        let name = match policy {
            NamePolicy::Exact => name.to_string(),
            NamePolicy::RenameOnConflict => free_name(&record.project_names, name),
        };
        record.project_names.insert(name.clone());
        Ok(ProjectInfo {
            id,
            name,
            workspace_id: Some(workspace_id),
            project_type: Some(project_type.as_str().into()),
            created_at: None,
        })
    }

    async fn create_dataset(&self, project_id: EntityId, name: &str) -> Result<DatasetInfo, ApiError> {
        let id = self.log("create_dataset");
        Ok(DatasetInfo {
            id,
            name: name.into(),
            project_id: Some(project_id),
            created_at: None,
        })
    }

    async fn update_project_meta(&self, _project_id: EntityId, meta: &ProjectMeta) -> Result<(), ApiError> {
        self.log("update_project_meta");
        self.record.lock().unwrap().meta = Some(meta.clone());
        Ok(())
    }

    async fn get_project_meta(&self, _project_id: EntityId) -> Result<ProjectMeta, ApiError> {
        self.log("get_project_meta");
        self.record.lock().unwrap().meta.clone().ok_or_else(|| ApiError::Status {
            method: "projects.meta".into(),
            status: 404,
            body: "no meta".into(),
        })
    }

    async fn upload_video(&self, dataset_id: EntityId, name: &str, _path: &Path) -> Result<VideoInfo, ApiError> {
        let id = self.log("upload_video");
        Ok(VideoInfo {
            id,
            name: name.into(),
            hash: None,
            dataset_id: Some(dataset_id),
            frames_count: None,
            created_at: None,
        })
    }

    async fn append_annotation(&self, _video_id: EntityId, annotation: &VideoAnnotation) -> Result<(), ApiError> {
        self.log("append_annotation");
        self.record.lock().unwrap().annotation = Some(annotation.to_json()?);
        Ok(())
    }

    async fn download_annotation(&self, video_id: EntityId) -> Result<Value, ApiError> {
        self.log("download_annotation");
        let mut json = self.record.lock().unwrap().annotation.clone().ok_or_else(|| ApiError::Status {
            method: "videos.annotations.download".into(),
            status: 404,
            body: format!("no annotation for video {video_id}"),
        })?;
        if self.truncate_download {
            if let Some(frames) = json["frames"].as_array_mut() {
                frames.pop();
            }
        }
        Ok(json)
    }
}

/// [`VideoInspector`] answering with a fixed shape.
pub struct FixedInspector(pub VideoShape);

impl Default for FixedInspector {
    fn default() -> Self {
        Self(VideoShape {
            size: FrameSize::new(1080, 1920),
            frames_count: 10,
        })
    }
}

#[async_trait]
impl VideoInspector for FixedInspector {
    async fn inspect(&self, _path: &Path) -> Result<VideoShape, ProbeError> {
        Ok(self.0)
    }
}

/// Write one 16x16 mask per index, named `frame_{index}.png`.
pub fn write_masks(dir: &Path, indices: &[u32]) {
    for &index in indices {
        let mut img = GrayImage::new(16, 16);
        for i in 0..=index.min(15) {
            img.put_pixel(i, 0, Luma([255]));
        }
        img.save(dir.join(format!("frame_{index}.png"))).expect("write mask");
    }
}

/// Config pointing at `root/masks` and `root/orange_kiwi.mp4`.
pub fn test_config(root: &Path) -> CliConfig {
    let masks_dir = root.join("masks");
    std::fs::create_dir_all(&masks_dir).expect("create masks dir");
    let video_path: PathBuf = root.join("orange_kiwi.mp4");
    std::fs::write(&video_path, b"video").expect("write video");

    CliConfig {
        server_address: "http://platform.invalid".into(),
        api_token: "token".into(),
        workspace_id: WORKSPACE_ID,
        video_path,
        masks_dir,
        boxes_path: None,
        project_name: "Demo".into(),
        dataset_name: "orange & kiwi".into(),
        verify_download: false,
    }
}

pub fn context(config: CliConfig, platform: &RecordingPlatform) -> RunContext {
    RunContext::with_parts(
        config,
        Box::new(platform.clone()),
        Box::new(FixedInspector::default()),
    )
}
