//! The end-to-end upload run.
//!
//! The workspace check comes first. All local work (schema, video probe,
//! mask loading, annotation assembly) follows, and only then does the run
//! create anything on the server, so bad input never leaves a half-built
//! project behind.

use slyvid_client::models::{DatasetInfo, NamePolicy, ProjectInfo, VideoInfo};
use slyvid_client::ApiError;
use slyvid_core::annotation::VideoAnnotation;
use slyvid_core::assembly::{build_annotation, load_boxes, AssemblyError, DEMO_BOXES};
use slyvid_core::error::CoreError;
use slyvid_core::meta::ProjectType;
use slyvid_core::naming::file_name_with_ext;
use slyvid_core::probe::ProbeError;
use slyvid_core::roundtrip::{verify_round_trip, RoundTripError};
use slyvid_core::schema::DemoSchema;
use slyvid_core::types::EntityId;

use crate::config::{CliConfig, ConfigError};
use crate::context::RunContext;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("workspace {id} not found; put the correct WORKSPACE_ID in local.env")]
    WorkspaceNotFound { id: EntityId },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The downloaded annotation could not be rebuilt from its JSON.
    #[error("downloaded annotation is malformed: {0}")]
    Download(#[from] CoreError),

    #[error(transparent)]
    RoundTrip(#[from] RoundTripError),
}

/// What a successful run created.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub project: ProjectInfo,
    pub dataset: DatasetInfo,
    pub video: VideoInfo,
    pub frames: usize,
    pub figures: usize,
    /// Whether the download comparison ran (and passed).
    pub verified: bool,
}

/// Local inputs ready for upload.
struct PreparedUpload {
    schema: DemoSchema,
    annotation: VideoAnnotation,
    video_name: String,
}

/// Run the whole upload.
pub async fn run(ctx: &RunContext) -> Result<RunSummary, PipelineError> {
    let config = &ctx.config;

    ensure_workspace(ctx).await?;
    let prepared = prepare(ctx).await?;

    let (project, dataset) = provision(ctx).await?;

    ctx.platform
        .update_project_meta(project.id, &prepared.schema.meta)
        .await?;
    tracing::info!(project_id = project.id, "Project schema updated");

    let video = ctx
        .platform
        .upload_video(dataset.id, &prepared.video_name, &config.video_path)
        .await?;
    tracing::info!(video_id = video.id, name = %video.name, "Video uploaded");

    ctx.platform
        .append_annotation(video.id, &prepared.annotation)
        .await?;
    tracing::info!(
        video_id = video.id,
        frames = prepared.annotation.frames().len(),
        figures = prepared.annotation.figures_count(),
        "Annotation uploaded",
    );

    let verified = if config.verify_download {
        verify_download(ctx, project.id, video.id, &prepared.annotation).await?;
        true
    } else {
        false
    };

    Ok(RunSummary {
        project,
        dataset,
        video,
        frames: prepared.annotation.frames().len(),
        figures: prepared.annotation.figures_count(),
        verified,
    })
}

/// Fail unless the configured workspace exists.
pub async fn ensure_workspace(ctx: &RunContext) -> Result<(), PipelineError> {
    let id = ctx.config.workspace_id;
    match ctx.platform.get_workspace(id).await? {
        Some(workspace) => {
            tracing::info!(workspace_id = id, name = %workspace.name, "Workspace found");
            Ok(())
        }
        None => Err(PipelineError::WorkspaceNotFound { id }),
    }
}

/// Build the schema and the full annotation from local files.
async fn prepare(ctx: &RunContext) -> Result<PreparedUpload, PipelineError> {
    let config = &ctx.config;

    let video_name = file_name_with_ext(&config.video_path).ok_or_else(|| ConfigError::Invalid {
        var: "VIDEO_PATH",
        message: format!("'{}' has no file name", config.video_path.display()),
    })?;

    let boxes = rectangle_rows(config)?;
    let shape = ctx.inspector.inspect(&config.video_path).await?;
    tracing::info!(
        height = shape.size.height,
        width = shape.size.width,
        frames_count = shape.frames_count,
        "Video inspected",
    );

    let schema = DemoSchema::new();
    let annotation = build_annotation(&config.masks_dir, &boxes, shape, &schema)?;
    tracing::info!(
        frames = annotation.frames().len(),
        masks_dir = %config.masks_dir.display(),
        "Annotation assembled",
    );

    Ok(PreparedUpload {
        schema,
        annotation,
        video_name,
    })
}

fn rectangle_rows(config: &CliConfig) -> Result<Vec<[i64; 4]>, AssemblyError> {
    match &config.boxes_path {
        Some(path) => load_boxes(path),
        None => Ok(DEMO_BOXES.to_vec()),
    }
}

/// Create the project (renamed on conflict) and its dataset.
async fn provision(ctx: &RunContext) -> Result<(ProjectInfo, DatasetInfo), PipelineError> {
    let config = &ctx.config;

    let project = ctx
        .platform
        .create_project(
            config.workspace_id,
            &config.project_name,
            ProjectType::Videos,
            NamePolicy::RenameOnConflict,
        )
        .await?;
    tracing::info!(project_id = project.id, name = %project.name, "Project created");

    let dataset = ctx
        .platform
        .create_dataset(project.id, &config.dataset_name)
        .await?;
    tracing::info!(dataset_id = dataset.id, name = %dataset.name, "Dataset created");

    Ok((project, dataset))
}

/// Download the annotation, rebuild it with the server's schema and compare.
async fn verify_download(
    ctx: &RunContext,
    project_id: EntityId,
    video_id: EntityId,
    uploaded: &VideoAnnotation,
) -> Result<(), PipelineError> {
    let json = ctx.platform.download_annotation(video_id).await?;
    let meta = ctx.platform.get_project_meta(project_id).await?;
    let downloaded = VideoAnnotation::from_json(&json, &meta)?;
    verify_round_trip(uploaded, &downloaded)?;
    tracing::info!(
        video_id,
        frames = downloaded.frames().len(),
        "Downloaded annotation matches upload",
    );
    Ok(())
}
