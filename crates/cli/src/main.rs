//! `slyvid` -- uploads a demo video with per-frame rectangle and bitmap
//! annotations to an annotation platform.
//!
//! Creates a `videos` project and a dataset in an existing workspace,
//! pushes the two-class schema, uploads the video and its annotation, and
//! optionally downloads the annotation back to verify it.
//!
//! # Environment variables
//!
//! Read after loading `local.env` and `~/supervisely.env` when present.
//!
//! | Variable          | Required | Default                | Description                         |
//! |-------------------|----------|------------------------|-------------------------------------|
//! | `SERVER_ADDRESS`  | yes      | --                     | Platform base URL                   |
//! | `API_TOKEN`       | yes      | --                     | API token                           |
//! | `WORKSPACE_ID`    | yes      | --                     | Target workspace id                 |
//! | `VIDEO_PATH`      | no       | `data/orange_kiwi.mp4` | Video to upload                     |
//! | `MASKS_DIR`       | no       | `data/masks`           | One mask PNG per annotated frame    |
//! | `BOXES_PATH`      | no       | built-in table         | JSON `[top, left, bottom, right]` rows |
//! | `PROJECT_NAME`    | no       | `Demo`                 | Renamed `_001`, `_002`... if taken  |
//! | `DATASET_NAME`    | no       | `orange & kiwi`        |                                     |
//! | `VERIFY_DOWNLOAD` | no       | `false`                | Download and compare after upload   |

use slyvid_cli::config::{self, CliConfig};
use slyvid_cli::context::RunContext;
use slyvid_cli::pipeline;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let env_files = config::load_env_files();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slyvid=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match env_files {
        Ok(loaded) => {
            for path in loaded {
                tracing::debug!(path = %path.display(), "Loaded env file");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    }

    let config = CliConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        server = %config.server_address,
        workspace_id = config.workspace_id,
        video = %config.video_path.display(),
        masks_dir = %config.masks_dir.display(),
        "Starting slyvid",
    );

    let ctx = RunContext::new(config);
    match pipeline::run(&ctx).await {
        Ok(summary) => tracing::info!(
            project_id = summary.project.id,
            project = %summary.project.name,
            dataset_id = summary.dataset.id,
            video_id = summary.video.id,
            frames = summary.frames,
            figures = summary.figures,
            verified = summary.verified,
            "Upload complete",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Upload failed");
            std::process::exit(1);
        }
    }
}
