use std::path::{Path, PathBuf};

use slyvid_core::types::EntityId;

/// Dotenv file read from the working directory.
pub const LOCAL_ENV_FILE: &str = "local.env";

/// Dotenv file read from the user's home directory.
pub const HOME_ENV_FILE: &str = "supervisely.env";

const DEFAULT_VIDEO_PATH: &str = "data/orange_kiwi.mp4";
const DEFAULT_MASKS_DIR: &str = "data/masks";
const DEFAULT_PROJECT_NAME: &str = "Demo";
const DEFAULT_DATASET_NAME: &str = "orange & kiwi";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        source: dotenvy::Error,
    },
}

/// Run configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Platform base URL.
    pub server_address: String,
    /// API token, sent as `x-api-key`.
    pub api_token: String,
    pub workspace_id: EntityId,
    pub video_path: PathBuf,
    pub masks_dir: PathBuf,
    /// JSON rectangle table; the built-in demo rows when unset.
    pub boxes_path: Option<PathBuf>,
    pub project_name: String,
    pub dataset_name: String,
    /// Download the annotation after upload and compare it.
    pub verify_download: bool,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var           | Default                |
    /// |-------------------|------------------------|
    /// | `SERVER_ADDRESS`  | required               |
    /// | `API_TOKEN`       | required               |
    /// | `WORKSPACE_ID`    | required               |
    /// | `VIDEO_PATH`      | `data/orange_kiwi.mp4` |
    /// | `MASKS_DIR`       | `data/masks`           |
    /// | `BOXES_PATH`      | built-in table         |
    /// | `PROJECT_NAME`    | `Demo`                 |
    /// | `DATASET_NAME`    | `orange & kiwi`        |
    /// | `VERIFY_DOWNLOAD` | `false`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let server_address = require("SERVER_ADDRESS")?;
        let api_token = require("API_TOKEN")?;

        let workspace_id = require("WORKSPACE_ID")?
            .parse::<EntityId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ConfigError::Invalid {
                var: "WORKSPACE_ID",
                message: "must be a positive integer".into(),
            })?;

        let verify_download = match get("VERIFY_DOWNLOAD") {
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::Invalid {
                var: "VERIFY_DOWNLOAD",
                message: format!("expected true or false, got '{value}'"),
            })?,
            None => false,
        };

        Ok(Self {
            server_address,
            api_token,
            workspace_id,
            video_path: get("VIDEO_PATH")
                .unwrap_or_else(|| DEFAULT_VIDEO_PATH.into())
                .into(),
            masks_dir: get("MASKS_DIR")
                .unwrap_or_else(|| DEFAULT_MASKS_DIR.into())
                .into(),
            boxes_path: get("BOXES_PATH").map(PathBuf::from),
            project_name: get("PROJECT_NAME").unwrap_or_else(|| DEFAULT_PROJECT_NAME.into()),
            dataset_name: get("DATASET_NAME").unwrap_or_else(|| DEFAULT_DATASET_NAME.into()),
            verify_download,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load `local.env` and then `~/supervisely.env` when present, returning
/// the files that were read.
///
/// Variables already set are never overridden, so the process environment
/// wins over `local.env`, which wins over the home file. Runs before logging
/// is set up, so nothing is logged here.
pub fn load_env_files() -> Result<Vec<PathBuf>, ConfigError> {
    let mut candidates = vec![PathBuf::from(LOCAL_ENV_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(Path::new(&home).join(HOME_ENV_FILE));
    }

    let mut loaded = Vec::new();
    for path in candidates {
        if load_env_file(&path)? {
            loaded.push(path);
        }
    }
    Ok(loaded)
}

/// Load one dotenv file. `Ok(false)` when the file does not exist.
pub fn load_env_file(path: &Path) -> Result<bool, ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(source) => Err(ConfigError::EnvFile {
            path: path.display().to_string(),
            source,
        }),
    }
}
