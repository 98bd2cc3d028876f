//! HTTP client for the platform's public API.
//!
//! Every method is a `POST {server}/public/api/v3/{method}` with a JSON
//! body, authenticated by the `x-api-key` header. Requests carry no
//! client-side timeout and are never retried.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use slyvid_core::annotation::VideoAnnotation;
use slyvid_core::hashing::sha256_base64;
use slyvid_core::meta::{ProjectMeta, ProjectType};
use slyvid_core::naming::free_name;
use slyvid_core::types::EntityId;

use crate::error::ApiError;
use crate::models::{DatasetInfo, ListPage, NamePolicy, ProjectInfo, VideoInfo, WorkspaceInfo};
use crate::platform::AnnotationPlatform;

/// Path prefix of every API method.
pub const API_PREFIX: &str = "public/api/v3";

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "x-api-key";

/// Page size for list methods.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// HTTP client for one platform server.
pub struct SuperviselyApi {
    client: reqwest::Client,
    server_address: String,
    token: String,
    page_size: u32,
}

impl SuperviselyApi {
    /// Create a new API client.
    ///
    /// * `server_address` - Base URL, e.g. `https://app.supervisely.com`.
    /// * `token`          - API token sent as `x-api-key`.
    pub fn new(server_address: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), server_address, token)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        server_address: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            server_address: server_address.into().trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size used by list methods.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    /// Full URL of an API method.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{API_PREFIX}/{method}", self.server_address)
    }

    /// Names of all projects in a workspace.
    pub async fn list_project_names(
        &self,
        workspace_id: EntityId,
    ) -> Result<HashSet<String>, ApiError> {
        let projects: Vec<ProjectInfo> = self
            .list_all("projects.list", json!({ "workspaceId": workspace_id }))
            .await?;
        Ok(projects.into_iter().map(|p| p.name).collect())
    }

    // ---- private helpers ----

    /// Send a JSON `POST` and return the raw response, whatever its status.
    async fn send(&self, method: &str, body: &Value) -> Result<reqwest::Response, ApiError> {
        tracing::debug!(method, "Calling platform API");
        let response = self
            .client
            .post(self.method_url(method))
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    /// Send a JSON `POST` and decode a successful response.
    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, ApiError> {
        let response = self.send(method, body).await?;
        Self::parse_response(method, response).await
    }

    /// Collect every page of a list method.
    async fn list_all<T: DeserializeOwned>(
        &self,
        method: &str,
        mut body: Value,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            body["page"] = json!(page);
            body["per_page"] = json!(self.page_size);
            let batch: ListPage<T> = self.post(method, &body).await?;
            items.extend(batch.entities);
            if page >= batch.pages_count {
                break;
            }
            page += 1;
        }
        Ok(items)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        method: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(method, response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(method: &str, response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(method, response).await?;
        Ok(())
    }
}

#[async_trait]
impl AnnotationPlatform for SuperviselyApi {
    async fn get_workspace(&self, id: EntityId) -> Result<Option<WorkspaceInfo>, ApiError> {
        let method = "workspaces.info";
        let response = self.send(method, &json!({ "id": id })).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(method, response).await.map(Some)
    }

    async fn create_project(
        &self,
        workspace_id: EntityId,
        name: &str,
        project_type: ProjectType,
        policy: NamePolicy,
    ) -> Result<ProjectInfo, ApiError> {
        let effective_name = match policy {
            NamePolicy::Exact => name.to_string(),
            NamePolicy::RenameOnConflict => {
                let used = self.list_project_names(workspace_id).await?;
                free_name(&used, name)
            }
        };

        if effective_name != name {
            tracing::info!(requested = name, name = %effective_name, "Project name taken, renaming");
        }

        self.post(
            "projects.add",
            &json!({
                "workspaceId": workspace_id,
                "title": effective_name,
                "description": "",
                "type": project_type.as_str(),
            }),
        )
        .await
    }

    async fn create_dataset(
        &self,
        project_id: EntityId,
        name: &str,
    ) -> Result<DatasetInfo, ApiError> {
        self.post(
            "datasets.add",
            &json!({
                "projectId": project_id,
                "name": name,
                "description": "",
            }),
        )
        .await
    }

    async fn update_project_meta(
        &self,
        project_id: EntityId,
        meta: &ProjectMeta,
    ) -> Result<(), ApiError> {
        let method = "projects.meta.update";
        let response = self
            .send(method, &json!({ "id": project_id, "meta": meta.to_json() }))
            .await?;
        Self::check_status(method, response).await
    }

    async fn get_project_meta(&self, project_id: EntityId) -> Result<ProjectMeta, ApiError> {
        let meta: Value = self.post("projects.meta", &json!({ "id": project_id })).await?;
        Ok(ProjectMeta::from_json(&meta)?)
    }

    async fn upload_video(
        &self,
        dataset_id: EntityId,
        name: &str,
        path: &Path,
    ) -> Result<VideoInfo, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.display().to_string(),
            source,
        })?;
        let hash = sha256_base64(&bytes);
        let size = bytes.len();

        // Step 1: content upload, addressed by hash.
        let method = "videos.bulk.upload";
        let part = Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().text("hash", hash.clone()).part("file", part);
        tracing::debug!(method, size, "Uploading video content");
        let response = self
            .client
            .post(self.method_url(method))
            .header(TOKEN_HEADER, &self.token)
            .multipart(form)
            .send()
            .await?;
        Self::check_status(method, response).await?;

        // Step 2: register the uploaded content in the dataset.
        let method = "videos.bulk.add";
        let infos: Vec<VideoInfo> = self
            .post(
                method,
                &json!({
                    "datasetId": dataset_id,
                    "videos": [{ "name": name, "hash": hash }],
                }),
            )
            .await?;

        infos
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::InvalidResponse {
                method: method.to_string(),
                message: "no video info returned".to_string(),
            })
    }

    async fn append_annotation(
        &self,
        video_id: EntityId,
        annotation: &VideoAnnotation,
    ) -> Result<(), ApiError> {
        let method = "videos.annotations.append";
        let body = json!({
            "videoId": video_id,
            "annotation": annotation.to_json()?,
        });
        let response = self.send(method, &body).await?;
        Self::check_status(method, response).await
    }

    async fn download_annotation(&self, video_id: EntityId) -> Result<Value, ApiError> {
        self.post("videos.annotations.download", &json!({ "videoId": video_id }))
            .await
    }
}
