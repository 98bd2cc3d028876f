//! In-process stand-in for the platform's public API.
//!
//! Serves the API methods the client uses from an in-memory store so that
//! [`SuperviselyApi`](slyvid_client::SuperviselyApi) can be exercised over
//! real HTTP without a platform instance.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use slyvid_core::hashing::sha256_base64;
use slyvid_core::types::EntityId;

/// Token the fake server accepts.
pub const TOKEN: &str = "test-token";

/// Timestamp stamped on every created entity.
const CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

type Reply = Result<Json<Value>, (StatusCode, String)>;

/// Everything the fake server stores.
#[derive(Default)]
pub struct FakeState {
    next_id: EntityId,
    pub workspaces: HashMap<EntityId, String>,
    pub projects: Vec<Value>,
    pub datasets: Vec<Value>,
    pub metas: HashMap<EntityId, Value>,
    pub blobs: HashMap<String, Vec<u8>>,
    pub videos: Vec<Value>,
    pub annotations: HashMap<EntityId, Value>,
    /// API method names in call order.
    pub calls: Vec<String>,
    /// Method that answers 500 instead of its normal response.
    pub fail_method: Option<String>,
}

pub type Shared = Arc<Mutex<FakeState>>;

impl FakeState {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    /// Add a workspace and return its id.
    pub fn add_workspace(&mut self, name: &str) -> EntityId {
        let id = self.allocate_id();
        self.workspaces.insert(id, name.to_string());
        id
    }

    /// Add a project directly, bypassing the API.
    pub fn add_project(&mut self, workspace_id: EntityId, name: &str) -> EntityId {
        let id = self.allocate_id();
        self.projects.push(json!({
            "id": id,
            "name": name,
            "workspaceId": workspace_id,
            "type": "videos",
            "createdAt": CREATED_AT,
        }));
        id
    }
}

/// Start the fake server on an ephemeral port. Returns its base URL and
/// the shared store.
pub async fn spawn_fake_server(state: FakeState) -> (String, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));

    let app = Router::new()
        .route("/public/api/v3/videos.bulk.upload", post(bulk_upload))
        .route("/public/api/v3/{method}", post(dispatch))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake server");
    });

    (format!("http://{addr}"), shared)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, String) {
    (status, json!({ "error": message.into() }).to_string())
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(TOKEN) => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

fn id_field(body: &Value, field: &str) -> Result<EntityId, (StatusCode, String)> {
    body[field]
        .as_i64()
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, format!("'{field}' is required")))
}

async fn bulk_upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    authorize(&headers)?;

    let mut hash = None;
    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;
        match name.as_str() {
            "hash" => hash = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "file" => content = Some(bytes.to_vec()),
            _ => {}
        }
    }

    let (Some(hash), Some(content)) = (hash, content) else {
        return Err(error(StatusCode::BAD_REQUEST, "hash and file parts are required"));
    };
    if sha256_base64(&content) != hash {
        return Err(error(StatusCode::BAD_REQUEST, "hash does not match content"));
    }

    let mut state = state.lock().expect("lock fake state");
    state.calls.push("videos.bulk.upload".to_string());
    state.blobs.insert(hash, content);
    Ok(Json(json!({ "success": true })))
}

async fn dispatch(
    State(state): State<Shared>,
    Path(method): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;

    let mut state = state.lock().expect("lock fake state");
    state.calls.push(method.clone());

    if state.fail_method.as_deref() == Some(method.as_str()) {
        return Err(error(StatusCode::INTERNAL_SERVER_ERROR, "injected failure"));
    }

    match method.as_str() {
        "workspaces.info" => {
            let id = id_field(&body, "id")?;
            let name = state
                .workspaces
                .get(&id)
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "workspace not found"))?;
            Ok(Json(json!({
                "id": id,
                "name": name,
                "teamId": 1,
                "createdAt": CREATED_AT,
            })))
        }
        "projects.list" => {
            let workspace_id = id_field(&body, "workspaceId")?;
            let page = body["page"].as_u64().unwrap_or(1).max(1) as usize;
            let per_page = body["per_page"].as_u64().unwrap_or(50).max(1) as usize;
            let all: Vec<&Value> = state
                .projects
                .iter()
                .filter(|p| p["workspaceId"] == json!(workspace_id))
                .collect();
            let pages_count = all.len().div_ceil(per_page);
            let entities: Vec<&Value> = all.iter().skip((page - 1) * per_page).take(per_page).copied().collect();
            Ok(Json(json!({
                "total": all.len(),
                "perPage": per_page,
                "pagesCount": pages_count,
                "entities": entities,
            })))
        }
        "projects.add" => {
            let workspace_id = id_field(&body, "workspaceId")?;
            let title = body["title"].as_str().unwrap_or_default().to_string();
            let taken = state
                .projects
                .iter()
                .any(|p| p["workspaceId"] == json!(workspace_id) && p["name"] == json!(title));
            if taken {
                return Err(error(StatusCode::BAD_REQUEST, format!("project '{title}' already exists")));
            }
            let id = state.add_project(workspace_id, &title);
            let project = state
                .projects
                .iter()
                .find(|p| p["id"] == json!(id))
                .cloned()
                .unwrap_or_default();
            Ok(Json(project))
        }
        "datasets.add" => {
            let project_id = id_field(&body, "projectId")?;
            let id = state.allocate_id();
            let dataset = json!({
                "id": id,
                "name": body["name"],
                "projectId": project_id,
                "createdAt": CREATED_AT,
            });
            state.datasets.push(dataset.clone());
            Ok(Json(dataset))
        }
        "projects.meta.update" => {
            let project_id = id_field(&body, "id")?;
            let mut meta = body["meta"].clone();
            // The server assigns ids to classes.
            if let Some(classes) = meta["classes"].as_array_mut() {
                for class in classes {
                    class["id"] = json!(state.allocate_id());
                }
            }
            state.metas.insert(project_id, meta);
            Ok(Json(json!({ "success": true })))
        }
        "projects.meta" => {
            let project_id = id_field(&body, "id")?;
            state
                .metas
                .get(&project_id)
                .cloned()
                .map(Json)
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "project not found"))
        }
        "videos.bulk.add" => {
            let dataset_id = id_field(&body, "datasetId")?;
            let mut infos = Vec::new();
            for video in body["videos"].as_array().cloned().unwrap_or_default() {
                let hash = video["hash"].as_str().unwrap_or_default().to_string();
                if !state.blobs.contains_key(&hash) {
                    return Err(error(StatusCode::BAD_REQUEST, format!("unknown hash {hash}")));
                }
                let id = state.allocate_id();
                let info = json!({
                    "id": id,
                    "name": video["name"],
                    "hash": hash,
                    "datasetId": dataset_id,
                    "createdAt": CREATED_AT,
                });
                state.videos.push(info.clone());
                infos.push(info);
            }
            Ok(Json(Value::Array(infos)))
        }
        "videos.annotations.append" => {
            let video_id = id_field(&body, "videoId")?;
            let meta = meta_for_video(&state, video_id)?;
            let annotation = &body["annotation"];
            for object in annotation["objects"].as_array().cloned().unwrap_or_default() {
                let known = meta["classes"]
                    .as_array()
                    .is_some_and(|classes| classes.iter().any(|c| c["title"] == object["classTitle"]));
                if !known {
                    return Err(error(
                        StatusCode::BAD_REQUEST,
                        format!("class {} is not in project meta", object["classTitle"]),
                    ));
                }
            }
            state.annotations.insert(video_id, annotation.clone());
            Ok(Json(json!({ "success": true })))
        }
        "videos.annotations.download" => {
            let video_id = id_field(&body, "videoId")?;
            let stored = state
                .annotations
                .get(&video_id)
                .cloned()
                .ok_or_else(|| error(StatusCode::NOT_FOUND, "annotation not found"))?;
            Ok(Json(server_view(stored, video_id)))
        }
        other => Err(error(StatusCode::NOT_FOUND, format!("unknown method {other}"))),
    }
}

/// Meta of the project owning `video_id`.
fn meta_for_video(state: &FakeState, video_id: EntityId) -> Result<Value, (StatusCode, String)> {
    let video = state
        .videos
        .iter()
        .find(|v| v["id"] == json!(video_id))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "video not found"))?;
    let dataset = state
        .datasets
        .iter()
        .find(|d| d["id"] == video["datasetId"])
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "dataset not found"))?;
    let project_id = dataset["projectId"].as_i64().unwrap_or_default();
    state
        .metas
        .get(&project_id)
        .cloned()
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "project has no meta"))
}

/// The annotation as the server hands it back: fresh keys everywhere and
/// extra server fields.
fn server_view(mut annotation: Value, video_id: EntityId) -> Value {
    let new_key = || uuid::Uuid::new_v4().simple().to_string();

    let mut object_keys = HashMap::new();
    if let Some(objects) = annotation["objects"].as_array_mut() {
        for object in objects {
            let key = new_key();
            object_keys.insert(object["key"].as_str().unwrap_or_default().to_string(), key.clone());
            object["key"] = json!(key);
            object["createdAt"] = json!(CREATED_AT);
        }
    }
    if let Some(frames) = annotation["frames"].as_array_mut() {
        for frame in frames {
            if let Some(figures) = frame["figures"].as_array_mut() {
                for figure in figures {
                    let old = figure["objectKey"].as_str().unwrap_or_default().to_string();
                    figure["objectKey"] = json!(object_keys.get(&old).cloned().unwrap_or(old));
                    figure["key"] = json!(new_key());
                }
            }
        }
    }
    annotation["key"] = json!(new_key());
    annotation["videoId"] = json!(video_id);
    annotation["createdAt"] = json!(CREATED_AT);
    annotation
}
