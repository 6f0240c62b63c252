/// Admin project endpoints
///
/// Reads return JSON bundles (`projects`, `project`, `types`, `technologies`)
/// for the presentation layer. Writes take multipart forms and answer with a
/// 303 redirect to the index plus a flash cookie.

use crate::{
    api::{
        flash::Flash,
        form::{read_project_form, FormError},
    },
    project::{
        service::{ProjectEditForm, ProjectError, ProjectForm},
        ProjectWorkflow,
    },
};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};

/// Where successful writes land
pub const INDEX_PATH: &str = "/admin/projects";

/// Largest accepted form body (cover image included)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared by the admin handlers
#[derive(Clone)]
pub struct AppState {
    /// Project workflow over storage, blob store and mailer
    pub workflow: ProjectWorkflow,
}

/// Create admin project routes
pub fn create_project_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/projects", get(index).post(store))
        .route("/admin/projects/create", get(create))
        .route(
            "/admin/projects/{id}",
            get(show).put(update).post(update).delete(destroy),
        )
        .route("/admin/projects/{id}/edit", get(edit))
        .route("/admin/leads", get(list_leads))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// List all projects
///
/// GET /admin/projects
/// Returns: { "projects": [...], "message": "..." | null }
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, StatusCode> {
    let listing = state.workflow.list().await.map_err(|e| error_status("list projects", e))?;
    let flash = Flash::from_headers(&headers);

    let body = Json(json!({
        "projects": listing.projects,
        "message": flash.map(Flash::message),
    }));

    if flash.is_some() {
        Ok(([(header::SET_COOKIE, Flash::clear_cookie())], body).into_response())
    } else {
        Ok(body.into_response())
    }
}

/// Reference data for the create form
///
/// GET /admin/projects/create
/// Returns: { "types": [...], "technologies": [...] }
async fn create(State(state): State<AppState>) -> Result<Json<ProjectForm>, StatusCode> {
    state
        .workflow
        .create_form()
        .await
        .map(Json)
        .map_err(|e| error_status("load create form", e))
}

/// Create a project
///
/// POST /admin/projects (multipart/form-data)
async fn store(State(state): State<AppState>, multipart: Multipart) -> Result<Response, StatusCode> {
    let input = read_project_form(multipart).await.map_err(form_status)?;

    state
        .workflow
        .create(input)
        .await
        .map_err(|e| error_status("create project", e))?;

    Ok(redirect_with(Flash::Created))
}

/// Show one project
///
/// GET /admin/projects/{id}
/// Returns: { "project": { ..., "technologies": [...] } }
async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>, StatusCode> {
    let project = state
        .workflow
        .show(id)
        .await
        .map_err(|e| error_status("show project", e))?;
    Ok(Json(json!({ "project": project })))
}

/// Project plus reference data for the edit form
///
/// GET /admin/projects/{id}/edit
async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectEditForm>, StatusCode> {
    state
        .workflow
        .edit_form(id)
        .await
        .map(Json)
        .map_err(|e| error_status("load edit form", e))
}

/// Update a project
///
/// PUT|POST /admin/projects/{id} (multipart/form-data)
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let input = read_project_form(multipart).await.map_err(form_status)?;

    state
        .workflow
        .update(id, input.into())
        .await
        .map_err(|e| error_status("update project", e))?;

    Ok(redirect_with(Flash::Updated))
}

/// Delete a project
///
/// DELETE /admin/projects/{id}
async fn destroy(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, StatusCode> {
    state
        .workflow
        .delete(id)
        .await
        .map_err(|e| error_status("delete project", e))?;

    Ok(redirect_with(Flash::Deleted))
}

/// Leads generated from new projects
///
/// GET /admin/leads
/// Returns: { "leads": [...] }
async fn list_leads(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let leads = state
        .workflow
        .leads()
        .await
        .map_err(|e| error_status("list leads", e))?;
    Ok(Json(json!({ "leads": leads })))
}

fn redirect_with(flash: Flash) -> Response {
    ([(header::SET_COOKIE, flash.set_cookie())], Redirect::to(INDEX_PATH)).into_response()
}

fn form_status(e: FormError) -> StatusCode {
    tracing::warn!("❌ Rejected project form: {}", e);
    e.status()
}

/// Map a workflow error to a status code, logging it
fn error_status(action: &str, e: ProjectError) -> StatusCode {
    match e {
        ProjectError::NotFound(id) => {
            tracing::warn!("🔍 Failed to {}: project {} not found", action, id);
            StatusCode::NOT_FOUND
        }
        ProjectError::Validation(reason) => {
            tracing::warn!("❌ Failed to {}: {}", action, reason);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ProjectError::Storage(e) => {
            tracing::error!("❌ Failed to {}: {:#}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
