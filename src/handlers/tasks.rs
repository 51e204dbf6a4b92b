use std::collections::{HashMap, HashSet};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{json, Value};
use crate::auth::authenticate;
use crate::envelope::{request_id, ApiError, ApiResult, RpcReply};
use crate::html::html_to_plaintext;
use crate::models::{ClientExport, PartnerRecord, ProjectExport, ProjectRecord, TaskExport, TaskRecord};
use crate::odoo::Many2one;
use crate::state::AppState;

/// Export the tasks of the caller's company to Coclock
///
/// The request body is optional; when it is a JSON-RPC envelope its id is
/// echoed back.
pub async fn tasks_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> RpcReply {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    RpcReply::from_result(request_id(&body), export_tasks(&state, &headers).await)
}

fn distinct(ids: impl Iterator<Item = u32>) -> Vec<u32> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

pub async fn export_tasks(state: &AppState, headers: &HeaderMap) -> ApiResult<Value> {
    let session = authenticate(state, headers).await?;
    let user = state
        .gateway
        .current_user(&session)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    let company_id = user.company_id.as_ref().map(Many2one::id);

    let tasks = state.gateway.company_tasks(&session, company_id).await?;

    let project_ids = distinct(tasks.iter().filter_map(|task| task.project_id.as_ref().map(Many2one::id)));
    let projects: HashMap<u32, ProjectRecord> = state
        .gateway
        .projects(&session, &project_ids)
        .await?
        .into_iter()
        .map(|project| (project.id, project))
        .collect();

    let partner_ids = distinct(
        project_ids
            .iter()
            .filter_map(|id| projects.get(id))
            .filter_map(|project| project.partner_id.as_ref().map(Many2one::id)),
    );
    let partners: HashMap<u32, PartnerRecord> = state
        .gateway
        .partners(&session, &partner_ids)
        .await?
        .into_iter()
        .map(|partner| (partner.id, partner))
        .collect();

    let exported: Vec<TaskExport> = tasks
        .iter()
        .filter_map(|task| export_task(task, &projects, &partners))
        .collect();

    tracing::info!(uid = session.uid, company = ?company_id, tasks = exported.len(), "exported tasks");

    Ok(json!({
        "status": "success",
        "tasks": exported,
        "code": 200,
    }))
}

/// `None` for tasks outside any project.
fn export_task(
    task: &TaskRecord,
    projects: &HashMap<u32, ProjectRecord>,
    partners: &HashMap<u32, PartnerRecord>,
) -> Option<TaskExport> {
    let project_ref = task.project_id.as_ref()?;
    let project = projects.get(&project_ref.id());

    let client = project
        .and_then(|project| project.partner_id.as_ref())
        .and_then(|partner| partners.get(&partner.id()))
        .map(ClientExport::from_partner);

    let project = match project {
        Some(project) => ProjectExport {
            odoo_id: Some(project.id),
            name: Some(project.name.clone()),
            description: Some(html_to_plaintext(project.description.as_deref().unwrap_or(""))),
        },
        None => ProjectExport {
            odoo_id: Some(project_ref.id()),
            name: Some(project_ref.name().to_string()),
            description: None,
        },
    };

    Some(TaskExport {
        odoo_id: task.id,
        name: task.name.clone(),
        description: html_to_plaintext(task.description.as_deref().unwrap_or("")),
        status: task.state.clone(),
        allocated_time: task.allocated_hours,
        project,
        client,
    })
}
