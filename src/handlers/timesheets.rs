use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{json, Value};
use crate::auth::authenticate;
use crate::envelope::{request_id, ApiError, ApiResult, RpcReply};
use crate::models::{parse_start_date, AnalyticLineValues, TimesheetEntry};
use crate::odoo::Session;
use crate::state::AppState;

/// Import Coclock timesheets as analytic lines
pub async fn timesheets_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> RpcReply {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(err) => return RpcReply::from_result(Value::Null, Err(err)),
    };
    RpcReply::from_result(request_id(&body), import_timesheets(&state, &headers, &body).await)
}

fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// `timesheets` at the top level, or under `params` for JSON-RPC clients.
fn timesheets_param(body: &Value) -> ApiResult<&Vec<Value>> {
    let value = body
        .get("timesheets")
        .or_else(|| body.get("params").and_then(|params| params.get("timesheets")));
    match value {
        Some(Value::Array(entries)) if !entries.is_empty() => Ok(entries),
        Some(value) if is_truthy(value) => Err(ApiError::InvalidTimesheet("`timesheets` must be a list".to_string())),
        _ => Err(ApiError::MissingTimesheets),
    }
}

/// JSON values a client would treat as "something was sent".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Entries are applied one by one; the first failure stops the import and
/// leaves the lines already written in place.
pub async fn import_timesheets(state: &AppState, headers: &HeaderMap, body: &Value) -> ApiResult<Value> {
    let entries = timesheets_param(body)?;
    let session = authenticate(state, headers).await?;

    let mut last_line = None;
    for raw in entries {
        last_line = Some(sync_entry(state, &session, raw).await?);
    }

    tracing::info!(uid = session.uid, count = entries.len(), "synchronised Coclock timesheets");

    Ok(json!({
        "status": "success",
        "timesheets": last_line,
        "code": 200,
    }))
}

/// Create or update the analytic line of one entry, returning its id.
async fn sync_entry(state: &AppState, session: &Session, raw: &Value) -> ApiResult<u32> {
    let entry: TimesheetEntry =
        serde_json::from_value(raw.clone()).map_err(|e| ApiError::InvalidTimesheet(e.to_string()))?;
    let date = parse_start_date(&entry.start_time).ok_or_else(|| {
        ApiError::InvalidTimesheet(format!("start_time {:?} is not a date", entry.start_time))
    })?;

    let employee_id = state
        .gateway
        .find_employee(session, &entry.employee.email)
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    let values = AnalyticLineValues::new(&entry, employee_id, date);
    match state.gateway.find_analytic_line(session, &entry.coclock_instance_id).await? {
        Some(id) => {
            state.gateway.write_analytic_line(session, id, &values).await?;
            tracing::debug!(id, instance = %entry.coclock_instance_id, "updated analytic line");
            Ok(id)
        }
        None => {
            let id = state.gateway.create_analytic_line(session, &values).await?;
            tracing::debug!(id, instance = %entry.coclock_instance_id, "created analytic line");
            Ok(id)
        }
    }
}
