//! Reply format of the Coclock endpoints.
//!
//! Coclock talks to the bridge the way it talks to an Odoo `type='json'`
//! route: every answer is HTTP 200 carrying
//! `{"jsonrpc": "2.0", "id": ..., "result": {...}}`, and the outcome is in
//! the `status` and `code` members of the result.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use crate::error::Error;

pub const EMPLOYEE_NOT_FOUND: &str = "No employee found with the given email, please create the employee in Odoo before attempting a synchronisation";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No API key provided")]
    MissingApiKey,

    #[error("API key problem")]
    InvalidApiKey,

    #[error("{0}")]
    AccessDenied(String),

    #[error("API User not found")]
    UserNotFound,

    #[error("Missing parameter: timesheets")]
    MissingTimesheets,

    #[error("{}", EMPLOYEE_NOT_FOUND)]
    EmployeeNotFound,

    #[error("Malformed JSON body: {0}")]
    MalformedBody(String),

    #[error("Invalid timesheet: {0}")]
    InvalidTimesheet(String),

    #[error("{0}")]
    Odoo(Error),
}

impl ApiError {
    pub fn code(&self) -> u16 {
        match self {
            ApiError::MissingApiKey => 401,
            ApiError::InvalidApiKey | ApiError::AccessDenied(_) => 403,
            ApiError::UserNotFound | ApiError::MissingTimesheets | ApiError::EmployeeNotFound => 404,
            ApiError::MalformedBody(_) | ApiError::InvalidTimesheet(_) => 400,
            ApiError::Odoo(_) => 500,
        }
    }

    pub fn payload(&self) -> Value {
        json!({
            "status": "error",
            "message": self.to_string(),
            "code": self.code(),
        })
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::AccessDenied(message) => ApiError::AccessDenied(message),
            other => ApiError::Odoo(other),
        }
    }
}

/// JSON-RPC style reply echoing the caller's request id
#[derive(Debug)]
pub struct RpcReply {
    pub id: Value,
    pub result: Value,
}

impl RpcReply {
    pub fn new(id: Value, result: Value) -> Self {
        Self { id, result }
    }

    pub fn from_result(id: Value, result: ApiResult<Value>) -> Self {
        match result {
            Ok(payload) => Self::new(id, payload),
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "Coclock request failed");
                Self::new(id, err.payload())
            }
        }
    }
}

impl IntoResponse for RpcReply {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "jsonrpc": "2.0",
            "id": self.id,
            "result": self.result,
        }));

        (StatusCode::OK, body).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        RpcReply::from_result(Value::Null, Err(self)).into_response()
    }
}

/// Request id of a JSON-RPC style body, `null` when there is none.
pub fn request_id(body: &Value) -> Value {
    body.get("id").cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ApiError::MissingApiKey.code(), 401);
        assert_eq!(ApiError::InvalidApiKey.code(), 403);
        assert_eq!(ApiError::AccessDenied("Access Denied".to_string()).code(), 403);
        assert_eq!(ApiError::UserNotFound.code(), 404);
        assert_eq!(ApiError::MissingTimesheets.code(), 404);
        assert_eq!(ApiError::EmployeeNotFound.code(), 404);
        assert_eq!(ApiError::InvalidTimesheet("duration".to_string()).code(), 400);
        let rpc = Error::Rpc { code: 200, message: "boom".to_string(), exception: None };
        assert_eq!(ApiError::from(rpc).code(), 500);
    }

    #[test]
    fn test_payload() {
        let payload = ApiError::MissingTimesheets.payload();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["message"], "Missing parameter: timesheets");
        assert_eq!(payload["code"], 404);
    }

    #[test]
    fn test_access_denied_keeps_odoo_message() {
        let err = ApiError::from(Error::AccessDenied("Access Denied".to_string()));
        assert_eq!(err.code(), 403);
        assert_eq!(err.payload()["message"], "Access Denied");
    }

    #[test]
    fn test_error_response_is_http_ok() {
        let response = ApiError::UserNotFound.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_request_id() {
        assert_eq!(request_id(&json!({"jsonrpc": "2.0", "id": 17})), json!(17));
        assert_eq!(request_id(&json!({"timesheets": []})), Value::Null);
        assert_eq!(request_id(&Value::Null), Value::Null);
    }
}
