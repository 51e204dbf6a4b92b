//! API key check shared by the Coclock endpoints.
//!
//! The `Authorization` header carries an Odoo API key, optionally paired with
//! the login it belongs to: `Basic base64(login:key)`, `login:key`, or the
//! bare key (paired with the configured default login).

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose, Engine as _};
use crate::envelope::{ApiError, ApiResult};
use crate::odoo::Session;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub login: Option<String>,
    pub key: String,
}

fn split_credentials(value: &str) -> ApiKey {
    // Odoo API keys never contain ':', logins might
    match value.rsplit_once(':') {
        Some((login, key)) if !login.is_empty() => ApiKey {
            login: Some(login.to_string()),
            key: key.to_string(),
        },
        _ => ApiKey {
            login: None,
            key: value.trim_start_matches(':').to_string(),
        },
    }
}

fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Option<&'a str> {
    let head = value.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme).then(|| value[scheme.len()..].trim())
}

pub fn parse_authorization(headers: &HeaderMap) -> ApiResult<ApiKey> {
    let value = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| ApiError::InvalidApiKey))
        .transpose()?
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingApiKey)?;

    let api_key = if let Some(encoded) = strip_scheme(value, "Basic ") {
        let decoded = general_purpose::STANDARD
            .decode(encoded)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(ApiError::InvalidApiKey)?;
        split_credentials(&decoded)
    } else if let Some(token) = strip_scheme(value, "Bearer ") {
        split_credentials(token)
    } else {
        split_credentials(value)
    };

    if api_key.key.is_empty() {
        return Err(ApiError::MissingApiKey);
    }
    Ok(api_key)
}

/// Resolve the request's API key to an Odoo session.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<Session> {
    let api_key = parse_authorization(headers)?;
    let login = match api_key.login.as_deref().or(state.default_login.as_deref()) {
        Some(login) => login,
        None => {
            tracing::warn!("API key without login and no default login configured");
            return Err(ApiError::InvalidApiKey);
        }
    };

    match state.gateway.authenticate(login, &api_key.key).await? {
        Some(session) => {
            tracing::debug!(uid = session.uid, login, "API key accepted");
            Ok(session)
        }
        None => Err(ApiError::InvalidApiKey),
    }
}
