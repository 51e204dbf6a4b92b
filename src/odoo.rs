use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use crate::error::{Error, Result};
use crate::api::{Request, Response};

/// Odoo sends `false` for empty scalar fields and unset relations.
pub fn deserialize_odoo_nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Nullable<T> {
        Value(T),
        Flag(bool),
        Null(()),
    }

    match Nullable::<T>::deserialize(deserializer)? {
        Nullable::Value(value) => Ok(Some(value)),
        Nullable::Flag(false) | Nullable::Null(()) => Ok(None),
        Nullable::Flag(true) => Err(serde::de::Error::custom("unexpected `true` for a nullable Odoo field")),
    }
}

/// A many2one value as returned by `read`: `[id, display_name]`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Many2one(pub u32, pub String);

impl Many2one {
    pub fn id(&self) -> u32 {
        self.0
    }

    pub fn name(&self) -> &str {
        &self.1
    }
}

/// Credentials of an authenticated Odoo user, sent with every `execute_kw`.
#[derive(Clone)]
pub struct Session {
    pub uid: u32,
    password: String,
}

impl Session {
    pub fn new(uid: u32, password: &str) -> Session {
        Session {
            uid,
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("password", &"***")
            .finish()
    }
}

pub struct Odoo {
    host: String,
    database: String,
    client: reqwest::Client,
}

impl Odoo {
    pub fn new(host: &str, database: &str) -> Odoo {
        Odoo {
            host: host.trim_end_matches('/').to_string(),
            database: database.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(host: &str, database: &str, timeout: Duration) -> Result<Odoo> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Odoo {
            host: host.trim_end_matches('/').to_string(),
            database: database.to_string(),
            client,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub async fn version(&self) -> Result<HashMap<String, Value>> {
        let request: Request<()> = Request::new("common", Some("version"), ());
        self.send(&request).await
    }

    /// Returns `None` when Odoo refuses the login/password (or API key) pair.
    pub async fn login(&self, login: &str, password: &str) -> Result<Option<Session>> {
        let request = Request::new("common", Some("authenticate"), (
            self.database.as_str(),
            login,
            password,
            json!({}),
        ));
        let result: Value = self.send(&request).await?;
        Ok(result
            .as_u64()
            .filter(|uid| *uid > 0)
            .and_then(|uid| u32::try_from(uid).ok())
            .map(|uid| Session::new(uid, password)))
    }

    pub async fn call<T: Serialize, U: DeserializeOwned>(&self, session: &Session, model: &str, method: &str, args: T) -> Result<U> {
        self.call_kw(session, model, method, args, json!({})).await
    }

    pub async fn call_kw<T: Serialize, K: Serialize, U: DeserializeOwned>(
        &self,
        session: &Session,
        model: &str,
        method: &str,
        args: T,
        kwargs: K,
    ) -> Result<U> {
        let request = Request::new("object", None, (
            self.database.as_str(),
            session.uid,
            session.password.as_str(),
            model,
            method,
            args,
            kwargs,
        ));
        tracing::debug!(model, method, uid = session.uid, "execute_kw");
        self.send(&request).await
    }

    pub async fn search<D: Serialize>(&self, session: &Session, model: &str, domain: D, limit: Option<u32>) -> Result<Vec<u32>> {
        let mut kwargs = serde_json::Map::new();
        if let Some(limit) = limit {
            kwargs.insert("limit".to_string(), json!(limit));
        }
        self.call_kw(session, model, "search", (domain,), kwargs).await
    }

    pub async fn search_read<D: Serialize, U: DeserializeOwned>(
        &self,
        session: &Session,
        model: &str,
        domain: D,
        fields: Option<Vec<&str>>,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<U>> {
        let mut kwargs = serde_json::Map::new();
        if let Some(fields) = fields {
            kwargs.insert("fields".to_string(), json!(fields));
        }
        if let Some(offset) = offset {
            kwargs.insert("offset".to_string(), json!(offset));
        }
        if let Some(limit) = limit {
            kwargs.insert("limit".to_string(), json!(limit));
        }
        self.call_kw(session, model, "search_read", (domain,), kwargs).await
    }

    /// Field definitions of a model, restricted to the given attributes.
    pub async fn fields_get(&self, session: &Session, model: &str, attributes: &[&str]) -> Result<HashMap<String, Value>> {
        self.call_kw(session, model, "fields_get", Vec::<Value>::new(), json!({ "attributes": attributes })).await
    }

    pub async fn read<U: DeserializeOwned>(&self, session: &Session, model: &str, ids: &[u32], fields: &[&str]) -> Result<Vec<U>> {
        self.call_kw(session, model, "read", (ids,), json!({ "fields": fields })).await
    }

    pub async fn create<V: Serialize>(&self, session: &Session, model: &str, values: V) -> Result<u32> {
        self.call(session, model, "create", (values,)).await
    }

    pub async fn write<V: Serialize>(&self, session: &Session, model: &str, ids: &[u32], values: V) -> Result<bool> {
        self.call(session, model, "write", (ids, values)).await
    }

    async fn send<T: Serialize, U: DeserializeOwned>(&self, request: &Request<T>) -> Result<U> {
        let url = format!("{}/jsonrpc", self.host);
        let resp = self.client.post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let response: Response<Value> = resp.json().await?;
        let result = response.into_result()?;
        serde_json::from_value(result).map_err(Error::from)
    }
}
