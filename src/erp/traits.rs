use std::collections::HashMap;
use async_trait::async_trait;
use serde_json::Value;
use crate::error::Result;
use crate::models::{AnalyticLineValues, PartnerRecord, ProjectRecord, TaskRecord, UserRecord};
use crate::odoo::Session;

/// Odoo operations the bridge performs, abstracted so handlers can be tested
/// without a live server.
#[async_trait]
pub trait OdooGateway: Send + Sync {
    /// `common.version` of the server
    async fn version(&self) -> Result<HashMap<String, Value>>;

    /// Check a login / API key pair. `None` when Odoo rejects it.
    async fn authenticate(&self, login: &str, api_key: &str) -> Result<Option<Session>>;

    /// The `res.users` record of the session user, if it still exists.
    async fn current_user(&self, session: &Session) -> Result<Option<UserRecord>>;

    /// All tasks of a company (`company_id = false` when `None`).
    async fn company_tasks(&self, session: &Session, company_id: Option<u32>) -> Result<Vec<TaskRecord>>;

    async fn projects(&self, session: &Session, ids: &[u32]) -> Result<Vec<ProjectRecord>>;

    async fn partners(&self, session: &Session, ids: &[u32]) -> Result<Vec<PartnerRecord>>;

    /// First active employee whose work email matches.
    async fn find_employee(&self, session: &Session, email: &str) -> Result<Option<u32>>;

    /// First analytic line carrying the given Coclock instance id.
    async fn find_analytic_line(&self, session: &Session, instance_id: &str) -> Result<Option<u32>>;

    async fn create_analytic_line(&self, session: &Session, values: &AnalyticLineValues) -> Result<u32>;

    async fn write_analytic_line(&self, session: &Session, id: u32, values: &AnalyticLineValues) -> Result<()>;
}
