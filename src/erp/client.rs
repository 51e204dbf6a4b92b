use std::collections::HashMap;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use crate::erp::traits::OdooGateway;
use crate::error::Result;
use crate::models::{AnalyticLineValues, PartnerRecord, ProjectRecord, TaskRecord, UserRecord};
use crate::odoo::{Odoo, Session};

pub const ANALYTIC_LINE: &str = "account.analytic.line";

const TASK_FIELDS: [&str; 5] = ["name", "description", "state", "allocated_hours", "project_id"];
const PROJECT_FIELDS: [&str; 3] = ["name", "description", "partner_id"];
const PARTNER_FIELDS: [&str; 3] = ["name", "is_company", "parent_id"];

/// Gateway backed by Odoo's JSON-RPC endpoint
pub struct OdooClient {
    odoo: Odoo,
    instance_field: String,
    // TASK_FIELDS minus those the connected Odoo does not define
    task_fields: OnceCell<Vec<&'static str>>,
}

impl OdooClient {
    pub fn new(odoo: Odoo, instance_field: &str) -> Self {
        Self {
            odoo,
            instance_field: instance_field.to_string(),
            task_fields: OnceCell::new(),
        }
    }

    pub fn instance_field(&self) -> &str {
        &self.instance_field
    }

    async fn task_fields(&self, session: &Session) -> Result<&[&'static str]> {
        let fields = self
            .task_fields
            .get_or_try_init(|| async {
                let known = self.odoo.fields_get(session, "project.task", &["type"]).await?;
                let fields: Vec<&'static str> = TASK_FIELDS
                    .into_iter()
                    .filter(|field| known.contains_key(*field))
                    .collect();
                if fields.len() < TASK_FIELDS.len() {
                    tracing::info!(?fields, "project.task lacks some exported fields");
                }
                Ok::<_, crate::error::Error>(fields)
            })
            .await?;
        Ok(fields)
    }
}

#[async_trait]
impl OdooGateway for OdooClient {
    async fn version(&self) -> Result<HashMap<String, Value>> {
        self.odoo.version().await
    }

    async fn authenticate(&self, login: &str, api_key: &str) -> Result<Option<Session>> {
        self.odoo.login(login, api_key).await
    }

    async fn current_user(&self, session: &Session) -> Result<Option<UserRecord>> {
        let users: Vec<UserRecord> = self
            .odoo
            .search_read(
                session,
                "res.users",
                [("id", "=", session.uid)],
                Some(vec!["company_id"]),
                None,
                Some(1),
            )
            .await?;
        Ok(users.into_iter().next())
    }

    async fn company_tasks(&self, session: &Session, company_id: Option<u32>) -> Result<Vec<TaskRecord>> {
        let company = company_id.map_or(json!(false), |id| json!(id));
        let fields = self.task_fields(session).await?;
        self.odoo
            .search_read(
                session,
                "project.task",
                [("company_id", "=", company)],
                Some(fields.to_vec()),
                None,
                None,
            )
            .await
    }

    async fn projects(&self, session: &Session, ids: &[u32]) -> Result<Vec<ProjectRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.odoo.read(session, "project.project", ids, &PROJECT_FIELDS).await
    }

    async fn partners(&self, session: &Session, ids: &[u32]) -> Result<Vec<PartnerRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.odoo.read(session, "res.partner", ids, &PARTNER_FIELDS).await
    }

    async fn find_employee(&self, session: &Session, email: &str) -> Result<Option<u32>> {
        let ids = self
            .odoo
            .search(
                session,
                "hr.employee",
                json!([["work_email", "=", email], ["active", "=", true]]),
                Some(1),
            )
            .await?;
        Ok(ids.first().copied())
    }

    async fn find_analytic_line(&self, session: &Session, instance_id: &str) -> Result<Option<u32>> {
        let ids = self
            .odoo
            .search(
                session,
                ANALYTIC_LINE,
                [(self.instance_field.as_str(), "=", instance_id)],
                Some(1),
            )
            .await?;
        Ok(ids.first().copied())
    }

    async fn create_analytic_line(&self, session: &Session, values: &AnalyticLineValues) -> Result<u32> {
        self.odoo
            .create(session, ANALYTIC_LINE, values.to_record(&self.instance_field))
            .await
    }

    async fn write_analytic_line(&self, session: &Session, id: u32, values: &AnalyticLineValues) -> Result<()> {
        self.odoo
            .write(session, ANALYTIC_LINE, &[id], values.to_record(&self.instance_field))
            .await?;
        Ok(())
    }
}
