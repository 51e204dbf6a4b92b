use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use serde_json::{json, Value};
use crate::erp::traits::OdooGateway;
use crate::error::{Error, Result};
use crate::models::{AnalyticLineValues, PartnerRecord, ProjectRecord, TaskRecord, UserRecord};
use crate::odoo::Session;

#[derive(Default)]
struct Store {
    api_keys: HashMap<(String, String), u32>,
    users: HashMap<u32, UserRecord>,
    tasks: Vec<(Option<u32>, TaskRecord)>,
    projects: HashMap<u32, ProjectRecord>,
    partners: HashMap<u32, PartnerRecord>,
    employees: Vec<(u32, String, bool)>,
    lines: Vec<(u32, AnalyticLineValues)>,
    next_line_id: u32,
    failing_instance: Option<String>,
    offline: bool,
    calls: Vec<String>,
}

/// In-memory Odoo used by unit tests
#[derive(Clone, Default)]
pub struct MockGateway {
    store: Arc<Mutex<Store>>,
}

impl MockGateway {
    pub fn new() -> Self {
        let gateway = Self::default();
        gateway.store.lock().unwrap().next_line_id = 1;
        gateway
    }

    pub fn add_api_key(&self, login: &str, key: &str, uid: u32) {
        self.store.lock().unwrap().api_keys.insert((login.to_string(), key.to_string()), uid);
    }

    pub fn add_user(&self, user: UserRecord) {
        self.store.lock().unwrap().users.insert(user.id, user);
    }

    pub fn add_task(&self, company_id: Option<u32>, task: TaskRecord) {
        self.store.lock().unwrap().tasks.push((company_id, task));
    }

    pub fn add_project(&self, project: ProjectRecord) {
        self.store.lock().unwrap().projects.insert(project.id, project);
    }

    pub fn add_partner(&self, partner: PartnerRecord) {
        self.store.lock().unwrap().partners.insert(partner.id, partner);
    }

    pub fn add_employee(&self, id: u32, work_email: &str, active: bool) {
        self.store.lock().unwrap().employees.push((id, work_email.to_string(), active));
    }

    /// Seed an existing analytic line
    pub fn add_line(&self, id: u32, values: AnalyticLineValues) {
        let mut store = self.store.lock().unwrap();
        store.next_line_id = store.next_line_id.max(id + 1);
        store.lines.push((id, values));
    }

    /// Make create/write fail for the entry with this instance id
    pub fn fail_on_instance(&self, instance_id: &str) {
        self.store.lock().unwrap().failing_instance = Some(instance_id.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.store.lock().unwrap().offline = offline;
    }

    pub fn lines(&self) -> Vec<(u32, AnalyticLineValues)> {
        self.store.lock().unwrap().lines.clone()
    }

    /// Names of the gateway methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.store.lock().unwrap().calls.clone()
    }

    fn record(&self, call: &str) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.calls.push(call.to_string());
        if store.offline {
            return Err(Error::Rpc {
                code: -1,
                message: "Connection refused".to_string(),
                exception: None,
            });
        }
        Ok(())
    }

    fn check_writable(store: &Store, values: &AnalyticLineValues) -> Result<()> {
        if store.failing_instance.as_deref() == Some(values.instance_id.as_str()) {
            return Err(Error::Rpc {
                code: 200,
                message: format!("Cannot save timesheet {}", values.instance_id),
                exception: Some("odoo.exceptions.ValidationError".to_string()),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OdooGateway for MockGateway {
    async fn version(&self) -> Result<HashMap<String, Value>> {
        self.record("version")?;
        Ok(HashMap::from([("server_version".to_string(), json!("17.0"))]))
    }

    async fn authenticate(&self, login: &str, api_key: &str) -> Result<Option<Session>> {
        self.record("authenticate")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .api_keys
            .get(&(login.to_string(), api_key.to_string()))
            .map(|uid| Session::new(*uid, api_key)))
    }

    async fn current_user(&self, session: &Session) -> Result<Option<UserRecord>> {
        self.record("current_user")?;
        Ok(self.store.lock().unwrap().users.get(&session.uid).cloned())
    }

    async fn company_tasks(&self, _session: &Session, company_id: Option<u32>) -> Result<Vec<TaskRecord>> {
        self.record("company_tasks")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .tasks
            .iter()
            .filter(|(company, _)| *company == company_id)
            .map(|(_, task)| task.clone())
            .collect())
    }

    async fn projects(&self, _session: &Session, ids: &[u32]) -> Result<Vec<ProjectRecord>> {
        self.record("projects")?;
        let store = self.store.lock().unwrap();
        Ok(ids.iter().filter_map(|id| store.projects.get(id).cloned()).collect())
    }

    async fn partners(&self, _session: &Session, ids: &[u32]) -> Result<Vec<PartnerRecord>> {
        self.record("partners")?;
        let store = self.store.lock().unwrap();
        Ok(ids.iter().filter_map(|id| store.partners.get(id).cloned()).collect())
    }

    async fn find_employee(&self, _session: &Session, email: &str) -> Result<Option<u32>> {
        self.record("find_employee")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .employees
            .iter()
            .find(|(_, work_email, active)| *active && work_email == email)
            .map(|(id, _, _)| *id))
    }

    async fn find_analytic_line(&self, _session: &Session, instance_id: &str) -> Result<Option<u32>> {
        self.record("find_analytic_line")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .lines
            .iter()
            .find(|(_, values)| values.instance_id == instance_id)
            .map(|(id, _)| *id))
    }

    async fn create_analytic_line(&self, _session: &Session, values: &AnalyticLineValues) -> Result<u32> {
        self.record("create_analytic_line")?;
        let mut store = self.store.lock().unwrap();
        Self::check_writable(&store, values)?;
        let id = store.next_line_id;
        store.next_line_id += 1;
        store.lines.push((id, values.clone()));
        Ok(id)
    }

    async fn write_analytic_line(&self, _session: &Session, id: u32, values: &AnalyticLineValues) -> Result<()> {
        self.record("write_analytic_line")?;
        let mut store = self.store.lock().unwrap();
        Self::check_writable(&store, values)?;
        match store.lines.iter_mut().find(|(line_id, _)| *line_id == id) {
            Some((_, line)) => {
                *line = values.clone();
                Ok(())
            }
            None => Err(Error::Rpc {
                code: 200,
                message: format!("Record account.analytic.line({}) does not exist", id),
                exception: Some("odoo.exceptions.MissingError".to_string()),
            }),
        }
    }
}
