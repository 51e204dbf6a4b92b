//! Odoo records read by the bridge and the JSON shapes exchanged with Coclock.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use serde_with::{serde_as, DefaultOnError};
use crate::odoo::{deserialize_odoo_nullable, Many2one};

#[derive(Deserialize, Debug, Clone)]
pub struct UserRecord {
    pub id: u32,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub company_id: Option<Many2one>,
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct TaskRecord {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub state: Option<String>,
    // not present on every Odoo version
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub allocated_hours: f64,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub project_id: Option<Many2one>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ProjectRecord {
    pub id: u32,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub partner_id: Option<Many2one>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PartnerRecord {
    pub id: u32,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_company: bool,
    #[serde(default, deserialize_with = "deserialize_odoo_nullable")]
    pub parent_id: Option<Many2one>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClientExport {
    pub odoo_id: Option<u32>,
    pub client_name: Option<String>,
    pub odoo_company_id: Option<u32>,
    pub company_name: Option<String>,
}

impl ClientExport {
    /// A company partner is reported as the company itself; a contact is
    /// reported with its parent company, if any.
    pub fn from_partner(partner: &PartnerRecord) -> ClientExport {
        if partner.is_company {
            ClientExport {
                odoo_id: None,
                client_name: None,
                odoo_company_id: Some(partner.id),
                company_name: partner.name.clone(),
            }
        } else {
            ClientExport {
                odoo_id: Some(partner.id),
                client_name: partner.name.clone(),
                odoo_company_id: partner.parent_id.as_ref().map(Many2one::id),
                company_name: partner.parent_id.as_ref().map(|parent| parent.name().to_string()),
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectExport {
    pub odoo_id: Option<u32>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskExport {
    pub odoo_id: u32,
    pub name: String,
    pub description: String,
    pub status: Option<String>,
    pub allocated_time: f64,
    pub project: ProjectExport,
    pub client: Option<ClientExport>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EmployeeRef {
    pub email: String,
}

/// Coclock sends instance ids either as strings or as plain numbers.
fn deserialize_instance_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum InstanceId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match InstanceId::deserialize(deserializer)? {
        InstanceId::Text(text) => text,
        InstanceId::Number(number) => number.to_string(),
    })
}

#[derive(Deserialize, Debug, Clone)]
pub struct TimesheetEntry {
    pub employee: EmployeeRef,
    #[serde(deserialize_with = "deserialize_instance_id")]
    pub coclock_instance_id: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes.
    pub duration: f64,
    #[serde(default)]
    pub project_id: Option<u32>,
    #[serde(default)]
    pub task_id: Option<u32>,
    pub start_time: String,
}

/// Accepts `YYYY-MM-DD`, or a date-time whose date part is kept.
pub fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
}

/// Values written to `account.analytic.line` for one Coclock entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticLineValues {
    pub name: Option<String>,
    pub employee_id: u32,
    pub date: NaiveDate,
    pub unit_amount: f64,
    pub project_id: Option<u32>,
    pub task_id: Option<u32>,
    pub instance_id: String,
}

impl AnalyticLineValues {
    pub fn new(entry: &TimesheetEntry, employee_id: u32, date: NaiveDate) -> AnalyticLineValues {
        AnalyticLineValues {
            name: entry.description.clone(),
            employee_id,
            date,
            unit_amount: entry.duration / 60.0,
            project_id: entry.project_id,
            task_id: entry.task_id,
            instance_id: entry.coclock_instance_id.clone(),
        }
    }

    pub fn to_record(&self, instance_field: &str) -> Value {
        let mut record = json!({
            "name": self.name,
            "employee_id": self.employee_id,
            "date": self.date.format("%Y-%m-%d").to_string(),
            "unit_amount": self.unit_amount,
            "project_id": self.project_id,
            "task_id": self.task_id,
        });
        record[instance_field] = json!(self.instance_id);
        record
    }
}
