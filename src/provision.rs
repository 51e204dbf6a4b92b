//! Creation of the Coclock instance id field on analytic lines.
//!
//! Fields added over RPC are "manual" fields; Odoo requires their technical
//! name to start with `x_`.

use std::sync::OnceLock;
use regex::Regex;
use serde_json::json;
use crate::erp::client::ANALYTIC_LINE;
use crate::error::{Error, Result};
use crate::odoo::{Odoo, Session};

pub const FIELD_LABEL: &str = "Coclock Instance ID";
pub const FIELD_HELP: &str = "ID of the Coclock Instance";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldStatus {
    Existing(u32),
    Created(u32),
}

pub fn validate_field_name(field: &str) -> Result<()> {
    static NAME: OnceLock<Regex> = OnceLock::new();
    let name = NAME.get_or_init(|| Regex::new(r"^x_[a-z0-9_]+$").unwrap());
    if name.is_match(field) {
        Ok(())
    } else {
        Err(Error::InvalidField(field.to_string()))
    }
}

/// Make sure `account.analytic.line` has the char field `field`.
/// Needs a session allowed to write `ir.model.fields` (administrator).
pub async fn ensure_instance_field(odoo: &Odoo, session: &Session, field: &str) -> Result<FieldStatus> {
    validate_field_name(field)?;

    let existing = odoo
        .search(
            session,
            "ir.model.fields",
            [("model", "=", ANALYTIC_LINE), ("name", "=", field)],
            Some(1),
        )
        .await?;
    if let Some(id) = existing.first() {
        return Ok(FieldStatus::Existing(*id));
    }

    let model_id = odoo
        .search(session, "ir.model", [("model", "=", ANALYTIC_LINE)], Some(1))
        .await?
        .first()
        .copied()
        .ok_or_else(|| Error::MissingModel(ANALYTIC_LINE.to_string()))?;

    let id = odoo
        .create(
            session,
            "ir.model.fields",
            json!({
                "name": field,
                "model_id": model_id,
                "field_description": FIELD_LABEL,
                "help": FIELD_HELP,
                "ttype": "char",
                "state": "manual",
                "index": true,
            }),
        )
        .await?;
    tracing::info!(field, id, "created Coclock instance field");
    Ok(FieldStatus::Created(id))
}
