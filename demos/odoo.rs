use std::env;
use serde::Deserialize;

use coclock_odoo::odoo::{deserialize_odoo_nullable, Many2one, Odoo};

#[derive(Deserialize)]
struct Task {
    pub id: u32,
    pub name: String,
    #[serde(deserialize_with = "deserialize_odoo_nullable")]
    pub project_id: Option<Many2one>,
}

// ODOO_URL=http://localhost:8069 ODOO_DATABASE=odoo ODOO_LOGIN=admin ODOO_PASSWORD=<api key> cargo run --example odoo
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let odoo = Odoo::new(&env::var("ODOO_URL")?, &env::var("ODOO_DATABASE")?);
    let session = match odoo.login(&env::var("ODOO_LOGIN")?, &env::var("ODOO_PASSWORD")?).await? {
        Some(session) => session,
        None => anyhow::bail!("login refused"),
    };

    let tasks: Vec<Task> = odoo.search_read(&session, "project.task",
                                            [("project_id", "!=", false)],
                                            Some(vec!["name", "project_id"]),
                                            None, Some(20),
    ).await?;

    for task in tasks.iter() {
        let project = task.project_id.as_ref().map(Many2one::name).unwrap_or("");
        println!("[{}] {} ({})", task.id, task.name, project);
    }
    Ok(())
}
