use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use coclock_odoo::erp::{OdooClient, OdooGateway};
use coclock_odoo::{provision, server, AppState, Config, Odoo};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    tracing::info!("Coclock bridge starting");
    tracing::info!("Odoo: {} (database {})", config.odoo_url, config.odoo_database);

    let odoo = Odoo::with_timeout(
        &config.odoo_url,
        &config.odoo_database,
        Duration::from_secs(config.timeout_secs),
    )?;

    if let Some(admin) = &config.admin {
        let session = odoo
            .login(&admin.login, &admin.password)
            .await?
            .context("Odoo rejected the administrator credentials")?;
        let status = provision::ensure_instance_field(&odoo, &session, &config.instance_field).await?;
        tracing::info!("Instance field {}: {:?}", config.instance_field, status);
    }

    let client = OdooClient::new(odoo, &config.instance_field);
    tracing::info!("Analytic lines matched on {}", client.instance_field());

    let gateway: Arc<dyn OdooGateway> = Arc::new(client);
    let state = AppState::new(gateway, config.default_login.clone());
    let app = server::build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
