use std::env;
use anyhow::Context;

pub const DEFAULT_INSTANCE_FIELD: &str = "x_coclock_instance_id";

#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub odoo_url: String,
    pub odoo_database: String,
    pub default_login: Option<String>,
    pub timeout_secs: u64,
    pub instance_field: String,
    pub admin: Option<AdminCredentials>,
    pub log_level: String,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let admin = match (optional("ODOO_ADMIN_LOGIN"), optional("ODOO_ADMIN_PASSWORD")) {
            (Some(login), Some(password)) => Some(AdminCredentials { login, password }),
            _ => None,
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a port number")?,
            odoo_url: optional("ODOO_URL").context("ODOO_URL is not set")?,
            odoo_database: optional("ODOO_DATABASE").context("ODOO_DATABASE is not set")?,
            default_login: optional("ODOO_DEFAULT_LOGIN"),
            timeout_secs: env::var("ODOO_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("ODOO_TIMEOUT_SECS must be a number of seconds")?,
            instance_field: optional("COCLOCK_INSTANCE_FIELD")
                .unwrap_or_else(|| DEFAULT_INSTANCE_FIELD.to_string()),
            admin,
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 9] = [
        "PORT",
        "ODOO_URL",
        "ODOO_DATABASE",
        "ODOO_DEFAULT_LOGIN",
        "ODOO_TIMEOUT_SECS",
        "COCLOCK_INSTANCE_FIELD",
        "ODOO_ADMIN_LOGIN",
        "ODOO_ADMIN_PASSWORD",
        "RUST_LOG",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear();
        env::set_var("ODOO_URL", "http://localhost:8069");
        env::set_var("ODOO_DATABASE", "odoo");

        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.odoo_url, "http://localhost:8069");
        assert_eq!(config.odoo_database, "odoo");
        assert_eq!(config.default_login, None);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.instance_field, "x_coclock_instance_id");
        assert!(config.admin.is_none());
        assert_eq!(config.log_level, "info");

        clear();
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom() {
        clear();
        env::set_var("PORT", "9090");
        env::set_var("ODOO_URL", "https://erp.example.com");
        env::set_var("ODOO_DATABASE", "prod");
        env::set_var("ODOO_DEFAULT_LOGIN", "coclock@example.com");
        env::set_var("ODOO_TIMEOUT_SECS", "5");
        env::set_var("COCLOCK_INSTANCE_FIELD", "x_studio_coclock_id");
        env::set_var("ODOO_ADMIN_LOGIN", "admin");
        env::set_var("ODOO_ADMIN_PASSWORD", "admin-key");
        env::set_var("RUST_LOG", "debug");

        let config = Config::from_env().unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.default_login.as_deref(), Some("coclock@example.com"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.instance_field, "x_studio_coclock_id");
        let admin = config.admin.unwrap();
        assert_eq!(admin.login, "admin");
        assert_eq!(admin.password, "admin-key");
        assert_eq!(config.log_level, "debug");

        clear();
    }

    #[test]
    #[serial]
    fn test_config_admin_needs_both_values() {
        clear();
        env::set_var("ODOO_URL", "http://localhost:8069");
        env::set_var("ODOO_DATABASE", "odoo");
        env::set_var("ODOO_ADMIN_LOGIN", "admin");

        let config = Config::from_env().unwrap();
        assert!(config.admin.is_none());

        clear();
    }

    #[test]
    #[serial]
    fn test_config_missing_url() {
        clear();
        env::set_var("ODOO_DATABASE", "odoo");

        assert!(Config::from_env().is_err());

        clear();
    }

    #[test]
    #[serial]
    fn test_config_invalid_port() {
        clear();
        env::set_var("ODOO_URL", "http://localhost:8069");
        env::set_var("ODOO_DATABASE", "odoo");
        env::set_var("PORT", "invalid");

        assert!(Config::from_env().is_err());

        clear();
    }
}
