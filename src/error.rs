use thiserror::Error;

/// Exception class Odoo reports when credentials or access rights are refused.
pub const ACCESS_DENIED: &str = "odoo.exceptions.AccessDenied";

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected JSON-RPC payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{message}")]
    Rpc {
        code: i64,
        message: String,
        exception: Option<String>,
    },

    #[error("{0}")]
    AccessDenied(String),

    #[error("Invalid custom field name `{0}`: manual fields need the x_ prefix")]
    InvalidField(String),

    #[error("Model {0} is not installed")]
    MissingModel(String),
}

impl Error {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::AccessDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
