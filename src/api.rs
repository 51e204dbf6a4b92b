use rand::{Rng, thread_rng};
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::error::{Error, Result, ACCESS_DENIED};

#[derive(Serialize, Debug)]
pub struct RequestParams<T> {
    service: String,
    method: String,
    args: T,
}

#[derive(Serialize, Debug)]
pub struct Request<T> {
    jsonrpc: String,
    method: String,
    id: u32,
    params: RequestParams<T>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<ErrorData>,
}

#[derive(Deserialize, Debug)]
pub struct Response<T> {
    #[serde(default)]
    pub id: Option<Value>,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl<T> Request<T> {
    pub fn new(service: &str, method: Option<&str>, args: T) -> Request<T> {
        let mut rng = thread_rng();
        Request {
            jsonrpc: String::from("2.0"),
            method: String::from("call"),
            params: RequestParams {
                service: service.to_string(),
                method: method.unwrap_or("execute_kw").to_string(),
                args,
            },
            id: rng.gen_range(1..10000),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        let data = err.data.unwrap_or(ErrorData { name: None, message: None });
        // Odoo puts the user-facing text in data.message, the outer message is generic
        let message = data.message.filter(|m| !m.is_empty()).unwrap_or(err.message);
        match data.name {
            Some(name) if name == ACCESS_DENIED => Error::AccessDenied(message),
            exception => Error::Rpc {
                code: err.code,
                message,
                exception,
            },
        }
    }
}

impl<T> Response<T> {
    pub fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        self.result.ok_or_else(|| Error::Rpc {
            code: 0,
            message: "JSON-RPC response carries neither result nor error".to_string(),
            exception: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = Request::new("common", Some("version"), ());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "call");
        assert_eq!(value["params"]["service"], "common");
        assert_eq!(value["params"]["method"], "version");
        assert!((1..10000).contains(&request.id()));
    }

    #[test]
    fn test_default_method_is_execute_kw() {
        let request = Request::new("object", None, ("db", 2, "key", "res.users", "read"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["params"]["method"], "execute_kw");
        assert_eq!(value["params"]["args"][3], "res.users");
    }

    #[test]
    fn test_response_result() {
        let response: Response<u32> =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 4, "result": 7})).unwrap();
        assert_eq!(response.into_result().unwrap(), 7);
    }

    #[test]
    fn test_response_access_denied() {
        let response: Response<u32> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {"name": "odoo.exceptions.AccessDenied", "message": "Access Denied"}
            }
        }))
        .unwrap();
        match response.into_result() {
            Err(Error::AccessDenied(message)) => assert_eq!(message, "Access Denied"),
            other => panic!("Expected AccessDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_response_other_fault() {
        let response: Response<u32> = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {"name": "odoo.exceptions.ValidationError", "message": "bad date"}
            }
        }))
        .unwrap();
        match response.into_result() {
            Err(Error::Rpc { message, exception, .. }) => {
                assert_eq!(message, "bad date");
                assert_eq!(exception.as_deref(), Some("odoo.exceptions.ValidationError"));
            }
            other => panic!("Expected Rpc error, got {:?}", other),
        }
    }

    #[test]
    fn test_response_empty() {
        let response: Response<u32> = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(response.into_result().is_err());
    }
}
