use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned by [`Client::call`](crate::Client::call).
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier is not in the endpoint catalogue. No request was sent.
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The API answered with a status other than 200.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The transport failed before a response arrived. The transport's own
    /// error is kept as-is and is reachable through `source()`.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The configured host does not form a valid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// `accounts/ClientLogin` succeeded but carried no `Auth` value.
    #[error("Login response did not contain an Auth token")]
    MissingAuthToken,
}

impl Error {
    /// The API error, if the server rejected the request.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// A non-200 response from the API.
///
/// `data` holds the decoded JSON error object when the body is one. Otherwise
/// it holds the request URI under `uri` and the raw body under `errors`.
/// Either way `code` is set to the HTTP status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    status: u16,
    uri: String,
    data: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: u16, uri: impl Into<String>, body: &str) -> Self {
        let uri = uri.into();
        let mut data = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                map.insert("uri".to_string(), Value::String(uri.clone()));
                map.insert("errors".to_string(), Value::String(body.to_string()));
                map
            }
        };
        data.insert("code".to_string(), Value::from(status));
        Self { status, uri, data }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Theoldreader API has returned the error (")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::String(s) => write!(f, "{key}: \"{s}\"")?,
                other => write!(f, "{key}: \"{other}\"")?,
            }
        }
        f.write_str(")")
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_decoded_and_tagged() {
        let err = ApiError::new(404, "https://theoldreader.com/x", r#"{"error":"not found"}"#);
        assert_eq!(err.status(), 404);
        assert_eq!(err.get("error"), Some(&json!("not found")));
        assert_eq!(err.get("code"), Some(&json!(404)));
        assert!(err.get("uri").is_none());
    }

    #[test]
    fn test_raw_body_uses_synthetic_keys() {
        let err = ApiError::new(500, "https://theoldreader.com/y", "Internal Server Error");
        assert_eq!(err.get("uri"), Some(&json!("https://theoldreader.com/y")));
        assert_eq!(err.get("errors"), Some(&json!("Internal Server Error")));
        assert_eq!(err.get("code"), Some(&json!(500)));
    }

    #[test]
    fn test_non_object_json_falls_back_to_raw() {
        let err = ApiError::new(400, "u", "[1,2]");
        assert_eq!(err.get("errors"), Some(&json!("[1,2]")));
    }

    #[test]
    fn test_display_lists_data() {
        let err = ApiError::new(403, "u", r#"{"error":"denied"}"#);
        let msg = err.to_string();
        assert!(msg.starts_with("Theoldreader API has returned the error"));
        assert!(msg.contains(r#"error: "denied""#));
        assert!(msg.contains(r#"code: "403""#));
    }

    #[test]
    fn test_api_error_accessor() {
        let err = Error::from(ApiError::new(401, "u", ""));
        assert_eq!(err.as_api().map(ApiError::status), Some(401));
        assert!(Error::UnknownEndpoint("x".into()).as_api().is_none());
    }
}
