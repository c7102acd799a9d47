use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::endpoints::{self, Params};
use super::error::{ApiError, Error};
use super::transport::{HttpTransport, RawResponse, Request, Transport};

/// Default API host.
pub const HOST: &str = "theoldreader.com";

/// Extra request headers supplied by the caller.
pub type Headers = BTreeMap<String, String>;

/// Connection settings for a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// `false` switches from HTTPS to plain HTTP.
    pub use_ssl: bool,
    /// Host (optionally with port) every request is sent to.
    pub host: String,
    /// Per-request timeout for the default transport. `None` waits as long as
    /// the transport does.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            use_ssl: true,
            host: HOST.to_string(),
            timeout: None,
        }
    }
}

impl ClientOptions {
    fn protocol(&self) -> &'static str {
        if self.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}://{}", self.protocol(), self.host))
    }
}

/// Result of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not JSON and is returned verbatim.
    Text(String),
}

impl Response {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Json(_) => None,
            Response::Text(text) => Some(text.as_str()),
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Response::Json(value) => Some(value),
            Response::Text(_) => None,
        }
    }

    fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Response::Json(value),
            Err(e) => {
                tracing::debug!(error = %e, len = body.len(), "Response body is not JSON, returning text");
                Response::Text(body)
            }
        }
    }
}

/// Client for The Old Reader API.
///
/// Holds an optional auth token and a transport. Every call is independent;
/// the only state shared between calls is the transport's connection pool.
pub struct Client<T = HttpTransport> {
    token: Option<SecretString>,
    base_url: Url,
    transport: T,
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client<HttpTransport> {
    /// Client against the default host over HTTPS.
    pub fn new(token: Option<String>) -> Result<Self, Error> {
        Self::with_options(token, ClientOptions::default())
    }

    pub fn with_options(token: Option<String>, options: ClientOptions) -> Result<Self, Error> {
        let transport = HttpTransport::new(options.timeout);
        Self::with_transport(token, options, transport)
    }
}

impl<T: Transport> Client<T> {
    /// Client that sends requests through `transport`.
    pub fn with_transport(
        token: Option<String>,
        options: ClientOptions,
        transport: T,
    ) -> Result<Self, Error> {
        let base_url = options.base_url()?;
        Ok(Self {
            token: token.map(SecretString::from),
            base_url,
            transport,
        })
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(SecretString::from(token.into()));
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Exposes the token, e.g. to persist it after [`login`](Self::login).
    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call the endpoint `endpoint_id`.
    ///
    /// Caller parameters are filtered through the endpoint's allow-list and
    /// merged over its defaults (`output=json` unless overridden). Caller
    /// headers are applied after the `Authorization` header and win on
    /// conflict.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownEndpoint`] if the identifier is not in the catalogue;
    ///   nothing is sent.
    /// - [`Error::Api`] for any status other than 200.
    /// - [`Error::Transport`] if the transport fails.
    ///
    /// A 200 response whose body is not JSON is returned as
    /// [`Response::Text`], not as an error.
    pub async fn call(
        &self,
        endpoint_id: &str,
        params: &Params,
        headers: &Headers,
    ) -> Result<Response, Error> {
        let request = self.build_request(endpoint_id, params, headers)?;

        tracing::debug!(
            endpoint = request.endpoint,
            verb = %request.verb,
            params = request.params.len(),
            "Calling API endpoint"
        );

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|e| Error::Transport(Box::new(e)))?;

        Self::handle_response(response)
    }

    /// Resolve everything about a call without sending it.
    pub fn build_request(
        &self,
        endpoint_id: &str,
        params: &Params,
        headers: &Headers,
    ) -> Result<Request, Error> {
        let endpoint = endpoints::lookup(endpoint_id)
            .ok_or_else(|| Error::UnknownEndpoint(endpoint_id.to_string()))?;

        let url = self.base_url.join(&endpoint.path())?;

        Ok(Request {
            endpoint: endpoint.id(),
            verb: endpoint.verb(),
            url,
            params: endpoint.build_params(params),
            headers: self.merge_headers(headers),
        })
    }

    fn merge_headers(&self, extra: &Headers) -> Vec<(String, String)> {
        let mut merged = Vec::with_capacity(extra.len() + 1);
        if let Some(token) = &self.token {
            tracing::trace!("Attaching GoogleLogin authorization");
            merged.push((
                "Authorization".to_string(),
                format!("GoogleLogin auth={}", token.expose_secret()),
            ));
        }
        for (name, value) in extra {
            merged.retain(|(existing, _): &(String, String)| !existing.eq_ignore_ascii_case(name));
            merged.push((name.clone(), value.clone()));
        }
        merged
    }

    fn handle_response(response: RawResponse) -> Result<Response, Error> {
        if response.status != 200 {
            tracing::debug!(status = response.status, uri = %response.uri, "API returned an error status");
            return Err(ApiError::new(response.status, response.uri, &response.body).into());
        }
        Ok(Response::from_body(response.body))
    }
}
