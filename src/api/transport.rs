//! HTTP transport seam.
//!
//! [`Client`](crate::Client) builds a [`Request`] and hands it to a
//! [`Transport`], which performs the round-trip and returns a [`RawResponse`].
//! [`HttpTransport`] is the default, backed by `reqwest`. Tests and embedders
//! can plug in their own implementation through
//! [`Client::with_transport`](crate::Client::with_transport).
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use url::Url;

use super::endpoints::{Params, Verb};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fully resolved call, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Catalogue identifier the request was built from.
    pub endpoint: &'static str,
    pub verb: Verb,
    /// Scheme, host and path. Parameters are not encoded here.
    pub url: Url,
    /// Merged and filtered parameters.
    pub params: Params,
    /// Headers in the order they should be applied.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// URL to send. GET requests carry their parameters in the query string.
    pub fn target_url(&self) -> Url {
        let mut url = self.url.clone();
        if self.verb == Verb::Get && !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }

    /// Form-encoded body for POST requests, `None` for GET.
    pub fn form_body(&self) -> Option<String> {
        match self.verb {
            Verb::Get => None,
            Verb::Post => Some(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(self.params.iter())
                    .finish(),
            ),
        }
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a transport hands back: status, final URI and the body as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub uri: String,
    pub body: String,
}

/// Executes a [`Request`] against the network (or a stand-in).
pub trait Transport: Send + Sync {
    /// Failure raised before a response is available. Passed to the caller
    /// untranslated inside [`Error::Transport`](crate::Error::Transport).
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<RawResponse, Self::Error>> + Send;
}

impl From<Verb> for reqwest::Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
        }
    }
}

/// `reqwest`-backed transport.
///
/// The underlying `reqwest::Client` (and its connection pool) is created on
/// the first request and reused afterwards.
#[derive(Debug, Default)]
pub struct HttpTransport {
    client: OnceLock<reqwest::Client>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: OnceLock::new(),
            timeout,
        }
    }

    /// Use an already configured `reqwest::Client` instead of building one.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client: OnceLock::from(client),
            timeout: None,
        }
    }

    fn client(&self) -> Result<&reqwest::Client, reqwest::Error> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let built = builder.build()?;
        tracing::debug!(timeout = ?self.timeout, "Created HTTP client");

        // A concurrent caller may have won the race; either client is fine.
        Ok(self.client.get_or_init(|| built))
    }
}

impl Transport for HttpTransport {
    type Error = reqwest::Error;

    async fn execute(&self, request: &Request) -> Result<RawResponse, Self::Error> {
        let client = self.client()?;

        let mut builder = client.request(request.verb.into(), request.target_url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.form_body() {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let uri = response.url().to_string();
        let body = response.text().await?;

        Ok(RawResponse { status, uri, body })
    }
}
