//! The Old Reader API binding.
//!
//! - [`endpoints`] - the fixed endpoint catalogue and parameter filtering
//! - [`Client`] - dispatches calls, attaches auth and decodes responses
//! - [`transport`] - the pluggable HTTP seam and its `reqwest` implementation
//!
//! # Example
//!
//! ```ignore
//! use theoldreader::{Client, Headers, Params};
//!
//! let mut client = Client::new(None)?;
//! client.login("me@example.com", "secret", None).await?;
//!
//! let mut params = Params::new();
//! params.insert("s".into(), "user/-/state/com.google/reading-list".into());
//! let ids = client.call("stream/items/ids", &params, &Headers::new()).await?;
//! ```

mod client;
pub mod endpoints;
mod error;
mod methods;
pub mod transport;

pub use client::{Client, ClientOptions, Headers, Response, HOST};
pub use endpoints::{Endpoint, Params, Verb, BASE_PATH};
pub use error::{ApiError, Error};
pub use methods::DEFAULT_CLIENT_NAME;
pub use transport::{HttpTransport, RawResponse, Request, Transport};
