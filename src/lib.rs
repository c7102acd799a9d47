//! Client for The Old Reader HTTP API.
//!
//! See [`api`] for the client itself and [`config`] for the optional
//! configuration file used by the command-line front end.

pub mod api;
pub mod config;

pub use api::{ApiError, Client, ClientOptions, Error, Headers, Params, Response};
