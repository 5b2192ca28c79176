//! itol-http library.
//!
//! Blocking HTTP transport for talking to a remote issue tracker: streamed
//! uploads and downloads with progress and cooperative cancellation,
//! transparent gzip, learned redirects, and Basic authentication helpers.
//!
//! # Conventions
//!
//! - **Errors**: Transport failures are captured in [`HttpResponse`];
//!   only cancellation and worker failure are returned as [`HttpError`].
//!   Configuration loading uses `anyhow` with file context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod redirect;
pub mod request;
pub mod response;
pub mod transfer;

pub use auth::{PasswordDecryptor, PlainPassword, basic_authorization_header, basic_credentials};
pub use client::HttpClient;
pub use config::{ClientConfig, Config, ServiceConfig, load_config, load_user_config};
pub use error::{CredentialError, HttpError};
pub use progress::ProgressReporter;
pub use redirect::{RedirectCache, Rewrite};
pub use request::{Body, HttpRequest};
pub use response::HttpResponse;
