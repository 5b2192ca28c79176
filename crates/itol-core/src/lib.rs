//! itol-core library.
//!
//! # Conventions
//!
//! - **Errors**: Precondition failures are `thiserror` enums exposing an
//!   [`error::ErrorCode`]; the issue model itself has no runtime failures.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod error;
pub mod model;

pub use error::{ErrorCode, ModelError};
pub use model::{Attachment, Issue, IssueUpdate, Property, PropertyValue};
