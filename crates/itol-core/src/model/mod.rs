//! Issue document model.
//!
//! - [`Property`]: one identified value, the atomic unit of issue state.
//! - [`IssueUpdate`]: a snapshot of properties with author and timestamp.
//! - [`Issue`]: working snapshot, saved history and relational links.
//! - [`Attachment`]: metadata for files stored as an issue property.

pub mod attachment;
pub mod issue;
pub mod property;
pub mod update;

pub use attachment::Attachment;
pub use issue::Issue;
pub use property::{Property, PropertyValue};
pub use update::IssueUpdate;
