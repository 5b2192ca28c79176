use serde::{Deserialize, Serialize};

use super::attachment::Attachment;

/// The value held by a [`Property`].
///
/// Which variant an id carries is fixed by the service schema, not by the
/// property itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
    StringList(Vec<String>),
    Attachments(Vec<Attachment>),
}

impl PropertyValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_attachments(&self) -> Option<&[Attachment]> {
        match self {
            Self::Attachments(list) => Some(list),
            _ => None,
        }
    }

    /// The attachment list, after replacing any other kind of value with an
    /// empty list.
    pub(crate) fn attachments_or_reset(&mut self) -> &mut Vec<Attachment> {
        match self {
            Self::Attachments(list) => list,
            other => {
                *other = Self::Attachments(Vec::new());
                other.attachments_or_reset()
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

impl From<Vec<Attachment>> for PropertyValue {
    fn from(value: Vec<Attachment>) -> Self {
        Self::Attachments(value)
    }
}

/// An identified value of an issue snapshot.
///
/// A property without a value is "null"; storing it is the same as not
/// storing anything under its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    id: String,
    value: Option<PropertyValue>,
}

impl Property {
    pub const ISSUE_TYPE: &'static str = "issuetype";
    pub const ASSIGNEE: &'static str = "assignee";
    pub const STATUS: &'static str = "status";
    pub const PROJECT: &'static str = "project";
    pub const PRIORITY: &'static str = "priority";
    pub const SUBJECT: &'static str = "subject";
    pub const DESCRIPTION: &'static str = "description";
    pub const NOTES: &'static str = "notes";
    pub const ATTACHMENTS: &'static str = "attachments";

    #[must_use]
    pub fn new(id: impl Into<String>, value: Option<PropertyValue>) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub(crate) fn value_or_insert(&mut self, default: PropertyValue) -> &mut PropertyValue {
        self.value.get_or_insert(default)
    }

    #[must_use]
    pub fn into_value(self) -> Option<PropertyValue> {
        self.value
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.value.is_none()
    }
}
