//! The issue document.
//!
//! An [`Issue`] holds a working snapshot (`current_update`) that edits go
//! into, plus the history of saved snapshots, oldest first. Demoting the
//! working snapshot into history after a save is the synchronization
//! layer's job; the issue only stores what it is given.
//!
//! # Reads populate
//!
//! The `*_or_insert` accessors store their default when the property is
//! absent, so a read can change the working snapshot and therefore the
//! result of [`Issue::find_changed_members`]. Use [`Issue::property`] for a
//! side-effect-free peek.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::attachment::Attachment;
use super::property::{Property, PropertyValue};
use super::update::IssueUpdate;
use crate::error::ModelError;

static NULL_ISSUE: LazyLock<Issue> = LazyLock::new(Issue::new);

/// A mutable issue record with a versioned property history.
///
/// `Clone` is a deep copy: the clone owns its own snapshots and
/// properties, so editing one never shows through in the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    id: String,
    #[serde(default)]
    parent_issue_id: String,
    #[serde(default)]
    sub_issue_ids: Vec<String>,
    #[serde(default)]
    related_issue_ids: Vec<String>,
    #[serde(default)]
    current_update: IssueUpdate,
    #[serde(default)]
    updates: Vec<IssueUpdate>,
}

impl Issue {
    /// A new, unsaved issue with an empty working snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared "no issue" value. It is immutable; clone it to edit.
    #[must_use]
    pub fn null() -> &'static Self {
        &NULL_ISSUE
    }

    /// A persisted issue that adopts `rhs`'s snapshots under a
    /// service-issued id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty: handing out an empty id here is a bug in
    /// the caller.
    #[must_use]
    pub fn with_id(id: impl Into<String>, rhs: Self) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "Issue::with_id requires a non-empty id");
        Self::adopt(id, rhs)
    }

    /// Non-panicking form of [`Issue::with_id`].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyIssueId`] if `id` is empty.
    pub fn try_with_id(id: impl Into<String>, rhs: Self) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyIssueId);
        }
        Ok(Self::adopt(id, rhs))
    }

    fn adopt(id: String, rhs: Self) -> Self {
        Self {
            id,
            current_update: rhs.current_update,
            updates: rhs.updates,
            ..Self::default()
        }
    }

    /// True for a new, unsaved issue (empty id).
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.id.is_empty()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    #[must_use]
    pub fn parent_issue_id(&self) -> &str {
        &self.parent_issue_id
    }

    pub fn set_parent_issue_id(&mut self, id: impl Into<String>) {
        self.parent_issue_id = id.into();
    }

    #[must_use]
    pub fn sub_issue_ids(&self) -> &[String] {
        &self.sub_issue_ids
    }

    pub const fn sub_issue_ids_mut(&mut self) -> &mut Vec<String> {
        &mut self.sub_issue_ids
    }

    #[must_use]
    pub fn related_issue_ids(&self) -> &[String] {
        &self.related_issue_ids
    }

    pub const fn related_issue_ids_mut(&mut self) -> &mut Vec<String> {
        &mut self.related_issue_ids
    }

    #[must_use]
    pub const fn current_update(&self) -> &IssueUpdate {
        &self.current_update
    }

    pub const fn current_update_mut(&mut self) -> &mut IssueUpdate {
        &mut self.current_update
    }

    pub fn set_current_update(&mut self, update: IssueUpdate) {
        self.current_update = update;
    }

    /// Saved snapshots, oldest first. Does not include the working one.
    #[must_use]
    pub fn updates(&self) -> &[IssueUpdate] {
        &self.updates
    }

    pub fn push_update(&mut self, update: IssueUpdate) {
        self.updates.push(update);
    }

    pub fn set_updates(&mut self, updates: Vec<IssueUpdate>) {
        self.updates = updates;
    }

    /// The last saved snapshot if there is any history, else the working
    /// snapshot.
    ///
    /// With history present this deliberately ignores `current_update`,
    /// even when the working snapshot has unsaved edits.
    #[must_use]
    pub fn last_update(&self) -> &IssueUpdate {
        self.updates.last().unwrap_or(&self.current_update)
    }

    /// Creation time of [`Issue::last_update`].
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_update().create_date()
    }

    /// Working-snapshot value for `id`, without side effects.
    #[must_use]
    pub fn property(&self, id: &str) -> Option<&PropertyValue> {
        self.current_update.value(id)
    }

    /// Working-snapshot value for `id`; stores `default` first if absent.
    pub fn get_or_insert_default(&mut self, id: &str, default: PropertyValue) -> &PropertyValue {
        if self.current_update.value(id).is_none() {
            tracing::trace!(property = id, "storing default for absent property");
        }
        self.current_update.value_or_insert(id, default)
    }

    /// Replace the value for `id` in the working snapshot; `None` removes it.
    pub fn set_property_value(&mut self, id: &str, value: Option<PropertyValue>) {
        match value {
            Some(value) => self.current_update.set_property(Property::new(id, Some(value))),
            None => {
                self.current_update.remove_property(id);
            }
        }
    }

    /// Text value for `id`, storing `default` if absent.
    ///
    /// A stored value of another kind is left untouched and `default` is
    /// returned.
    pub fn text_or_insert(&mut self, id: &str, default: &str) -> String {
        self.get_or_insert_default(id, PropertyValue::from(default))
            .as_text()
            .unwrap_or(default)
            .to_string()
    }

    pub fn set_text(&mut self, id: &str, value: impl Into<String>) {
        self.set_property_value(id, Some(PropertyValue::Text(value.into())));
    }

    pub fn flag_or_insert(&mut self, id: &str, default: bool) -> bool {
        self.get_or_insert_default(id, PropertyValue::Flag(default))
            .as_flag()
            .unwrap_or(default)
    }

    pub fn set_flag(&mut self, id: &str, value: bool) {
        self.set_property_value(id, Some(PropertyValue::Flag(value)));
    }

    pub fn string_list_or_insert(&mut self, id: &str, default: Vec<String>) -> Vec<String> {
        let fallback = default.clone();
        self.get_or_insert_default(id, PropertyValue::StringList(default))
            .as_string_list()
            .map_or(fallback, <[String]>::to_vec)
    }

    pub fn set_string_list(&mut self, id: &str, value: Vec<String>) {
        self.set_property_value(id, Some(PropertyValue::StringList(value)));
    }

    pub fn issue_type(&mut self) -> String {
        self.text_or_insert(Property::ISSUE_TYPE, "")
    }

    pub fn set_issue_type(&mut self, value: impl Into<String>) {
        self.set_text(Property::ISSUE_TYPE, value);
    }

    pub fn assignee(&mut self) -> String {
        self.text_or_insert(Property::ASSIGNEE, "")
    }

    pub fn set_assignee(&mut self, value: impl Into<String>) {
        self.set_text(Property::ASSIGNEE, value);
    }

    pub fn status(&mut self) -> String {
        self.text_or_insert(Property::STATUS, "")
    }

    pub fn set_status(&mut self, value: impl Into<String>) {
        self.set_text(Property::STATUS, value);
    }

    pub fn project(&mut self) -> String {
        self.text_or_insert(Property::PROJECT, "")
    }

    pub fn set_project(&mut self, value: impl Into<String>) {
        self.set_text(Property::PROJECT, value);
    }

    pub fn priority(&mut self) -> String {
        self.text_or_insert(Property::PRIORITY, "")
    }

    pub fn set_priority(&mut self, value: impl Into<String>) {
        self.set_text(Property::PRIORITY, value);
    }

    pub fn subject(&mut self) -> String {
        self.text_or_insert(Property::SUBJECT, "")
    }

    pub fn set_subject(&mut self, value: impl Into<String>) {
        self.set_text(Property::SUBJECT, value);
    }

    pub fn description(&mut self) -> String {
        self.text_or_insert(Property::DESCRIPTION, "")
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.set_text(Property::DESCRIPTION, value);
    }

    pub fn notes(&mut self) -> String {
        self.text_or_insert(Property::NOTES, "")
    }

    pub fn set_notes(&mut self, value: impl Into<String>) {
        self.set_text(Property::NOTES, value);
    }

    /// Attachments in the working snapshot, empty if none were stored.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        self.property(Property::ATTACHMENTS)
            .and_then(PropertyValue::as_attachments)
            .unwrap_or_default()
    }

    /// Mutable attachment list, created empty on first access.
    ///
    /// A non-attachment value stored under the attachments id is replaced.
    pub fn attachments_mut(&mut self) -> &mut Vec<Attachment> {
        self.current_update
            .value_or_insert(Property::ATTACHMENTS, PropertyValue::Attachments(Vec::new()))
            .attachments_or_reset()
    }

    pub fn set_attachments(&mut self, attachments: Option<Vec<Attachment>>) {
        self.set_property_value(
            Property::ATTACHMENTS,
            attachments.map(PropertyValue::Attachments),
        );
    }

    /// First attachment whose file name equals `file_name`, ignoring case.
    #[must_use]
    pub fn find_attachment(&self, file_name: &str) -> Option<&Attachment> {
        let wanted = file_name.to_lowercase();
        self.attachments()
            .iter()
            .find(|att| att.file_name.to_lowercase() == wanted)
    }

    /// `file_name` if no attachment uses it yet, else the first free
    /// `"<name> (n).<ext>"` variant for n = 1, 2, …
    #[must_use]
    pub fn make_unique_attachment_file_name(&self, file_name: &str) -> String {
        if self.find_attachment(file_name).is_none() {
            return file_name.to_string();
        }

        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) => (&file_name[..dot], Some(&file_name[dot + 1..])),
            None => (file_name, None),
        };

        let mut retry: u64 = 0;
        loop {
            retry += 1;
            let candidate = match ext {
                Some(ext) => format!("{stem} ({retry}).{ext}"),
                None => format!("{stem} ({retry})"),
            };
            if self.find_attachment(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Append the ids of working-snapshot properties that differ from
    /// `other`'s working snapshot.
    pub fn find_changed_members(&self, other: &Self, out: &mut Vec<String>) {
        self.current_update
            .find_changed_members(&other.current_update, out);
    }
}

/// Issues are equal when id, working snapshot and history match; the
/// relational links are not compared.
impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.current_update == other.current_update
            && self.updates == other.updates
    }
}

impl Eq for Issue {}
