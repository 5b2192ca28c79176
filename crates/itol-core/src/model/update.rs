use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::property::{Property, PropertyValue};

/// One snapshot of an issue's properties, stamped with time and author.
///
/// Absence of a key means the property is null for this snapshot, so null
/// properties are never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredUpdate")]
pub struct IssueUpdate {
    create_date: DateTime<Utc>,
    #[serde(default)]
    created_by: String,
    #[serde(default)]
    properties: BTreeMap<String, Property>,
}

impl IssueUpdate {
    /// Empty snapshot created now by an unknown author.
    #[must_use]
    pub fn new() -> Self {
        Self {
            create_date: Utc::now(),
            created_by: String::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Snapshot reconstructed from a remote representation.
    ///
    /// A missing `create_date` defaults to now. Null properties are dropped.
    #[must_use]
    pub fn from_parts(
        create_date: Option<DateTime<Utc>>,
        created_by: impl Into<String>,
        properties: impl IntoIterator<Item = Property>,
    ) -> Self {
        let mut update = Self {
            create_date: create_date.unwrap_or_else(Utc::now),
            created_by: created_by.into(),
            properties: BTreeMap::new(),
        };
        for prop in properties {
            update.set_property(prop);
        }
        update
    }

    #[must_use]
    pub const fn create_date(&self) -> DateTime<Utc> {
        self.create_date
    }

    #[must_use]
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, Property> {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    #[must_use]
    pub fn value(&self, id: &str) -> Option<&PropertyValue> {
        self.properties.get(id).and_then(Property::value)
    }

    /// Store `prop`, replacing any property with the same id. A null
    /// property removes the id instead.
    pub fn set_property(&mut self, prop: Property) {
        if prop.is_null() {
            self.properties.remove(prop.id());
        } else {
            self.properties.insert(prop.id().to_string(), prop);
        }
    }

    pub fn remove_property(&mut self, id: &str) -> Option<Property> {
        self.properties.remove(id)
    }

    /// Value for `id`, storing `default` first if the id is absent.
    pub(crate) fn value_or_insert(&mut self, id: &str, default: PropertyValue) -> &mut PropertyValue {
        self.properties
            .entry(id.to_string())
            .or_insert_with(|| Property::new(id, None))
            .value_or_insert(default)
    }

    /// Append the id of every property whose value differs from `other`.
    ///
    /// Present on one side and absent on the other counts as a change. Ids
    /// are appended in ascending order.
    pub fn find_changed_members(&self, other: &Self, out: &mut Vec<String>) {
        let ids = self
            .properties
            .keys()
            .chain(other.properties.keys())
            .collect::<std::collections::BTreeSet<_>>();
        for id in ids {
            if self.value(id) != other.value(id) {
                out.push(id.clone());
            }
        }
    }
}

/// Wire form of an [`IssueUpdate`]. Decoded properties go through
/// [`IssueUpdate::set_property`], so nulls are dropped and each property is
/// keyed by its own id rather than by the map key it arrived under.
#[derive(Deserialize)]
struct StoredUpdate {
    #[serde(default)]
    create_date: Option<DateTime<Utc>>,
    #[serde(default)]
    created_by: String,
    #[serde(default)]
    properties: BTreeMap<String, Property>,
}

impl From<StoredUpdate> for IssueUpdate {
    fn from(stored: StoredUpdate) -> Self {
        Self::from_parts(
            stored.create_date,
            stored.created_by,
            stored.properties.into_values(),
        )
    }
}

impl Default for IssueUpdate {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshots compare by their property map only; time and author are
/// bookkeeping.
impl PartialEq for IssueUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
    }
}

impl Eq for IssueUpdate {}
