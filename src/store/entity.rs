//! The stateful entity contract and an in-memory reference implementation.

use crate::core::{Attributes, EntityRef, State};
use crate::store::error::PersistError;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Compare-and-set condition for saving an entity.
///
/// The save must only succeed while the persisted value of `field` still
/// equals `expected`, the value the handle was loaded with.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveGuard<S: State> {
    pub field: String,
    pub expected: Option<S>,
}

/// A record with one or more tracked fields.
///
/// Implementations own persistence. `save` must be atomic over every field
/// and attribute changed locally, and must honour the [`SaveGuard`].
pub trait StatefulEntity<S: State> {
    fn entity_ref(&self) -> EntityRef;

    fn get(&self, field: &str) -> Option<S>;

    fn set(&mut self, field: &str, state: S);

    /// Clear a field locally.
    fn unset(&mut self, field: &str);

    /// Value of `field` as last loaded from or saved to storage, ignoring
    /// local changes. This is the compare-and-set baseline for `save`.
    fn loaded(&self, field: &str) -> Option<S>;

    /// Non-state attributes changed since the entity was loaded or last saved.
    fn changed_attributes(&self) -> Attributes;

    fn save(&mut self, guard: &SaveGuard<S>) -> Result<(), PersistError>;
}

#[derive(Clone, Debug)]
struct Row<S: State> {
    fields: BTreeMap<String, S>,
    attributes: Attributes,
}

/// Shared in-memory table of entity rows.
///
/// Cloning the table shares the rows, so entities loaded from different
/// clones race on the same data the way two processes would.
#[derive(Debug)]
pub struct MemoryTable<S: State> {
    kind: String,
    rows: Arc<Mutex<HashMap<String, Row<S>>>>,
}

impl<S: State> Clone for MemoryTable<S> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<S: State> MemoryTable<S> {
    /// Create an empty table for entities of `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            rows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Insert or replace a row, returning a loaded handle onto it.
    pub fn insert(
        &self,
        id: impl Into<String>,
        fields: BTreeMap<String, S>,
        attributes: Attributes,
    ) -> MemoryEntity<S> {
        let id = id.into();
        self.rows.lock().insert(
            id.clone(),
            Row {
                fields: fields.clone(),
                attributes: attributes.clone(),
            },
        );
        MemoryEntity {
            table: self.clone(),
            entity: EntityRef::new(self.kind.clone(), id),
            loaded_fields: fields.clone(),
            fields,
            attributes: attributes.clone(),
            loaded_attributes: attributes,
        }
    }

    /// Load a fresh handle onto an existing row.
    pub fn load(&self, id: &str) -> Result<MemoryEntity<S>, PersistError> {
        let rows = self.rows.lock();
        let row = rows
            .get(id)
            .ok_or_else(|| PersistError::NotFound(format!("{}#{}", self.kind, id)))?;
        Ok(MemoryEntity {
            table: self.clone(),
            entity: EntityRef::new(self.kind.clone(), id),
            fields: row.fields.clone(),
            loaded_fields: row.fields.clone(),
            attributes: row.attributes.clone(),
            loaded_attributes: row.attributes.clone(),
        })
    }

    /// Persisted value of a field, bypassing any loaded handle.
    pub fn persisted(&self, id: &str, field: &str) -> Option<S> {
        self.rows
            .lock()
            .get(id)
            .and_then(|row| row.fields.get(field).cloned())
    }
}

/// Loaded handle onto a [`MemoryTable`] row with local, unsaved changes.
#[derive(Debug, Clone)]
pub struct MemoryEntity<S: State> {
    table: MemoryTable<S>,
    entity: EntityRef,
    fields: BTreeMap<String, S>,
    loaded_fields: BTreeMap<String, S>,
    attributes: Attributes,
    loaded_attributes: Attributes,
}

impl<S: State> MemoryEntity<S> {
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }
}

impl<S: State> StatefulEntity<S> for MemoryEntity<S> {
    fn entity_ref(&self) -> EntityRef {
        self.entity.clone()
    }

    fn get(&self, field: &str) -> Option<S> {
        self.fields.get(field).cloned()
    }

    fn set(&mut self, field: &str, state: S) {
        self.fields.insert(field.to_string(), state);
    }

    fn unset(&mut self, field: &str) {
        self.fields.remove(field);
    }

    fn loaded(&self, field: &str) -> Option<S> {
        self.loaded_fields.get(field).cloned()
    }

    fn changed_attributes(&self) -> Attributes {
        self.attributes
            .iter()
            .filter(|(key, value)| self.loaded_attributes.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn save(&mut self, guard: &SaveGuard<S>) -> Result<(), PersistError> {
        let mut rows = self.table.rows.lock();
        let row = rows
            .get_mut(&self.entity.id)
            .ok_or_else(|| PersistError::NotFound(self.entity.to_string()))?;

        let found = row.fields.get(&guard.field);
        if found != guard.expected.as_ref() {
            return Err(PersistError::Conflict {
                entity: self.entity.to_string(),
                field: guard.field.clone(),
                expected: guard.expected.as_ref().map(|s| s.name().to_string()),
                found: found.map(|s| s.name().to_string()),
            });
        }

        row.fields = self.fields.clone();
        row.attributes = self.attributes.clone();
        self.loaded_fields = self.fields.clone();
        self.loaded_attributes = self.attributes.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_with_draft() -> (MemoryTable<String>, MemoryEntity<String>) {
        let table = MemoryTable::new("document");
        let mut fields = BTreeMap::new();
        fields.insert("status".to_string(), "draft".to_string());
        let entity = table.insert("1", fields, Attributes::new());
        (table, entity)
    }

    fn guard(expected: Option<&str>) -> SaveGuard<String> {
        SaveGuard {
            field: "status".into(),
            expected: expected.map(str::to_string),
        }
    }

    #[test]
    fn save_writes_fields_and_attributes() {
        let (table, mut entity) = table_with_draft();
        entity.set("status", "submitted".into());
        entity.set_attribute("title", json!("Quarterly report"));

        entity.save(&guard(Some("draft"))).unwrap();

        assert_eq!(table.persisted("1", "status"), Some("submitted".into()));
        let reloaded = table.load("1").unwrap();
        assert_eq!(reloaded.attribute("title"), Some(&json!("Quarterly report")));
    }

    #[test]
    fn changed_attributes_tracks_unsaved_edits() {
        let (_table, mut entity) = table_with_draft();
        assert!(entity.changed_attributes().is_empty());

        entity.set_attribute("title", json!("Draft title"));
        let changed = entity.changed_attributes();
        assert_eq!(changed.get("title"), Some(&json!("Draft title")));

        entity.save(&guard(Some("draft"))).unwrap();
        assert!(entity.changed_attributes().is_empty());
    }

    #[test]
    fn stale_handle_conflicts() {
        let (table, mut first) = table_with_draft();
        let mut second = table.load("1").unwrap();

        first.set("status", "submitted".into());
        first.save(&guard(Some("draft"))).unwrap();

        second.set("status", "submitted".into());
        let err = second.save(&guard(Some("draft"))).unwrap_err();
        assert!(matches!(err, PersistError::Conflict { .. }));
    }

    #[test]
    fn loaded_tracks_storage_not_local_edits() {
        let (table, mut entity) = table_with_draft();
        entity.set("status", "submitted".into());
        assert_eq!(entity.loaded("status"), Some("draft".into()));

        entity.save(&guard(Some("draft"))).unwrap();
        assert_eq!(entity.loaded("status"), Some("submitted".into()));

        let mut fresh = table.insert("2", BTreeMap::new(), Attributes::new());
        fresh.set("status", "draft".into());
        assert_eq!(fresh.loaded("status"), None);
        fresh.unset("status");
        assert_eq!(fresh.get("status"), None);
    }

    #[test]
    fn load_missing_row_fails() {
        let table: MemoryTable<String> = MemoryTable::new("document");
        assert!(matches!(table.load("404"), Err(PersistError::NotFound(_))));
    }
}
