//! In-memory document store. Backs local development (the emulator
//! analogue of the managed database) and the handler tests.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{DocumentQuery, DocumentStore, SortOrder, StoreError, StoredDocument};

type Collections = HashMap<String, BTreeMap<String, Map<String, Value>>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under a caller-chosen id, used to seed the
    /// `users` directory in development and tests. Overwrites silently.
    pub fn insert_with_id(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        self.write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn add(&self, collection: &str, fields: Map<String, Value>) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn add_unique(
        &self,
        collection: &str,
        unique_field: &str,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let mut collections = self.write();
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(value) = fields.get(unique_field) {
            let taken = docs.values().any(|doc| doc.get(unique_field) == Some(value));
            if taken {
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    field: unique_field.to_string(),
                });
            }
        }

        let id = Uuid::new_v4().to_string();
        docs.insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| StoredDocument {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut collections = self.write();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (field, value) in changes {
            doc.insert(field, value);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.read();
        let mut docs: Vec<StoredDocument> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| match &query.filter {
                        Some((field, value)) => fields.get(field) == Some(value),
                        None => true,
                    })
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, order)) = &query.order_by {
            docs.sort_by(|a, b| {
                let ordering = compare_fields(a.fields.get(field), b.fields.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            docs.truncate(limit.max(0) as usize);
        }

        Ok(docs)
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Field comparison for ordered queries. Timestamps are RFC 3339 strings,
/// so string comparison orders them chronologically.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.to_string().cmp(&b.to_string()),
    }
}
