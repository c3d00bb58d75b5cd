//! Collection-oriented persistence: the narrow contract the handlers need
//! from whatever document database backs the deployment.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Collection names, kept as constants so route code and tests agree on
/// spelling.
pub mod collections {
    pub const WAITLIST: &str = "waitlist";
    pub const STORY_INTAKE: &str = "start-story-submissions";
    pub const CUSTOMER_STORIES: &str = "customer-stories";
    pub const USERS: &str = "users";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: String },
    #[error("duplicate value for {field} in {collection}")]
    Conflict { collection: String, field: String },
    #[error("document must serialize to a JSON object")]
    NotAnObject,
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A query against one collection: at most one equality filter, one
/// ordering field, and a result cap.
#[derive(Debug, Clone, Default)]
pub struct DocumentQuery {
    pub filter: Option<(String, Value)>,
    pub order_by: Option<(String, SortOrder)>,
    pub limit: Option<i64>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter = Some((field.into(), value.into()));
        self
    }

    pub fn order_asc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some((field.into(), SortOrder::Ascending));
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some((field.into(), SortOrder::Descending));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A document read back from a store, its id alongside its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl StoredDocument {
    /// Merge the id into the fields, the shape listing endpoints return.
    pub fn into_value(self) -> Value {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Value::Object(fields)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert with a generated id; returns the id.
    async fn add(&self, collection: &str, fields: Map<String, Value>) -> Result<String, StoreError>;

    /// Insert with a generated id unless another document in the
    /// collection already holds the same value for `unique_field`.
    /// Backends enforce this atomically (a unique key, or the store's
    /// write lock), never by a separate read.
    async fn add_unique(
        &self,
        collection: &str,
        unique_field: &str,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Merge `changes` into an existing document. `NotFound` if absent.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<(), StoreError>;

    async fn query(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Cheap connectivity probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;
}

/// Serialize a record into the field map a store write expects.
pub fn fields_of<T: Serialize>(record: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::NotAnObject),
    }
}
