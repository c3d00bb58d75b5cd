//! PostgreSQL backend: every document is a JSONB row in one `documents`
//! table keyed by (collection, id).

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{DocumentQuery, DocumentStore, SortOrder, StoreError, StoredDocument};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn add(&self, collection: &str, fields: Map<String, Value>) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(Value::Object(fields))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Conditional insert in a single statement, not a query-then-insert.
    /// With the optional unique key from the migrations in place the
    /// `ON CONFLICT` clause also absorbs concurrent duplicates.
    async fn add_unique(
        &self,
        collection: &str,
        unique_field: &str,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let value = fields
            .get(unique_field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, fields) \
             SELECT $1, $2, $3 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM documents WHERE collection = $1 AND fields->>$4::text = $5 \
             ) \
             ON CONFLICT DO NOTHING",
        )
        .bind(collection)
        .bind(&id)
        .bind(Value::Object(fields))
        .bind(unique_field)
        .bind(value)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                field: unique_field.to_string(),
            });
        }
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query("SELECT fields FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let fields: Value = row.try_get("fields")?;
                Ok(Some(StoredDocument {
                    id: id.to_string(),
                    fields: fields.as_object().cloned().unwrap_or_default(),
                }))
            }
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE documents SET fields = fields || $3 WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .bind(Value::Object(changes))
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let mut sql = String::from("SELECT id, fields FROM documents WHERE collection = $1");
        let mut arg = 1;

        if query.filter.is_some() {
            sql.push_str(&format!(" AND fields->>${}::text = ${}", arg + 1, arg + 2));
            arg += 2;
        }
        if let Some((_, order)) = &query.order_by {
            let direction = match order {
                SortOrder::Ascending => "ASC",
                SortOrder::Descending => "DESC",
            };
            sql.push_str(&format!(" ORDER BY fields->>${}::text {}", arg + 1, direction));
            arg += 1;
        }
        if query.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${}", arg + 1));
        }

        let mut statement = sqlx::query(&sql).bind(collection);
        if let Some((field, value)) = &query.filter {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            statement = statement.bind(field.clone()).bind(value);
        }
        if let Some((field, _)) = &query.order_by {
            statement = statement.bind(field.clone());
        }
        if let Some(limit) = query.limit {
            statement = statement.bind(limit);
        }

        let rows = statement.fetch_all(&self.pool).await?;
        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let fields: Value = row.try_get("fields")?;
            docs.push(StoredDocument {
                id,
                fields: fields.as_object().cloned().unwrap_or_default(),
            });
        }
        Ok(docs)
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
