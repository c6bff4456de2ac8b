use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres};
use tracing::debug;
use uuid::Uuid;

use super::manager::{quote_identifier, DatabaseError};
use super::store::{
    Collection, DeleteResult, Document, DocumentStore, Filter, FindOptions, InsertOneResult, UpdateResult, ID_FIELD,
};

/// Document store over Postgres JSONB tables, one table per collection.
///
/// Each row is `(id UUID, seq BIGSERIAL, doc JSONB)`; `seq` preserves
/// insertion order and `_id` is merged into `doc` on the way out.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_doc(collection: Collection) -> String {
        format!(
            "SELECT doc || jsonb_build_object('{}', id::text) AS doc FROM {}",
            ID_FIELD,
            quote_identifier(collection.name())
        )
    }
}

// Matches store::type_rank so both backends order mixed types the same way
const SORT_RANK: &str = "CASE jsonb_typeof(doc -> $5::text) \
    WHEN 'number' THEN 1 WHEN 'string' THEN 2 WHEN 'object' THEN 3 \
    WHEN 'array' THEN 4 WHEN 'boolean' THEN 5 ELSE 0 END";

// Every named field must be missing or JSON null
const NULL_FIELDS: &str = "NOT EXISTS (SELECT 1 FROM unnest($4::text[]) AS f(name) \
    WHERE jsonb_typeof(doc -> f.name) <> 'null')";

/// LIMIT/OFFSET bind; anything past `i64::MAX` is already past the end
fn window_bind(value: Option<u64>) -> Option<i64> {
    value.map(|v| i64::try_from(v).unwrap_or(i64::MAX))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, DatabaseError> {
        let order_by = match options.sort_by {
            Some(_) => format!("{}, doc -> $5::text, seq", SORT_RANK),
            None => "seq".to_string(),
        };
        let sql = format!(
            "{} WHERE doc @> $1 AND {} ORDER BY {} LIMIT $2 OFFSET $3",
            Self::select_doc(collection),
            NULL_FIELDS,
            order_by
        );
        debug!("find {}: {}", collection.name(), sql);

        let (values, nulls) = filter.split_nulls();
        let mut query = sqlx::query_scalar::<Postgres, Value>(&sql)
            .bind(Value::Object(values))
            .bind(window_bind(options.limit))
            .bind(window_bind(options.skip))
            .bind(nulls);
        if let Some(field) = options.sort_by {
            query = query.bind(field);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|v| match v {
                Value::Object(map) => Ok(map),
                other => Err(DatabaseError::QueryError(format!("non-object document: {}", other))),
            })
            .collect()
    }

    async fn find_one(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let sql = format!("{} WHERE id = $1", Self::select_doc(collection));

        let row = sqlx::query_scalar::<Postgres, Value>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(DatabaseError::QueryError(format!("non-object document: {}", other))),
            None => Ok(None),
        }
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOneResult, DatabaseError> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2)",
            quote_identifier(collection.name())
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(doc))
            .execute(&self.pool)
            .await?;

        let inserted = result.rows_affected() == 1;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: inserted.then(|| id.to_string()),
        })
    }

    async fn update_one(&self, collection: Collection, id: Uuid, mut set: Document) -> Result<UpdateResult, DatabaseError> {
        set.remove(ID_FIELD);
        let table = quote_identifier(collection.name());
        // Rows whose merged document is unchanged count as matched, not modified
        let sql = format!(
            "WITH matched AS (SELECT id FROM {table} WHERE id = $1), \
             modified AS (UPDATE {table} SET doc = doc || $2 WHERE id = $1 AND doc || $2 <> doc RETURNING id) \
             SELECT (SELECT COUNT(*) FROM matched), (SELECT COUNT(*) FROM modified)",
            table = table
        );

        let (matched, modified) = sqlx::query_as::<Postgres, (i64, i64)>(&sql)
            .bind(id)
            .bind(Value::Object(set))
            .fetch_one(&self.pool)
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched as u64,
            modified_count: modified as u64,
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(collection.name()));

        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: result.rows_affected(),
        })
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
