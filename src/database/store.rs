use std::cmp::Ordering;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::manager::DatabaseError;

/// A JSON document as stored in a collection
pub type Document = Map<String, Value>;

/// Field under which the identifier is exposed on every returned document
pub const ID_FIELD: &str = "_id";

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Toys,
    Opinions,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Toys, Collection::Opinions];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Toys => "toys",
            Collection::Opinions => "opinions",
        }
    }
}

/// Equality filter: every listed field must equal the given value.
///
/// A `null` value also matches documents that lack the field entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(pub Document);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn equals(field: impl Into<String>, value: Value) -> Self {
        let mut map = Document::new();
        map.insert(field.into(), value);
        Self(map)
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(k, v)| match v {
            Value::Null => matches!(doc.get(k), None | Some(Value::Null)),
            _ => doc.get(k) == Some(v),
        })
    }

    /// Split into the fields that must equal a concrete value and the
    /// fields that must be missing or null.
    pub fn split_nulls(self) -> (Document, Vec<String>) {
        let mut values = Document::new();
        let mut nulls = Vec::new();
        for (k, v) in self.0 {
            match v {
                Value::Null => nulls.push(k),
                v => {
                    values.insert(k, v);
                }
            }
        }
        (values, nulls)
    }
}

/// Sorting and windowing applied to a `find`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Field to sort ascending on; `None` keeps insertion order
    pub sort_by: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn sorted_by(field: impl Into<String>) -> Self {
        Self {
            sort_by: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn page(mut self, skip: u64, limit: u64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// Single-operation access to document collections.
///
/// Every handler issues exactly one of these calls per request. Returned
/// documents always carry their identifier under `_id`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, DatabaseError>;

    async fn find_one(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, DatabaseError>;

    async fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertOneResult, DatabaseError>;

    /// Merge `set` into the document's top-level fields
    async fn update_one(&self, collection: Collection, id: Uuid, set: Document) -> Result<UpdateResult, DatabaseError>;

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Rank of a JSON value's type in sort order: missing and null first, then
/// numbers, strings, objects, arrays, booleans.
pub fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Ascending comparison of a single field across two documents
pub fn compare_field(a: &Document, b: &Document, field: &str) -> Ordering {
    let (va, vb) = (a.get(field), b.get(field));
    type_rank(va).cmp(&type_rank(vb)).then_with(|| match (va, vb) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    })
}
