use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::{
    compare_field, Collection, DeleteResult, Document, DocumentStore, Filter, FindOptions, InsertOneResult,
    UpdateResult, ID_FIELD,
};

/// In-process document store. Collections are insertion-ordered vectors,
/// so unsorted finds come back in the order documents were added.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<(Uuid, Document)>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn with_id(id: &Uuid, doc: &Document) -> Document {
    let mut out = doc.clone();
    out.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    out
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        filter: Filter,
        options: FindOptions,
    ) -> Result<Vec<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|(_, doc)| filter.matches(doc))
                    .map(|(id, doc)| with_id(id, doc))
                    .collect()
            })
            .unwrap_or_default();

        // Stable sort keeps insertion order among equal keys
        if let Some(field) = &options.sort_by {
            docs.sort_by(|a, b| compare_field(a, b, field));
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(docs.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, DatabaseError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|rows| rows.iter().find(|(row_id, _)| *row_id == id))
            .map(|(row_id, doc)| with_id(row_id, doc)))
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOneResult, DatabaseError> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push((id, doc));

        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: Some(id.to_string()),
        })
    }

    async fn update_one(&self, collection: Collection, id: Uuid, mut set: Document) -> Result<UpdateResult, DatabaseError> {
        set.remove(ID_FIELD);
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|(row_id, _)| *row_id == id))
            .map(|(_, doc)| doc)
        else {
            return Ok(UpdateResult { acknowledged: true, matched_count: 0, modified_count: 0 });
        };

        let mut changed = false;
        for (field, value) in set {
            if doc.get(&field) != Some(&value) {
                doc.insert(field, value);
                changed = true;
            }
        }

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(changed),
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> Result<DeleteResult, DatabaseError> {
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(rows) => match rows.iter().position(|(row_id, _)| *row_id == id) {
                Some(index) => {
                    rows.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult { acknowledged: true, deleted_count })
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
