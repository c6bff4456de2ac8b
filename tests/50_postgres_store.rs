// Runs against a live Postgres when DATABASE_URL is set; otherwise each test
// returns early. Documents are tagged with a per-test `run` value so tests can
// share the collection tables.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use uuid::Uuid;

use marvel_toyverse::config::AppConfig;
use marvel_toyverse::database::{manager, Collection, Document, DocumentStore, Filter, FindOptions, PgDocumentStore};

async fn store() -> Result<Option<PgDocumentStore>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.database.url = Some(url);
    let pool = manager::connect(&config).await?;
    manager::ensure_collections(&pool).await?;
    Ok(Some(PgDocumentStore::new(pool)))
}

fn doc(v: Value) -> Document {
    v.as_object().cloned().unwrap_or_default()
}

async fn insert(store: &PgDocumentStore, v: Value) -> Result<Uuid> {
    let result = store.insert_one(Collection::Toys, doc(v)).await?;
    let id = result.inserted_id.context("no insertedId")?;
    Ok(id.parse()?)
}

fn prices(docs: &[Document]) -> Vec<Value> {
    docs.iter().map(|d| d.get("price").cloned().unwrap_or(Value::Null)).collect()
}

#[tokio::test]
async fn sorts_mixed_price_types_by_rank() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let run = Uuid::new_v4().to_string();

    for price in [json!(true), json!("5"), json!(10), json!([1]), json!({"a": 1}), json!(2.5)] {
        insert(&store, json!({ "run": run, "price": price })).await?;
    }
    insert(&store, json!({ "run": run, "name": "no price" })).await?;

    let docs = store
        .find(Collection::Toys, Filter::equals("run", json!(run)), FindOptions::sorted_by("price"))
        .await?;
    assert_eq!(
        prices(&docs),
        vec![Value::Null, json!(2.5), json!(10), json!("5"), json!({"a": 1}), json!([1]), json!(true)]
    );
    Ok(())
}

#[tokio::test]
async fn pages_with_limit_and_offset() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let run = Uuid::new_v4().to_string();
    let filter = || Filter::equals("run", json!(run));

    for price in (0..5).rev() {
        insert(&store, json!({ "run": run, "price": price })).await?;
    }

    let all = store.find(Collection::Toys, filter(), FindOptions::sorted_by("price")).await?;
    assert_eq!(prices(&all), vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);

    let page = store
        .find(Collection::Toys, filter(), FindOptions::sorted_by("price").page(2, 2))
        .await?;
    assert_eq!(prices(&page), vec![json!(2), json!(3)]);

    let past_end = store
        .find(Collection::Toys, filter(), FindOptions::sorted_by("price").page(u64::MAX, u64::MAX))
        .await?;
    assert!(past_end.is_empty());
    Ok(())
}

#[tokio::test]
async fn find_one_exposes_generated_id() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let run = Uuid::new_v4().to_string();

    let id = insert(&store, json!({ "run": run, "_id": "client-chosen", "name": "Vision" })).await?;

    let found = store.find_one(Collection::Toys, id).await?.context("toy not found")?;
    assert_eq!(found["_id"], json!(id.to_string()));
    assert_eq!(found["name"], json!("Vision"));

    assert!(store.find_one(Collection::Toys, Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn unchanged_update_is_matched_not_modified() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let run = Uuid::new_v4().to_string();
    let id = insert(&store, json!({ "run": run, "price": 1, "quantity": 1, "description": "old" })).await?;
    let set = doc(json!({ "price": 9.5, "quantity": 3, "description": "x" }));

    let first = store.update_one(Collection::Toys, id, set.clone()).await?;
    assert_eq!((first.matched_count, first.modified_count), (1, 1));

    let second = store.update_one(Collection::Toys, id, set.clone()).await?;
    assert_eq!((second.matched_count, second.modified_count), (1, 0));

    let missing = store.update_one(Collection::Toys, Uuid::new_v4(), set).await?;
    assert_eq!((missing.matched_count, missing.modified_count), (0, 0));

    let toy = store.find_one(Collection::Toys, id).await?.context("toy not found")?;
    assert_eq!(toy["price"], json!(9.5));
    assert_eq!(toy["quantity"], json!(3));
    assert_eq!(toy["run"], json!(run));
    Ok(())
}

#[tokio::test]
async fn delete_removes_once() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let id = insert(&store, json!({ "run": Uuid::new_v4().to_string() })).await?;

    assert_eq!(store.delete_one(Collection::Toys, id).await?.deleted_count, 1);
    assert_eq!(store.delete_one(Collection::Toys, id).await?.deleted_count, 0);
    assert!(store.find_one(Collection::Toys, id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn null_filter_matches_missing_and_null() -> Result<()> {
    let Some(store) = store().await? else { return Ok(()) };
    let run = Uuid::new_v4().to_string();

    insert(&store, json!({ "run": run, "sellerEmail": "a@b.com", "price": 3 })).await?;
    insert(&store, json!({ "run": run, "price": 2 })).await?;
    insert(&store, json!({ "run": run, "sellerEmail": null, "price": 1 })).await?;

    let mut filter = Filter::equals("run", json!(run));
    filter.0.insert("sellerEmail".into(), Value::Null);
    let docs = store.find(Collection::Toys, filter, FindOptions::sorted_by("price")).await?;
    assert_eq!(prices(&docs), vec![json!(1), json!(2)]);

    let owned = store
        .find(
            Collection::Toys,
            Filter::equals("sellerEmail", json!("a@b.com")),
            FindOptions::default(),
        )
        .await?;
    assert!(owned.iter().any(|d| d["run"] == json!(run)));
    Ok(())
}
