use serde::Deserialize;
use serde_json::{Map, Value};

use super::coerce::{self, FieldErrors};
use crate::database::Document;
use crate::error::ApiError;

/// Field toys are listed by
pub const PRICE_FIELD: &str = "price";
/// Field "my toys" are scoped by
pub const SELLER_EMAIL_FIELD: &str = "sellerEmail";
const QUANTITY_FIELD: &str = "quantity";
const DESCRIPTION_FIELD: &str = "description";

/// Body of `POST /addtoy`.
///
/// Price and quantity are stored as numbers so listings sort numerically;
/// everything else the client sends is stored as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewToy {
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewToy {
    pub fn into_document(self) -> Result<Document, ApiError> {
        let mut errors = FieldErrors::default();
        let price = self
            .price
            .and_then(|v| errors.check(PRICE_FIELD, coerce::to_f64(&v)));
        let quantity = self
            .quantity
            .and_then(|v| errors.check(QUANTITY_FIELD, coerce::to_i64(&v)));
        errors.into_result()?;

        let mut doc = self.extra;
        if let Some(price) = price {
            doc.insert(PRICE_FIELD.into(), Value::from(price));
        }
        if let Some(quantity) = quantity {
            doc.insert(QUANTITY_FIELD.into(), Value::from(quantity));
        }
        Ok(doc)
    }
}

/// Body of `PATCH /toy/:id`: exactly these three fields are overwritten
#[derive(Debug, Clone, Deserialize)]
pub struct ToyUpdate {
    pub price: Value,
    pub quantity: Value,
    pub description: String,
}

impl ToyUpdate {
    pub fn into_set(self) -> Result<Document, ApiError> {
        let mut errors = FieldErrors::default();
        let price = errors.check(PRICE_FIELD, coerce::to_f64(&self.price));
        let quantity = errors.check(QUANTITY_FIELD, coerce::to_i64(&self.quantity));
        errors.into_result()?;

        let mut set = Document::new();
        set.insert(PRICE_FIELD.into(), Value::from(price.unwrap_or_default()));
        set.insert(QUANTITY_FIELD.into(), Value::from(quantity.unwrap_or_default()));
        set.insert(DESCRIPTION_FIELD.into(), Value::String(self.description));
        Ok(set)
    }
}
