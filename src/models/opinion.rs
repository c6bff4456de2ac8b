use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::Document;

/// Body of `POST /opinion`
#[derive(Debug, Clone, Deserialize)]
pub struct NewOpinion {
    pub name: String,
    pub email: String,
    pub photo: String,
    pub opinion: String,
}

/// Stored opinion document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub username: String,
    pub email: String,
    pub photo: String,
    pub opinion: String,
}

impl From<NewOpinion> for Opinion {
    fn from(input: NewOpinion) -> Self {
        Self {
            username: input.name,
            email: input.email,
            photo: input.photo,
            opinion: input.opinion,
        }
    }
}

impl From<Opinion> for Document {
    fn from(opinion: Opinion) -> Self {
        let mut doc = Document::new();
        doc.insert("username".into(), Value::String(opinion.username));
        doc.insert("email".into(), Value::String(opinion.email));
        doc.insert("photo".into(), Value::String(opinion.photo));
        doc.insert("opinion".into(), Value::String(opinion.opinion));
        doc
    }
}
