use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Garden {
    pub id: Option<i64>,
    pub name: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Garden {
    pub fn new(name: &str, owner_id: i64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            owner_id,
            created_at: Utc::now(),
        }
    }
}
