use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn default_garden_name(&self) -> String {
        format!("{}'s Garden", self.first_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_parts() {
        let user = User::new("Uncle", "Tony", "uncletony@example.com");
        assert_eq!(user.full_name(), "Uncle Tony");
    }

    #[test]
    fn default_garden_name_uses_first_name() {
        let user = User::new("Ada", "Lovelace", "ada@example.com");
        assert_eq!(user.default_garden_name(), "Ada's Garden");
    }
}
