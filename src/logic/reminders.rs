use crate::db::Database;
use crate::error::Result;
use crate::logic::CareScheduler;
use crate::models::{Plant, User};
use chrono::{DateTime, Utc};
use tracing::debug;

/// One user's reminder: the active plants of theirs that are due for care.
#[derive(Debug, Clone)]
pub struct ReminderDigest {
    pub user: User,
    pub due_plants: Vec<Plant>,
}

impl ReminderDigest {
    /// Plain-text rendering of the reminder. Delivery (mail, push) is the
    /// caller's concern; this only produces the content.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Hi {},", self.user.first_name),
            String::new(),
            "Give your plants some love! These are due for a check-in:".to_string(),
        ];
        for plant in &self.due_plants {
            lines.push(format!(
                "  - {} (every {})",
                plant.name,
                plant.frequency_label()
            ));
        }
        lines.join("\n")
    }
}

/// Builds reminder digests by sweeping all users for due plants. Pure,
/// repeatable read; safe to run on any schedule.
pub struct ReminderService {
    db: Database,
    scheduler: CareScheduler,
}

impl ReminderService {
    pub fn new(db: Database) -> Self {
        let scheduler = CareScheduler::new(db.clone());
        Self { db, scheduler }
    }

    pub fn digests(&self) -> Result<Vec<ReminderDigest>> {
        self.digests_at(Utc::now())
    }

    pub fn digests_at(&self, now: DateTime<Utc>) -> Result<Vec<ReminderDigest>> {
        let users = self.db.all_users()?;
        let mut digests = Vec::new();

        for user in users {
            let Some(user_id) = user.id else { continue };
            let plants = self.db.active_plants_for_user(user_id)?;
            let due_plants = self.scheduler.plants_needing_care_at(&plants, now)?;
            if due_plants.is_empty() {
                debug!(user = %user.email, "No plants due, skipping reminder");
                continue;
            }
            digests.push(ReminderDigest { user, due_plants });
        }

        Ok(digests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckIn, FrequencyUnit, Garden};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap()
    }

    fn seed_user_with_plant(
        db: &Database,
        email: &str,
        last_check_in: Option<DateTime<Utc>>,
    ) -> i64 {
        let user_id = db.create_user(&User::new("Plant", "Person", email)).unwrap();
        let garden_id = db
            .create_garden(&Garden::new("A Garden", user_id))
            .unwrap();
        let plant_id = db
            .create_plant(
                &Plant::new(garden_id, user_id, "Ficus").with_frequency(1, FrequencyUnit::Week),
            )
            .unwrap();
        if let Some(ts) = last_check_in {
            db.create_check_in(&CheckIn::new(plant_id).watered().at(ts))
                .unwrap();
        }
        user_id
    }

    #[test]
    fn digests_only_cover_users_with_due_plants() {
        let db = Database::open_in_memory().unwrap();
        seed_user_with_plant(&db, "diligent@example.com", Some(now() - Duration::days(2)));
        seed_user_with_plant(&db, "overdue@example.com", Some(now() - Duration::days(9)));

        let service = ReminderService::new(db);
        let digests = service.digests_at(now()).unwrap();

        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].user.email, "overdue@example.com");
        assert_eq!(digests[0].due_plants.len(), 1);
        assert_eq!(digests[0].due_plants[0].name, "Ficus");
    }

    #[test]
    fn never_checked_plants_trigger_a_reminder() {
        let db = Database::open_in_memory().unwrap();
        seed_user_with_plant(&db, "new@example.com", None);

        let service = ReminderService::new(db);
        let digests = service.digests_at(now()).unwrap();

        assert_eq!(digests.len(), 1);
    }

    #[test]
    fn render_names_the_due_plants() {
        let db = Database::open_in_memory().unwrap();
        seed_user_with_plant(&db, "overdue@example.com", Some(now() - Duration::days(9)));

        let service = ReminderService::new(db);
        let digests = service.digests_at(now()).unwrap();
        let text = digests[0].render();

        assert!(text.contains("Give your plants some love!"));
        assert!(text.contains("Ficus"));
        assert!(text.contains("every 1 week"));
    }
}
