use crate::db::Database;
use crate::error::{PlantifulError, Result};
use crate::models::{CareFilter, CheckIn, FrequencyUnit, Garden, Plant, User};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Row};

/// A malformed stored timestamp is a data error the caller must see. For
/// check-in rows especially, a fallback like "now" would reset the care
/// clock and silently mark an overdue plant as cared for.
fn parse_timestamp(value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("invalid timestamp '{}': {}", value, e).into(),
            )
        })
}

/// Fixed-precision RFC 3339 so that lexicographic ordering in SQL matches
/// chronological ordering.
fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// User Queries

impl Database {
    pub fn create_user(&self, user: &User) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO users (first_name, last_name, email, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    user.first_name,
                    user.last_name,
                    user.email,
                    encode_timestamp(user.created_at),
                    encode_timestamp(user.updated_at),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user(&self, id: i64) -> Result<User> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM users WHERE id = ?1", [id], row_to_user)
                .optional()?
                .ok_or_else(|| PlantifulError::NotFound(format!("user {}", id)))
        })
    }

    pub fn get_default_user(&self) -> Result<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM users ORDER BY id LIMIT 1", [], row_to_user)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn all_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id")?;
            let mut users = Vec::new();
            let rows = stmt.query_map([], row_to_user)?;
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
    }

    pub fn update_user(&self, user: &User) -> Result<()> {
        let id = user
            .id
            .ok_or_else(|| PlantifulError::InvalidData("User has no ID".into()))?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE users SET
                    first_name = ?1, last_name = ?2, email = ?3, updated_at = ?4
                WHERE id = ?5
                "#,
                params![
                    user.first_name,
                    user.last_name,
                    user.email,
                    encode_timestamp(Utc::now()),
                    id,
                ],
            )?;
            Ok(())
        })
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    Ok(User {
        id: Some(row.get("id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

// Garden Queries

impl Database {
    /// Creates the garden and enrolls the owner as its first member.
    pub fn create_garden(&self, garden: &Garden) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gardens (name, owner_id, created_at) VALUES (?1, ?2, ?3)",
                params![
                    garden.name,
                    garden.owner_id,
                    encode_timestamp(garden.created_at)
                ],
            )?;
            let id = conn.last_insert_rowid();
            conn.execute(
                "INSERT OR IGNORE INTO garden_members (garden_id, user_id) VALUES (?1, ?2)",
                params![id, garden.owner_id],
            )?;
            Ok(id)
        })
    }

    pub fn get_garden(&self, id: i64) -> Result<Garden> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM gardens WHERE id = ?1", [id], row_to_garden)
                .optional()?
                .ok_or_else(|| PlantifulError::NotFound(format!("garden {}", id)))
        })
    }

    pub fn get_default_garden(&self) -> Result<Option<Garden>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM gardens ORDER BY id LIMIT 1",
                [],
                row_to_garden,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn rename_garden(&self, id: i64, name: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE gardens SET name = ?1 WHERE id = ?2", params![name, id])?;
            Ok(())
        })
    }

    pub fn add_garden_member(&self, garden_id: i64, user_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO garden_members (garden_id, user_id) VALUES (?1, ?2)",
                params![garden_id, user_id],
            )?;
            Ok(())
        })
    }

    pub fn gardens_for_user(&self, user_id: i64) -> Result<Vec<Garden>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT g.* FROM gardens g
                JOIN garden_members gm ON gm.garden_id = g.id
                WHERE gm.user_id = ?1
                ORDER BY g.id
                "#,
            )?;
            let mut gardens = Vec::new();
            let rows = stmt.query_map([user_id], row_to_garden)?;
            for row in rows {
                gardens.push(row?);
            }
            Ok(gardens)
        })
    }
}

fn row_to_garden(row: &Row) -> rusqlite::Result<Garden> {
    let created_at_str: String = row.get("created_at")?;

    Ok(Garden {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        owner_id: row.get("owner_id")?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

// Plant Queries

impl Database {
    pub fn create_plant(&self, plant: &Plant) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO plants
                    (garden_id, added_by, name, botanical_name,
                     check_frequency_scalar, check_frequency_unit,
                     deleted_at, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    plant.garden_id,
                    plant.added_by,
                    plant.name,
                    plant.botanical_name,
                    plant.check_frequency_scalar,
                    plant.check_frequency_unit.as_str(),
                    plant.deleted_at.map(encode_timestamp),
                    encode_timestamp(plant.created_at),
                    encode_timestamp(plant.updated_at),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_plant(&self, id: i64) -> Result<Plant> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM plants WHERE id = ?1", [id], row_to_plant)
                .optional()?
                .ok_or_else(|| PlantifulError::NotFound(format!("plant {}", id)))
        })
    }

    pub fn update_plant(&self, plant: &Plant) -> Result<()> {
        let id = plant
            .id
            .ok_or_else(|| PlantifulError::InvalidData("Plant has no ID".into()))?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                UPDATE plants SET
                    name = ?1, botanical_name = ?2,
                    check_frequency_scalar = ?3, check_frequency_unit = ?4,
                    updated_at = ?5
                WHERE id = ?6
                "#,
                params![
                    plant.name,
                    plant.botanical_name,
                    plant.check_frequency_scalar,
                    plant.check_frequency_unit.as_str(),
                    encode_timestamp(Utc::now()),
                    id,
                ],
            )?;
            Ok(())
        })
    }

    /// Soft delete: the plant drops out of the active scopes but its
    /// check-in history stays intact.
    pub fn soft_delete_plant(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE plants SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2",
                params![encode_timestamp(Utc::now()), id],
            )?;
            Ok(())
        })
    }

    pub fn active_plants_in_garden(&self, garden_id: i64) -> Result<Vec<Plant>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM plants WHERE garden_id = ?1 AND deleted_at IS NULL ORDER BY name",
            )?;
            let mut plants = Vec::new();
            let rows = stmt.query_map([garden_id], row_to_plant)?;
            for row in rows {
                plants.push(row?);
            }
            Ok(plants)
        })
    }

    /// Every plant in the garden, soft-deleted included. Used where history
    /// rows must still resolve to a plant name.
    pub fn plants_in_garden(&self, garden_id: i64) -> Result<Vec<Plant>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM plants WHERE garden_id = ?1 ORDER BY name")?;
            let mut plants = Vec::new();
            let rows = stmt.query_map([garden_id], row_to_plant)?;
            for row in rows {
                plants.push(row?);
            }
            Ok(plants)
        })
    }

    pub fn all_active_plants(&self) -> Result<Vec<Plant>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM plants WHERE deleted_at IS NULL ORDER BY id")?;
            let mut plants = Vec::new();
            let rows = stmt.query_map([], row_to_plant)?;
            for row in rows {
                plants.push(row?);
            }
            Ok(plants)
        })
    }

    /// Active plants visible to a user through garden membership.
    pub fn active_plants_for_user(&self, user_id: i64) -> Result<Vec<Plant>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT p.* FROM plants p
                JOIN garden_members gm ON gm.garden_id = p.garden_id
                WHERE gm.user_id = ?1 AND p.deleted_at IS NULL
                ORDER BY p.id
                "#,
            )?;
            let mut plants = Vec::new();
            let rows = stmt.query_map([user_id], row_to_plant)?;
            for row in rows {
                plants.push(row?);
            }
            Ok(plants)
        })
    }
}

fn row_to_plant(row: &Row) -> rusqlite::Result<Plant> {
    let unit_str: String = row.get("check_frequency_unit")?;
    let deleted_at_str: Option<String> = row.get("deleted_at")?;
    let created_at_str: String = row.get("created_at")?;
    let updated_at_str: String = row.get("updated_at")?;

    // An unknown unit is a configuration error the caller must see, never
    // something to silently default.
    let check_frequency_unit = FrequencyUnit::from_str(&unit_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown check_frequency_unit '{}'", unit_str).into(),
        )
    })?;

    Ok(Plant {
        id: Some(row.get("id")?),
        garden_id: row.get("garden_id")?,
        added_by: row.get("added_by")?,
        name: row.get("name")?,
        botanical_name: row.get("botanical_name")?,
        check_frequency_scalar: row.get("check_frequency_scalar")?,
        check_frequency_unit,
        deleted_at: deleted_at_str.as_deref().map(parse_timestamp).transpose()?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

// Check-In Queries

impl Database {
    pub fn create_check_in(&self, check_in: &CheckIn) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO check_ins (plant_id, notes, watered, fertilized, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    check_in.plant_id,
                    check_in.notes,
                    check_in.watered,
                    check_in.fertilized,
                    encode_timestamp(check_in.created_at),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Most recent event matching the filter, or None if the plant has no
    /// qualifying history. Ties on created_at break toward the highest id,
    /// i.e. the most recently inserted row.
    pub fn latest_check_in(&self, plant_id: i64, filter: CareFilter) -> Result<Option<CheckIn>> {
        let sql = format!(
            "SELECT * FROM check_ins WHERE plant_id = ?1 {} \
             ORDER BY created_at DESC, id DESC LIMIT 1",
            filter.sql_clause()
        );
        self.with_conn(|conn| {
            conn.query_row(&sql, [plant_id], row_to_check_in)
                .optional()
                .map_err(Into::into)
        })
    }

    pub fn check_ins_for_plant(&self, plant_id: i64) -> Result<Vec<CheckIn>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM check_ins WHERE plant_id = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let mut check_ins = Vec::new();
            let rows = stmt.query_map([plant_id], row_to_check_in)?;
            for row in rows {
                check_ins.push(row?);
            }
            Ok(check_ins)
        })
    }

    pub fn check_ins_for_garden(&self, garden_id: i64, limit: u32) -> Result<Vec<CheckIn>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT c.* FROM check_ins c
                JOIN plants p ON p.id = c.plant_id
                WHERE p.garden_id = ?1
                ORDER BY c.created_at DESC, c.id DESC
                LIMIT ?2
                "#,
            )?;
            let mut check_ins = Vec::new();
            let rows = stmt.query_map(params![garden_id, limit], row_to_check_in)?;
            for row in rows {
                check_ins.push(row?);
            }
            Ok(check_ins)
        })
    }
}

fn row_to_check_in(row: &Row) -> rusqlite::Result<CheckIn> {
    let created_at_str: String = row.get("created_at")?;

    Ok(CheckIn {
        id: Some(row.get("id")?),
        plant_id: row.get("plant_id")?,
        notes: row.get("notes")?,
        watered: row.get("watered")?,
        fertilized: row.get("fertilized")?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn seed_garden(db: &Database) -> (i64, i64) {
        let user_id = db
            .create_user(&User::new("Uncle", "Tony", "uncletony@example.com"))
            .unwrap();
        let garden_id = db.create_garden(&Garden::new("Back Porch", user_id)).unwrap();
        (user_id, garden_id)
    }

    #[test]
    fn create_garden_enrolls_owner_as_member() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);

        let gardens = db.gardens_for_user(user_id).unwrap();
        assert_eq!(gardens.len(), 1);
        assert_eq!(gardens[0].id, Some(garden_id));
    }

    #[test]
    fn plant_round_trips_through_store() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);

        let plant = Plant::new(garden_id, user_id, "Monstera")
            .with_botanical_name("Monstera deliciosa")
            .with_frequency(1, FrequencyUnit::Week);
        let id = db.create_plant(&plant).unwrap();

        let loaded = db.get_plant(id).unwrap();
        assert_eq!(loaded.name, "Monstera");
        assert_eq!(loaded.botanical_name, Some("Monstera deliciosa".into()));
        assert_eq!(loaded.check_frequency_scalar, 1);
        assert_eq!(loaded.check_frequency_unit, FrequencyUnit::Week);
        assert!(loaded.is_active());
    }

    #[test]
    fn soft_deleted_plants_leave_active_scopes_but_keep_history() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);

        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Fern"))
            .unwrap();
        db.create_check_in(&CheckIn::new(plant_id).watered()).unwrap();

        db.soft_delete_plant(plant_id).unwrap();

        assert!(db.active_plants_in_garden(garden_id).unwrap().is_empty());
        assert!(db.active_plants_for_user(user_id).unwrap().is_empty());
        // History survives deactivation
        assert_eq!(db.check_ins_for_plant(plant_id).unwrap().len(), 1);
        assert!(!db.get_plant(plant_id).unwrap().is_active());
    }

    #[test]
    fn latest_check_in_picks_most_recent_per_filter() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);
        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Pothos"))
            .unwrap();

        let t0 = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        db.create_check_in(&CheckIn::new(plant_id).watered().at(t0))
            .unwrap();
        db.create_check_in(&CheckIn::new(plant_id).at(t0 + Duration::days(2)))
            .unwrap();
        db.create_check_in(&CheckIn::new(plant_id).fertilized().at(t0 + Duration::days(1)))
            .unwrap();

        let any = db.latest_check_in(plant_id, CareFilter::Any).unwrap().unwrap();
        assert_eq!(any.created_at, t0 + Duration::days(2));
        assert!(any.is_bare_check());

        let watered = db
            .latest_check_in(plant_id, CareFilter::Watered)
            .unwrap()
            .unwrap();
        assert_eq!(watered.created_at, t0);

        let fertilized = db
            .latest_check_in(plant_id, CareFilter::Fertilized)
            .unwrap()
            .unwrap();
        assert_eq!(fertilized.created_at, t0 + Duration::days(1));

        assert!(db
            .latest_check_in(plant_id, CareFilter::CheckOnly)
            .unwrap()
            .unwrap()
            .is_bare_check());
    }

    #[test]
    fn latest_check_in_breaks_timestamp_ties_by_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);
        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Cactus"))
            .unwrap();

        let t = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        db.create_check_in(&CheckIn::new(plant_id).watered().at(t))
            .unwrap();
        let second = db
            .create_check_in(&CheckIn::new(plant_id).fertilized().at(t))
            .unwrap();

        let latest = db.latest_check_in(plant_id, CareFilter::Any).unwrap().unwrap();
        assert_eq!(latest.id, Some(second));
        assert!(latest.fertilized);
    }

    #[test]
    fn latest_check_in_none_for_unlogged_plant() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);
        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Aloe"))
            .unwrap();

        assert!(db.latest_check_in(plant_id, CareFilter::Any).unwrap().is_none());
    }

    #[test]
    fn unknown_frequency_unit_surfaces_as_error() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);

        db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO plants
                    (garden_id, added_by, name, check_frequency_scalar,
                     check_frequency_unit, created_at, updated_at)
                VALUES (?1, ?2, 'Bonsai', 2, 'fortnight', ?3, ?3)
                "#,
                params![garden_id, user_id, encode_timestamp(Utc::now())],
            )?;
            Ok(())
        })
        .unwrap();

        let result = db.all_active_plants();
        assert!(result.is_err());
    }

    #[test]
    fn corrupt_check_in_timestamp_surfaces_as_error() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);
        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Orchid"))
            .unwrap();

        db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO check_ins (plant_id, watered, fertilized, created_at)
                VALUES (?1, 1, 0, 'not-a-timestamp')
                "#,
                [plant_id],
            )?;
            Ok(())
        })
        .unwrap();

        // A fallback here would reset the care clock to "just now".
        assert!(db.latest_check_in(plant_id, CareFilter::Any).is_err());
        assert!(db.check_ins_for_plant(plant_id).is_err());
    }

    #[test]
    fn corrupt_user_timestamp_surfaces_as_error() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO users (first_name, last_name, email, created_at, updated_at)
                VALUES ('Bad', 'Row', 'bad@example.com', 'yesterday', 'yesterday')
                "#,
                [],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.all_users().is_err());
    }

    #[test]
    fn check_ins_for_garden_spans_plants_most_recent_first() {
        let db = Database::open_in_memory().unwrap();
        let (user_id, garden_id) = seed_garden(&db);
        let first = db
            .create_plant(&Plant::new(garden_id, user_id, "Ivy"))
            .unwrap();
        let second = db
            .create_plant(&Plant::new(garden_id, user_id, "Palm"))
            .unwrap();

        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        db.create_check_in(&CheckIn::new(first).watered().at(t0)).unwrap();
        db.create_check_in(&CheckIn::new(second).at(t0 + Duration::hours(1)))
            .unwrap();

        let recent = db.check_ins_for_garden(garden_id, 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].plant_id, second);
        assert_eq!(recent[1].plant_id, first);
    }
}
