//! JSON shaping for `plantiful export`: the same response shapes the API
//! serializers produce, written to a stream instead of an HTTP body.

use crate::db::Database;
use crate::error::Result;
use crate::logic::CareScheduler;
use crate::models::{CareFilter, CheckIn, Garden, Plant, User};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlantExport {
    pub id: i64,
    pub name: String,
    pub botanical_name: Option<String>,
    pub check_frequency_scalar: i64,
    pub check_frequency_unit: String,
    /// Unix seconds of the most recent watering, if any.
    pub last_watered_at: Option<i64>,
    pub next_check_date: String,
    pub needs_care: bool,
    pub check_ins: Vec<CheckInExport>,
}

#[derive(Debug, Serialize)]
pub struct CheckInExport {
    pub id: i64,
    pub plant_id: i64,
    pub created_at: i64,
    pub watered: bool,
    pub fertilized: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GardenExport {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub plants: Vec<PlantExport>,
}

#[derive(Debug, Serialize)]
pub struct UserExport {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub gardens: Vec<GardenExport>,
}

impl CheckInExport {
    fn from_check_in(check_in: &CheckIn) -> Self {
        Self {
            id: check_in.id.unwrap_or_default(),
            plant_id: check_in.plant_id,
            created_at: check_in.created_at.timestamp(),
            watered: check_in.watered,
            fertilized: check_in.fertilized,
            notes: check_in.notes.clone(),
        }
    }
}

pub fn export_plant(db: &Database, scheduler: &CareScheduler, plant: &Plant) -> Result<PlantExport> {
    let plant_id = plant.id.unwrap_or_default();
    let last_watering = db.latest_check_in(plant_id, CareFilter::Watered)?;
    let check_ins = db
        .check_ins_for_plant(plant_id)?
        .iter()
        .map(CheckInExport::from_check_in)
        .collect();

    Ok(PlantExport {
        id: plant_id,
        name: plant.name.clone(),
        botanical_name: plant.botanical_name.clone(),
        check_frequency_scalar: plant.check_frequency_scalar,
        check_frequency_unit: plant.check_frequency_unit.as_str().to_string(),
        last_watered_at: last_watering.map(|w| w.created_at.timestamp()),
        next_check_date: scheduler.next_check_date(plant)?,
        needs_care: scheduler.needs_care(plant)?,
        check_ins,
    })
}

/// A garden serializes with its active plants only; soft-deleted plants are
/// invisible here even though their history remains stored.
pub fn export_garden(
    db: &Database,
    scheduler: &CareScheduler,
    garden: &Garden,
) -> Result<GardenExport> {
    let garden_id = garden.id.unwrap_or_default();
    let mut plants = Vec::new();
    for plant in db.active_plants_in_garden(garden_id)? {
        plants.push(export_plant(db, scheduler, &plant)?);
    }

    Ok(GardenExport {
        id: garden_id,
        name: garden.name.clone(),
        owner_id: garden.owner_id,
        plants,
    })
}

pub fn export_user(db: &Database, scheduler: &CareScheduler, user: &User) -> Result<UserExport> {
    let user_id = user.id.unwrap_or_default();
    let mut gardens = Vec::new();
    for garden in db.gardens_for_user(user_id)? {
        gardens.push(export_garden(db, scheduler, &garden)?);
    }

    Ok(UserExport {
        id: user_id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.full_name(),
        email: user.email.clone(),
        gardens,
    })
}

pub fn write_json<W: std::io::Write, T: Serialize>(writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrequencyUnit;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn garden_export_shapes_active_plants_with_care_status() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db
            .create_user(&User::new("Uncle", "Tony", "uncletony@example.com"))
            .unwrap();
        let garden_id = db.create_garden(&Garden::new("Back Porch", user_id)).unwrap();

        let plant_id = db
            .create_plant(
                &Plant::new(garden_id, user_id, "Monstera")
                    .with_frequency(1, FrequencyUnit::Week),
            )
            .unwrap();
        let watered_at = Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap();
        db.create_check_in(
            &CheckIn::new(plant_id)
                .watered()
                .with_notes("looking healthy")
                .at(watered_at),
        )
        .unwrap();

        let hidden = db
            .create_plant(&Plant::new(garden_id, user_id, "Gone"))
            .unwrap();
        db.soft_delete_plant(hidden).unwrap();

        let scheduler = CareScheduler::new(db.clone());
        let garden = db.get_garden(garden_id).unwrap();
        let export = export_garden(&db, &scheduler, &garden).unwrap();

        assert_eq!(export.name, "Back Porch");
        assert_eq!(export.plants.len(), 1);

        let plant = &export.plants[0];
        assert_eq!(plant.name, "Monstera");
        assert_eq!(plant.check_frequency_unit, "week");
        assert_eq!(plant.last_watered_at, Some(watered_at.timestamp()));
        assert_eq!(plant.check_ins.len(), 1);
        assert_eq!(plant.check_ins[0].notes.as_deref(), Some("looking healthy"));
    }

    #[test]
    fn user_export_includes_member_gardens() {
        let db = Database::open_in_memory().unwrap();
        let owner = db
            .create_user(&User::new("Ada", "Lovelace", "ada@example.com"))
            .unwrap();
        let friend = db
            .create_user(&User::new("Grace", "Hopper", "grace@example.com"))
            .unwrap();
        let garden_id = db.create_garden(&Garden::new("Shared Plot", owner)).unwrap();
        db.add_garden_member(garden_id, friend).unwrap();

        let scheduler = CareScheduler::new(db.clone());
        let user = db.get_user(friend).unwrap();
        let export = export_user(&db, &scheduler, &user).unwrap();

        assert_eq!(export.full_name, "Grace Hopper");
        assert_eq!(export.gardens.len(), 1);
        assert_eq!(export.gardens[0].name, "Shared Plot");
    }

    #[test]
    fn export_serializes_to_json() {
        let db = Database::open_in_memory().unwrap();
        let user_id = db
            .create_user(&User::new("Uncle", "Tony", "uncletony@example.com"))
            .unwrap();
        let garden_id = db.create_garden(&Garden::new("Porch", user_id)).unwrap();
        let plant_id = db
            .create_plant(&Plant::new(garden_id, user_id, "Aloe"))
            .unwrap();
        db.create_check_in(&CheckIn::new(plant_id).watered().at(Utc::now() - Duration::days(1)))
            .unwrap();

        let scheduler = CareScheduler::new(db.clone());
        let garden = db.get_garden(garden_id).unwrap();
        let export = export_garden(&db, &scheduler, &garden).unwrap();

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["plants"][0]["name"], "Aloe");
        assert!(json["plants"][0]["last_watered_at"].is_i64());
        assert!(json["plants"][0]["next_check_date"].is_string());
    }
}
