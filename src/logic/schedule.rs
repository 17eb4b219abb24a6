//! Care scheduling: when is a plant next due, and which plants are due now.
//!
//! The rule is the same everywhere: a plant is due once its single most
//! recent check-in (of any kind) plus its configured check frequency is at
//! or before the current time. A plant with no history uses the Unix epoch
//! as the sentinel "never cared for" timestamp, which makes it due
//! immediately. Comparisons are at full timestamp granularity.

use crate::db::Database;
use crate::error::{PlantifulError, Result};
use crate::models::{CareFilter, CheckIn, Plant, User};
use chrono::{DateTime, Duration, Utc};

fn invalid_frequency(plant: &Plant) -> PlantifulError {
    PlantifulError::InvalidFrequency {
        scalar: plant.check_frequency_scalar,
        unit: plant.check_frequency_unit.as_str().to_string(),
    }
}

/// Resolve the configured scalar + unit into an absolute duration. Scalars
/// that are non-positive, or so large the interval does not fit in a
/// duration, are rejected rather than wrapped.
pub fn check_frequency(plant: &Plant) -> Result<Duration> {
    if plant.check_frequency_scalar < 1 {
        return Err(invalid_frequency(plant));
    }
    plant
        .check_frequency_scalar
        .checked_mul(plant.check_frequency_unit.days())
        .and_then(Duration::try_days)
        .ok_or_else(|| invalid_frequency(plant))
}

/// Next due time: last event (epoch if none) plus frequency, clamped so the
/// result is never earlier than `now`. A plant whose computed due time has
/// already passed reports "due now" rather than a stale past timestamp.
pub fn next_check_time(
    plant: &Plant,
    last_event: Option<&CheckIn>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let last = last_event
        .map(|e| e.created_at)
        .unwrap_or(DateTime::UNIX_EPOCH);
    let candidate = last
        .checked_add_signed(check_frequency(plant)?)
        .ok_or_else(|| invalid_frequency(plant))?;
    Ok(candidate.max(now))
}

pub fn needs_care(plant: &Plant, last_event: Option<&CheckIn>, now: DateTime<Utc>) -> Result<bool> {
    Ok(next_check_time(plant, last_event, now)? <= now)
}

/// Next due time formatted for display (month/day/year).
pub fn next_check_date(
    plant: &Plant,
    last_event: Option<&CheckIn>,
    now: DateTime<Utc>,
) -> Result<String> {
    Ok(next_check_time(plant, last_event, now)?
        .format("%m/%d/%Y")
        .to_string())
}

/// Due-status queries backed by the check-in store. Reads only; state is
/// recomputed on every call rather than persisted.
pub struct CareScheduler {
    db: Database,
}

impl CareScheduler {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn latest_event(&self, plant: &Plant) -> Result<Option<CheckIn>> {
        match plant.id {
            Some(id) => self.db.latest_check_in(id, CareFilter::Any),
            None => Ok(None),
        }
    }

    pub fn needs_care(&self, plant: &Plant) -> Result<bool> {
        self.needs_care_at(plant, Utc::now())
    }

    pub fn needs_care_at(&self, plant: &Plant, now: DateTime<Utc>) -> Result<bool> {
        let last = self.latest_event(plant)?;
        needs_care(plant, last.as_ref(), now)
    }

    pub fn next_check_time(&self, plant: &Plant) -> Result<DateTime<Utc>> {
        let last = self.latest_event(plant)?;
        next_check_time(plant, last.as_ref(), Utc::now())
    }

    pub fn next_check_date(&self, plant: &Plant) -> Result<String> {
        let last = self.latest_event(plant)?;
        next_check_date(plant, last.as_ref(), Utc::now())
    }

    /// The due subset of the caller-supplied scope. Which plants are
    /// eligible (one garden, all gardens, one user's view) is the caller's
    /// decision; this only applies the scheduling rule to active plants.
    pub fn plants_needing_care(&self, scope: &[Plant]) -> Result<Vec<Plant>> {
        self.plants_needing_care_at(scope, Utc::now())
    }

    pub fn plants_needing_care_at(
        &self,
        scope: &[Plant],
        now: DateTime<Utc>,
    ) -> Result<Vec<Plant>> {
        let mut due = Vec::new();
        for plant in scope {
            if !plant.is_active() {
                continue;
            }
            let last = self.latest_event(plant)?;
            if needs_care(plant, last.as_ref(), now)? {
                due.push(plant.clone());
            }
        }
        Ok(due)
    }

    /// Users with at least one due plant among the plants they can see.
    pub fn users_with_plants_needing_care(&self, users: &[User]) -> Result<Vec<User>> {
        self.users_with_plants_needing_care_at(users, Utc::now())
    }

    pub fn users_with_plants_needing_care_at(
        &self,
        users: &[User],
        now: DateTime<Utc>,
    ) -> Result<Vec<User>> {
        let mut result = Vec::new();
        for user in users {
            let Some(user_id) = user.id else { continue };
            let plants = self.db.active_plants_for_user(user_id)?;
            if !self.plants_needing_care_at(&plants, now)?.is_empty() {
                result.push(user.clone());
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrequencyUnit, Garden};
    use chrono::TimeZone;

    fn weekly_plant() -> Plant {
        Plant::new(1, 1, "Monstera").with_frequency(1, FrequencyUnit::Week)
    }

    fn event_at(ts: DateTime<Utc>) -> CheckIn {
        CheckIn::new(1).at(ts)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn check_frequency_resolves_units() {
        let weekly = weekly_plant();
        assert_eq!(check_frequency(&weekly).unwrap(), Duration::days(7));

        let every_three_days = Plant::new(1, 1, "Basil").with_frequency(3, FrequencyUnit::Day);
        assert_eq!(
            check_frequency(&every_three_days).unwrap(),
            Duration::days(3)
        );
    }

    #[test]
    fn check_frequency_rejects_non_positive_scalar() {
        let plant = Plant::new(1, 1, "Fern").with_frequency(0, FrequencyUnit::Day);
        assert!(matches!(
            check_frequency(&plant),
            Err(PlantifulError::InvalidFrequency { scalar: 0, .. })
        ));

        let negative = Plant::new(1, 1, "Fern").with_frequency(-2, FrequencyUnit::Week);
        assert!(check_frequency(&negative).is_err());
    }

    #[test]
    fn check_frequency_rejects_overflowing_scalar() {
        let plant = Plant::new(1, 1, "Sequoia").with_frequency(i64::MAX, FrequencyUnit::Week);
        assert!(matches!(
            check_frequency(&plant),
            Err(PlantifulError::InvalidFrequency { .. })
        ));
    }

    #[test]
    fn next_check_time_rejects_out_of_range_due_dates() {
        // 200 million days fits in a duration but pushes the due date past
        // the end of the calendar.
        let plant = Plant::new(1, 1, "Sequoia").with_frequency(200_000_000, FrequencyUnit::Day);
        assert!(next_check_time(&plant, None, now()).is_err());
    }

    #[test]
    fn never_cared_for_plant_is_due_right_now() {
        // Epoch + frequency is always in the past, so the clamp to `now`
        // dominates.
        let plant = weekly_plant();
        assert_eq!(next_check_time(&plant, None, now()).unwrap(), now());
        assert!(needs_care(&plant, None, now()).unwrap());
    }

    #[test]
    fn due_exactly_at_the_boundary() {
        let plant = weekly_plant();
        let last = event_at(now() - Duration::days(7));
        assert!(needs_care(&plant, Some(&last), now()).unwrap());
    }

    #[test]
    fn due_when_last_watering_is_a_week_ago_less_a_second() {
        let plant = weekly_plant();
        let last = event_at(now() - Duration::days(7) - Duration::seconds(1));
        assert!(needs_care(&plant, Some(&last), now()).unwrap());
        // Overdue plants report "due now", not a stale past timestamp
        assert_eq!(next_check_time(&plant, Some(&last), now()).unwrap(), now());
    }

    #[test]
    fn not_due_when_last_watering_is_six_days_ago() {
        let plant = weekly_plant();
        let last = event_at(now() - Duration::days(6));
        assert!(!needs_care(&plant, Some(&last), now()).unwrap());
        assert_eq!(
            next_check_time(&plant, Some(&last), now()).unwrap(),
            now() + Duration::days(1)
        );
    }

    #[test]
    fn next_check_date_formats_month_day_year() {
        let plant = weekly_plant();
        let last = event_at(now() - Duration::days(3));
        assert_eq!(
            next_check_date(&plant, Some(&last), now()).unwrap(),
            "04/19/2024"
        );
    }

    // Scheduler tests against a real store.

    struct Fixture {
        db: Database,
        scheduler: CareScheduler,
        user_id: i64,
        garden_id: i64,
    }

    fn fixture() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let user_id = db
            .create_user(&User::new("Uncle", "Tony", "uncletony@example.com"))
            .unwrap();
        let garden_id = db.create_garden(&Garden::new("Back Porch", user_id)).unwrap();
        let scheduler = CareScheduler::new(db.clone());
        Fixture {
            db,
            scheduler,
            user_id,
            garden_id,
        }
    }

    fn add_weekly_plant(fx: &Fixture, name: &str) -> Plant {
        let plant = Plant::new(fx.garden_id, fx.user_id, name)
            .with_frequency(1, FrequencyUnit::Week);
        let id = fx.db.create_plant(&plant).unwrap();
        fx.db.get_plant(id).unwrap()
    }

    #[test]
    fn only_the_most_recent_event_governs() {
        // Events 12 and 5 days old with a weekly frequency: the 5-day-old
        // event is the relevant one, so the plant is not due.
        let fx = fixture();
        let plant = add_weekly_plant(&fx, "not included");
        let id = plant.id.unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).at(now() - Duration::days(12)))
            .unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).at(now() - Duration::days(5)))
            .unwrap();

        assert!(!fx.scheduler.needs_care_at(&plant, now()).unwrap());
    }

    #[test]
    fn later_bare_check_governs_over_earlier_watering() {
        // Watering 3 days ago, check-only event 1 day ago: the more recent
        // event of any kind drives the schedule.
        let fx = fixture();
        let plant = add_weekly_plant(&fx, "Calathea");
        let id = plant.id.unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).watered().at(now() - Duration::days(3)))
            .unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).at(now() - Duration::days(1)))
            .unwrap();

        let last = fx.db.latest_check_in(id, CareFilter::Any).unwrap();
        let next = next_check_time(&plant, last.as_ref(), now()).unwrap();
        assert_eq!(next, now() - Duration::days(1) + Duration::days(7));
    }

    #[test]
    fn plants_needing_care_matches_the_interval_rule() {
        let fx = fixture();

        let fresh = add_weekly_plant(&fx, "not included");
        fx.db
            .create_check_in(&CheckIn::new(fresh.id.unwrap()).at(now() - Duration::days(12)))
            .unwrap();
        fx.db
            .create_check_in(&CheckIn::new(fresh.id.unwrap()).at(now() - Duration::days(5)))
            .unwrap();

        let overdue1 = add_weekly_plant(&fx, "included1");
        fx.db
            .create_check_in(
                &CheckIn::new(overdue1.id.unwrap())
                    .at(now() - Duration::days(7) - Duration::seconds(1)),
            )
            .unwrap();

        let overdue2 = add_weekly_plant(&fx, "included2");
        fx.db
            .create_check_in(&CheckIn::new(overdue2.id.unwrap()).at(now() - Duration::days(8)))
            .unwrap();

        let scope = fx.db.active_plants_in_garden(fx.garden_id).unwrap();
        let mut due: Vec<String> = fx
            .scheduler
            .plants_needing_care_at(&scope, now())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        due.sort();

        assert_eq!(due, vec!["included1", "included2"]);
    }

    #[test]
    fn plants_needing_care_excludes_soft_deleted_plants() {
        let fx = fixture();
        let plant = add_weekly_plant(&fx, "Abandoned");
        let id = plant.id.unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).at(now() - Duration::days(90)))
            .unwrap();
        fx.db.soft_delete_plant(id).unwrap();

        // Even passing the deleted plant in explicitly, it stays excluded.
        let deleted = fx.db.get_plant(id).unwrap();
        let due = fx
            .scheduler
            .plants_needing_care_at(&[deleted], now())
            .unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn corrupt_history_fails_loudly_instead_of_resetting_the_clock() {
        // A malformed stored timestamp must not read as "cared for just
        // now" and flip the plant to not due.
        let fx = fixture();
        let plant = add_weekly_plant(&fx, "Orchid");
        let id = plant.id.unwrap();
        fx.db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO check_ins (plant_id, created_at) VALUES (?1, 'not-a-timestamp')",
                    [id],
                )?;
                Ok(())
            })
            .unwrap();

        assert!(fx.scheduler.needs_care_at(&plant, now()).is_err());
    }

    #[test]
    fn recording_care_immediately_clears_due_status() {
        let fx = fixture();
        let plant = add_weekly_plant(&fx, "Pothos");
        let id = plant.id.unwrap();
        fx.db
            .create_check_in(&CheckIn::new(id).at(now() - Duration::days(10)))
            .unwrap();

        assert!(fx.scheduler.needs_care_at(&plant, now()).unwrap());

        fx.db
            .create_check_in(&CheckIn::new(id).watered().at(now()))
            .unwrap();

        // No caching: the next evaluation sees the new event.
        assert!(!fx.scheduler.needs_care_at(&plant, now()).unwrap());
    }

    #[test]
    fn users_with_plants_needing_care_follows_garden_membership() {
        let fx = fixture();

        let neglectful = fx
            .db
            .get_user(
                fx.db
                    .create_user(&User::new("Fern", "Forgetter", "fern@example.com"))
                    .unwrap(),
            )
            .unwrap();
        let their_garden = fx
            .db
            .create_garden(&Garden::new("Window Sill", neglectful.id.unwrap()))
            .unwrap();
        let thirsty = Plant::new(their_garden, neglectful.id.unwrap(), "Thirsty")
            .with_frequency(1, FrequencyUnit::Week);
        let thirsty_id = fx.db.create_plant(&thirsty).unwrap();
        fx.db
            .create_check_in(&CheckIn::new(thirsty_id).at(now() - Duration::days(8)))
            .unwrap();

        // The fixture owner's plant was checked recently.
        let content = add_weekly_plant(&fx, "Content");
        fx.db
            .create_check_in(&CheckIn::new(content.id.unwrap()).at(now() - Duration::days(1)))
            .unwrap();

        let users = fx.db.all_users().unwrap();
        let reminded = fx
            .scheduler
            .users_with_plants_needing_care_at(&users, now())
            .unwrap();

        assert_eq!(reminded.len(), 1);
        assert_eq!(reminded[0].email, "fern@example.com");
    }
}
