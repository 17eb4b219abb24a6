use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Day,
    Week,
}

impl FrequencyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
        }
    }

    /// Explicit unit-to-days lookup; the scheduling math multiplies this
    /// by the plant's frequency scalar.
    pub fn days(&self) -> i64 {
        match self {
            FrequencyUnit::Day => 1,
            FrequencyUnit::Week => 7,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "day" | "days" => Some(FrequencyUnit::Day),
            "week" | "weeks" => Some(FrequencyUnit::Week),
            _ => None,
        }
    }

    pub fn all() -> &'static [FrequencyUnit] {
        &[FrequencyUnit::Day, FrequencyUnit::Week]
    }
}

impl std::fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: Option<i64>,
    pub garden_id: i64,
    pub added_by: i64,
    pub name: String,
    pub botanical_name: Option<String>,
    pub check_frequency_scalar: i64,
    pub check_frequency_unit: FrequencyUnit,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Plant {
    pub fn new(garden_id: i64, added_by: i64, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            garden_id,
            added_by,
            name: name.to_string(),
            botanical_name: None,
            check_frequency_scalar: 3,
            check_frequency_unit: FrequencyUnit::Day,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_botanical_name(mut self, name: &str) -> Self {
        self.botanical_name = Some(name.to_string());
        self
    }

    pub fn with_frequency(mut self, scalar: i64, unit: FrequencyUnit) -> Self {
        self.check_frequency_scalar = scalar;
        self.check_frequency_unit = unit;
        self
    }

    /// Active plants are the ones never soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Display form of the configured interval, e.g. "3 days" or "1 week".
    pub fn frequency_label(&self) -> String {
        if self.check_frequency_scalar == 1 {
            format!("1 {}", self.check_frequency_unit)
        } else {
            format!(
                "{} {}s",
                self.check_frequency_scalar, self.check_frequency_unit
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_unit_from_str_valid() {
        assert_eq!(FrequencyUnit::from_str("day"), Some(FrequencyUnit::Day));
        assert_eq!(FrequencyUnit::from_str("days"), Some(FrequencyUnit::Day));
        assert_eq!(FrequencyUnit::from_str("Day"), Some(FrequencyUnit::Day));
        assert_eq!(FrequencyUnit::from_str("week"), Some(FrequencyUnit::Week));
        assert_eq!(FrequencyUnit::from_str("WEEKS"), Some(FrequencyUnit::Week));
    }

    #[test]
    fn frequency_unit_from_str_invalid() {
        assert_eq!(FrequencyUnit::from_str("month"), None);
        assert_eq!(FrequencyUnit::from_str("fortnight"), None);
        assert_eq!(FrequencyUnit::from_str(""), None);
    }

    #[test]
    fn frequency_unit_round_trip() {
        for unit in FrequencyUnit::all() {
            assert_eq!(
                FrequencyUnit::from_str(unit.as_str()),
                Some(*unit),
                "Round-trip failed for {:?}",
                unit
            );
        }
    }

    #[test]
    fn frequency_unit_days() {
        assert_eq!(FrequencyUnit::Day.days(), 1);
        assert_eq!(FrequencyUnit::Week.days(), 7);
    }

    #[test]
    fn plant_builder_pattern() {
        let plant = Plant::new(1, 2, "Monstera")
            .with_botanical_name("Monstera deliciosa")
            .with_frequency(1, FrequencyUnit::Week);

        assert_eq!(plant.garden_id, 1);
        assert_eq!(plant.added_by, 2);
        assert_eq!(plant.name, "Monstera");
        assert_eq!(
            plant.botanical_name,
            Some("Monstera deliciosa".to_string())
        );
        assert_eq!(plant.check_frequency_scalar, 1);
        assert_eq!(plant.check_frequency_unit, FrequencyUnit::Week);
        assert!(plant.is_active());
    }

    #[test]
    fn frequency_label_pluralizes() {
        let weekly = Plant::new(1, 1, "Fern").with_frequency(1, FrequencyUnit::Week);
        let often = Plant::new(1, 1, "Basil").with_frequency(3, FrequencyUnit::Day);

        assert_eq!(weekly.frequency_label(), "1 week");
        assert_eq!(often.frequency_label(), "3 days");
    }
}
