use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Predicate for "most recent event" lookups against the check-in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareFilter {
    /// Any care event, regardless of flags.
    Any,
    Watered,
    Fertilized,
    /// A bare check: neither watered nor fertilized.
    CheckOnly,
}

impl CareFilter {
    /// SQL fragment appended to the per-plant history query.
    pub fn sql_clause(&self) -> &'static str {
        match self {
            CareFilter::Any => "",
            CareFilter::Watered => "AND watered = 1",
            CareFilter::Fertilized => "AND fertilized = 1",
            CareFilter::CheckOnly => "AND watered = 0 AND fertilized = 0",
        }
    }
}

/// A timestamped record that a plant received care. Immutable once
/// recorded; rows only disappear when the owning plant is destroyed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Option<i64>,
    pub plant_id: i64,
    pub notes: Option<String>,
    pub watered: bool,
    pub fertilized: bool,
    pub created_at: DateTime<Utc>,
}

impl CheckIn {
    pub fn new(plant_id: i64) -> Self {
        Self {
            id: None,
            plant_id,
            notes: None,
            watered: false,
            fertilized: false,
            created_at: Utc::now(),
        }
    }

    pub fn watered(mut self) -> Self {
        self.watered = true;
        self
    }

    pub fn fertilized(mut self) -> Self {
        self.fertilized = true;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.created_at = timestamp;
        self
    }

    pub fn is_bare_check(&self) -> bool {
        !self.watered && !self.fertilized
    }

    pub fn created_at_date(&self) -> String {
        self.created_at.format("%m/%d/%Y").to_string()
    }

    /// Short flag summary for list views, e.g. "W+F" or "check".
    pub fn kind_label(&self) -> &'static str {
        match (self.watered, self.fertilized) {
            (true, true) => "W+F",
            (true, false) => "W",
            (false, true) => "F",
            (false, false) => "check",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match (self.watered, self.fertilized) {
            (true, true) => Color::Cyan,
            (true, false) => Color::LightBlue,
            (false, true) => Color::Magenta,
            (false, false) => Color::Gray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn check_in_builder_pattern() {
        let event = CheckIn::new(7)
            .watered()
            .with_notes("repotted afterwards");

        assert_eq!(event.plant_id, 7);
        assert!(event.watered);
        assert!(!event.fertilized);
        assert_eq!(event.notes, Some("repotted afterwards".to_string()));
        assert!(!event.is_bare_check());
    }

    #[test]
    fn bare_check_has_no_flags() {
        let event = CheckIn::new(1);
        assert!(event.is_bare_check());
        assert_eq!(event.kind_label(), "check");
    }

    #[test]
    fn kind_label_reflects_flags() {
        assert_eq!(CheckIn::new(1).watered().kind_label(), "W");
        assert_eq!(CheckIn::new(1).fertilized().kind_label(), "F");
        assert_eq!(CheckIn::new(1).watered().fertilized().kind_label(), "W+F");
    }

    #[test]
    fn created_at_date_uses_month_day_year() {
        let event =
            CheckIn::new(1).at(Utc.with_ymd_and_hms(2024, 4, 15, 9, 30, 0).unwrap());
        assert_eq!(event.created_at_date(), "04/15/2024");
    }

    #[test]
    fn care_filter_clauses() {
        assert_eq!(CareFilter::Any.sql_clause(), "");
        assert_eq!(CareFilter::Watered.sql_clause(), "AND watered = 1");
        assert_eq!(CareFilter::Fertilized.sql_clause(), "AND fertilized = 1");
        assert_eq!(
            CareFilter::CheckOnly.sql_clause(),
            "AND watered = 0 AND fertilized = 0"
        );
    }
}
