use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::logic::schedule;
use crate::models::{CareFilter, CheckIn, FrequencyUnit, Garden, Plant, User};
use crate::ui::screens::{CheckInField, SettingsField};
use chrono::{Datelike, Local, NaiveDate, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Plants,
    Calendar,
    CheckIn,
    Settings,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Dashboard),
            '2' => Some(Screen::Plants),
            '3' => Some(Screen::Calendar),
            's' | 'S' => Some(Screen::Settings),
            _ => None,
        }
    }
}

/// A plant together with its current care status, recomputed on every
/// reload rather than cached in the store.
#[derive(Debug, Clone)]
pub struct PlantSummary {
    pub plant: Plant,
    pub last_check_in: Option<CheckIn>,
    pub next_check_date: String,
    pub needs_care: bool,
}

pub struct PlantsState {
    pub selected_index: usize,
    pub adding: bool,
    pub name_buffer: String,
}

impl PlantsState {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            adding: false,
            name_buffer: String::new(),
        }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn start_adding(&mut self) {
        self.adding = true;
        self.name_buffer.clear();
    }

    pub fn cancel_adding(&mut self) {
        self.adding = false;
        self.name_buffer.clear();
    }

    pub fn finish_adding(&mut self) -> String {
        self.adding = false;
        std::mem::take(&mut self.name_buffer)
    }
}

pub struct CheckInFormState {
    pub plant_id: i64,
    pub plant_name: String,
    pub focused_field: CheckInField,
    pub watered: bool,
    pub fertilized: bool,
    pub notes: String,
}

impl CheckInFormState {
    pub fn new(plant_id: i64, plant_name: &str) -> Self {
        Self {
            plant_id,
            plant_name: plant_name.to_string(),
            focused_field: CheckInField::Watered,
            watered: false,
            fertilized: false,
            notes: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn toggle_focused(&mut self) {
        match self.focused_field {
            CheckInField::Watered => self.watered = !self.watered,
            CheckInField::Fertilized => self.fertilized = !self.fertilized,
            CheckInField::Notes => {}
        }
    }

    pub fn is_notes_focused(&self) -> bool {
        self.focused_field == CheckInField::Notes
    }
}

pub struct CalendarState {
    pub year: i32,
    pub month: u32,
    pub selected_date: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new() -> Self {
        let now = Local::now();
        Self {
            year: now.year(),
            month: now.month(),
            selected_date: Some(now.date_naive()),
        }
    }

    pub fn prev_month(&mut self) {
        if self.month == 1 {
            self.month = 12;
            self.year -= 1;
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.month = 1;
            self.year += 1;
        } else {
            self.month += 1;
        }
    }
}

pub struct SettingsState {
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: String,
}

impl SettingsState {
    pub fn new() -> Self {
        Self {
            focused_field: SettingsField::OwnerFirstName,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn start_editing(&mut self, current_value: &str) {
        self.editing = true;
        self.edit_buffer = current_value.to_string();
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) -> String {
        self.editing = false;
        std::mem::take(&mut self.edit_buffer)
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,
    pub db: Database,

    // Data
    pub user: User,
    pub garden: Garden,
    pub summaries: Vec<PlantSummary>,
    pub recent_check_ins: Vec<CheckIn>,
    pub plant_names: HashMap<i64, String>,

    // Screen states
    pub plants_state: PlantsState,
    pub calendar_state: CalendarState,
    pub check_in_state: Option<CheckInFormState>,
    pub settings_state: SettingsState,

    // UI state
    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        // Load or create the owner and their garden from config
        let user = match db.get_default_user()? {
            Some(u) => u,
            None => {
                let user = User::new(
                    &config.owner.first_name,
                    &config.owner.last_name,
                    &config.owner.email,
                );
                let id = db.create_user(&user)?;
                db.get_user(id)?
            }
        };

        let garden = match db.get_default_garden()? {
            Some(g) => g,
            None => {
                let garden = Garden::new(&config.garden.name, user.id.unwrap_or_default());
                let id = db.create_garden(&garden)?;
                db.get_garden(id)?
            }
        };

        let mut app = Self {
            screen: Screen::Dashboard,
            should_quit: false,
            config,
            db,
            user,
            garden,
            summaries: Vec::new(),
            recent_check_ins: Vec::new(),
            plant_names: HashMap::new(),
            plants_state: PlantsState::new(),
            calendar_state: CalendarState::new(),
            check_in_state: None,
            settings_state: SettingsState::new(),
            status_message: None,
        };
        app.reload()?;
        Ok(app)
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Recompute plant summaries and recent history from the store.
    pub fn reload(&mut self) -> Result<()> {
        let garden_id = self.garden.id.unwrap_or_default();
        let now = Utc::now();

        let mut summaries = Vec::new();
        for plant in self.db.active_plants_in_garden(garden_id)? {
            let last_check_in = match plant.id {
                Some(id) => self.db.latest_check_in(id, CareFilter::Any)?,
                None => None,
            };
            let next_check_date = schedule::next_check_date(&plant, last_check_in.as_ref(), now)?;
            let needs_care = schedule::needs_care(&plant, last_check_in.as_ref(), now)?;
            summaries.push(PlantSummary {
                plant,
                last_check_in,
                next_check_date,
                needs_care,
            });
        }
        self.summaries = summaries;

        self.recent_check_ins = self.db.check_ins_for_garden(garden_id, 50)?;
        self.plant_names = self
            .db
            .plants_in_garden(garden_id)?
            .into_iter()
            .filter_map(|p| p.id.map(|id| (id, p.name)))
            .collect();

        let count = self.summaries.len();
        if count > 0 && self.plants_state.selected_index >= count {
            self.plants_state.selected_index = count - 1;
        }

        Ok(())
    }

    pub fn selected_summary(&self) -> Option<&PlantSummary> {
        self.summaries.get(self.plants_state.selected_index)
    }

    pub fn add_plant(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            self.set_status("Plant name cannot be empty");
            return Ok(());
        }
        let (scalar, unit) = self.config.care.default_frequency()?;
        let plant = Plant::new(
            self.garden.id.unwrap_or_default(),
            self.user.id.unwrap_or_default(),
            name,
        )
        .with_frequency(scalar, unit);
        self.db.create_plant(&plant)?;
        self.reload()?;
        self.set_status(&format!("Added {}", name));
        Ok(())
    }

    pub fn delete_selected_plant(&mut self) -> Result<()> {
        let Some(summary) = self.selected_summary() else {
            return Ok(());
        };
        let name = summary.plant.name.clone();
        if let Some(id) = summary.plant.id {
            self.db.soft_delete_plant(id)?;
            self.reload()?;
            self.set_status(&format!("Removed {} (history kept)", name));
        }
        Ok(())
    }

    /// Adjust the selected plant's frequency scalar, clamped at 1.
    pub fn adjust_selected_frequency(&mut self, delta: i64) -> Result<()> {
        let Some(summary) = self.selected_summary() else {
            return Ok(());
        };
        let mut plant = summary.plant.clone();
        plant.check_frequency_scalar = (plant.check_frequency_scalar + delta).max(1);
        self.db.update_plant(&plant)?;
        self.reload()
    }

    pub fn toggle_selected_unit(&mut self) -> Result<()> {
        let Some(summary) = self.selected_summary() else {
            return Ok(());
        };
        let mut plant = summary.plant.clone();
        plant.check_frequency_unit = match plant.check_frequency_unit {
            FrequencyUnit::Day => FrequencyUnit::Week,
            FrequencyUnit::Week => FrequencyUnit::Day,
        };
        self.db.update_plant(&plant)?;
        self.reload()
    }

    pub fn start_check_in(&mut self) {
        if let Some(summary) = self.selected_summary() {
            if let Some(id) = summary.plant.id {
                self.check_in_state = Some(CheckInFormState::new(id, &summary.plant.name));
                self.switch_screen(Screen::CheckIn);
            }
        }
    }

    pub fn cancel_check_in(&mut self) {
        self.check_in_state = None;
        self.switch_screen(Screen::Plants);
    }

    pub fn submit_check_in(&mut self) -> Result<()> {
        let Some(state) = self.check_in_state.take() else {
            return Ok(());
        };
        let mut check_in = CheckIn::new(state.plant_id);
        check_in.watered = state.watered;
        check_in.fertilized = state.fertilized;
        let notes = state.notes.trim();
        if !notes.is_empty() {
            check_in.notes = Some(notes.to_string());
        }
        self.db.create_check_in(&check_in)?;
        self.switch_screen(Screen::Plants);
        // Due status flips immediately: the reload re-reads the history
        self.reload()?;
        self.set_status(&format!("Check-in recorded for {}", state.plant_name));
        Ok(())
    }

    pub fn settings_field_value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::OwnerFirstName => self.user.first_name.clone(),
            SettingsField::OwnerLastName => self.user.last_name.clone(),
            SettingsField::OwnerEmail => self.user.email.clone(),
            SettingsField::GardenName => self.garden.name.clone(),
            SettingsField::CheckEvery => self.config.care.default_frequency_scalar.to_string(),
            SettingsField::CheckUnit => self.config.care.default_frequency_unit.clone(),
        }
    }

    pub fn apply_settings_field(&mut self, field: SettingsField, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            SettingsField::OwnerFirstName => {
                if !value.is_empty() {
                    self.user.first_name = value.to_string();
                    self.db.update_user(&self.user)?;
                }
            }
            SettingsField::OwnerLastName => {
                if !value.is_empty() {
                    self.user.last_name = value.to_string();
                    self.db.update_user(&self.user)?;
                }
            }
            SettingsField::OwnerEmail => {
                if !value.is_empty() {
                    self.user.email = value.to_string();
                    self.db.update_user(&self.user)?;
                }
            }
            SettingsField::GardenName => {
                if !value.is_empty() {
                    self.garden.name = value.to_string();
                    if let Some(id) = self.garden.id {
                        self.db.rename_garden(id, value)?;
                    }
                }
            }
            SettingsField::CheckEvery => {
                if let Ok(scalar) = value.parse::<i64>() {
                    if scalar >= 1 {
                        self.config.care.default_frequency_scalar = scalar;
                        self.config.save(None)?;
                    }
                }
            }
            SettingsField::CheckUnit => {
                if FrequencyUnit::from_str(value).is_some() {
                    self.config.care.default_frequency_unit = value.to_lowercase();
                    self.config.save(None)?;
                }
            }
        }
        Ok(())
    }

    /// True while a screen is consuming plain character input.
    pub fn is_text_entry(&self) -> bool {
        if self.plants_state.adding || self.settings_state.editing {
            return true;
        }
        matches!(&self.check_in_state, Some(state) if self.screen == Screen::CheckIn && state.is_notes_focused())
    }
}
