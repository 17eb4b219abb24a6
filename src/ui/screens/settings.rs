use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    OwnerFirstName,
    OwnerLastName,
    OwnerEmail,
    GardenName,
    CheckEvery,
    CheckUnit,
}

impl SettingsField {
    pub fn all() -> &'static [SettingsField] {
        &[
            SettingsField::OwnerFirstName,
            SettingsField::OwnerLastName,
            SettingsField::OwnerEmail,
            SettingsField::GardenName,
            SettingsField::CheckEvery,
            SettingsField::CheckUnit,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::OwnerFirstName => "First Name",
            SettingsField::OwnerLastName => "Last Name",
            SettingsField::OwnerEmail => "Email",
            SettingsField::GardenName => "Garden Name",
            SettingsField::CheckEvery => "Default Check Every",
            SettingsField::CheckUnit => "Default Check Unit",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SettingsField::OwnerFirstName => SettingsField::OwnerLastName,
            SettingsField::OwnerLastName => SettingsField::OwnerEmail,
            SettingsField::OwnerEmail => SettingsField::GardenName,
            SettingsField::GardenName => SettingsField::CheckEvery,
            SettingsField::CheckEvery => SettingsField::CheckUnit,
            SettingsField::CheckUnit => SettingsField::OwnerFirstName,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SettingsField::OwnerFirstName => SettingsField::CheckUnit,
            SettingsField::OwnerLastName => SettingsField::OwnerFirstName,
            SettingsField::OwnerEmail => SettingsField::OwnerLastName,
            SettingsField::GardenName => SettingsField::OwnerEmail,
            SettingsField::CheckEvery => SettingsField::GardenName,
            SettingsField::CheckUnit => SettingsField::CheckEvery,
        }
    }
}

pub struct SettingsScreen<'a> {
    pub focused_field: SettingsField,
    pub editing: bool,
    pub edit_buffer: &'a str,
    pub field_values: [String; 6],
}

impl<'a> SettingsScreen<'a> {
    pub fn new(field_values: [String; 6]) -> Self {
        Self {
            focused_field: SettingsField::OwnerFirstName,
            editing: false,
            edit_buffer: "",
            field_values,
        }
    }

    pub fn with_focus(mut self, field: SettingsField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn editing(mut self, editing: bool, buffer: &'a str) -> Self {
        self.editing = editing;
        self.edit_buffer = buffer;
        self
    }

    fn field_value(&self, field: SettingsField) -> &str {
        let index = SettingsField::all()
            .iter()
            .position(|f| *f == field)
            .unwrap_or(0);
        &self.field_values[index]
    }
}

impl Widget for SettingsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(20),   // Form (6 fields * 3 lines + borders)
                Constraint::Length(4), // Help
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Settings", Theme::title()),
            Span::styled(" - Owner & Garden", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_form(chunks[1], buf);
        self.render_help(chunks[2], buf);

        let nav = Line::from(vec![
            Span::styled("[↑↓]", Theme::nav_key()),
            Span::styled("Navigate ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Edit/Save ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Cancel/Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[3], buf);
    }
}

impl SettingsScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Profile")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let field_height = 3;
        let constraints: Vec<Constraint> = SettingsField::all()
            .iter()
            .map(|_| Constraint::Length(field_height))
            .collect();

        let field_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in SettingsField::all().iter().enumerate() {
            let is_focused = *field == self.focused_field;

            let value = if is_focused && self.editing {
                format!("{}_", self.edit_buffer)
            } else {
                self.field_value(*field).to_string()
            };

            let border_style = if is_focused {
                Theme::border_focused()
            } else {
                Theme::border()
            };

            let value_style = if is_focused && self.editing {
                Theme::highlight()
            } else if is_focused {
                Theme::selected()
            } else {
                Theme::normal()
            };

            let field_block = Block::default()
                .title(field.label())
                .borders(Borders::ALL)
                .border_style(border_style);

            let field_inner = field_block.inner(field_areas[i]);
            field_block.render(field_areas[i], buf);

            let para = Paragraph::new(Span::styled(value, value_style));
            para.render(field_inner, buf);
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Field Options")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = match self.focused_field {
            SettingsField::OwnerFirstName => "Your first name, used in reminder digests",
            SettingsField::OwnerLastName => "Your last name",
            SettingsField::OwnerEmail => "Email address for the owner account",
            SettingsField::GardenName => "Display name for your garden",
            SettingsField::CheckEvery => "How often new plants should be checked (a number, e.g. 3)",
            SettingsField::CheckUnit => "Options: day, week",
        };

        let para = Paragraph::new(Span::styled(help_text, Theme::dim()));
        para.render(inner, buf);
    }
}
