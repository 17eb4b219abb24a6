use crate::app::CheckInFormState;
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInField {
    Watered,
    Fertilized,
    Notes,
}

impl CheckInField {
    pub fn label(&self) -> &'static str {
        match self {
            CheckInField::Watered => "Watered",
            CheckInField::Fertilized => "Fertilized",
            CheckInField::Notes => "Notes",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CheckInField::Watered => CheckInField::Fertilized,
            CheckInField::Fertilized => CheckInField::Notes,
            CheckInField::Notes => CheckInField::Watered,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            CheckInField::Watered => CheckInField::Notes,
            CheckInField::Fertilized => CheckInField::Watered,
            CheckInField::Notes => CheckInField::Fertilized,
        }
    }
}

pub struct CheckInScreen<'a> {
    pub form: &'a CheckInFormState,
}

impl<'a> CheckInScreen<'a> {
    pub fn new(form: &'a CheckInFormState) -> Self {
        Self { form }
    }

    fn render_checkbox(&self, field: CheckInField, checked: bool, area: Rect, buf: &mut Buffer) {
        let focused = self.form.focused_field == field;

        let border_style = if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(field.label())
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let marker = if checked { "[x]" } else { "[ ]" };
        let style = if checked {
            Theme::success()
        } else if focused {
            Theme::highlight()
        } else {
            Theme::normal()
        };

        let line = Line::from(vec![
            Span::styled(marker, style),
            Span::styled(" (Space to toggle)", Theme::dim()),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}

impl Widget for CheckInScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Watered
                Constraint::Length(3), // Fertilized
                Constraint::Length(3), // Notes
                Constraint::Min(1),    // Spacer
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Check In", Theme::title()),
            Span::styled(format!(" - {}", self.form.plant_name), Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        self.render_checkbox(CheckInField::Watered, self.form.watered, chunks[1], buf);
        self.render_checkbox(
            CheckInField::Fertilized,
            self.form.fertilized,
            chunks[2],
            buf,
        );

        InputWidget::new("Notes", &self.form.notes)
            .placeholder("optional")
            .focused(self.form.focused_field == CheckInField::Notes)
            .render(chunks[3], buf);

        let nav = Line::from(vec![
            Span::styled("[Tab/↑↓]", Theme::nav_key()),
            Span::styled("Field ", Theme::nav_label()),
            Span::styled("[Space]", Theme::nav_key()),
            Span::styled("Toggle ", Theme::nav_label()),
            Span::styled("[Enter]", Theme::nav_key()),
            Span::styled("Save ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Cancel", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[5], buf);
    }
}
