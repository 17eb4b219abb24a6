use crate::app::PlantSummary;
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Widget},
};

pub struct PlantsScreen<'a> {
    pub summaries: &'a [PlantSummary],
    pub selected_index: usize,
    pub adding: bool,
    pub name_buffer: &'a str,
}

impl<'a> PlantsScreen<'a> {
    pub fn new(summaries: &'a [PlantSummary]) -> Self {
        Self {
            summaries,
            selected_index: 0,
            adding: false,
            name_buffer: "",
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn adding(mut self, adding: bool, buffer: &'a str) -> Self {
        self.adding = adding;
        self.name_buffer = buffer;
        self
    }
}

impl Widget for PlantsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let constraints = if self.adding {
            vec![
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Table
                Constraint::Length(3), // Add form
                Constraint::Length(1), // Nav
            ]
        } else {
            vec![
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
            ]
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_table(chunks[1], buf);

        if self.adding {
            InputWidget::new("New Plant Name", self.name_buffer)
                .placeholder("e.g. Monstera")
                .focused(true)
                .render(chunks[2], buf);
            let nav = Line::from(vec![
                Span::styled("[Enter]", Theme::nav_key()),
                Span::styled("Add ", Theme::nav_label()),
                Span::styled("[Esc]", Theme::nav_key()),
                Span::styled("Cancel", Theme::nav_label()),
            ]);
            Paragraph::new(nav).render(chunks[3], buf);
        } else {
            let nav = Line::from(vec![
                Span::styled("[a]", Theme::nav_key()),
                Span::styled("Add ", Theme::nav_label()),
                Span::styled("[c]", Theme::nav_key()),
                Span::styled("Check In ", Theme::nav_label()),
                Span::styled("[d]", Theme::nav_key()),
                Span::styled("Delete ", Theme::nav_label()),
                Span::styled("[+/-]", Theme::nav_key()),
                Span::styled("Frequency ", Theme::nav_label()),
                Span::styled("[u]", Theme::nav_key()),
                Span::styled("Unit ", Theme::nav_label()),
                Span::styled("[↑↓]", Theme::nav_key()),
                Span::styled("Navigate ", Theme::nav_label()),
                Span::styled("[Esc]", Theme::nav_key()),
                Span::styled("Back", Theme::nav_label()),
            ]);
            Paragraph::new(nav).render(chunks[2], buf);
        }
    }
}

impl PlantsScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Plants", Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let due_count = self.summaries.iter().filter(|s| s.needs_care).count();
        let info = Line::from(vec![Span::styled(
            format!("{} plants ({} due)", self.summaries.len(), due_count),
            Theme::dim(),
        )]);

        let para = Paragraph::new(info).block(block);
        para.render(area, buf);
    }

    fn render_table(&self, area: Rect, buf: &mut Buffer) {
        let header_cells = [
            "Name",
            "Botanical",
            "Every",
            "Last Check-In",
            "Next Check",
            "Status",
        ]
        .iter()
        .map(|h| Cell::from(*h).style(Theme::header()));

        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = self
            .summaries
            .iter()
            .map(|s| {
                let status_style = if s.needs_care {
                    Theme::due()
                } else {
                    Theme::up_to_date()
                };

                let last = s
                    .last_check_in
                    .as_ref()
                    .map(|c| format!("{} ({})", c.created_at_date(), c.kind_label()))
                    .unwrap_or_else(|| "never".to_string());

                let cells = vec![
                    Cell::from(truncate(&s.plant.name, 24)),
                    Cell::from(
                        s.plant
                            .botanical_name
                            .as_ref()
                            .map(|n| truncate(n, 24))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(s.plant.frequency_label()),
                    Cell::from(last),
                    Cell::from(s.next_check_date.clone()),
                    Cell::from(if s.needs_care { "due" } else { "ok" }).style(status_style),
                ];

                Row::new(cells).style(Theme::normal())
            })
            .collect();

        let widths = [
            Constraint::Length(26),
            Constraint::Length(26),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Min(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border()),
            )
            .highlight_style(Theme::selected());

        let mut state = TableState::default();
        if !self.summaries.is_empty() {
            state.select(Some(self.selected_index.min(self.summaries.len() - 1)));
        }

        ratatui::widgets::StatefulWidget::render(table, area, buf, &mut state);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
