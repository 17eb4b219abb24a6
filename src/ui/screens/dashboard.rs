use crate::app::PlantSummary;
use crate::models::{CheckIn, Garden, User};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};
use std::collections::HashMap;

pub struct DashboardScreen<'a> {
    pub user: &'a User,
    pub garden: &'a Garden,
    pub summaries: &'a [PlantSummary],
    pub recent_check_ins: &'a [CheckIn],
    pub plant_names: &'a HashMap<i64, String>,
    pub status_message: Option<&'a str>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(
        user: &'a User,
        garden: &'a Garden,
        summaries: &'a [PlantSummary],
        recent_check_ins: &'a [CheckIn],
        plant_names: &'a HashMap<i64, String>,
    ) -> Self {
        Self {
            user,
            garden,
            summaries,
            recent_check_ins,
            plant_names,
            status_message: None,
        }
    }

    pub fn with_status(mut self, status: Option<&'a str>) -> Self {
        self.status_message = status;
        self
    }

    fn due_summaries(&self) -> Vec<&PlantSummary> {
        self.summaries.iter().filter(|s| s.needs_care).collect()
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Due plants and recent check-ins
                Constraint::Length(1), // Status message
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        self.render_due_plants(middle[0], buf);
        self.render_recent_check_ins(middle[1], buf);

        self.render_status_message(chunks[2], buf);
        self.render_nav(chunks[3], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            "Plantiful - {} ({})",
            self.garden.name,
            self.user.full_name()
        );

        let block = Block::default()
            .title(Span::styled(title, Theme::title()))
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let due_count = self.due_summaries().len();
        let info = if due_count == 0 {
            format!("{} plants, all caught up", self.summaries.len())
        } else {
            format!(
                "{} plants, {} need attention",
                self.summaries.len(),
                due_count
            )
        };

        let para = Paragraph::new(Span::styled(info, Theme::dim())).block(block);
        para.render(area, buf);
    }

    fn render_due_plants(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Needs Care", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let due = self.due_summaries();

        if due.is_empty() {
            let para = Paragraph::new(Span::styled("Everything is up to date", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = due
            .iter()
            .map(|s| {
                let title_line = Line::from(vec![
                    Span::styled("● ", Theme::due()),
                    Span::styled(&s.plant.name, Theme::normal()),
                    Span::styled(
                        format!(" (every {})", s.plant.frequency_label()),
                        Theme::dim(),
                    ),
                ]);
                let detail = match &s.last_check_in {
                    Some(c) => format!("  last checked {}", c.created_at_date()),
                    None => "  never checked".to_string(),
                };
                let detail_line = Line::from(Span::styled(detail, Theme::dim()));
                ListItem::new(vec![title_line, detail_line])
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_recent_check_ins(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Recent Check-Ins", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.recent_check_ins.is_empty() {
            let para = Paragraph::new(Span::styled("No check-ins recorded", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .recent_check_ins
            .iter()
            .take(10)
            .map(|c| {
                let name = self
                    .plant_names
                    .get(&c.plant_id)
                    .map(String::as_str)
                    .unwrap_or("(unknown plant)");
                let kind_style = Style::default().fg(c.color());
                let line = Line::from(vec![
                    Span::styled(c.created_at_date(), Theme::dim()),
                    Span::raw(" "),
                    Span::styled(format!("[{}]", c.kind_label()), kind_style),
                    Span::raw(" "),
                    Span::styled(name, Theme::normal()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }

    fn render_status_message(&self, area: Rect, buf: &mut Buffer) {
        if let Some(msg) = self.status_message {
            let style = if msg.contains("cannot") || msg.contains("failed") {
                Theme::warning()
            } else {
                Theme::success()
            };
            let para = Paragraph::new(Span::styled(msg, style));
            para.render(area, buf);
        }
    }

    fn render_nav(&self, area: Rect, buf: &mut Buffer) {
        let nav = Line::from(vec![
            Span::styled("[1]", Theme::nav_key()),
            Span::styled("Dashboard ", Theme::nav_label()),
            Span::styled("[2]", Theme::nav_key()),
            Span::styled("Plants ", Theme::nav_label()),
            Span::styled("[3]", Theme::nav_key()),
            Span::styled("Calendar ", Theme::nav_label()),
            Span::styled("[s]", Theme::nav_key()),
            Span::styled("Settings ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled("Quit", Theme::nav_label()),
        ]);

        let para = Paragraph::new(nav);
        para.render(area, buf);
    }
}
