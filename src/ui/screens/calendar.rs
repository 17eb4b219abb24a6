use crate::models::CheckIn;
use crate::ui::components::{CalendarWidget, CareLegend};
use crate::ui::Theme;
use chrono::{Datelike, Local, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};
use std::collections::HashMap;

pub struct CalendarScreen<'a> {
    pub year: i32,
    pub month: u32,
    pub selected_date: Option<NaiveDate>,
    pub check_ins: &'a [CheckIn],
    pub plant_names: &'a HashMap<i64, String>,
}

impl<'a> CalendarScreen<'a> {
    pub fn new(check_ins: &'a [CheckIn], plant_names: &'a HashMap<i64, String>) -> Self {
        let now = Local::now();
        Self {
            year: now.year(),
            month: now.month(),
            selected_date: Some(now.date_naive()),
            check_ins,
            plant_names,
        }
    }

    pub fn with_date(mut self, year: i32, month: u32) -> Self {
        self.year = year;
        self.month = month;
        self
    }

    pub fn selected(mut self, date: Option<NaiveDate>) -> Self {
        self.selected_date = date;
        self
    }

    fn check_ins_for_selected(&self) -> Vec<&CheckIn> {
        match self.selected_date {
            Some(date) => self
                .check_ins
                .iter()
                .filter(|c| c.created_at.with_timezone(&Local).date_naive() == date)
                .collect(),
            None => Vec::new(),
        }
    }
}

impl Widget for CalendarScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Calendar + details
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Care Calendar", Theme::title()),
            Span::styled(" - ", Theme::dim()),
            Span::styled("[←/→] Change month", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let cal_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(6)])
            .split(content[0]);

        CalendarWidget::new(self.year, self.month, self.check_ins)
            .selected(self.selected_date)
            .render(cal_area[0], buf);

        let legend_block = Block::default()
            .title("Legend")
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let legend_inner = legend_block.inner(cal_area[1]);
        legend_block.render(cal_area[1], buf);
        CareLegend.render(legend_inner, buf);

        self.render_details(content[1], buf);

        let nav = Line::from(vec![
            Span::styled("[1-3]", Theme::nav_key()),
            Span::styled("Screens ", Theme::nav_label()),
            Span::styled("[←/→]", Theme::nav_key()),
            Span::styled("Month ", Theme::nav_label()),
            Span::styled("[Esc]", Theme::nav_key()),
            Span::styled("Back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(chunks[2], buf);
    }
}

impl CalendarScreen<'_> {
    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let date_str = self
            .selected_date
            .map(|d| d.format("%B %d, %Y").to_string())
            .unwrap_or_else(|| "No date selected".to_string());

        let block = Block::default()
            .title(date_str)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let check_ins = self.check_ins_for_selected();

        if check_ins.is_empty() {
            let para = Paragraph::new(Span::styled("No check-ins on this date", Theme::dim()));
            para.render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = check_ins
            .iter()
            .map(|c| {
                let name = self
                    .plant_names
                    .get(&c.plant_id)
                    .map(String::as_str)
                    .unwrap_or("(unknown plant)");

                let mut lines = vec![Line::from(vec![
                    Span::styled("● ", Style::default().fg(c.color())),
                    Span::styled(name, Theme::header()),
                    Span::styled(format!(" [{}]", c.kind_label()), Theme::dim()),
                ])];

                if let Some(ref notes) = c.notes {
                    lines.push(Line::from(vec![
                        Span::styled("  Notes: ", Theme::dim()),
                        Span::styled(notes, Theme::normal()),
                    ]));
                }

                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items);
        list.render(inner, buf);
    }
}
