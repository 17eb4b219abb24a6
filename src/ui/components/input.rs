use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct InputWidget<'a> {
    label: &'a str,
    value: &'a str,
    placeholder: &'a str,
    focused: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(label: &'a str, value: &'a str) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            focused: false,
        }
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        if self.focused {
            // Block cursor at the end of the value
            let line = Line::from(vec![
                Span::raw(self.value),
                Span::styled(" ", Theme::selected()),
            ]);
            Paragraph::new(line).render(inner, buf);
        } else if self.value.is_empty() && !self.placeholder.is_empty() {
            Paragraph::new(Span::styled(self.placeholder, Theme::dim())).render(inner, buf);
        } else {
            Paragraph::new(self.value).render(inner, buf);
        }
    }
}
