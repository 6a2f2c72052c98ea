use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Difficulty lists the player can pick from.
#[derive(Clone, Debug, Default)]
pub struct ListMenu {
    pub items: Vec<String>,
    pub selected: usize,
}

impl ListMenu {
    pub fn new(items: Vec<String>, current: Option<&str>) -> Self {
        let selected = current
            .and_then(|c| items.iter().position(|i| i == c))
            .unwrap_or(0);
        Self { items, selected }
    }

    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }
}

pub struct ListMenuView<'a> {
    menu: &'a ListMenu,
    loading: Option<&'a str>,
    error: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> ListMenuView<'a> {
    pub fn new(
        menu: &'a ListMenu,
        loading: Option<&'a str>,
        error: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            menu,
            loading,
            error,
            theme,
        }
    }
}

impl Widget for ListMenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "tajamaster",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Vocabulary Typing Trainer",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let status = match (self.loading, self.error) {
            (Some(id), _) => Line::from(Span::styled(
                format!("Loading '{id}'..."),
                Style::default().fg(colors.warning()),
            )),
            (None, Some(err)) => Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(colors.error()),
            )),
            (None, None) => Line::from(Span::styled(
                "Choose a word list",
                Style::default().fg(colors.muted()),
            )),
        };
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(layout[1], buf);

        let dimmed = self.loading.is_some();
        let lines: Vec<Line> = self
            .menu
            .items
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let is_selected = i == self.menu.selected;
                let indicator = if is_selected { ">" } else { " " };
                let fg = if dimmed {
                    colors.text_pending()
                } else if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                };
                let modifier = if is_selected && !dimmed {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                };
                Line::from(Span::styled(
                    format!("  {indicator} {name}"),
                    Style::default().fg(fg).add_modifier(modifier),
                ))
            })
            .collect();
        Paragraph::new(lines).render(layout[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> ListMenu {
        ListMenu::new(
            vec!["advanced".into(), "beginner".into(), "intermediate".into()],
            Some("beginner"),
        )
    }

    #[test]
    fn test_menu_starts_on_current_list() {
        assert_eq!(menu().selected_item(), Some("beginner"));
    }

    #[test]
    fn test_menu_wraps_both_ways() {
        let mut m = menu();
        m.next();
        m.next();
        assert_eq!(m.selected_item(), Some("advanced"));
        m.prev();
        assert_eq!(m.selected_item(), Some("intermediate"));
    }

    #[test]
    fn test_empty_menu_is_inert() {
        let mut m = ListMenu::new(Vec::new(), None);
        m.next();
        m.prev();
        assert_eq!(m.selected_item(), None);
    }
}
