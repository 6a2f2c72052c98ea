use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::input::CharStatus;
use crate::ui::theme::Theme;

/// The word being practised, coloured position by position.
pub struct TypingArea<'a> {
    target: &'a [char],
    input: &'a [char],
    statuses: &'a [CharStatus],
    last_result: Option<bool>,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(
        target: &'a [char],
        input: &'a [char],
        statuses: &'a [CharStatus],
        last_result: Option<bool>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            target,
            input,
            statuses,
            last_result,
            theme,
        }
    }
}

/// Character shown at each position: what was typed where the player got it
/// wrong, otherwise the target.
fn display_chars(target: &[char], input: &[char], statuses: &[CharStatus]) -> Vec<char> {
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| {
            let ch = match status {
                CharStatus::Incorrect => input.get(i).copied(),
                _ => target.get(i).copied(),
            }
            .unwrap_or(' ');
            if ch == ' ' { '\u{00b7}' } else { ch }
        })
        .collect()
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let spans: Vec<Span> = display_chars(self.target, self.input, self.statuses)
            .into_iter()
            .zip(self.statuses)
            .map(|(ch, status)| {
                let style = match status {
                    CharStatus::Correct => Style::default().fg(colors.text_correct()),
                    CharStatus::Incorrect => Style::default()
                        .fg(colors.text_incorrect())
                        .bg(colors.text_incorrect_bg())
                        .add_modifier(Modifier::UNDERLINED),
                    CharStatus::Current => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    CharStatus::Untouched => Style::default().fg(colors.text_pending()),
                };
                Span::styled(ch.to_string(), style.add_modifier(Modifier::BOLD))
            })
            .collect();

        let border = match self.last_result {
            Some(true) => colors.success(),
            Some(false) => colors.error(),
            None => colors.border_focused(),
        };
        let block = Block::bordered()
            .title(" Word ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let inner_height = area.height.saturating_sub(2);
        let mut lines = vec![Line::from(""); (inner_height / 2) as usize];
        lines.push(Line::from(spans));

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::input::classify;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_display_shows_typed_char_on_mismatch() {
        let target = chars("hello");
        let input = chars("hex");
        let statuses = classify(&input, &target);
        let shown: String = display_chars(&target, &input, &statuses).into_iter().collect();
        assert_eq!(shown, "hexlo");
    }

    #[test]
    fn test_display_includes_overtyped_chars() {
        let target = chars("cat");
        let input = chars("cats");
        let statuses = classify(&input, &target);
        let shown: String = display_chars(&target, &input, &statuses).into_iter().collect();
        assert_eq!(shown, "cats");
    }

    #[test]
    fn test_display_marks_typed_space() {
        let target = chars("ab");
        let input = chars("a ");
        let statuses = classify(&input, &target);
        let shown: String = display_chars(&target, &input, &statuses).into_iter().collect();
        assert_eq!(shown, "a\u{00b7}");
    }

    #[test]
    fn test_render_does_not_panic_in_tiny_area() {
        let theme = Theme::default();
        let target = chars("apple");
        let statuses = classify(&[], &target);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        TypingArea::new(&target, &[], &statuses, None, &theme).render(area, &mut buf);
    }
}
