use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::word_stats::WordStat;
use crate::words::Word;
use crate::ui::theme::Theme;

/// Meaning, pronunciations and exposure counters of the current word.
pub struct StatsSidebar<'a> {
    word: Option<&'a Word>,
    stat: Option<WordStat>,
    reset_notice: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        word: Option<&'a Word>,
        stat: Option<WordStat>,
        reset_notice: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            word,
            stat,
            reset_notice,
            theme,
        }
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let label = Style::default().fg(colors.muted());
        let value = Style::default().fg(colors.fg());

        let mut lines = Vec::new();
        if let Some(word) = self.word {
            let korean = word.korean_pronunciation.as_deref().unwrap_or("");
            lines.push(Line::from(vec![
                Span::styled("Meaning        ", label),
                Span::styled(
                    or_dash(&word.meaning).to_string(),
                    value.add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Pronunciation  ", label),
                Span::styled(or_dash(&word.pronunciation).to_string(), value),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Korean         ", label),
                Span::styled(or_dash(korean).to_string(), value),
            ]));
            lines.push(Line::from(""));
        }

        let stat = self.stat.unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("Appearances    ", label),
            Span::styled(stat.appearance_count.to_string(), Style::default().fg(colors.accent())),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Resets         ", label),
            Span::styled(stat.reset_count.to_string(), Style::default().fg(colors.accent())),
        ]));

        if let Some(notice) = self.reset_notice {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                notice.to_string(),
                Style::default().fg(colors.warning()),
            )));
        }

        let block = Block::bordered()
            .title(" Details ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
