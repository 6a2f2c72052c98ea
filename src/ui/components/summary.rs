use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::session::result::SessionSummary;
use crate::ui::theme::Theme;

/// End-of-session dialog.
pub struct SummaryDialog<'a> {
    summary: &'a SessionSummary,
    theme: &'a Theme,
}

impl<'a> SummaryDialog<'a> {
    pub fn new(summary: &'a SessionSummary, theme: &'a Theme) -> Self {
        Self { summary, theme }
    }
}

impl Widget for SummaryDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.summary;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Session Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(inner);

        Paragraph::new(Line::from(Span::styled(
            s.reason_label(),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let acc_color = if s.accuracy >= 95.0 {
            colors.success()
        } else if s.accuracy >= 85.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let error_color = if s.total_errors == 0 {
            colors.success()
        } else {
            colors.error()
        };

        let row = |label: &'static str, value: String, style: Style| {
            Line::from(vec![
                Span::styled(label, Style::default().fg(colors.fg())),
                Span::styled(value, style),
            ])
        };
        let lines = vec![
            row(
                "  Characters typed: ",
                s.total_typed.to_string(),
                Style::default().fg(colors.fg()),
            ),
            row(
                "  Errors:           ",
                s.total_errors.to_string(),
                Style::default().fg(error_color),
            ),
            row(
                "  Accuracy:         ",
                s.accuracy_label(),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
            row(
                "  Words completed:  ",
                s.words_completed.to_string(),
                Style::default().fg(colors.fg()),
            ),
            row(
                "  Final score:      ",
                s.score.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            row(
                "  Finished:         ",
                s.ended_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
                Style::default().fg(colors.muted()),
            ),
        ];
        Paragraph::new(lines).render(layout[1], buf);

        Paragraph::new(Line::from(Span::styled(
            "  [Enter/Esc] Close  [l] Lists  [q] Quit",
            Style::default().fg(colors.accent()),
        )))
        .render(layout[2], buf);
    }
}
