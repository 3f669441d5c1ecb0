use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::config::Theme;

/// Values displayed by the HUD row.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo {
    pub score: u32,
    pub length: usize,
    pub high_score: u32,
}

/// Renders the one-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, info: HudInfo, theme: &Theme) -> Rect {
    let [play_area, hud_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

    let left = theme.name;
    let right = format!(
        "Length {}  Score {}  Hi {}",
        info.length, info.score, info.high_score
    );

    frame.render_widget(
        Paragraph::new(Line::from(hud_line(left, &right, usize::from(hud_area.width))))
            .style(Style::default().fg(theme.hud_text)),
        hud_area,
    );

    play_area
}

/// Joins the left and right labels with padding so the right label ends at
/// the row edge. Display width, not byte length, decides the padding.
fn hud_line(left: &str, right: &str, row_width: usize) -> String {
    let used = left.width() + right.width();
    let padding = row_width.saturating_sub(used);

    format!("{left}{}{right}", " ".repeat(padding))
}
