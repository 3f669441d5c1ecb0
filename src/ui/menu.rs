use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::Theme;
use crate::session::{DeathReason, DeathReport};

/// Draws the start screen as a centered popup.
pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect, high_score: u32, theme: &Theme) {
    let popup = centered_popup(area, 70, 45);
    frame.render_widget(Clear, popup);

    let [title_row, body_row, footer_row] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(2),
    ])
    .areas(popup);

    frame.render_widget(
        Paragraph::new(Line::from("SNAKE"))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(theme.menu_title)
                    .add_modifier(Modifier::BOLD),
            ),
        title_row,
    );

    let body = vec![
        Line::from(format!("High score: {high_score}")),
        Line::from(""),
        Line::from("[Enter]/[Space] Start"),
        Line::from("[Q]/[Esc] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" start ")),
        body_row,
    );

    frame.render_widget(
        Paragraph::new(Line::from("Use arrows or WASD to steer"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.menu_footer)),
        footer_row,
    );
}

/// Draws the dead screen as a centered popup.
pub fn render_dead_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    report: &DeathReport,
    high_score: u32,
    theme: &Theme,
) {
    let popup = centered_popup(area, 70, 45);
    frame.render_widget(Clear, popup);

    let is_new_high = report.score >= high_score && report.score > 0;
    let lines = vec![
        Line::from("YOU DEAD").style(
            Style::default()
                .fg(theme.menu_title)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("Score: {}", report.score)),
        Line::from(format!("Length: {}", report.length)),
        Line::from(match report.reason {
            DeathReason::WallCollision => "Cause: hit the wall",
            DeathReason::SelfCollision => "Cause: bit yourself",
        }),
        Line::from(if is_new_high { "New high score!" } else { "" }),
        Line::from(""),
        Line::from("[Enter]/[Space] Play Again"),
        Line::from("[Q]/[Esc] Quit"),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" game over ")),
        popup,
    );
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}
