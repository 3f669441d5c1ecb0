use std::io;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;

use crate::config::{GLYPH_FOOD, GLYPH_SEGMENT, Stage, Theme};
use crate::geometry::Vec2;
use crate::session::{DeathReport, FrameSnapshot, RenderSink};
use crate::ui::hud::{HudInfo, render_hud};
use crate::ui::menu::{render_dead_menu, render_start_menu};

/// Render sink drawing to the terminal through ratatui.
///
/// Owns the raw-mode/alternate-screen lifecycle; terminal state is restored
/// best-effort on drop. Draw failures are parked in `last_error` because the
/// sink contract has no error channel; the run loop collects them between
/// frames.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    stage: Stage,
    theme: &'static Theme,
    high_score: u32,
    last_error: Option<io::Error>,
}

impl TerminalRenderer {
    /// Enters raw mode and the alternate screen, and hides the cursor.
    pub fn new(stage: Stage, theme: &'static Theme) -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(error);
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = match Terminal::new(backend) {
            Ok(terminal) => terminal,
            Err(error) => {
                let _ = cleanup_terminal_best_effort();
                return Err(error);
            }
        };

        Ok(Self {
            terminal,
            stage,
            theme,
            high_score: 0,
            last_error: None,
        })
    }

    /// Updates the high score shown in the HUD and menus.
    pub fn set_high_score(&mut self, high_score: u32) {
        self.high_score = high_score;
    }

    /// Returns and clears the last draw error, if any.
    pub fn take_error(&mut self) -> io::Result<()> {
        match self.last_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Draws the idle start screen.
    pub fn render_start_screen(&mut self) {
        let stage = self.stage;
        let theme = self.theme;
        let high_score = self.high_score;

        let result = self.terminal.draw(|frame| {
            let board = board_rect(frame.area(), stage);
            frame.render_widget(board_block(theme), board);
            render_start_menu(frame, board, high_score, theme);
        });

        if let Err(error) = result {
            self.last_error = Some(error);
        }
    }
}

impl RenderSink for TerminalRenderer {
    fn render_frame(&mut self, snapshot: &FrameSnapshot<'_>) {
        let stage = self.stage;
        let theme = self.theme;
        let high_score = self.high_score;

        let result = self.terminal.draw(|frame| {
            let play_area = render_hud(
                frame,
                frame.area(),
                HudInfo {
                    score: snapshot.score,
                    length: snapshot.snake.len(),
                    high_score,
                },
                theme,
            );

            let board = board_rect(play_area, stage);
            let block = board_block(theme);
            let inner = block.inner(board);
            frame.render_widget(block, board);

            draw_food(frame, inner, stage, snapshot.food.position, theme);
            draw_snake(frame, inner, stage, snapshot, theme);
        });

        if let Err(error) = result {
            self.last_error = Some(error);
        }
    }

    fn render_dead_screen(&mut self, report: &DeathReport) {
        let stage = self.stage;
        let theme = self.theme;
        let high_score = self.high_score;
        let report = *report;

        let result = self.terminal.draw(|frame| {
            let play_area = render_hud(
                frame,
                frame.area(),
                HudInfo {
                    score: report.score,
                    length: report.length,
                    high_score,
                },
                theme,
            );

            let board = board_rect(play_area, stage);
            frame.render_widget(board_block(theme), board);
            render_dead_menu(frame, board, &report, high_score, theme);
        });

        if let Err(error) = result {
            self.last_error = Some(error);
        }
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = cleanup_terminal_best_effort();
    }
}

/// Restores cooked mode and the main screen. Also used by the panic hook.
pub fn cleanup_terminal_best_effort() -> io::Result<()> {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    execute!(stdout, Show, LeaveAlternateScreen)
}

fn board_block(theme: &Theme) -> Block<'static> {
    Block::bordered().border_style(Style::default().fg(theme.border))
}

/// Terminal rectangle of the bordered board: one terminal cell per grid
/// cell, clipped to the available area on small terminals.
fn board_rect(area: Rect, stage: Stage) -> Rect {
    let cols = u16::try_from(stage.cols()).unwrap_or(u16::MAX);
    let rows = u16::try_from(stage.rows()).unwrap_or(u16::MAX);

    Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(cols.saturating_add(2)),
        height: area.height.min(rows.saturating_add(2)),
    }
}

fn draw_food(frame: &mut Frame<'_>, inner: Rect, stage: Stage, position: Vec2, theme: &Theme) {
    let Some((x, y)) = cell_to_terminal(inner, stage, position) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::default().fg(theme.food));
}

fn draw_snake(
    frame: &mut Frame<'_>,
    inner: Rect,
    stage: Stage,
    snapshot: &FrameSnapshot<'_>,
    theme: &Theme,
) {
    let head = snapshot.snake.head();
    let tail = snapshot.snake.segments().last().copied();

    let buffer = frame.buffer_mut();
    for segment in snapshot.snake.segments() {
        let Some((x, y)) = cell_to_terminal(inner, stage, *segment) else {
            continue;
        };

        let style = if *segment == head {
            Style::default()
                .fg(theme.snake_head)
                .add_modifier(Modifier::BOLD)
        } else if Some(*segment) == tail {
            Style::default().fg(theme.snake_tail)
        } else {
            Style::default().fg(theme.snake_body)
        };

        buffer.set_string(x, y, GLYPH_SEGMENT, style);
    }
}

/// Projects a grid-aligned pixel position into the board interior, or `None`
/// when it falls outside the stage or the visible terminal area.
fn cell_to_terminal(inner: Rect, stage: Stage, position: Vec2) -> Option<(u16, u16)> {
    if !stage.contains(position, stage.cell()) {
        return None;
    }

    let col = u16::try_from(position.x / stage.cell()).ok()?;
    let row = u16::try_from(position.y / stage.cell()).ok()?;

    let x = inner.x.saturating_add(col);
    let y = inner.y.saturating_add(row);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
