use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

/// Movement axis. Exactly one axis is active per direction.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
}

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Axis this direction moves along.
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Up | Self::Down => Axis::Y,
        }
    }

    /// Movement sign along the active axis (screen coordinates: down and
    /// right are positive).
    #[must_use]
    pub fn sign(self) -> i32 {
        match self {
            Self::Up | Self::Left => -1,
            Self::Down | Self::Right => 1,
        }
    }

    /// Pixel offset of one `step` along this direction.
    #[must_use]
    pub fn offset(self, step: i32) -> (i32, i32) {
        match self.axis() {
            Axis::X => (self.sign() * step, 0),
            Axis::Y => (0, self.sign() * step),
        }
    }
}

/// High-level input events consumed by the run loop.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameInput {
    Direction(Direction),
    Confirm,
    Quit,
}

/// Polls for one decoded input event, waiting at most `timeout`.
///
/// Key codes with no game meaning are swallowed here so the session never
/// sees malformed input.
pub fn poll_input(timeout: Duration) -> io::Result<Option<GameInput>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }

    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(map_key(key.code)),
        _ => Ok(None),
    }
}

fn map_key(code: KeyCode) -> Option<GameInput> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(GameInput::Direction(Direction::Up)),
        KeyCode::Down | KeyCode::Char('s') => Some(GameInput::Direction(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(GameInput::Direction(Direction::Left)),
        KeyCode::Right | KeyCode::Char('d') => Some(GameInput::Direction(Direction::Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(GameInput::Confirm),
        KeyCode::Esc | KeyCode::Char('q') => Some(GameInput::Quit),
        _ => None,
    }
}
