//! Tick-driven grid snake simulation.
//!
//! The simulation core (`snake`, `food`, `clock`, `session`) is pure state
//! machinery: positions are pixel coordinates aligned to a fixed grid, one
//! tick moves the snake one cell, and collisions end the session. Rendering,
//! input, and score persistence are collaborators behind the sink traits in
//! [`session`], with terminal implementations in [`renderer`], [`input`],
//! and [`score`].

pub mod clock;
pub mod config;
pub mod food;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod score;
pub mod session;
pub mod snake;
pub mod ui;
