//! ascii-circles — drifting circles in the terminal.
//!
//! - `engine`: the animation core (clock, shape buffer, commands, controller)
//! - `renderer`: rasterizes the shape buffer into a cell grid
//! - `player`: crossterm host driving the engine
//! - `config`: JSON configuration and validation

pub mod config;
pub mod engine;
pub mod error;
pub mod menubar;
pub mod player;
pub mod renderer;
pub mod types;
