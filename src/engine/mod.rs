//! Engine — the animation core.
//!
//! Keeps a bounded FIFO of circles, moves them on a fixed-period clock and
//! spawns new ones on a cadence, steered by keyboard commands.
//!
//! The engine never touches a terminal. Scheduling, drawing and notices go
//! through the collaborator traits in `controller`, which the host implements.

pub mod buffer;
pub mod clock;
pub mod command;
pub mod controller;
pub mod factory;
pub mod motion;

pub use buffer::{Shape, ShapeBuffer, ShapeFactory};
pub use clock::FrameClock;
pub use command::{Command, CommandInterpreter, Effect, Key, KeyInput, Keymap};
pub use controller::{
    AnimationController, FrameRequest, FrameScheduler, Notifier, RenderSink, RunState,
};
pub use factory::{Palette, RandomShapeFactory};
pub use motion::{Cadence, Velocity};
