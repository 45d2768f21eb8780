//! AnimationController — ties the clock, buffer, motion state and command
//! interpreter together and talks to the host through the collaborator traits.
//!
//! The host owns the actual callback loop. The controller only ever asks for
//! one more frame (`FrameScheduler::request_frame`) and the host answers by
//! calling `on_frame` with its current timestamp.

use std::num::NonZeroUsize;

use tracing::{debug, info};

use crate::config::Settings;

use super::buffer::{ShapeBuffer, ShapeFactory};
use super::clock::FrameClock;
use super::command::{CommandInterpreter, Effect, KeyInput};
use super::motion::{Cadence, Velocity};

// ---------------------------------------------------------------------------
// Host collaborators
// ---------------------------------------------------------------------------

/// Handle for one outstanding frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

pub trait FrameScheduler {
    /// Ask to be called back (via `AnimationController::on_frame`) once more.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request made earlier. Unknown or already delivered handles
    /// are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

pub trait RenderSink {
    /// Reflect the buffer's current membership and positions.
    fn render(&mut self, shapes: &ShapeBuffer);
}

pub trait Notifier {
    fn notify(&mut self, text: &str);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Never started, or stopped explicitly.
    Stopped,
    Running,
    /// Stopped through `toggle`. Schedules exactly like `Stopped`.
    Paused,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

pub struct AnimationController<F> {
    clock: FrameClock,
    buffer: ShapeBuffer,
    velocity: Velocity,
    cadence: Cadence,
    interpreter: CommandInterpreter,
    factory: F,
    state: RunState,
    pending: Option<FrameRequest>,
}

impl<F: ShapeFactory> AnimationController<F> {
    pub fn new(settings: &Settings, factory: F) -> Self {
        Self {
            clock: FrameClock::new(settings.frame_period_seconds),
            buffer: ShapeBuffer::with_capacity(settings.max_shapes),
            velocity: settings.velocity,
            cadence: settings.cadence,
            interpreter: CommandInterpreter::new(settings.keymap.clone()),
            factory,
            state: RunState::Stopped,
            pending: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn shapes(&self) -> &ShapeBuffer {
        &self.buffer
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn set_max_shapes(&mut self, max_shapes: NonZeroUsize) {
        self.buffer.set_max_shapes(max_shapes);
    }

    /// Start animating. Does nothing if already running.
    pub fn start(&mut self, host: &mut impl FrameScheduler) {
        if !self.state.is_running() {
            info!("animation started");
        }
        self.state = RunState::Running;
        self.arm(host);
    }

    pub fn stop(&mut self, host: &mut impl FrameScheduler) {
        if self.state.is_running() {
            info!(frames = self.clock.frame_count(), "animation stopped");
        }
        self.state = RunState::Stopped;
        self.disarm(host);
    }

    /// Flip between running and paused. Only resuming re-arms the callback.
    pub fn toggle(&mut self, host: &mut impl FrameScheduler) {
        if self.state.is_running() {
            self.state = RunState::Paused;
            self.disarm(host);
            info!("animation paused");
        } else {
            self.state = RunState::Running;
            self.arm(host);
            info!("animation resumed");
        }
    }

    /// Host callback. Does nothing (and does not re-register) unless running.
    pub fn on_frame<H: FrameScheduler + RenderSink>(&mut self, timestamp_ms: f64, host: &mut H) {
        self.pending = None;
        if !self.state.is_running() {
            return;
        }

        if self.clock.tick(timestamp_ms) {
            self.buffer.advance_all(&self.velocity);
            host.render(&self.buffer);

            let frames_per_spawn = self.cadence.frames_per_spawn(self.clock.period_seconds());
            if self.clock.frame_count() % frames_per_spawn == 0 {
                if let Some(evicted) = self.buffer.spawn(&mut self.factory) {
                    debug!(x = evicted.x, y = evicted.y, "evicted oldest shape");
                }
                host.render(&self.buffer);
            }
        }

        self.arm(host);
    }

    /// Interpret one key press from the host.
    pub fn handle_key<H: FrameScheduler + Notifier>(&mut self, input: KeyInput, host: &mut H) {
        let Some(command) = self.interpreter.normalize(input) else {
            return;
        };
        debug!(?command, "key command");
        match self.interpreter.apply(command, &mut self.velocity, &mut self.cadence) {
            Effect::None => {}
            Effect::ToggleRunning => self.toggle(host),
            Effect::Notify(text) => host.notify(&text),
        }
    }

    fn arm(&mut self, host: &mut impl FrameScheduler) {
        if self.pending.is_none() {
            self.pending = Some(host.request_frame());
        }
    }

    fn disarm(&mut self, host: &mut impl FrameScheduler) {
        if let Some(request) = self.pending.take() {
            host.cancel_frame(request);
        }
    }
}
