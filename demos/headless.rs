//! Drives the animation core without a terminal: a scripted host delivers
//! callbacks at a jittery 90 Hz, a few key presses steer the drift, and the
//! final canvas is printed as plain text.
//!
//! Run with: cargo run --example headless

use ascii_circles::{
    config::AnimationConfig,
    engine::{
        AnimationController, FrameRequest, FrameScheduler, Key, KeyInput, Notifier,
        RandomShapeFactory, RenderSink, ShapeBuffer,
    },
    renderer::Canvas,
    types::Surface,
};

struct ScriptedHost {
    canvas: Canvas,
    pending: Option<FrameRequest>,
    next: u64,
}

impl FrameScheduler for ScriptedHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.next += 1;
        self.pending = Some(FrameRequest(self.next));
        FrameRequest(self.next)
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

impl RenderSink for ScriptedHost {
    fn render(&mut self, shapes: &ShapeBuffer) {
        self.canvas.render(shapes);
    }
}

impl Notifier for ScriptedHost {
    fn notify(&mut self, text: &str) {
        println!("{text}\n");
    }
}

fn main() -> anyhow::Result<()> {
    let surface = Surface {
        width: 72,
        height: 20,
    };
    let config = AnimationConfig {
        max_shapes: 12,
        seed: Some(2024),
        ..Default::default()
    };
    let settings = config.validate()?;

    let factory = RandomShapeFactory::new(
        surface,
        settings.radius.clone(),
        settings.palette.clone(),
        settings.seed,
    );
    let mut controller = AnimationController::new(&settings, factory);
    let mut host = ScriptedHost {
        canvas: Canvas::new(surface),
        pending: None,
        next: 0,
    };

    controller.handle_key(KeyInput::plain(Key::Char('h')), &mut host);
    controller.start(&mut host);

    let mut now_ms = 0.0;
    for callback in 0..600u32 {
        // Roughly 11ms apart, with a little jitter.
        now_ms += 11.1 + (callback % 3) as f64;
        match callback {
            200 => controller.handle_key(KeyInput::plain(Key::Right), &mut host),
            300 => controller.handle_key(KeyInput::shifted(Key::Down), &mut host),
            _ => {}
        }
        if host.pending.take().is_some() {
            controller.on_frame(now_ms, &mut host);
        }
    }
    controller.stop(&mut host);

    for row in host.canvas.grid() {
        let line: String = row.iter().map(|cell| cell.ch).collect();
        println!("|{line}|");
    }
    let velocity = controller.velocity();
    println!(
        "\n{} frames, {} shapes, drift ({}, {}), delay {:.1}s",
        controller.clock().frame_count(),
        controller.shapes().len(),
        velocity.dx,
        velocity.dy,
        controller.cadence().delay_seconds(),
    );
    Ok(())
}
