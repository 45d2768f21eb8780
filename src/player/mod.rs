//! Player — the terminal host.
//!
//! Owns the crossterm session and the callback loop. It delivers frame
//! callbacks at `host_refresh_hz`, forwards key presses, and paints whatever
//! the canvas reports as changed. All animation decisions stay in the engine.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, event, execute, queue, style, terminal};
use tracing::{debug, info};

use crate::config::Settings;
use crate::engine::{
    AnimationController, FrameRequest, FrameScheduler, Key, KeyInput, Notifier,
    RandomShapeFactory, RenderSink, ShapeBuffer,
};
use crate::menubar::{self, Hint};
use crate::renderer::Canvas;
use crate::types::{Color, NamedColor, Style, Surface};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
/// Menu bar plus status bar.
const CHROME_ROWS: u16 = 2;

// ---------------------------------------------------------------------------
// Host side of the engine's collaborator traits
// ---------------------------------------------------------------------------

/// Scheduler, render sink and notifier backed by the terminal loop.
pub struct TerminalHost {
    next_request: u64,
    pending: Option<FrameRequest>,
    canvas: Canvas,
    notice: Option<String>,
    notice_drawn: bool,
}

impl TerminalHost {
    pub fn new(surface: Surface) -> Self {
        Self {
            next_request: 0,
            pending: None,
            canvas: Canvas::new(surface),
            notice: None,
            notice_drawn: false,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Hand out the pending request, if any. The loop then owes exactly one
    /// `on_frame` call.
    pub fn take_due(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Drop the current notice. Returns whether there was one to drop.
    pub fn dismiss_notice(&mut self) -> bool {
        self.notice_drawn = false;
        self.notice.take().is_some()
    }

    pub fn resize(&mut self, surface: Surface, shapes: &ShapeBuffer) {
        self.canvas.resize(surface, shapes);
        self.notice_drawn = false;
    }

    /// Paint changed canvas cells, then the notice on top if it was hit.
    pub fn flush(&mut self, out: &mut impl Write) -> Result<()> {
        let changes = self.canvas.take_changes();
        for change in &changes {
            queue!(
                out,
                cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                style::PrintStyledContent(style::StyledContent::new(
                    to_content_style(&change.cell.style),
                    change.cell.ch,
                )),
            )?;
        }

        if let Some(text) = &self.notice {
            if !self.notice_drawn || !changes.is_empty() {
                draw_notice(out, text, self.canvas.surface())?;
                self.notice_drawn = true;
            }
        }

        out.flush()?;
        Ok(())
    }
}

impl FrameScheduler for TerminalHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

impl RenderSink for TerminalHost {
    fn render(&mut self, shapes: &ShapeBuffer) {
        self.canvas.render(shapes);
    }
}

impl Notifier for TerminalHost {
    fn notify(&mut self, text: &str) {
        info!("showing notice");
        self.notice = Some(text.to_string());
        self.notice_drawn = false;
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub struct Player {
    settings: Settings,
    controller: AnimationController<RandomShapeFactory>,
    host: TerminalHost,
    hints: Vec<Hint>,
    started: Instant,
    last_status: String,
}

impl Player {
    pub fn new(settings: Settings) -> Result<Self> {
        let (term_w, term_h) = terminal::size()?;
        if term_h <= CHROME_ROWS || term_w == 0 {
            bail!(
                "Terminal too small: need at least 1x{}, have {}x{}",
                CHROME_ROWS + 1,
                term_w,
                term_h,
            );
        }
        let surface = canvas_surface(term_w, term_h);

        let factory = RandomShapeFactory::new(
            surface,
            settings.radius.clone(),
            settings.palette.clone(),
            settings.seed,
        );
        let controller = AnimationController::new(&settings, factory);
        let hints = menubar::hints(&settings.keymap, &settings.quit.to_string());

        Ok(Self {
            settings,
            controller,
            host: TerminalHost::new(surface),
            hints,
            started: Instant::now(),
            last_status: String::new(),
        })
    }

    /// Run the animation in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let refresh = Duration::from_secs_f64(1.0 / self.settings.host_refresh_hz as f64);
        self.controller.start(&mut self.host);
        self.full_redraw(stdout)?;

        loop {
            if event::poll(refresh)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.is_quit(&key) {
                            break;
                        }
                        if self.host.dismiss_notice() {
                            self.full_redraw(stdout)?;
                        }
                        if let Some(input) = key_input(&key) {
                            self.controller.handle_key(input, &mut self.host);
                        }
                    }
                    Event::Resize(w, h) => self.resize(stdout, w, h)?,
                    _ => {}
                }
            }

            if self.host.take_due().is_some() {
                let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                self.controller.on_frame(now_ms, &mut self.host);
            }

            self.host.flush(stdout)?;
            self.render_status(stdout)?;
        }

        self.controller.stop(&mut self.host);
        info!(
            frames = self.controller.clock().frame_count(),
            shapes = self.controller.shapes().len(),
            "player exiting"
        );
        Ok(())
    }

    fn is_quit(&self, key: &KeyEvent) -> bool {
        if key.code == KeyCode::Esc {
            return true;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return key.code == KeyCode::Char('c');
        }
        key_input(key).is_some_and(|input| self.settings.quit.matches(input.key))
    }

    fn resize(&mut self, stdout: &mut io::Stdout, w: u16, h: u16) -> Result<()> {
        let surface = canvas_surface(w, h);
        debug!(width = surface.width, height = surface.height, "terminal resized");
        self.controller.factory_mut().set_bounds(surface);
        self.host.resize(surface, self.controller.shapes());
        self.full_redraw(stdout)
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn full_redraw(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        self.render_menubar(stdout)?;
        self.host.canvas.invalidate();
        self.host.notice_drawn = false;
        self.host.flush(stdout)?;
        self.last_status.clear();
        self.render_status(stdout)
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
        )?;
        menubar::print_hints(stdout, &self.hints)?;
        stdout.flush()?;
        Ok(())
    }

    fn render_status(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let status = status_line(&self.controller);
        if status == self.last_status {
            return Ok(());
        }

        let status_y = self.host.canvas.surface().height + CANVAS_OFFSET;
        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status.as_str())),
        )?;
        stdout.flush()?;
        self.last_status = status;
        Ok(())
    }
}

fn canvas_surface(term_w: u16, term_h: u16) -> Surface {
    Surface {
        width: term_w,
        height: term_h.saturating_sub(CHROME_ROWS),
    }
}

pub fn status_line<F>(controller: &AnimationController<F>) -> String
where
    F: crate::engine::ShapeFactory,
{
    let state = if controller.is_running() { "running" } else { "paused" };
    let velocity = controller.velocity();
    format!(
        " {state} | dx {} dy {} | delay {:.1}s | shapes {}/{} | frame {} ",
        velocity.dx,
        velocity.dy,
        controller.cadence().delay_seconds(),
        controller.shapes().len(),
        controller.shapes().max_shapes(),
        controller.clock().frame_count(),
    )
}

/// Translate a crossterm key event into the engine's key input. Chords with
/// Ctrl or Alt are not plain bindings and translate to nothing.
pub fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(KeyInput {
        key: code,
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    })
}

fn draw_notice(out: &mut impl Write, text: &str, surface: Surface) -> Result<()> {
    let lines: Vec<&str> = text.lines().collect();
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let box_w = (inner + 4).min(surface.width);
    let box_h = (lines.len() as u16 + 2).min(surface.height);
    if box_w < 4 || box_h < 3 {
        return Ok(());
    }
    let left = (surface.width - box_w) / 2;
    let top = (surface.height - box_h) / 2 + CANVAS_OFFSET;

    let mut cs = style::ContentStyle::default();
    cs.attributes.set(style::Attribute::Bold);
    let horizontal = "─".repeat(box_w as usize - 2);

    queue!(
        out,
        cursor::MoveTo(left, top),
        style::PrintStyledContent(style::StyledContent::new(cs, format!("┌{horizontal}┐"))),
    )?;
    for (i, line) in lines.iter().take(box_h as usize - 2).enumerate() {
        let body: String = line.chars().take(box_w as usize - 4).collect();
        queue!(
            out,
            cursor::MoveTo(left, top + 1 + i as u16),
            style::PrintStyledContent(style::StyledContent::new(
                cs,
                format!("│ {body:<width$} │", width = box_w as usize - 4),
            )),
        )?;
    }
    queue!(
        out,
        cursor::MoveTo(left, top + box_h - 1),
        style::PrintStyledContent(style::StyledContent::new(cs, format!("└{horizontal}┘"))),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    cs
}

pub fn to_ct_color(c: Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb { r, g, b },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Shape;

    const SURFACE: Surface = Surface {
        width: 30,
        height: 12,
    };

    #[test]
    fn scheduler_hands_out_one_request_at_a_time() {
        let mut host = TerminalHost::new(SURFACE);
        let first = host.request_frame();
        let second = host.request_frame();
        assert_ne!(first, second);
        assert_eq!(host.take_due(), Some(second));
        assert_eq!(host.take_due(), None);
    }

    #[test]
    fn cancel_only_drops_matching_request() {
        let mut host = TerminalHost::new(SURFACE);
        let stale = host.request_frame();
        let live = host.request_frame();
        host.cancel_frame(stale);
        assert_eq!(host.take_due(), Some(live));

        let request = host.request_frame();
        host.cancel_frame(request);
        assert_eq!(host.take_due(), None);
    }

    #[test]
    fn notice_is_drawn_once_until_dismissed() {
        let mut host = TerminalHost::new(SURFACE);
        host.notify("Keys\n  Space pause");
        assert_eq!(host.notice(), Some("Keys\n  Space pause"));

        let mut out = Vec::new();
        host.flush(&mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("Space pause"));

        let mut again = Vec::new();
        host.flush(&mut again).unwrap();
        assert!(again.is_empty());

        assert!(host.dismiss_notice());
        assert!(!host.dismiss_notice());
    }

    #[test]
    fn flush_paints_rendered_shapes() {
        let mut host = TerminalHost::new(SURFACE);
        let mut buffer = ShapeBuffer::new(1).unwrap();
        buffer.spawn(&mut || Shape::new(4, 4, 1, Color::Named(NamedColor::Green)));
        host.render(&buffer);

        let mut out = Vec::new();
        host.flush(&mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains('█'));
    }

    #[test]
    fn key_translation_keeps_shift() {
        let event = KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT);
        assert_eq!(key_input(&event), Some(KeyInput::shifted(Key::Up)));
        let event = KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(key_input(&event), None);
    }

    #[test]
    fn shifted_help_letter_shows_help() {
        let mut host = TerminalHost::new(SURFACE);
        let mut controller = AnimationController::new(&Settings::default(), || {
            Shape::new(0, 0, 1, Color::Named(NamedColor::Green))
        });

        let event = KeyEvent::new(KeyCode::Char('H'), KeyModifiers::SHIFT);
        let input = key_input(&event).unwrap();
        controller.handle_key(input, &mut host);
        assert!(host.notice().is_some_and(|text| text.contains("pause / resume")));
    }

    #[test]
    fn ctrl_and_alt_chords_are_not_bindings() {
        for modifiers in [KeyModifiers::CONTROL, KeyModifiers::ALT] {
            assert_eq!(key_input(&KeyEvent::new(KeyCode::Left, modifiers)), None);
            assert_eq!(key_input(&KeyEvent::new(KeyCode::Char('h'), modifiers)), None);
        }

        let mut host = TerminalHost::new(SURFACE);
        let mut controller = AnimationController::new(&Settings::default(), || {
            Shape::new(0, 0, 1, Color::Named(NamedColor::Green))
        });
        let before = controller.velocity();
        let event = KeyEvent::new(KeyCode::Down, KeyModifiers::ALT);
        if let Some(input) = key_input(&event) {
            controller.handle_key(input, &mut host);
        }
        assert_eq!(controller.velocity(), before);
    }

    #[test]
    fn canvas_leaves_room_for_chrome() {
        assert_eq!(canvas_surface(80, 24), Surface { width: 80, height: 22 });
        assert_eq!(canvas_surface(80, 1).height, 0);
    }

    #[test]
    fn rgb_maps_straight_through() {
        assert_eq!(
            to_ct_color(Color::from_hex(0x0A0B0C)),
            style::Color::Rgb {
                r: 0x0A,
                g: 0x0B,
                b: 0x0C
            }
        );
    }
}
