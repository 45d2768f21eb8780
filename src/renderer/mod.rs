//! Renderer — the deterministic rasterizer.
//!
//! Turns the shape buffer into a fixed-size cell grid and reports cell-level
//! diffs against what was last handed to the terminal.
//!
//! The renderer knows nothing about time, input or terminals. It is the
//! core's `RenderSink`: every call simply re-rasterizes the buffer.

use crate::engine::{RenderSink, Shape, ShapeBuffer};
use crate::types::{Cell, CellChange, Style, Surface};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

const FILL: char = '█';

pub struct Canvas {
    surface: Surface,
    /// What the terminal currently shows.
    shown: Vec<Vec<Cell>>,
    /// Latest rasterized frame.
    current: Vec<Vec<Cell>>,
}

impl Canvas {
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            shown: blank(surface),
            current: blank(surface),
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.current
    }

    /// Change size. The terminal is assumed blank afterwards, so the next
    /// `take_changes` repaints every non-empty cell.
    pub fn resize(&mut self, surface: Surface, shapes: &ShapeBuffer) {
        self.surface = surface;
        self.shown = blank(surface);
        self.current = Self::rasterize(shapes, surface);
    }

    /// Forget what the terminal shows, e.g. after it was cleared.
    pub fn invalidate(&mut self) {
        self.shown = blank(self.surface);
    }

    /// Cells that differ from the last call, then mark them as shown.
    pub fn take_changes(&mut self) -> Vec<CellChange> {
        let changes = Self::diff(&self.shown, &self.current);
        self.shown.clone_from(&self.current);
        changes
    }

    /// Rasterize every shape as a filled disc, oldest first so newer shapes
    /// paint over older ones. Anything outside the surface is clipped.
    pub fn rasterize(shapes: &ShapeBuffer, surface: Surface) -> Vec<Vec<Cell>> {
        let mut grid = blank(surface);
        for shape in shapes.iter() {
            Self::draw_disc(&mut grid, shape, surface);
        }
        grid
    }

    fn draw_disc(grid: &mut [Vec<Cell>], shape: &Shape, surface: Surface) {
        let r = shape.radius() as f64;
        let reach_x = (r * CELL_ASPECT).ceil() as i64;
        let reach_y = r.ceil() as i64;

        let x0 = (shape.x - reach_x).max(0);
        let x1 = (shape.x + reach_x).min(surface.width as i64 - 1);
        let y0 = (shape.y - reach_y).max(0);
        let y1 = (shape.y + reach_y).min(surface.height as i64 - 1);

        let style = Style {
            fg: Some(shape.color()),
        };

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let dx = (cx - shape.x) as f64 / CELL_ASPECT;
                let dy = (cy - shape.y) as f64;
                if dx * dx + dy * dy <= r * r {
                    grid[cy as usize][cx as usize] = Cell { ch: FILL, style };
                }
            }
        }
    }

    /// Compute a cell-level diff between two grids of the same size.
    fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: *next_cell,
                    });
                }
            }
        }
        changes
    }
}

impl RenderSink for Canvas {
    fn render(&mut self, shapes: &ShapeBuffer) {
        self.current = Self::rasterize(shapes, self.surface);
    }
}

fn blank(surface: Surface) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); surface.width as usize]; surface.height as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Velocity;
    use crate::types::{Color, NamedColor};

    const SURFACE: Surface = Surface {
        width: 20,
        height: 10,
    };

    fn buffer_of(shapes: Vec<Shape>) -> ShapeBuffer {
        let mut buffer = ShapeBuffer::new(shapes.len().max(1)).unwrap();
        let mut shapes = shapes.into_iter();
        for _ in 0..buffer.max_shapes() {
            if let Some(shape) = shapes.next() {
                buffer.spawn(&mut || shape.clone());
            }
        }
        buffer
    }

    fn red(x: i64, y: i64, radius: u16) -> Shape {
        Shape::new(x, y, radius, Color::Named(NamedColor::Red))
    }

    #[test]
    fn unit_disc_is_wider_than_tall() {
        let grid = Canvas::rasterize(&buffer_of(vec![red(5, 5, 1)]), SURFACE);
        let filled = |x: usize, y: usize| grid[y][x].ch == FILL;
        assert!(filled(5, 5));
        assert!(filled(3, 5) && filled(7, 5));
        assert!(filled(5, 4) && filled(5, 6));
        assert!(!filled(2, 5));
        assert!(!filled(4, 4));
    }

    #[test]
    fn newer_shapes_paint_over_older_ones() {
        let older = red(5, 5, 2);
        let newer = Shape::new(5, 5, 1, Color::Named(NamedColor::Blue));
        let grid = Canvas::rasterize(&buffer_of(vec![older, newer]), SURFACE);
        assert_eq!(grid[5][5].style.fg, Some(Color::Named(NamedColor::Blue)));
        assert_eq!(grid[3][5].style.fg, Some(Color::Named(NamedColor::Red)));
    }

    #[test]
    fn off_surface_shapes_are_clipped() {
        let shapes = vec![red(-3, -3, 2), red(100, 4, 3), red(19, 9, 4)];
        let grid = Canvas::rasterize(&buffer_of(shapes), SURFACE);
        assert_eq!(grid.len(), 10);
        assert!(grid.iter().all(|row| row.len() == 20));
        assert_eq!(grid[9][19].ch, FILL);
    }

    #[test]
    fn changes_follow_movement() {
        let mut buffer = buffer_of(vec![red(5, 5, 1)]);
        let mut canvas = Canvas::new(SURFACE);
        canvas.render(&buffer);
        let first = canvas.take_changes();
        assert_eq!(first.len(), 7);
        assert!(canvas.take_changes().is_empty());

        buffer.advance_all(&Velocity::new(1, 0));
        canvas.render(&buffer);
        let moved = canvas.take_changes();
        // Leading edge appears, trailing edge is cleared.
        assert!(moved.iter().any(|c| c.x == 8 && c.y == 5 && c.cell.ch == FILL));
        assert!(moved.iter().any(|c| c.x == 3 && c.y == 5 && c.cell.ch == ' '));
    }

    #[test]
    fn invalidate_repaints_everything() {
        let buffer = buffer_of(vec![red(5, 5, 1)]);
        let mut canvas = Canvas::new(SURFACE);
        canvas.render(&buffer);
        canvas.take_changes();
        canvas.invalidate();
        assert_eq!(canvas.take_changes().len(), 7);
    }
}
