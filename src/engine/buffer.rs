use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::error::ConfigError;
use crate::types::Color;

use super::motion::Velocity;

/// One drawn circle. Position moves; radius and color are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub x: i64,
    pub y: i64,
    radius: u16,
    color: Color,
}

impl Shape {
    pub fn new(x: i64, y: i64, radius: u16, color: Color) -> Self {
        Self { x, y, radius, color }
    }

    pub fn radius(&self) -> u16 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// Produces new shapes for `ShapeBuffer::spawn`.
pub trait ShapeFactory {
    fn create(&mut self) -> Shape;
}

impl<F: FnMut() -> Shape> ShapeFactory for F {
    fn create(&mut self) -> Shape {
        self()
    }
}

/// Bounded FIFO of shapes. Front is the oldest, back the newest.
#[derive(Debug, Clone)]
pub struct ShapeBuffer {
    shapes: VecDeque<Shape>,
    max_shapes: NonZeroUsize,
}

impl ShapeBuffer {
    pub fn new(max_shapes: usize) -> Result<Self, ConfigError> {
        let max_shapes = NonZeroUsize::new(max_shapes).ok_or(ConfigError::ZeroCapacity)?;
        Ok(Self::with_capacity(max_shapes))
    }

    pub fn with_capacity(max_shapes: NonZeroUsize) -> Self {
        Self {
            shapes: VecDeque::with_capacity(max_shapes.get().saturating_add(1).min(4096)),
            max_shapes,
        }
    }

    pub fn max_shapes(&self) -> usize {
        self.max_shapes.get()
    }

    /// Change the capacity. Takes effect on the next spawn, which still evicts
    /// at most one shape.
    pub fn set_max_shapes(&mut self, max_shapes: NonZeroUsize) {
        self.max_shapes = max_shapes;
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn advance_all(&mut self, velocity: &Velocity) {
        for shape in &mut self.shapes {
            shape.x += velocity.dx;
            shape.y += velocity.dy;
        }
    }

    /// Append a fresh shape; if that overflows the capacity, drop the oldest
    /// one and return it.
    pub fn spawn(&mut self, factory: &mut impl ShapeFactory) -> Option<Shape> {
        self.shapes.push_back(factory.create());
        if self.shapes.len() > self.max_shapes.get() {
            self.shapes.pop_front()
        } else {
            None
        }
    }
}
