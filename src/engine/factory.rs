//! Random shape generation.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::{Color, NamedColor, Surface};

use super::buffer::{Shape, ShapeFactory};

/// Where new shapes take their color from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Any 24-bit color.
    #[default]
    RandomRgb,
    /// One of the listed terminal colors. An empty list means all visible ones.
    Named(Vec<NamedColor>),
}

/// Integer in `[min, max)`; `min` itself when the range is empty.
pub fn random_in(rng: &mut impl Rng, min: i64, max: i64) -> i64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// A packed `0xRRGGBB` value.
pub fn random_rgb(rng: &mut impl Rng) -> u32 {
    rng.gen_range(0..0xFF_FF_FF)
}

pub struct RandomShapeFactory {
    rng: StdRng,
    bounds: Surface,
    radius: RangeInclusive<u16>,
    palette: Palette,
}

impl RandomShapeFactory {
    pub fn new(
        bounds: Surface,
        radius: RangeInclusive<u16>,
        palette: Palette,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            bounds,
            radius,
            palette,
        }
    }

    /// Follow the drawing surface when it is resized.
    pub fn set_bounds(&mut self, bounds: Surface) {
        self.bounds = bounds;
    }

    fn random_color(&mut self) -> Color {
        match &self.palette {
            Palette::RandomRgb => Color::from_hex(random_rgb(&mut self.rng)),
            Palette::Named(colors) => {
                let choices: &[NamedColor] = if colors.is_empty() {
                    &NamedColor::VISIBLE
                } else {
                    colors
                };
                Color::Named(choices[self.rng.gen_range(0..choices.len())])
            }
        }
    }
}

impl ShapeFactory for RandomShapeFactory {
    fn create(&mut self) -> Shape {
        let x = random_in(&mut self.rng, 0, self.bounds.width as i64);
        let y = random_in(&mut self.rng, 0, self.bounds.height as i64);
        let radius = self.rng.gen_range(self.radius.clone());
        let color = self.random_color();
        Shape::new(x, y, radius, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory(palette: Palette) -> RandomShapeFactory {
        RandomShapeFactory::new(
            Surface {
                width: 40,
                height: 12,
            },
            2..=5,
            palette,
            Some(7),
        )
    }

    #[test]
    fn shapes_stay_within_bounds_and_radius_range() {
        let mut factory = factory(Palette::RandomRgb);
        for _ in 0..500 {
            let shape = factory.create();
            assert!((0..40).contains(&shape.x));
            assert!((0..12).contains(&shape.y));
            assert!((2..=5).contains(&shape.radius()));
            assert!(matches!(shape.color(), Color::Rgb { .. }));
        }
    }

    #[test]
    fn same_seed_same_shapes() {
        let mut a = factory(Palette::RandomRgb);
        let mut b = factory(Palette::RandomRgb);
        for _ in 0..20 {
            assert_eq!(a.create(), b.create());
        }
    }

    #[test]
    fn named_palette_only_uses_listed_colors() {
        let mut factory = factory(Palette::Named(vec![NamedColor::Cyan, NamedColor::Magenta]));
        for _ in 0..100 {
            let color = factory.create().color();
            assert!(matches!(
                color,
                Color::Named(NamedColor::Cyan | NamedColor::Magenta)
            ));
        }
    }

    #[test]
    fn empty_named_palette_falls_back_to_visible_colors() {
        let mut factory = factory(Palette::Named(Vec::new()));
        for _ in 0..100 {
            assert_ne!(factory.create().color(), Color::Named(NamedColor::Black));
        }
    }

    #[test]
    fn zero_sized_bounds_pin_to_origin() {
        let mut factory = factory(Palette::RandomRgb);
        factory.set_bounds(Surface { width: 0, height: 0 });
        let shape = factory.create();
        assert_eq!((shape.x, shape.y), (0, 0));
    }

    #[test]
    fn random_in_is_half_open() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!((3..6).contains(&random_in(&mut rng, 3, 6)));
        }
        assert_eq!(random_in(&mut rng, 4, 4), 4);
        assert!(random_rgb(&mut rng) < 0xFF_FF_FF);
    }
}
