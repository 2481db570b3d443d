use rand::Rng;
use serde::Serialize;

use crate::palette::{Palette, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sparkle {
    pub id: usize,
    pub left: f32,          // Percent of the viewport width
    pub top: f32,           // Percent of the viewport height
    pub delay: f32,         // Seconds before the first twinkle
    pub size: f32,          // Pixels
    pub duration: f32,      // Seconds per twinkle
    pub opacity: f32,       // Peak opacity
    pub blur: f32,          // Glow radius in pixels
    color_slot: usize,
}

impl Sparkle {
    pub fn random(id: usize, rng: &mut impl Rng) -> Self {
        Self {
            id,
            left: rng.random_range(0.0..100.0),
            top: rng.random_range(0.0..100.0),
            delay: rng.random_range(0.0..0.7),
            size: 5.0 + rng.random_range(0.0..10.0),
            duration: 0.7 + rng.random_range(0.0..1.0),
            opacity: 0.7 + rng.random_range(0.0..0.3),
            blur: 3.0 + rng.random_range(0.0..4.0),
            color_slot: rng.random_range(0..5),
        }
    }

    pub fn color(&self, palette: &Palette) -> Rgb {
        palette.sparkles[self.color_slot % palette.sparkles.len()]
    }

    /// Twinkle envelope at `t` seconds after the sparkles were revealed:
    /// zero before `delay`, then a rise and fall over each `duration`.
    pub fn intensity(&self, t: f32) -> f32 {
        if t < self.delay {
            return 0.0;
        }
        let phase = ((t - self.delay) / self.duration).fract();
        let tri = 1.0 - (phase * 2.0 - 1.0).abs();
        tri * self.opacity
    }
}

/// The fixed set of sparkles drawn over the backdrop.
#[derive(Debug, Clone, Serialize)]
pub struct SparkleField {
    sparkles: Vec<Sparkle>,
}

impl SparkleField {
    pub fn generate(count: usize, rng: &mut impl Rng) -> Self {
        Self {
            sparkles: (0..count).map(|id| Sparkle::random(id, rng)).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sparkle> {
        self.sparkles.iter()
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }
}

/// Sparkles show only while running, once `reveal_ms` has passed.
pub fn sparkles_visible(elapsed: Option<u64>, reveal_ms: u64) -> bool {
    elapsed.is_some_and(|elapsed| elapsed >= reveal_ms)
}
