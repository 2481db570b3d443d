use raylib::prelude::*;

use slideshow::palette::{Palette, PaletteCatalog, PaletteId, Rgb};
use slideshow::sparkle::SparkleField;

const TRANSITION_SECS: f32 = 1.2; // Palette blend time

fn color(rgb: Rgb, alpha: f32) -> Color {
    Color::new(rgb.0, rgb.1, rgb.2, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

fn mix(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let lerp = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Gradient backdrop that blends into a new palette whenever the engine
/// switches, with the sparkle field drawn on top.
pub struct Backdrop {
    catalog: PaletteCatalog,
    shown: PaletteId,
    from: (Rgb, Rgb),
    blend: f32,
}

impl Backdrop {
    pub fn new(catalog: PaletteCatalog, initial: PaletteId) -> Self {
        let from = catalog.resolve(initial).background.endpoints();
        Self {
            catalog,
            shown: initial,
            from,
            blend: 1.0,
        }
    }

    pub fn update(&mut self, dt: f32, palette_id: PaletteId) {
        if palette_id != self.shown {
            self.from = self.current_endpoints();
            self.shown = palette_id;
            self.blend = 0.0;
        }
        self.blend = (self.blend + dt / TRANSITION_SECS).min(1.0);
    }

    fn palette(&self) -> &Palette {
        self.catalog.resolve(self.shown)
    }

    fn current_endpoints(&self) -> (Rgb, Rgb) {
        let to = self.palette().background.endpoints();
        (mix(self.from.0, to.0, self.blend), mix(self.from.1, to.1, self.blend))
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle, sparkles: Option<(&SparkleField, f32)>) {
        let width = d.get_screen_width() as f32;
        let height = d.get_screen_height() as f32;
        let (start, end) = self.current_endpoints();
        let middle = mix(start, end, 0.5);

        // 135deg: top-left to bottom-right
        d.draw_rectangle_gradient_ex(
            Rectangle::new(0.0, 0.0, width, height),
            color(start, 1.0),
            color(middle, 1.0),
            color(middle, 1.0),
            color(end, 1.0),
        );

        let Some((field, t)) = sparkles else {
            return;
        };
        let palette = self.palette();
        for sparkle in field.iter() {
            let intensity = sparkle.intensity(t);
            if intensity <= 0.0 {
                continue;
            }
            let center = Vector2::new(width * sparkle.left / 100.0, height * sparkle.top / 100.0);
            let tint = sparkle.color(palette);
            d.draw_circle_v(center, sparkle.size * 0.5 + sparkle.blur, color(tint, intensity * 0.25));
            d.draw_circle_v(center, sparkle.size * 0.5, color(tint, intensity));
        }
    }
}
