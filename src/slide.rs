use raylib::prelude::*;

pub struct Slide {
    image: Texture2D,
}

impl Slide {
    pub fn new(image: Texture2D) -> Self {
        Self { image }
    }

    /// Scale that fits the image within 90% of the screen, never upscaling.
    fn fit_scale(&self, screen_width: f32, screen_height: f32) -> f32 {
        let tex_width = self.image.width() as f32;
        let tex_height = self.image.height() as f32;
        let scale = (screen_width * 0.9 / tex_width).min(screen_height * 0.9 / tex_height);
        scale.min(1.0)
    }

    pub fn draw(&self, d: &mut RaylibDrawHandle, alpha: f32) {
        let screen_width = d.get_screen_width() as f32;
        let screen_height = d.get_screen_height() as f32;

        let tex_width = self.image.width() as f32;
        let tex_height = self.image.height() as f32;

        let scale = self.fit_scale(screen_width, screen_height);
        let scaled_width = tex_width * scale;
        let scaled_height = tex_height * scale;

        let tint = Color::new(255, 255, 255, (alpha.clamp(0.0, 1.0) * 255.0) as u8);

        d.draw_texture_pro(
            &self.image,
            Rectangle::new(0.0, 0.0, tex_width, tex_height),
            Rectangle::new(
                (screen_width - scaled_width) * 0.5,
                (screen_height - scaled_height) * 0.5,
                scaled_width,
                scaled_height,
            ),
            Vector2::new(0.0, 0.0),
            0.0,
            tint,
        );
    }
}

/// Opacity of the visible slide, eased toward 0 while the engine reports a
/// fade and back to 1 once the next image is in.
pub struct Crossfade {
    alpha: f32,
}

impl Crossfade {
    pub fn new() -> Self {
        Self { alpha: 1.0 }
    }

    pub fn update(&mut self, dt: f32, fading: bool, duration: f32) {
        let target = if fading { 0.0 } else { 1.0 };
        let step = if duration > 0.0 { dt / duration } else { 1.0 };
        self.alpha = if self.alpha < target {
            (self.alpha + step).min(target)
        } else {
            (self.alpha - step).max(target)
        };
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}
