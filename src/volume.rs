//! Output volume as driven by the slider, the wheel and the mute button.
//!
//! Every input lands on the same event queue, so the last applied value
//! wins without any locking.

use serde::Serialize;

use crate::constants::{DEFAULT_VOLUME, VOLUME_STEP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolumeLevel {
    Muted,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeControl {
    value: f32,
}

impl Default for VolumeControl {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl VolumeControl {
    pub fn new(value: f32) -> Self {
        Self {
            value: normalize(value),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set(&mut self, value: f32) -> f32 {
        self.value = normalize(value);
        self.value
    }

    /// Slider drag with the pointer `x` pixels into a `width` wide track.
    pub fn drag_to(&mut self, x: f32, width: f32) -> f32 {
        if width <= 0.0 {
            return self.value;
        }
        self.set(x / width)
    }

    pub fn click_at(&mut self, x: f32, width: f32) -> f32 {
        self.drag_to(x, width)
    }

    /// Wheel input: scrolling down (`delta_y > 0`) lowers by one step.
    pub fn scroll(&mut self, delta_y: f32) -> f32 {
        let step = if delta_y > 0.0 { -VOLUME_STEP } else { VOLUME_STEP };
        self.set(self.value + step)
    }

    pub fn toggle_mute(&mut self) -> f32 {
        let target = if self.value == 0.0 { 1.0 } else { 0.0 };
        self.set(target)
    }

    pub fn level(&self) -> VolumeLevel {
        match self.value {
            v if v == 0.0 => VolumeLevel::Muted,
            v if v < 0.3 => VolumeLevel::Low,
            v if v < 0.7 => VolumeLevel::Medium,
            _ => VolumeLevel::High,
        }
    }

    pub fn percent(&self) -> u32 {
        (self.value * 100.0).round() as u32
    }
}

/// Clamps to `[0, 1]` and rounds to two decimals. NaN reads as silence.
pub fn normalize(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    (value.clamp(0.0, 1.0) * 100.0).round() / 100.0
}
