//! Presentation settings, loadable from JSON. Every field has a default so a
//! config file only needs to name what it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bands::BandTable;
use crate::constants::*;
use crate::error::ConfigError;
use crate::palette::PaletteId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationConfig {
    pub speed_bands: BandTable<u64>,
    pub palette_bands: BandTable<PaletteId>,
    /// Track catalog offered by the form and used for the random pick.
    pub tracks: Vec<String>,
    pub asset_base: PathBuf,
    pub default_palette: PaletteId,
    pub terminal_palette: PaletteId,
    pub default_volume: f32,
    pub min_images: usize,
    pub max_images: usize,
    pub fade_window_ms: u64,
    pub cycle_tick_ms: u64,
    pub palette_tick_ms: u64,
    pub sparkle_count: usize,
    pub sparkle_reveal_ms: u64,
    /// Fetch tracks on a worker thread.
    pub background_fetch: bool,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            speed_bands: default_table(DEFAULT_SPEED_BANDS, DEFAULT_SPEED_MS),
            palette_bands: default_table(DEFAULT_PALETTE_BANDS, DEFAULT_PALETTE),
            tracks: Vec::new(),
            asset_base: PathBuf::from("."),
            default_palette: DEFAULT_PALETTE,
            terminal_palette: TERMINAL_PALETTE,
            default_volume: DEFAULT_VOLUME,
            min_images: MIN_IMAGES,
            max_images: MAX_IMAGES,
            fade_window_ms: FADE_WINDOW_MS,
            cycle_tick_ms: CYCLE_TICK_MS,
            palette_tick_ms: PALETTE_TICK_MS,
            sparkle_count: SPARKLE_COUNT,
            sparkle_reveal_ms: SPARKLE_REVEAL_MS,
            background_fetch: false,
        }
    }
}

fn default_table<T: Copy, const N: usize>(pairs: [(u64, T); N], fallback: T) -> BandTable<T> {
    BandTable::new(pairs).unwrap_or_else(|_| BandTable::constant(fallback))
}

impl PresentationConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_tick_ms == 0 || self.palette_tick_ms == 0 {
            return Err(ConfigError::invalid("tick periods must be positive"));
        }
        if self.min_images > self.max_images {
            return Err(ConfigError::invalid(format!(
                "min_images ({}) exceeds max_images ({})",
                self.min_images, self.max_images
            )));
        }
        if self.speed_bands.iter_values().any(|speed| speed == 0) {
            return Err(ConfigError::invalid("speed bands must be positive"));
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(ConfigError::invalid("default_volume must be within [0, 1]"));
        }
        if self.tracks.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid("track names must not be blank"));
        }
        Ok(())
    }
}
