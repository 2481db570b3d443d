pub const RENDER_WIDTH: i32 = 1920;           // Width of the render texture
pub const RENDER_HEIGHT: i32 = 1080;          // Height of the render texture
pub const FPS: u32 = 60;                      // Frames per second

pub const FADE_WINDOW_MS: u64 = 200;          // Crossfade lead-in before every advance
pub const CYCLE_TICK_MS: u64 = 100;           // Cycle scheduler polling period
pub const PALETTE_TICK_MS: u64 = 1_000;       // Palette scheduler polling period
pub const DEFAULT_SPEED_MS: u64 = 1_000;      // Display time per image before the first speed band

pub const MIN_IMAGES: usize = 2;              // Images required to start a presentation
pub const MAX_IMAGES: usize = 20;             // Images accepted by the form

pub const DEFAULT_VOLUME: f32 = 0.5;
pub const VOLUME_STEP: f32 = 0.05;            // One scroll notch

pub const DEFAULT_PALETTE: usize = 0;         // Palette before any band is reached
pub const TERMINAL_PALETTE: usize = 5;        // Pinned when a presentation ends

pub const SPARKLE_COUNT: usize = 60;
pub const SPARKLE_REVEAL_MS: u64 = 500;       // Sparkles appear this long after the epoch

pub const DEFAULT_DISPLAY_NAME: &str = "No message provided";
pub const AUDIO_LOAD_FAILED_MESSAGE: &str =
    "Unable to play background music. Please click anywhere to try again.";

/// `(threshold_ms, speed_ms)` pairs used when no configuration overrides them.
pub const DEFAULT_SPEED_BANDS: [(u64, u64); 7] = [
    (0, 1_000),
    (15_000, 500),
    (29_000, 1_000),
    (44_000, 500),
    (59_000, 1_000),
    (74_000, 500),
    (88_000, 1_000),
];

/// `(threshold_ms, palette_id)` pairs used when no configuration overrides them.
pub const DEFAULT_PALETTE_BANDS: [(u64, usize); 6] = [
    (0, 0),
    (29_000, 1),
    (44_000, 2),
    (59_000, 3),
    (74_000, 4),
    (88_000, 5),
];
