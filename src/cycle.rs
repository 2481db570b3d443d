//! Image cycling with a crossfade around every advance.
//!
//! Every advance happens in two phases: a tick notices the current image has
//! been shown for `speed - fade_window` and starts fading it out, then a
//! one-shot timer `fade_window` later swaps the index and fades back in.
//! The state lives with the controller; these functions only read the band
//! table and the timestamps they are handed.

use serde::Serialize;

use crate::bands::BandTable;
use crate::timer::TimerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleState {
    pub current_index: usize,
    pub fading: bool,
}

/// Controller-owned bookkeeping for the in-flight advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleRecord {
    pub last_advance_ms: u64,
    pub pending_advance: Option<TimerId>,
}

impl CycleRecord {
    pub fn starting_at(now: u64) -> Self {
        Self {
            last_advance_ms: now,
            pending_advance: None,
        }
    }
}

/// Runs one polling tick. Returns the delay after which the advance must
/// fire when this tick started a fade.
pub fn on_tick(
    state: &mut CycleState,
    record: &CycleRecord,
    now: u64,
    elapsed_since_start: u64,
    speeds: &BandTable<u64>,
    fade_window: u64,
) -> Option<u64> {
    if state.fading || record.pending_advance.is_some() {
        return None;
    }
    let speed = speeds.select(elapsed_since_start);
    let shown_for = now.saturating_sub(record.last_advance_ms);
    if shown_for < speed.saturating_sub(fade_window) {
        return None;
    }
    state.fading = true;
    log::trace!(
        "fade out of image {} after {}ms (speed {}ms)",
        state.current_index,
        shown_for,
        speed
    );
    Some(fade_window)
}

/// Completes the advance armed by [`on_tick`].
pub fn on_advance(state: &mut CycleState, record: &mut CycleRecord, now: u64, image_count: usize) {
    if image_count > 0 {
        state.current_index = (state.current_index + 1) % image_count;
    }
    state.fading = false;
    record.last_advance_ms = now;
    record.pending_advance = None;
    log::debug!("advanced to image {} of {}", state.current_index, image_count);
}

/// Progress bar fill in `[0, 1]`. Flat for fewer than two images.
pub fn progress(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    (index % count) as f32 / (count - 1) as f32
}

pub fn counter_label(index: usize, count: usize) -> String {
    if count == 0 {
        return "No images to display".to_string();
    }
    format!("Image {} of {}", index % count + 1, count)
}
