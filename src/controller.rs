//! The presentation state machine.
//!
//! `Idle -> Starting -> Running -> Idle`. The controller owns the epoch and
//! every piece of mutable scheduling state; the cycle and palette schedulers
//! only ever see it through the arguments of a single timer firing. Time is
//! always passed in by the caller as milliseconds on a monotonic clock.

use std::mem;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::audio::{AudioEvent, AudioSession, AudioSink, AudioState, SessionId, TrackFetcher, track_label};
use crate::constants::{AUDIO_LOAD_FAILED_MESSAGE, DEFAULT_DISPLAY_NAME};
use crate::config::PresentationConfig;
use crate::cycle::{self, CycleRecord, CycleState};
use crate::error::{ConfigError, ValidationError};
use crate::palette::{PaletteId, PaletteScheduler};
use crate::sparkle::{SparkleField, sparkles_visible};
use crate::state::{FormState, PresentationPhase};
use crate::timer::TimerQueue;
use crate::volume::{VolumeControl, VolumeLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    CycleTick,
    Advance,
    PaletteTick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started(SessionId),
    /// A presentation is already starting or running.
    Ignored,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationView {
    pub phase: PresentationPhase,
    pub current_index: usize,
    pub fading: bool,
    pub palette_id: PaletteId,
    pub audio_error: Option<String>,
    pub validation_message: Option<String>,
    pub current_track_label: String,
    pub display_name: String,
    pub image_count: usize,
    pub counter_label: String,
    pub progress: f32,
    pub epoch_ms: Option<u64>,
    pub elapsed_ms: Option<u64>,
    pub speed_ms: u64,
    pub volume: f32,
    pub volume_percent: u32,
    pub volume_level: VolumeLevel,
    pub sparkles_visible: bool,
}

pub struct PresentationController<I, S> {
    config: PresentationConfig,
    phase: PresentationPhase,
    form: FormState<I>,
    images: Vec<I>,
    display_name: String,
    current_track: String,
    audio_error: Option<String>,
    validation: Option<ValidationError>,

    epoch: Option<u64>,
    cycle: CycleState,
    record: CycleRecord,
    speed_ms: u64,
    palettes: PaletteScheduler,
    palette_id: PaletteId,
    timers: TimerQueue<TimerEvent>,

    audio: AudioSession<S>,
    session: Option<SessionId>,
    next_session: SessionId,
    submitting: bool,
    /// The audio start attempt has resolved; the next pump stamps the epoch.
    audio_settled: bool,
    volume: VolumeControl,

    sparkles: SparkleField,
    rng: StdRng,
}

impl<I, S: AudioSink> PresentationController<I, S> {
    pub fn new(
        config: PresentationConfig,
        sink: S,
        fetcher: Arc<dyn TrackFetcher>,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, sink, fetcher, StdRng::from_os_rng())
    }

    /// Deterministic track picks and sparkle layout.
    pub fn with_seed(
        config: PresentationConfig,
        sink: S,
        fetcher: Arc<dyn TrackFetcher>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::with_rng(config, sink, fetcher, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: PresentationConfig,
        sink: S,
        fetcher: Arc<dyn TrackFetcher>,
        mut rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let audio = AudioSession::new(sink, fetcher, config.asset_base.clone())
            .with_background_fetch(config.background_fetch);
        let palettes = PaletteScheduler::new(config.palette_bands.clone(), config.default_palette);
        let palette_id = palettes.evaluate(None);
        let sparkles = SparkleField::generate(config.sparkle_count, &mut rng);
        Ok(Self {
            phase: PresentationPhase::Idle,
            form: FormState::default(),
            images: Vec::new(),
            display_name: String::new(),
            current_track: String::new(),
            audio_error: None,
            validation: None,
            epoch: None,
            cycle: CycleState::default(),
            record: CycleRecord::default(),
            speed_ms: config.speed_bands.select(0),
            palettes,
            palette_id,
            timers: TimerQueue::new(),
            audio,
            session: None,
            next_session: 1,
            submitting: false,
            audio_settled: false,
            volume: VolumeControl::new(config.default_volume),
            sparkles,
            rng,
            config,
        })
    }

    // --- Form ---

    /// Appends a batch of images. A batch that would exceed the limit is
    /// rejected whole and the current selection is kept.
    pub fn add_images(&mut self, images: impl IntoIterator<Item = I>) -> Result<usize, ValidationError> {
        let batch: Vec<I> = images.into_iter().collect();
        let max = self.config.max_images;
        if self.form.images.len() + batch.len() > max {
            let err = ValidationError::TooManyImages { max };
            self.validation = Some(err.clone());
            return Err(err);
        }
        self.form.images.extend(batch);
        Ok(self.form.images.len())
    }

    pub fn clear_images(&mut self) {
        self.form.images.clear();
    }

    /// An empty selector means "pick at random".
    pub fn set_track(&mut self, track: Option<String>) {
        self.form.track = track.filter(|t| !t.trim().is_empty());
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn form(&self) -> &FormState<I> {
        &self.form
    }

    // --- Lifecycle ---

    pub fn submit(&mut self, now: u64) -> Result<SubmitOutcome, ValidationError> {
        if self.phase != PresentationPhase::Idle || self.submitting {
            log::warn!("Ignoring submit while {:?}", self.phase);
            return Ok(SubmitOutcome::Ignored);
        }
        self.validation = None;
        let track = match self.validate_form() {
            Ok(track) => track,
            Err(err) => {
                log::info!("Submission rejected: {}", err);
                self.validation = Some(err.clone());
                return Err(err);
            }
        };

        let name = self.form.name.trim();
        self.display_name = if name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_string()
        } else {
            name.to_string()
        };
        self.form.name = self.display_name.clone();
        self.images = mem::take(&mut self.form.images);
        self.current_track = track_label(&track);
        self.audio_error = None;
        self.cycle = CycleState::default();
        self.submitting = true;
        self.phase = PresentationPhase::Starting;

        let session = self.next_session;
        self.next_session += 1;
        self.session = Some(session);
        log::info!(
            "Starting presentation {} with {} images and {}",
            session,
            self.images.len(),
            track
        );
        self.audio.start(session, &track, self.volume.value());
        self.poll_audio(now);
        Ok(SubmitOutcome::Started(session))
    }

    /// Starts the run if the audio attempt settled on an earlier call, fires
    /// every timer due by `now`, then checks on the audio session.
    ///
    /// Settling includes a blocking decode, so the epoch is the `now` of the
    /// first pump after it and never the `now` of the settling call.
    pub fn pump(&mut self, now: u64) {
        if self.audio_settled && self.phase == PresentationPhase::Starting {
            self.begin_run(now);
        }
        while let Some((_, at, event)) = self.timers.pop_due(now) {
            self.handle_timer(at, event);
        }
        self.poll_audio(now);
    }

    /// Explicit stop from `Starting` or `Running`. Returns whether anything
    /// was stopped.
    pub fn stop(&mut self) -> bool {
        if self.phase == PresentationPhase::Idle {
            return false;
        }
        self.terminate("stopped");
        true
    }

    // --- Palette ---

    /// Pins the palette; visible immediately.
    pub fn force_palette(&mut self, id: PaletteId) {
        self.palettes.force(id);
        self.palette_id = id;
    }

    /// Resumes time-based selection at the current elapsed time.
    pub fn clear_palette_override(&mut self, now: u64) {
        self.palettes.clear_override();
        self.refresh_palette(now);
    }

    // --- Volume ---

    pub fn set_volume(&mut self, value: f32) -> f32 {
        self.apply_volume(|v| v.set(value))
    }

    pub fn scroll_volume(&mut self, delta_y: f32) -> f32 {
        self.apply_volume(|v| v.scroll(delta_y))
    }

    pub fn toggle_mute(&mut self) -> f32 {
        self.apply_volume(VolumeControl::toggle_mute)
    }

    pub fn drag_volume(&mut self, x: f32, width: f32) -> f32 {
        self.apply_volume(|v| v.drag_to(x, width))
    }

    pub fn click_volume(&mut self, x: f32, width: f32) -> f32 {
        self.apply_volume(|v| v.click_at(x, width))
    }

    // --- Outputs ---

    pub fn view(&self, now: u64) -> PresentationView {
        let elapsed_ms = self.elapsed(now);
        PresentationView {
            phase: self.phase,
            current_index: self.cycle.current_index,
            fading: self.cycle.fading,
            palette_id: self.palette_id,
            audio_error: self.audio_error.clone(),
            validation_message: self.validation.as_ref().map(|e| e.to_string()),
            current_track_label: self.current_track.clone(),
            display_name: self.display_name.clone(),
            image_count: self.images.len(),
            counter_label: cycle::counter_label(self.cycle.current_index, self.images.len()),
            progress: cycle::progress(self.cycle.current_index, self.images.len()),
            epoch_ms: self.epoch,
            elapsed_ms,
            speed_ms: self.speed_ms,
            volume: self.volume.value(),
            volume_percent: self.volume.percent(),
            volume_level: self.volume.level(),
            sparkles_visible: sparkles_visible(elapsed_ms, self.config.sparkle_reveal_ms),
        }
    }

    pub fn phase(&self) -> PresentationPhase {
        self.phase
    }

    pub fn epoch(&self) -> Option<u64> {
        self.epoch
    }

    pub fn cycle(&self) -> CycleState {
        self.cycle
    }

    pub fn palette_id(&self) -> PaletteId {
        self.palette_id
    }

    pub fn audio_error(&self) -> Option<&str> {
        self.audio_error.as_deref()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio.state()
    }

    pub fn images(&self) -> &[I] {
        &self.images
    }

    pub fn current_image(&self) -> Option<&I> {
        self.images.get(self.cycle.current_index)
    }

    pub fn volume(&self) -> &VolumeControl {
        &self.volume
    }

    pub fn sparkles(&self) -> &SparkleField {
        &self.sparkles
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // --- Internals ---

    fn validate_form(&mut self) -> Result<String, ValidationError> {
        let got = self.form.images.len();
        if got == 0 {
            return Err(ValidationError::NoImages);
        }
        if got < self.config.min_images {
            return Err(ValidationError::NotEnoughImages {
                min: self.config.min_images,
                got,
            });
        }
        let catalog = &self.config.tracks;
        match &self.form.track {
            Some(track) if catalog.is_empty() || catalog.contains(track) => Ok(track.clone()),
            Some(track) => Err(ValidationError::UnknownTrack {
                track: track.clone(),
            }),
            None if catalog.is_empty() => Err(ValidationError::NoTrackAvailable),
            None => {
                let pick = self.rng.random_range(0..catalog.len());
                Ok(catalog[pick].clone())
            }
        }
    }

    fn poll_audio(&mut self, now: u64) {
        while let Some(event) = self.audio.poll() {
            if Some(event.session()) != self.session {
                log::debug!("Discarding audio event from stale session {}", event.session());
                continue;
            }
            match event {
                AudioEvent::Started { .. } => {
                    self.audio_settled = true;
                }
                AudioEvent::LoadFailed { .. } => {
                    self.audio_error = Some(AUDIO_LOAD_FAILED_MESSAGE.to_string());
                    self.audio_settled = true;
                }
                AudioEvent::Ended { reason, .. } => {
                    if self.phase != PresentationPhase::Idle {
                        log::info!("Audio ended at {}ms ({:?})", now, reason);
                        self.terminate("audio ended");
                        return;
                    }
                }
            }
        }
    }

    /// Stamps the epoch and arms the schedulers. Only reached once the audio
    /// start attempt has settled, whichever way.
    fn begin_run(&mut self, now: u64) {
        self.epoch = Some(now);
        self.cycle = CycleState::default();
        self.record = CycleRecord::starting_at(now);
        self.speed_ms = self.config.speed_bands.select(0);
        self.palettes.clear_override();
        self.refresh_palette(now);
        self.timers.cancel_all();
        self.timers
            .set_interval(now, self.config.cycle_tick_ms, TimerEvent::CycleTick);
        self.timers
            .set_interval(now, self.config.palette_tick_ms, TimerEvent::PaletteTick);
        self.submitting = false;
        self.audio_settled = false;
        self.phase = PresentationPhase::Running;
        log::info!("Presentation running from {}ms", now);
    }

    /// Terminal cleanup: pin the closing palette, drop the epoch and every
    /// timer, and reset the form for a fresh submission.
    fn terminate(&mut self, cause: &str) {
        if let Some(advance) = self.record.pending_advance.take() {
            self.timers.cancel(advance);
        }
        self.timers.cancel_all();
        self.audio.stop();
        self.session = None;
        self.epoch = None;
        self.force_palette(self.config.terminal_palette);
        self.images.clear();
        self.form.clear();
        self.submitting = false;
        self.audio_settled = false;
        self.phase = PresentationPhase::Idle;
        log::info!("Presentation {}", cause);
    }

    fn handle_timer(&mut self, at: u64, event: TimerEvent) {
        let Some(epoch) = self.epoch else {
            return;
        };
        match event {
            TimerEvent::CycleTick => {
                let elapsed = at.saturating_sub(epoch);
                let speed = self.config.speed_bands.select(elapsed);
                if speed != self.speed_ms {
                    log::debug!("Cycle speed {}ms -> {}ms at {}ms", self.speed_ms, speed, elapsed);
                    self.speed_ms = speed;
                }
                let fade = cycle::on_tick(
                    &mut self.cycle,
                    &self.record,
                    at,
                    elapsed,
                    &self.config.speed_bands,
                    self.config.fade_window_ms,
                );
                if let Some(delay) = fade {
                    let id = self.timers.set_timeout(at, delay, TimerEvent::Advance);
                    self.record.pending_advance = Some(id);
                }
            }
            TimerEvent::Advance => {
                cycle::on_advance(&mut self.cycle, &mut self.record, at, self.images.len());
            }
            TimerEvent::PaletteTick => self.refresh_palette(at),
        }
    }

    fn refresh_palette(&mut self, now: u64) {
        let id = self.palettes.evaluate(self.elapsed(now));
        if id != self.palette_id {
            log::debug!("Palette {} -> {}", self.palette_id, id);
            self.palette_id = id;
        }
    }

    fn elapsed(&self, now: u64) -> Option<u64> {
        self.epoch.map(|epoch| now.saturating_sub(epoch))
    }

    fn apply_volume(&mut self, input: impl FnOnce(&mut VolumeControl) -> f32) -> f32 {
        let value = input(&mut self.volume);
        self.audio.set_volume(value);
        value
    }
}
