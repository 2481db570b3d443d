use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::audio::fetch::{FetchedTrack, PendingFetch, TrackFetcher, candidate_locations, fetch_first};
use crate::error::AudioLoadError;

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkStatus {
    Playing,
    Finished,
    Failed(String),
}

/// The device side of a session: decoding and playing one fully loaded track.
pub trait AudioSink {
    /// Decodes the whole track, then starts it from position zero.
    fn play(&mut self, track: &FetchedTrack, volume: f32) -> Result<(), String>;

    fn set_volume(&mut self, volume: f32);

    fn status(&mut self) -> SinkStatus;

    /// Releases the current voice. Calling it with nothing playing is a no-op.
    fn stop(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    Completed,
    LoadFailed,
    PlaybackFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AudioState {
    Idle,
    Loading,
    Playing,
    Ended(EndReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Started {
        session: SessionId,
        track: String,
        location: PathBuf,
    },
    LoadFailed {
        session: SessionId,
        error: AudioLoadError,
    },
    Ended {
        session: SessionId,
        reason: EndReason,
    },
}

impl AudioEvent {
    pub fn session(&self) -> SessionId {
        match self {
            Self::Started { session, .. }
            | Self::LoadFailed { session, .. }
            | Self::Ended { session, .. } => *session,
        }
    }
}

/// Single-shot playback of one track per session. Each terminal transition
/// is reported once through [`AudioSession::poll`]; nothing loops.
pub struct AudioSession<S> {
    sink: S,
    fetcher: Arc<dyn TrackFetcher>,
    asset_base: PathBuf,
    background: bool,
    state: AudioState,
    session: Option<SessionId>,
    pending: Option<PendingFetch>,
    volume: f32,
}

impl<S: AudioSink> AudioSession<S> {
    pub fn new(sink: S, fetcher: Arc<dyn TrackFetcher>, asset_base: impl Into<PathBuf>) -> Self {
        Self {
            sink,
            fetcher,
            asset_base: asset_base.into(),
            background: false,
            state: AudioState::Idle,
            session: None,
            pending: None,
            volume: 0.0,
        }
    }

    /// Fetch on a worker thread instead of inline in `start`.
    pub fn with_background_fetch(mut self, background: bool) -> Self {
        self.background = background;
        self
    }

    /// Releases any previous session and begins loading `track`.
    pub fn start(&mut self, session: SessionId, track: &str, volume: f32) {
        self.stop();
        self.volume = clamp_gain(volume);
        let candidates = candidate_locations(&self.asset_base, track);
        log::info!("Loading {} for session {}", track, session);
        let pending = if self.background {
            PendingFetch::spawn(Arc::clone(&self.fetcher), track, candidates)
        } else {
            PendingFetch::resolved(track, fetch_first(self.fetcher.as_ref(), track, &candidates))
        };
        self.pending = Some(pending);
        self.session = Some(session);
        self.state = AudioState::Loading;
    }

    /// Advances the session and reports a state change, if any.
    pub fn poll(&mut self) -> Option<AudioEvent> {
        let session = self.session?;
        match self.state {
            AudioState::Loading => {
                let fetched = self.pending.as_mut()?.try_take()?;
                self.pending = None;
                match fetched.and_then(|track| self.begin_playback(track)) {
                    Ok(track) => {
                        self.state = AudioState::Playing;
                        log::info!("Playing {} from {:?}", track.label(), track.location);
                        Some(AudioEvent::Started {
                            session,
                            track: track.track,
                            location: track.location,
                        })
                    }
                    Err(error) => {
                        self.state = AudioState::Ended(EndReason::LoadFailed);
                        log::warn!("Audio load failed: {}", error);
                        Some(AudioEvent::LoadFailed { session, error })
                    }
                }
            }
            AudioState::Playing => {
                let reason = match self.sink.status() {
                    SinkStatus::Playing => return None,
                    SinkStatus::Finished => {
                        log::info!("Music finished playing.");
                        EndReason::Completed
                    }
                    SinkStatus::Failed(reason) => {
                        log::warn!("Playback failed: {}", reason);
                        EndReason::PlaybackFailed
                    }
                };
                self.sink.stop();
                self.state = AudioState::Ended(reason);
                Some(AudioEvent::Ended { session, reason })
            }
            AudioState::Idle | AudioState::Ended(_) => None,
        }
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_gain(volume);
        if self.state == AudioState::Playing {
            self.sink.set_volume(self.volume);
        }
        self.volume
    }

    /// Idempotent. A fetch still in flight is abandoned and its result dropped.
    pub fn stop(&mut self) {
        match self.state {
            AudioState::Loading => {
                self.pending = None;
                log::debug!("Abandoned pending fetch for session {:?}", self.session);
            }
            AudioState::Playing => self.sink.stop(),
            AudioState::Idle | AudioState::Ended(_) => {}
        }
        self.state = AudioState::Idle;
        self.session = None;
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    fn begin_playback(&mut self, track: FetchedTrack) -> Result<FetchedTrack, AudioLoadError> {
        self.sink
            .play(&track, self.volume)
            .map(|()| track.clone())
            .map_err(|reason| AudioLoadError::Decode {
                track: track.track.clone(),
                reason,
            })
    }
}

fn clamp_gain(volume: f32) -> f32 {
    if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) }
}
