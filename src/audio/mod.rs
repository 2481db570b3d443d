//! Background music: finding the track, and one playback session per run.

pub mod fetch;
pub mod session;

pub use fetch::{FetchedTrack, FsFetcher, PendingFetch, TrackFetcher, candidate_locations, track_label};
pub use session::{AudioEvent, AudioSession, AudioSink, AudioState, EndReason, SessionId, SinkStatus};
