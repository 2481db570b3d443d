//! Locating and reading a track from an ordered list of candidate paths.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::error::AudioLoadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTrack {
    pub track: String,
    pub location: PathBuf,
    pub bytes: Vec<u8>,
}

impl FetchedTrack {
    /// Lowercase file extension with a leading dot, as decoders expect it.
    pub fn file_type(&self) -> String {
        let ext = self
            .location
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("mp3")
            .to_lowercase();
        format!(".{}", ext)
    }

    /// Display label, `song.mp3` becomes `song`.
    pub fn label(&self) -> String {
        track_label(&self.track)
    }
}

pub fn track_label(track: &str) -> String {
    Path::new(track)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(track)
        .to_string()
}

pub trait TrackFetcher: Send + Sync {
    fn fetch(&self, location: &Path) -> io::Result<Vec<u8>>;
}

/// Reads tracks from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl TrackFetcher for FsFetcher {
    fn fetch(&self, location: &Path) -> io::Result<Vec<u8>> {
        let bytes = fs::read(location)?;
        if bytes.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "empty file"));
        }
        Ok(bytes)
    }
}

/// Where to look for `track`, in order: the asset base's `static/` folder,
/// the asset base itself, `./static/`, then the track name as given.
pub fn candidate_locations(base: &Path, track: &str) -> Vec<PathBuf> {
    let all = [
        base.join("static").join(track),
        base.join(track),
        Path::new("static").join(track),
        PathBuf::from(track),
    ];
    let mut unique: Vec<PathBuf> = Vec::with_capacity(all.len());
    for candidate in all {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

pub fn fetch_first(
    fetcher: &dyn TrackFetcher,
    track: &str,
    candidates: &[PathBuf],
) -> Result<FetchedTrack, AudioLoadError> {
    for location in candidates {
        match fetcher.fetch(location) {
            Ok(bytes) => {
                log::debug!("Resolved {} at {:?} ({} bytes)", track, location, bytes.len());
                return Ok(FetchedTrack {
                    track: track.to_string(),
                    location: location.clone(),
                    bytes,
                });
            }
            Err(e) => log::debug!("No track at {:?}: {}", location, e),
        }
    }
    Err(AudioLoadError::NoCandidateResolved {
        track: track.to_string(),
        tried: candidates.to_vec(),
    })
}

/// A fetch that may still be running. Dropping it discards the result.
#[derive(Debug)]
pub struct PendingFetch {
    track: String,
    rx: Receiver<Result<FetchedTrack, AudioLoadError>>,
}

impl PendingFetch {
    pub fn resolved(track: &str, result: Result<FetchedTrack, AudioLoadError>) -> Self {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(result);
        Self {
            track: track.to_string(),
            rx,
        }
    }

    /// Runs [`fetch_first`] on a worker thread.
    pub fn spawn(fetcher: Arc<dyn TrackFetcher>, track: &str, candidates: Vec<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        let name = track.to_string();
        let spawned = thread::Builder::new()
            .name("track-fetch".into())
            .spawn(move || {
                let result = fetch_first(fetcher.as_ref(), &name, &candidates);
                // The receiver is gone when the session was stopped meanwhile.
                let _ = tx.send(result);
            });
        match spawned {
            Ok(_) => Self {
                track: track.to_string(),
                rx,
            },
            Err(e) => {
                log::warn!("Could not spawn fetch worker for {}: {}", track, e);
                Self::resolved(
                    track,
                    Err(AudioLoadError::Aborted {
                        track: track.to_string(),
                    }),
                )
            }
        }
    }

    /// `None` while the fetch is still running.
    pub fn try_take(&mut self) -> Option<Result<FetchedTrack, AudioLoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AudioLoadError::Aborted {
                track: self.track.clone(),
            })),
        }
    }
}
