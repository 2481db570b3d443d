#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use slideshow::audio::{AudioSink, FetchedTrack, SinkStatus, TrackFetcher};
use slideshow::{BandTable, PresentationConfig, PresentationController, SubmitOutcome};

pub const SONG: &str = "song.mp3";

#[derive(Debug, Default)]
pub struct Device {
    pub plays: Vec<(String, f32)>,
    pub volume: f32,
    pub status: Option<SinkStatus>,
    pub reject_decode: bool,
    pub decode_delay: Option<Duration>,
}

/// Audio sink whose playback outcome the test decides.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSink(pub Rc<RefCell<Device>>);

impl ScriptedSink {
    pub fn finish(&self) {
        self.0.borrow_mut().status = Some(SinkStatus::Finished);
    }

    pub fn fail(&self, reason: &str) {
        self.0.borrow_mut().status = Some(SinkStatus::Failed(reason.to_string()));
    }

    pub fn plays(&self) -> Vec<(String, f32)> {
        self.0.borrow().plays.clone()
    }

    pub fn volume(&self) -> f32 {
        self.0.borrow().volume
    }
}

impl AudioSink for ScriptedSink {
    fn play(&mut self, track: &FetchedTrack, volume: f32) -> Result<(), String> {
        let mut device = self.0.borrow_mut();
        if let Some(delay) = device.decode_delay {
            std::thread::sleep(delay);
        }
        if device.reject_decode {
            return Err("unsupported format".into());
        }
        device.plays.push((track.track.clone(), volume));
        device.volume = volume;
        device.status = Some(SinkStatus::Playing);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = volume;
    }

    fn status(&mut self) -> SinkStatus {
        self.0.borrow().status.clone().unwrap_or(SinkStatus::Playing)
    }

    fn stop(&mut self) {
        self.0.borrow_mut().status = None;
    }
}

/// Serves fixed bytes for a set of paths.
pub struct MapFetcher(pub HashMap<PathBuf, Vec<u8>>);

impl MapFetcher {
    pub fn with_tracks(tracks: &[&str]) -> Self {
        Self(
            tracks
                .iter()
                .map(|t| (PathBuf::from("assets/static").join(t), b"ID3".to_vec()))
                .collect(),
        )
    }
}

impl TrackFetcher for MapFetcher {
    fn fetch(&self, location: &Path) -> io::Result<Vec<u8>> {
        self.0
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// Blocks every fetch until the test opens the gate, then reports back.
pub struct GatedFetcher {
    gate: Mutex<Receiver<()>>,
    done: Mutex<Sender<()>>,
}

pub struct Gate {
    open: Sender<()>,
    done: Receiver<()>,
}

impl Gate {
    /// Lets one fetch through and waits until it has returned.
    pub fn release(&self) {
        self.open.send(()).unwrap();
        self.done
            .recv_timeout(Duration::from_secs(5))
            .expect("fetch worker never finished");
    }
}

pub fn gated_fetcher() -> (GatedFetcher, Gate) {
    let (open_tx, open_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    (
        GatedFetcher {
            gate: Mutex::new(open_rx),
            done: Mutex::new(done_tx),
        },
        Gate {
            open: open_tx,
            done: done_rx,
        },
    )
}

impl TrackFetcher for GatedFetcher {
    fn fetch(&self, _location: &Path) -> io::Result<Vec<u8>> {
        let opened = self.gate.lock().unwrap().recv();
        let _ = self.done.lock().unwrap().send(());
        opened
            .map(|()| b"ID3".to_vec())
            .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

pub fn config() -> PresentationConfig {
    PresentationConfig {
        speed_bands: BandTable::new([(0, 1_000), (15_000, 500)]).unwrap(),
        tracks: vec![SONG.to_string(), "other.mp3".to_string()],
        asset_base: PathBuf::from("assets"),
        ..Default::default()
    }
}

pub type Controller = PresentationController<&'static str, ScriptedSink>;

pub fn controller(config: PresentationConfig, fetcher: impl TrackFetcher + 'static) -> (Controller, ScriptedSink) {
    let sink = ScriptedSink::default();
    let controller = PresentationController::with_seed(config, sink.clone(), Arc::new(fetcher), 42).unwrap();
    (controller, sink)
}

/// A controller with the form filled in and ready to submit.
pub fn ready(images: &[&'static str]) -> (Controller, ScriptedSink) {
    let (mut controller, sink) = controller(config(), MapFetcher::with_tracks(&[SONG, "other.mp3"]));
    controller.add_images(images.iter().copied()).unwrap();
    controller.set_track(Some(SONG.to_string()));
    controller.set_name("Ada");
    (controller, sink)
}

/// Submits at `now` and pumps once at the same instant, which stamps the
/// epoch when the audio attempt settled inline.
pub fn start(show: &mut Controller, now: u64) -> SubmitOutcome {
    let outcome = show.submit(now).unwrap();
    show.pump(now);
    outcome
}
