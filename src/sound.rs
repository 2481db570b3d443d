use raylib::prelude::*;

use slideshow::audio::{AudioSink, FetchedTrack, SinkStatus};

/// Plays a fully decoded track through raylib's audio device. Without a
/// device every `play` fails, which the engine treats as a silent run.
pub struct RaylibSink<'aud> {
    audio: Option<&'aud RaylibAudio>,
    sound: Option<Sound<'aud>>,
}

impl<'aud> RaylibSink<'aud> {
    pub fn new(audio: Option<&'aud RaylibAudio>) -> Self {
        Self { audio, sound: None }
    }
}

impl AudioSink for RaylibSink<'_> {
    fn play(&mut self, track: &FetchedTrack, volume: f32) -> Result<(), String> {
        self.stop();
        let audio = self.audio.ok_or_else(|| "no audio device".to_string())?;
        let wave = audio
            .new_wave_from_memory(&track.file_type(), &track.bytes)
            .map_err(|e| e.to_string())?;
        let mut sound = audio.new_sound_from_wave(&wave).map_err(|e| e.to_string())?;
        sound.set_volume(volume);
        sound.play();
        self.sound = Some(sound);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sound) = self.sound.as_mut() {
            sound.set_volume(volume);
        }
    }

    fn status(&mut self) -> SinkStatus {
        match self.sound.as_mut() {
            Some(sound) if sound.is_playing() => SinkStatus::Playing,
            Some(_) => SinkStatus::Finished,
            None => SinkStatus::Failed("sound released while playing".into()),
        }
    }

    fn stop(&mut self) {
        if let Some(mut sound) = self.sound.take() {
            sound.stop();
        }
    }
}
