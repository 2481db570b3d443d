use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use raylib::prelude::*;

use slideshow::audio::{FsFetcher, TrackFetcher, track_label};
use slideshow::constants::{FPS, RENDER_HEIGHT, RENDER_WIDTH};
use slideshow::{PaletteCatalog, PresentationConfig, PresentationController, PresentationPhase};

mod backdrop;
mod hud;
mod slide;
mod sound;
mod texture_loader;

use crate::backdrop::Backdrop;
use crate::slide::{Crossfade, Slide};
use crate::sound::RaylibSink;
use crate::texture_loader::{AUDIO_EXTENSIONS, IMAGE_EXTENSIONS, load_sorted_paths, load_texture_with_exif_rotation};

/// Image slideshow with crossfades, background music and a backdrop that
/// changes palette as the presentation goes on.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory of images to present
    image_dir: PathBuf,

    /// Track to play, picked at random from the catalog when omitted
    #[arg(long)]
    track: Option<String>,

    /// Message shown over the slides
    #[arg(long, default_value = "")]
    name: String,

    /// Directory holding the music catalog
    #[arg(long)]
    music_dir: Option<PathBuf>,

    /// JSON presentation settings. Without one, tracks load on a worker
    /// thread; with one, its `background_fetch` setting is kept.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial volume between 0 and 1
    #[arg(long)]
    volume: Option<f32>,

    /// Seed for the random track pick and sparkle layout
    #[arg(long)]
    seed: Option<u64>,
}

fn init_logger() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("slideshow=info"));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn load_config(args: &Args) -> Result<PresentationConfig> {
    let mut config = match &args.config {
        Some(path) => PresentationConfig::load(path)?,
        None => PresentationConfig::default(),
    };
    if let Some(dir) = &args.music_dir {
        let paths = load_sorted_paths(dir, AUDIO_EXTENSIONS).unwrap_or_else(|e| {
            log::warn!("{:#}", e);
            Vec::new()
        });
        config.tracks = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        config.asset_base = dir.clone();
        log::info!("Found {} tracks in {}", config.tracks.len(), dir.display());
    }
    if let Some(volume) = args.volume {
        config.default_volume = volume.clamp(0.0, 1.0);
    }
    if args.config.is_none() {
        config.background_fetch = true;
    }
    config.validate()?;
    Ok(config)
}

/// Plays the part of the upload form: selects every loaded slide.
fn fill_form<S: slideshow::audio::AudioSink>(
    show: &mut PresentationController<usize, S>,
    slide_count: usize,
    args: &Args,
) {
    show.clear_images();
    if let Err(e) = show.add_images(0..slide_count) {
        log::warn!("{}", e);
    }
    show.set_track(args.track.clone());
    show.set_name(args.name.clone());
}

/// Renderer fade time, matched to the engine's fade window.
fn fade_secs(config: &PresentationConfig) -> f32 {
    config.fade_window_ms as f32 / 1000.0
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();
    let config = load_config(&args)?;

    let image_paths = load_sorted_paths(&args.image_dir, IMAGE_EXTENSIONS)
        .with_context(|| format!("Error loading images from {}", args.image_dir.display()))?;
    if image_paths.len() > config.max_images {
        log::warn!(
            "Using the first {} of {} images",
            config.max_images,
            image_paths.len()
        );
    }

    let (mut rl, thread) = raylib::init()
        .size(RENDER_WIDTH / 2, RENDER_HEIGHT / 2)
        .title("Photo Slideshow")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);
    rl.set_exit_key(None);

    // --- Load Slides ---
    let mut slides: Vec<Slide> = Vec::new();
    for path in image_paths.iter().take(config.max_images) {
        match load_texture_with_exif_rotation(&mut rl, &thread, path) {
            Ok(texture) => slides.push(Slide::new(texture)),
            Err(e) => log::error!("Error processing image {}: {:#}", path.display(), e),
        }
    }
    log::info!("Loaded {} slides", slides.len());

    let audio = match RaylibAudio::init_audio_device() {
        Ok(audio) => Some(audio),
        Err(e) => {
            log::warn!("No audio device, presentations will be silent: {}", e);
            None
        }
    };

    let sink = RaylibSink::new(audio.as_ref());
    let fetcher: Arc<dyn TrackFetcher> = Arc::new(FsFetcher);
    let mut show = match args.seed {
        Some(seed) => PresentationController::with_seed(config, sink, fetcher, seed)?,
        None => PresentationController::new(config, sink, fetcher)?,
    };
    fill_form(&mut show, slides.len(), &args);

    let mut crossfade = Crossfade::new();
    let mut backdrop = Backdrop::new(PaletteCatalog::professional(), show.palette_id());
    let mut dragging_volume = false;
    let clock = Instant::now();

    // --- Main Loop ---
    while !rl.window_should_close() {
        let now = clock.elapsed().as_millis() as u64;
        let dt = rl.get_frame_time();

        // --- Input ---
        if rl.is_key_pressed(KeyboardKey::KEY_ENTER) && show.phase() == PresentationPhase::Idle {
            if show.form().images.is_empty() {
                fill_form(&mut show, slides.len(), &args);
            }
            if let Err(e) = show.submit(now) {
                log::warn!("{}", e);
            }
        }
        if rl.is_key_pressed(KeyboardKey::KEY_ESCAPE) {
            show.stop();
        }
        if rl.is_key_pressed(KeyboardKey::KEY_M) {
            show.toggle_mute();
        }
        let wheel = rl.get_mouse_wheel_move();
        if wheel != 0.0 {
            // Wheel up raises the volume
            show.scroll_volume(-wheel);
        }
        let mouse = rl.get_mouse_position();
        let track = hud::volume_track(rl.get_screen_width());
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT)
            && track.check_collision_point_rec(mouse)
        {
            dragging_volume = true;
            show.click_volume(mouse.x - track.x, track.width);
        } else if dragging_volume {
            if rl.is_mouse_button_down(MouseButton::MOUSE_BUTTON_LEFT) {
                show.drag_volume(mouse.x - track.x, track.width);
            } else {
                dragging_volume = false;
            }
        }

        // --- Update ---
        show.pump(now);
        let view = show.view(now);
        crossfade.update(dt, view.fading, fade_secs(show.config()));
        backdrop.update(dt, view.palette_id);
        let reveal = show.config().sparkle_reveal_ms;
        let sparkle_time = view
            .elapsed_ms
            .filter(|_| view.sparkles_visible)
            .map(|elapsed| elapsed.saturating_sub(reveal) as f32 / 1000.0);

        // --- Render ---
        let mut d = rl.begin_drawing(&thread);
        d.clear_background(Color::BLACK);
        backdrop.draw(&mut d, sparkle_time.map(|t| (show.sparkles(), t)));

        if view.phase == PresentationPhase::Running {
            if let Some(slide) = show.current_image().and_then(|&index| slides.get(index)) {
                slide.draw(&mut d, crossfade.alpha());
            }
            hud::draw_overlay(&mut d, &view);
        } else {
            let song = show
                .form()
                .track
                .as_deref()
                .map(track_label)
                .unwrap_or_else(|| "random".to_string());
            hud::draw_intro(&mut d, &view, show.form().images.len(), &song);
        }
        hud::draw_volume(&mut d, &view);
    }

    // Release the voice before the audio device goes away.
    drop(show);
    drop(audio);
    Ok(())
}
