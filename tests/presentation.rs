mod support;

use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;

use slideshow::audio::AudioState;
use slideshow::constants::{AUDIO_LOAD_FAILED_MESSAGE, DEFAULT_DISPLAY_NAME, TERMINAL_PALETTE};
use slideshow::{CycleState, PresentationConfig, PresentationPhase, SubmitOutcome, ValidationError};

use support::*;

#[test]
fn crossfade_lands_mid_fade() {
    let (mut show, _sink) = ready(&["a", "b", "c"]);
    assert!(matches!(show.submit(0), Ok(SubmitOutcome::Started(_))));
    assert_eq!(show.phase(), PresentationPhase::Starting);
    assert_eq!(show.epoch(), None);

    show.pump(0);
    assert_eq!(show.phase(), PresentationPhase::Running);
    assert_eq!(show.epoch(), Some(0));

    show.pump(799);
    assert_eq!(show.cycle(), CycleState { current_index: 0, fading: false });

    show.pump(800);
    assert!(show.cycle().fading);
    show.pump(900);
    assert_eq!(show.cycle(), CycleState { current_index: 0, fading: true });

    show.pump(1_000);
    assert_eq!(show.cycle(), CycleState { current_index: 1, fading: false });
    assert_eq!(show.current_image(), Some(&"b"));
}

#[test]
fn cycle_speeds_up_after_the_first_band() {
    let (mut show, _sink) = ready(&["a", "b", "c"]);
    start(&mut show, 0);

    // Coarse pumping must give the same answer as fine pumping.
    show.pump(15_000);
    let index_at_15s = show.cycle().current_index;
    assert_eq!(index_at_15s, 15 % 3);
    assert_eq!(show.view(15_000).speed_ms, 500);

    // 500ms per image from here: two more advances by 16s.
    show.pump(16_000);
    assert_eq!(show.cycle().current_index, (index_at_15s + 2) % 3);
}

#[test]
fn index_never_leaves_the_image_set() {
    let (mut show, _sink) = ready(&["a", "b"]);
    start(&mut show, 0);
    let mut fades = 0;
    for now in (0..40_000).step_by(50) {
        show.pump(now);
        assert!(show.cycle().current_index < 2);
        fades += usize::from(show.cycle().fading);
    }
    assert!(fades > 0);
}

#[test]
fn epoch_is_taken_after_the_decode_returns() {
    let (mut show, sink) = ready(&["a", "b"]);
    sink.0.borrow_mut().decode_delay = Some(Duration::from_millis(30));
    let clock = Instant::now();

    show.submit(0).unwrap();
    let decoded_at = clock.elapsed().as_millis() as u64;
    assert!(decoded_at >= 30);
    assert_eq!(sink.plays().len(), 1);
    assert_eq!(show.phase(), PresentationPhase::Starting);
    assert_eq!(show.epoch(), None);
    assert_eq!(show.pending_timers(), 0);

    show.pump(decoded_at);
    assert_eq!(show.phase(), PresentationPhase::Running);
    assert_eq!(show.epoch(), Some(decoded_at));

    // The first advance is measured from the post-decode epoch.
    show.pump(decoded_at + 799);
    assert!(!show.cycle().fading);
    show.pump(decoded_at + 800);
    assert!(show.cycle().fading);
}

#[test]
fn track_ending_before_the_run_starts_still_cleans_up() {
    let (mut show, sink) = ready(&["a", "b"]);
    show.submit(0).unwrap();
    sink.finish();

    // The run starts, then the finished track closes it in the same pump.
    show.pump(5);
    assert_eq!(show.phase(), PresentationPhase::Idle);
    assert_eq!(show.epoch(), None);
    assert_eq!(show.pending_timers(), 0);
    assert_eq!(show.palette_id(), TERMINAL_PALETTE);
}

#[test]
fn failed_audio_still_runs_silently() {
    let (mut show, sink) = controller(config(), MapFetcher::with_tracks(&[]));
    show.add_images(["a", "b"]).unwrap();
    show.set_track(Some(SONG.to_string()));

    start(&mut show, 250);
    assert_eq!(show.phase(), PresentationPhase::Running);
    assert_eq!(show.epoch(), Some(250));
    assert_eq!(show.audio_error(), Some(AUDIO_LOAD_FAILED_MESSAGE));
    assert!(sink.plays().is_empty());

    show.pump(1_250);
    assert_eq!(show.cycle().current_index, 1);
}

#[test]
fn decode_failure_is_reported_like_a_missing_file() {
    let (mut show, sink) = ready(&["a", "b"]);
    sink.0.borrow_mut().reject_decode = true;
    start(&mut show, 0);
    assert_eq!(show.phase(), PresentationPhase::Running);
    assert_eq!(show.audio_error(), Some(AUDIO_LOAD_FAILED_MESSAGE));
    assert_eq!(show.audio_state(), AudioState::Ended(slideshow::audio::EndReason::LoadFailed));
}

#[test]
fn natural_end_runs_terminal_cleanup() {
    let (mut show, sink) = ready(&["a", "b", "c"]);
    start(&mut show, 0);
    show.pump(30_000);
    assert_eq!(show.palette_id(), 1);

    sink.finish();
    show.pump(30_050);

    assert_eq!(show.phase(), PresentationPhase::Idle);
    assert_eq!(show.epoch(), None);
    assert_eq!(show.palette_id(), TERMINAL_PALETTE);
    assert!(show.images().is_empty());
    assert!(show.form().images.is_empty());
    assert_eq!(show.form().track, None);
    assert_eq!(show.form().name, "");
    assert_eq!(show.pending_timers(), 0);
    assert_eq!(show.audio_state(), AudioState::Idle);
}

#[test]
fn playback_failure_takes_the_same_exit() {
    let (mut show, sink) = ready(&["a", "b"]);
    start(&mut show, 0);
    show.pump(2_000);

    sink.fail("device unplugged");
    show.pump(2_100);
    assert_eq!(show.phase(), PresentationPhase::Idle);
    assert_eq!(show.epoch(), None);
    assert_eq!(show.palette_id(), TERMINAL_PALETTE);
}

#[test]
fn stop_freezes_every_output() {
    let (mut show, _sink) = ready(&["a", "b", "c"]);
    start(&mut show, 0);
    show.pump(1_850);
    let frozen = show.cycle();
    assert!(frozen.fading);
    // Both intervals plus the armed advance.
    assert_eq!(show.pending_timers(), 3);

    assert!(show.stop());
    let palette = show.palette_id();
    assert_eq!(show.pending_timers(), 0);

    show.pump(1_900);
    show.pump(120_000);
    assert_eq!(show.cycle(), frozen);
    assert_eq!(show.palette_id(), palette);
    assert_eq!(show.phase(), PresentationPhase::Idle);

    assert!(!show.stop());
}

#[test]
fn guard_rejects_bad_forms_without_side_effects() {
    let (mut show, sink) = controller(config(), MapFetcher::with_tracks(&[SONG]));

    assert_eq!(show.submit(0), Err(ValidationError::NoImages));
    assert_eq!(show.phase(), PresentationPhase::Idle);

    show.add_images(["only"]).unwrap();
    assert_eq!(
        show.submit(0),
        Err(ValidationError::NotEnoughImages { min: 2, got: 1 })
    );
    assert_eq!(show.form().images, vec!["only"]);

    show.add_images(["second"]).unwrap();
    show.set_track(Some("missing.mp3".into()));
    assert_eq!(
        show.submit(0),
        Err(ValidationError::UnknownTrack {
            track: "missing.mp3".into()
        })
    );
    assert_eq!(
        show.view(0).validation_message.as_deref(),
        Some("Unknown track: missing.mp3")
    );

    assert_eq!(show.epoch(), None);
    assert_eq!(show.pending_timers(), 0);
    assert!(sink.plays().is_empty());
}

#[test]
fn empty_catalog_without_selection_has_no_track() {
    let config = PresentationConfig {
        tracks: Vec::new(),
        ..config()
    };
    let (mut show, _sink) = controller(config, MapFetcher::with_tracks(&[]));
    show.add_images(["a", "b"]).unwrap();
    assert_eq!(show.submit(0), Err(ValidationError::NoTrackAvailable));
}

#[test]
fn oversized_batch_keeps_previous_selection() {
    let (mut show, _sink) = controller(config(), MapFetcher::with_tracks(&[SONG]));
    show.add_images(["a"; 19]).unwrap();
    assert_eq!(
        show.add_images(["b", "c"]),
        Err(ValidationError::TooManyImages { max: 20 })
    );
    assert_eq!(show.form().images.len(), 19);
    assert_eq!(
        show.view(0).validation_message.as_deref(),
        Some("You can upload up to 20 images. Your current selection was kept.")
    );
    assert_eq!(show.add_images(["d"]), Ok(20));
}

#[test]
fn blank_selection_picks_from_catalog() {
    let (mut show, sink) = controller(config(), MapFetcher::with_tracks(&[SONG, "other.mp3"]));
    show.add_images(["a", "b"]).unwrap();
    show.set_track(Some("   ".into()));
    show.submit(0).unwrap();

    let played = sink.plays();
    assert_eq!(played.len(), 1);
    assert!(config().tracks.contains(&played[0].0));
    let label = show.view(0).current_track_label;
    assert!(label == "song" || label == "other");
}

#[test]
fn second_submit_is_ignored_while_running() {
    let (mut show, sink) = ready(&["a", "b"]);
    let first = start(&mut show, 0);
    show.pump(500);
    assert_eq!(show.submit(600), Ok(SubmitOutcome::Ignored));
    assert!(matches!(first, SubmitOutcome::Started(1)));
    assert_eq!(show.epoch(), Some(0));
    assert_eq!(sink.plays().len(), 1);
}

#[test]
fn default_name_fills_blank_input() {
    let (mut show, _sink) = ready(&["a", "b"]);
    show.set_name("   ");
    show.submit(0).unwrap();
    assert_eq!(show.view(0).display_name, DEFAULT_DISPLAY_NAME);
}

#[test]
fn palette_override_is_a_pin_not_a_reset() {
    let (mut show, _sink) = ready(&["a", "b"]);
    start(&mut show, 0);
    show.pump(30_000);
    assert_eq!(show.palette_id(), 1);

    show.force_palette(4);
    assert_eq!(show.palette_id(), 4);
    show.pump(50_000);
    assert_eq!(show.palette_id(), 4);

    show.clear_palette_override(50_000);
    assert_eq!(show.palette_id(), 2);
}

#[test]
fn palette_only_moves_forward_while_running() {
    let (mut show, _sink) = ready(&["a", "b"]);
    start(&mut show, 0);
    let mut last = show.palette_id();
    for now in (0..100_000).step_by(500) {
        show.pump(now);
        assert!(show.palette_id() >= last);
        last = show.palette_id();
    }
    assert_eq!(last, 5);
}

#[test]
fn restart_begins_at_band_zero() {
    let (mut show, sink) = ready(&["a", "b"]);
    start(&mut show, 0);
    show.pump(45_000);
    sink.finish();
    show.pump(45_100);
    assert_eq!(show.palette_id(), TERMINAL_PALETTE);

    show.add_images(["c", "d"]).unwrap();
    start(&mut show, 50_000);
    assert_eq!(show.epoch(), Some(50_000));
    assert_eq!(show.palette_id(), 0);
    assert_eq!(show.cycle(), CycleState::default());
    assert!(show.view(50_000).audio_error.is_none());
}

#[test]
fn volume_survives_restarts_and_reaches_the_sink() {
    let (mut show, sink) = ready(&["a", "b"]);
    show.toggle_mute();
    show.scroll_volume(-1.0);
    show.scroll_volume(-1.0);
    assert_relative_eq!(show.volume().value(), 0.10);

    show.submit(0).unwrap();
    assert_relative_eq!(sink.plays()[0].1, 0.10);

    show.click_volume(75.0, 100.0);
    assert_relative_eq!(sink.volume(), 0.75);

    sink.finish();
    show.pump(100);
    assert_relative_eq!(show.view(100).volume, 0.75);
}

#[test]
fn view_serializes_for_the_renderer() {
    let (mut show, _sink) = ready(&["a", "b", "c"]);
    start(&mut show, 0);
    show.pump(1_000);
    let json = serde_json::to_value(show.view(1_000)).unwrap();
    assert_eq!(json["current_index"], 1);
    assert_eq!(json["fading"], false);
    assert_eq!(json["phase"], "Running");
    assert_eq!(json["counter_label"], "Image 2 of 3");
    assert_eq!(json["sparkles_visible"], true);
    assert_eq!(json["display_name"], "Ada");
    assert_eq!(json["volume_percent"], 50);
}

fn pump_until(show: &mut Controller, mut now: u64, done: impl Fn(&Controller) -> bool) -> u64 {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(show) {
        assert!(Instant::now() < deadline, "condition never reached");
        std::thread::sleep(Duration::from_millis(1));
        now += 1;
        show.pump(now);
    }
    now
}

#[test]
fn epoch_waits_for_background_fetch() {
    let config = PresentationConfig {
        background_fetch: true,
        ..config()
    };
    let (fetcher, gate) = gated_fetcher();
    let (mut show, sink) = controller(config, fetcher);
    show.add_images(["a", "b"]).unwrap();
    show.set_track(Some(SONG.into()));

    show.submit(0).unwrap();
    assert_eq!(show.phase(), PresentationPhase::Starting);
    show.pump(3_000);
    assert_eq!(show.epoch(), None);
    assert_eq!(show.pending_timers(), 0);
    assert_eq!(show.submit(3_000), Ok(SubmitOutcome::Ignored));

    gate.release();
    let now = pump_until(&mut show, 3_000, |s| s.phase() == PresentationPhase::Running);
    assert_eq!(show.epoch(), Some(now));
    assert_eq!(show.cycle(), CycleState::default());
    assert_eq!(sink.plays().len(), 1);
}

#[test]
fn stopped_start_discards_late_fetch() {
    let config = PresentationConfig {
        background_fetch: true,
        ..config()
    };
    let (fetcher, gate) = gated_fetcher();
    let (mut show, sink) = controller(config, fetcher);
    show.add_images(["a", "b"]).unwrap();
    show.set_track(Some(SONG.into()));

    show.submit(0).unwrap();
    assert!(show.stop());
    gate.release();

    show.pump(10);
    show.pump(5_000);
    assert_eq!(show.phase(), PresentationPhase::Idle);
    assert_eq!(show.epoch(), None);
    assert!(sink.plays().is_empty());
    assert_eq!(show.palette_id(), TERMINAL_PALETTE);
}
