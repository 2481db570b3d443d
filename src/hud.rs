use raylib::prelude::*;

use slideshow::PresentationView;
use slideshow::volume::VolumeLevel;

const MARGIN: i32 = 20;
const SLIDER_WIDTH: f32 = 160.0;
const SLIDER_HEIGHT: f32 = 8.0;

/// Hit area of the volume slider track, top-right corner.
pub fn volume_track(screen_width: i32) -> Rectangle {
    Rectangle::new(
        screen_width as f32 - SLIDER_WIDTH - MARGIN as f32,
        MARGIN as f32 + 8.0,
        SLIDER_WIDTH,
        SLIDER_HEIGHT,
    )
}

pub fn draw_volume(d: &mut RaylibDrawHandle, view: &PresentationView) {
    let track = volume_track(d.get_screen_width());
    let icon = match view.volume_level {
        VolumeLevel::Muted => "MUTE",
        VolumeLevel::Low => "VOL-",
        VolumeLevel::Medium => "VOL",
        VolumeLevel::High => "VOL+",
    };
    d.draw_text(icon, track.x as i32 - 60, track.y as i32 - 6, 20, Color::WHITE);
    d.draw_rectangle_rec(track, Color::new(255, 255, 255, 60));
    let fill = Rectangle::new(track.x, track.y, track.width * view.volume, track.height);
    d.draw_rectangle_rec(fill, Color::new(100, 108, 255, 220));
    d.draw_circle_v(
        Vector2::new(fill.x + fill.width, track.y + track.height * 0.5),
        8.0,
        Color::WHITE,
    );
    d.draw_text(
        &format!("{}%", view.volume_percent),
        track.x as i32,
        track.y as i32 + 14,
        14,
        Color::LIGHTGRAY,
    );
}

pub fn draw_overlay(d: &mut RaylibDrawHandle, view: &PresentationView) {
    let mut y = MARGIN;
    d.draw_text(&view.counter_label, MARGIN, y, 20, Color::WHITE);
    y += 28;
    if !view.display_name.is_empty() {
        d.draw_text(&view.display_name, MARGIN, y, 28, Color::WHITE);
        y += 36;
    }
    if !view.current_track_label.is_empty() {
        d.draw_text("Now Playing:", MARGIN, y, 16, Color::LIGHTGRAY);
        y += 20;
        d.draw_text(&view.current_track_label, MARGIN, y, 20, Color::WHITE);
        y += 28;
    }
    if let Some(error) = &view.audio_error {
        d.draw_text(error, MARGIN, y, 18, Color::new(255, 107, 107, 255));
    }

    let width = d.get_screen_width();
    let height = d.get_screen_height();
    d.draw_rectangle(0, height - 6, width, 6, Color::new(255, 255, 255, 40));
    d.draw_rectangle(
        0,
        height - 6,
        (width as f32 * view.progress) as i32,
        6,
        Color::new(100, 108, 255, 255),
    );
}

pub fn draw_intro(d: &mut RaylibDrawHandle, view: &PresentationView, selected: usize, track: &str) {
    let x = MARGIN * 3;
    let mut y = d.get_screen_height() / 3;
    d.draw_text(
        "Upload images to make a presentation with music and effects!",
        x,
        y,
        28,
        Color::WHITE,
    );
    y += 48;
    d.draw_text(
        &format!("{} image{} selected", selected, if selected == 1 { "" } else { "s" }),
        x,
        y,
        20,
        Color::LIGHTGRAY,
    );
    y += 28;
    d.draw_text(&format!("Song: {}", track), x, y, 20, Color::LIGHTGRAY);
    y += 40;
    d.draw_text("ENTER start   ESC stop   M mute   wheel volume", x, y, 18, Color::GRAY);
    y += 32;
    if let Some(message) = &view.validation_message {
        d.draw_text(message, x, y, 20, Color::new(255, 107, 107, 255));
    } else if view.phase == slideshow::PresentationPhase::Starting {
        d.draw_text("Starting...", x, y, 20, Color::WHITE);
    }
}
