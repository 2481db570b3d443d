use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use exif::{In, Reader, Tag, Value};
use raylib::prelude::*;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "wav", "flac", "qoa"];

// --- Helper: List files with one of `extensions`, sorted by name ---
pub fn load_sorted_paths(dir_path: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir_path)
        .with_context(|| format!("Failed to read directory {}", dir_path.display()))?;

    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.contains(&ext.to_lowercase().as_str()));
        if matches {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    if paths.is_empty() {
        bail!("No matching files found in directory: {}", dir_path.display());
    }
    Ok(paths)
}

/// EXIF orientation tag, 1 (normal) when absent or unreadable.
fn read_orientation(image_path: &Path, file_bytes: &[u8]) -> u32 {
    match Reader::new().read_from_container(&mut Cursor::new(file_bytes)) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| match &field.value {
                Value::Short(values) => values.first().map(|v| u32::from(*v)),
                _ => None,
            })
            .unwrap_or(1),
        Err(e) => {
            // Non-critical: proceed without rotation
            log::warn!("Could not read EXIF data for {}: {}", image_path.display(), e);
            1
        }
    }
}

// --- Load Image, Apply EXIF Rotation, Create Texture ---
pub fn load_texture_with_exif_rotation(
    rl: &mut RaylibHandle,
    thread: &RaylibThread,
    image_path: &Path,
) -> Result<Texture2D> {
    let file_bytes = fs::read(image_path)
        .with_context(|| format!("Failed to read file {}", image_path.display()))?;

    let extension = image_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();

    // EXIF is only reliable for JPEG
    let orientation = if extension == "jpg" || extension == "jpeg" {
        read_orientation(image_path, &file_bytes)
    } else {
        1
    };

    let mut image = Image::load_image_from_mem(&format!(".{}", extension), &file_bytes)
        .map_err(|e| anyhow!("Failed to load image data for {}: {}", image_path.display(), e))?;

    // 3 = 180 deg, 6 = 90 deg clockwise, 8 = 90 deg counter-clockwise.
    // Flipped orientations are drawn as-is.
    match orientation {
        3 => {
            image.rotate_cw();
            image.rotate_cw();
        }
        6 => image.rotate_cw(),
        8 => image.rotate_ccw(),
        _ => {}
    }
    if orientation != 1 {
        log::debug!("Applied EXIF orientation {} to {}", orientation, image_path.display());
    }

    let texture = rl
        .load_texture_from_image(thread, &image)
        .map_err(|e| anyhow!("Failed to create texture for {}: {}", image_path.display(), e))?;

    Ok(texture)
}
