use image::{imageops::FilterType, Rgba, RgbaImage};
use serde::Serialize;

use super::config::{FaceHeuristicConfig, SkinToneThresholds};

/// Per-frame statistics over the centre window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameStats {
    pub avg_luminance: f64,
    pub skin_ratio: f64,
    pub window_pixels: u32,
}

/// Downscale a camera frame to the analysis size.
pub fn downscale(frame: &RgbaImage, config: &FaceHeuristicConfig) -> RgbaImage {
    if frame.width() == config.sample_width && frame.height() == config.sample_height {
        return frame.clone();
    }
    image::imageops::resize(
        frame,
        config.sample_width,
        config.sample_height,
        FilterType::Triangle,
    )
}

/// Pixel bounds `(x0, y0, x1, y1)` of the square window centred on the frame,
/// clipped to the frame. End coordinates are exclusive.
pub fn center_window(width: u32, height: u32, size: u32) -> (u32, u32, u32, u32) {
    let half = size / 2;
    let (cx, cy) = (width / 2, height / 2);
    let x0 = cx.saturating_sub(half);
    let y0 = cy.saturating_sub(half);
    let x1 = cx.saturating_add(size - half).min(width);
    let y1 = cy.saturating_add(size - half).min(height);
    (x0, y0, x1, y1)
}

pub fn is_skin_tone(pixel: &Rgba<u8>, skin: &SkinToneThresholds) -> bool {
    let [r, g, b, _] = pixel.0;
    r > skin.red_floor
        && g > skin.green_floor
        && b > skin.blue_floor
        && r > g
        && r > b
        && r - g > skin.min_red_green_gap
}

/// Luminance and skin-tone fraction over the centre window of an
/// already-downscaled frame.
pub fn analyze_frame(frame: &RgbaImage, config: &FaceHeuristicConfig) -> FrameStats {
    let (x0, y0, x1, y1) = center_window(frame.width(), frame.height(), config.window_size);

    let mut luminance_sum = 0.0;
    let mut skin_pixels = 0u32;
    let mut total = 0u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = frame.get_pixel(x, y);
            let [r, g, b, _] = pixel.0;
            luminance_sum += (r as f64 + g as f64 + b as f64) / 3.0;
            if is_skin_tone(pixel, &config.skin) {
                skin_pixels += 1;
            }
            total += 1;
        }
    }

    if total == 0 {
        return FrameStats {
            avg_luminance: 0.0,
            skin_ratio: 0.0,
            window_pixels: 0,
        };
    }

    FrameStats {
        avg_luminance: luminance_sum / total as f64,
        skin_ratio: skin_pixels as f64 / total as f64,
        window_pixels: total,
    }
}

pub fn is_face_present(stats: &FrameStats, config: &FaceHeuristicConfig) -> bool {
    stats.window_pixels > 0
        && stats.avg_luminance > config.min_luminance
        && stats.skin_ratio > config.min_skin_ratio
}

/// Full pipeline for one camera frame: downscale, analyse, classify.
pub fn classify_frame(frame: &RgbaImage, config: &FaceHeuristicConfig) -> (bool, FrameStats) {
    let small = downscale(frame, config);
    let stats = analyze_frame(&small, config);
    (is_face_present(&stats, config), stats)
}
