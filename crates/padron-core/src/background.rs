//! Background clutter estimation.
//!
//! A coarse proxy for "is the backdrop plain enough for an ID photo":
//! the face region is masked to flat black, then channel deltas between
//! neighbouring pixels are accumulated at a fixed sampling stride.

use crate::types::FaceBox;
use image::{Rgb, RgbImage};

// The constants below define the score's meaning; changing any of them
// rescales every threshold built on top.
const FACE_MASK_PADDING: i64 = 20;
const SAMPLE_STRIDE: usize = 4;
const CHANNEL_WEIGHTS: [f32; 3] = [0.5, 0.3, 0.2];
const SCORE_SCALE: f32 = 0.5;

/// Score how busy the backdrop around `face` is. Higher = more cluttered.
///
/// The face box (plus padding) contributes nothing: it is painted flat
/// black before sampling, so only backdrop transitions accumulate.
pub fn clutter_score(photo: &RgbImage, face: &FaceBox) -> f32 {
    let (w, h) = photo.dimensions();
    if w == 0 || h == 0 {
        return 0.0;
    }

    let mut masked = photo.clone();
    mask_face(&mut masked, face);

    let data = masked.as_raw();
    let pixel_count = (w as usize) * (h as usize);

    let mut total = 0.0f32;
    let mut px = SAMPLE_STRIDE;
    while px < pixel_count {
        let cur = (px) * 3;
        let prev = (px - 1) * 3;
        for (c, weight) in CHANNEL_WEIGHTS.iter().enumerate() {
            total += (data[cur + c] as f32 - data[prev + c] as f32).abs() * weight;
        }
        px += SAMPLE_STRIDE;
    }

    total / (w as f32 * h as f32 * 3.0) * SCORE_SCALE
}

/// Paint the face box plus padding flat black, clamped to image bounds.
fn mask_face(photo: &mut RgbImage, face: &FaceBox) {
    let (w, h) = photo.dimensions();

    let x0 = (face.x as i64 - FACE_MASK_PADDING).max(0) as u32;
    let y0 = (face.y as i64 - FACE_MASK_PADDING).max(0) as u32;
    let x1 = ((face.x + face.width) as i64 + FACE_MASK_PADDING).clamp(0, w as i64) as u32;
    let y1 = ((face.y + face.height) as i64 + FACE_MASK_PADDING).clamp(0, h as i64) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            photo.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
}
