//! Photo acceptance pipeline.
//!
//! Checks run in order and stop at the first failure: face count,
//! horizontal centering, frontal pose (landmark proxies), background
//! clutter. An accepted image becomes a [`ValidatedPhoto`].

use crate::background;
use crate::detector::FaceFinder;
use crate::types::{FaceBox, Rejection, ValidatedPhoto};
use image::RgbImage;

/// Maximum horizontal offset of the face center from the image center,
/// as a fraction of image width.
const MAX_CENTER_OFFSET_RATIO: f32 = 0.3;
/// Yaw proxy limit: |eye midpoint x − nose x| / eye Δx.
const MAX_YAW_RATIO: f32 = 0.2;
/// Pitch proxy limit: |eye Δy| / eye Δx.
const MAX_EYE_SLOPE: f32 = 0.15;
/// Background clutter limit (see [`background::clutter_score`]).
const MAX_BACKGROUND_CLUTTER: f32 = 0.6;

/// Runs the acceptance checks on candidate photos.
///
/// Generic over the face finder so the pipeline is testable without model
/// weights; production code plugs in [`ScrfdDetector`](crate::ScrfdDetector).
pub struct PhotoValidator<F> {
    finder: F,
}

impl<F: FaceFinder> PhotoValidator<F> {
    pub fn new(finder: F) -> Self {
        Self { finder }
    }

    /// Validate a candidate photo, consuming it.
    ///
    /// On rejection the image is dropped — the caller starts over with a new
    /// capture, matching the form behaviour of clearing the photo input.
    pub fn validate(&mut self, photo: RgbImage) -> Result<ValidatedPhoto, Rejection> {
        let faces = self.finder.find_faces(&photo).map_err(|e| {
            tracing::warn!(error = %e, "face detection failed");
            Rejection::Analysis(e.to_string())
        })?;

        let face = match faces.as_slice() {
            [] => return Err(Rejection::NoFace),
            [face] => face,
            _ => return Err(Rejection::MultipleFaces),
        };

        let (width, _) = photo.dimensions();
        let offset = (width as f32 / 2.0 - face.center_x()).abs();
        if offset >= width as f32 * MAX_CENTER_OFFSET_RATIO {
            return Err(Rejection::OffCenter);
        }

        if !is_frontal(face) {
            return Err(Rejection::NotFrontal);
        }

        let clutter = background::clutter_score(&photo, face);
        if clutter > MAX_BACKGROUND_CLUTTER {
            tracing::debug!(clutter, "photo rejected for backdrop");
            return Err(Rejection::BusyBackground);
        }

        Ok(ValidatedPhoto::new(photo))
    }
}

/// Frontal-pose proxy from the eye and nose landmarks.
///
/// Not a true 3-D pose estimate: yaw is approximated by how far the nose
/// sits from the eye midpoint, pitch by the slope between the eyes, both
/// normalized by the horizontal eye distance. Degenerate geometry (missing
/// landmarks, non-positive eye distance) counts as not frontal.
fn is_frontal(face: &FaceBox) -> bool {
    let Some([left_eye, right_eye, nose, ..]) = face.landmarks else {
        return false;
    };

    let eye_dx = right_eye.0 - left_eye.0;
    if eye_dx <= f32::EPSILON {
        return false;
    }

    let yaw = ((left_eye.0 + right_eye.0) / 2.0 - nose.0).abs() / eye_dx;
    let slope = (right_eye.1 - left_eye.1).abs() / eye_dx;

    yaw < MAX_YAW_RATIO && slope < MAX_EYE_SLOPE
}
