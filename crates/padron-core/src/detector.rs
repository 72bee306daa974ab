//! SCRFD face detection via ONNX Runtime.
//!
//! Runs an SCRFD export over decoded color photos: letterbox resize into the
//! model input, 3-stride anchor-free decoding, and NMS. The five-point
//! landmarks (eyes, nose, mouth corners) feed the pose checks in
//! [`validator`](crate::validator).

use crate::types::FaceBox;
use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const INPUT_SIZE: usize = 640;
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 128.0;
const DEFAULT_CONFIDENCE: f32 = 0.5;
const NMS_IOU: f32 = 0.4;
const STRIDES: [usize; 3] = [8, 16, 32];
const ANCHORS_PER_CELL: usize = 2;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("model file not found: {0} — place an SCRFD ONNX export there (see PADRON_MODEL_DIR)")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Seam between the validator and whatever produces face detections.
///
/// Production uses [`ScrfdDetector`]; tests stub this out.
pub trait FaceFinder {
    fn find_faces(&mut self, photo: &RgbImage) -> Result<Vec<FaceBox>, DetectError>;
}

/// Letterbox geometry: maps model-input coordinates back to photo space.
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    fn fit(src_w: u32, src_h: u32) -> Self {
        let scale = (INPUT_SIZE as f32 / src_w as f32).min(INPUT_SIZE as f32 / src_h as f32);
        let new_w = (src_w as f32 * scale).round();
        let new_h = (src_h as f32 * scale).round();
        Self {
            scale,
            pad_x: (INPUT_SIZE as f32 - new_w) / 2.0,
            pad_y: (INPUT_SIZE as f32 - new_h) / 2.0,
        }
    }

    fn to_photo(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// SCRFD-based face detector for still photos.
pub struct ScrfdDetector {
    session: Session,
    confidence: f32,
}

impl ScrfdDetector {
    /// Load an SCRFD ONNX export with the default confidence threshold.
    pub fn load(model_path: &str) -> Result<Self, DetectError> {
        Self::load_with_confidence(model_path, DEFAULT_CONFIDENCE)
    }

    /// Load with an explicit confidence threshold.
    pub fn load_with_confidence(model_path: &str, confidence: f32) -> Result<Self, DetectError> {
        if !Path::new(model_path).exists() {
            return Err(DetectError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let num_outputs = session.outputs().len();
        tracing::info!(
            path = model_path,
            outputs = num_outputs,
            confidence,
            "loaded SCRFD model"
        );

        // 3 strides × (score, bbox, kps) in positional order.
        if num_outputs < 9 {
            return Err(DetectError::InferenceFailed(format!(
                "SCRFD export must have 9 outputs (3 strides × score/bbox/kps), got {num_outputs}"
            )));
        }

        Ok(Self {
            session,
            confidence,
        })
    }

    /// NCHW float tensor from a letterboxed RGB resize.
    ///
    /// Padding is filled with the model mean so it normalizes to zero.
    fn preprocess(&self, photo: &RgbImage, letterbox: &Letterbox) -> Array4<f32> {
        let (src_w, src_h) = photo.dimensions();
        let new_w = (src_w as f32 * letterbox.scale).round() as u32;
        let new_h = (src_h as f32 * letterbox.scale).round() as u32;

        let resized =
            image::imageops::resize(photo, new_w.max(1), new_h.max(1), FilterType::Triangle);

        let x_off = letterbox.pad_x.floor() as usize;
        let y_off = letterbox.pad_y.floor() as usize;

        let mut tensor =
            Array4::<f32>::from_elem((1, 3, INPUT_SIZE, INPUT_SIZE), 0.0);

        for y in 0..INPUT_SIZE {
            for x in 0..INPUT_SIZE {
                let inside = y >= y_off
                    && y < y_off + new_h as usize
                    && x >= x_off
                    && x < x_off + new_w as usize;
                // Padding carries the model mean so it normalizes to zero.
                let rgb: [f32; 3] = if inside {
                    resized
                        .get_pixel((x - x_off) as u32, (y - y_off) as u32)
                        .0
                        .map(|v| v as f32)
                } else {
                    [PIXEL_MEAN; 3]
                };
                for (c, value) in rgb.iter().enumerate() {
                    tensor[[0, c, y, x]] = (value - PIXEL_MEAN) / PIXEL_STD;
                }
            }
        }

        tensor
    }
}

impl FaceFinder for ScrfdDetector {
    /// Detect faces, most confident first.
    fn find_faces(&mut self, photo: &RgbImage) -> Result<Vec<FaceBox>, DetectError> {
        let (w, h) = photo.dimensions();
        let letterbox = Letterbox::fit(w, h);
        let input = self.preprocess(photo, &letterbox);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut candidates = Vec::new();
        for (pos, &stride) in STRIDES.iter().enumerate() {
            // Positional layout: [0-2]=scores, [3-5]=bboxes, [6-8]=kps.
            let (_, scores) = outputs[pos]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, bboxes) = outputs[pos + 3]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;
            let (_, kps) = outputs[pos + 6]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectError::InferenceFailed(format!("kps stride {stride}: {e}")))?;

            candidates.extend(decode_stride(
                scores,
                bboxes,
                kps,
                stride,
                &letterbox,
                self.confidence,
            ));
        }

        let mut faces = nms(candidates, NMS_IOU);
        faces.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        tracing::debug!(count = faces.len(), "detection complete");
        Ok(faces)
    }
}

/// Decode one stride level of SCRFD output into photo-space boxes.
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    kps: &[f32],
    stride: usize,
    letterbox: &Letterbox,
    threshold: f32,
) -> Vec<FaceBox> {
    let grid = INPUT_SIZE / stride;
    let num_anchors = grid * grid * ANCHORS_PER_CELL;

    let mut faces = Vec::new();
    for idx in 0..num_anchors {
        let score = scores.get(idx).copied().unwrap_or(0.0);
        if score <= threshold {
            continue;
        }

        let cell = idx / ANCHORS_PER_CELL;
        let anchor_cx = (cell % grid) as f32 * stride as f32;
        let anchor_cy = (cell / grid) as f32 * stride as f32;

        let b = idx * 4;
        if b + 3 >= bboxes.len() {
            continue;
        }
        let (x1, y1) = letterbox.to_photo(
            anchor_cx - bboxes[b] * stride as f32,
            anchor_cy - bboxes[b + 1] * stride as f32,
        );
        let (x2, y2) = letterbox.to_photo(
            anchor_cx + bboxes[b + 2] * stride as f32,
            anchor_cy + bboxes[b + 3] * stride as f32,
        );

        let k = idx * 10;
        let landmarks = if k + 9 < kps.len() {
            let mut points = [(0.0f32, 0.0f32); 5];
            for (i, point) in points.iter_mut().enumerate() {
                *point = letterbox.to_photo(
                    anchor_cx + kps[k + i * 2] * stride as f32,
                    anchor_cy + kps[k + i * 2 + 1] * stride as f32,
                );
            }
            Some(points)
        } else {
            None
        };

        faces.push(FaceBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            confidence: score,
            landmarks,
        });
    }

    faces
}

/// Non-maximum suppression over the combined candidate set.
fn nms(mut candidates: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<FaceBox> = Vec::new();
    for candidate in candidates {
        if kept.iter().all(|k| iou(k, &candidate) <= iou_threshold) {
            kept.push(candidate);
        }
    }
    kept
}

fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.width * a.height + b.width * b.height - inter;

    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
