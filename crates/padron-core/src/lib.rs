//! padron-core — face-photo acceptance engine.
//!
//! Detects faces with five-point landmarks (SCRFD via ONNX Runtime) and
//! applies the registration acceptance checks: exactly one face, centered,
//! frontal pose, plain background.

pub mod background;
pub mod detector;
pub mod types;
pub mod validator;

pub use detector::{DetectError, FaceFinder, ScrfdDetector};
pub use types::{FaceBox, Rejection, ValidatedPhoto};
pub use validator::PhotoValidator;
