use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl FaceBox {
    /// Horizontal center of the box.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// A photo that passed every acceptance check.
///
/// Only [`PhotoValidator`](crate::PhotoValidator) constructs one, so holding
/// a `ValidatedPhoto` proves the image was accepted. The decoded image sits
/// behind an `Arc`: cards and previews share the same buffer and the pixels
/// are released when the last handle is dropped.
#[derive(Clone)]
pub struct ValidatedPhoto {
    image: Arc<RgbImage>,
}

impl ValidatedPhoto {
    pub(crate) fn new(image: RgbImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// (width, height) of the accepted photo.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

impl std::fmt::Debug for ValidatedPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.dimensions();
        f.debug_struct("ValidatedPhoto")
            .field("width", &w)
            .field("height", &h)
            .finish()
    }
}

/// Why a photo was not accepted. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("No se detectó ningún rostro en la imagen. Por favor, tome una foto donde se vea claramente su rostro.")]
    NoFace,
    #[error("Se detectó más de una persona en la imagen. Por favor, tome una foto individual.")]
    MultipleFaces,
    #[error("Por favor, centre su rostro en la imagen.")]
    OffCenter,
    #[error("Por favor, mire directamente a la cámara. No se permiten fotos de perfil.")]
    NotFrontal,
    #[error("El fondo de la imagen es demasiado complejo. Por favor, use un fondo más liso.")]
    BusyBackground,
    /// Detector failure. The detail is kept for logs; the message shown to
    /// the user stays generic.
    #[error("Error al analizar la imagen. Por favor, intente nuevamente.")]
    Analysis(String),
}
