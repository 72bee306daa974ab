use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded from environment variables.
pub struct Config {
    /// Directory containing the SCRFD ONNX export.
    pub model_dir: PathBuf,
    /// Detection confidence threshold.
    pub detector_confidence: f32,
    /// Latency of the simulated submission round trip.
    pub gateway_latency: Duration,
}

impl Config {
    /// Load configuration from `PADRON_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("PADRON_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_dir());

        Self {
            model_dir,
            detector_confidence: env_f32("PADRON_DETECTOR_CONFIDENCE", 0.3),
            gateway_latency: Duration::from_millis(env_u64("PADRON_GATEWAY_LATENCY_MS", 1000)),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn scrfd_model_path(&self) -> String {
        self.model_dir
            .join("det_10g.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("padron/models")
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
