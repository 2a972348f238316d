//! Pretrained forecast model loaded from a serialized weight artifact.

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Input window length every city model was trained with.
pub const WINDOW: usize = 14;

/// Forecast horizon in days.
pub const HORIZON: usize = 7;

/// What a model emits per inference call. Declared in the artifact and
/// bound once at load time; the forecast engine branches on this instead
/// of sniffing output shapes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    /// One step ahead per call; the engine feeds predictions back in.
    SingleStep,
    /// All seven steps in a single call.
    MultiStep,
}

impl ModelCapability {
    /// Output length a conforming model must produce.
    pub fn output_len(&self) -> usize {
        match self {
            ModelCapability::SingleStep => 1,
            ModelCapability::MultiStep => HORIZON,
        }
    }
}

/// On-disk shape of a model artifact, exported by the upstream training
/// pipeline as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelArtifact {
    city: String,
    capability: ModelCapability,
    window: usize,
    /// Row-major weights, one row per output step.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// An opaque pretrained predictor over a fixed window of normalized values.
///
/// The weights are whatever the training pipeline exported; this service
/// never inspects or retrains them, it only applies the affine map.
#[derive(Debug, Clone)]
pub struct PretrainedModel {
    pub city: String,
    pub capability: ModelCapability,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl PretrainedModel {
    /// Build a model from raw parts, validating shapes against the
    /// declared capability.
    pub fn new(
        city: String,
        capability: ModelCapability,
        weights: Array2<f64>,
        bias: Array1<f64>,
    ) -> Result<Self> {
        let out = capability.output_len();
        if weights.nrows() != out || weights.ncols() != WINDOW || bias.len() != out {
            return Err(AppError::ArtifactFormat {
                path: format!("model '{}'", city),
                reason: format!(
                    "weight shape {}x{} / bias {} does not match capability output {} over window {}",
                    weights.nrows(),
                    weights.ncols(),
                    bias.len(),
                    out,
                    WINDOW
                ),
            });
        }
        Ok(Self {
            city,
            capability,
            weights,
            bias,
        })
    }

    /// Run one inference call on a 14-value normalized window.
    ///
    /// Returns `capability.output_len()` values: one scalar for a
    /// single-step model, seven for a direct multi-step model.
    pub fn predict(&self, window: &[f64]) -> Result<Vec<f64>> {
        if window.len() != WINDOW {
            return Err(AppError::InsufficientHistory {
                needed: WINDOW,
                got: window.len(),
            });
        }
        let x = Array1::from_iter(window.iter().copied());
        let out = self.weights.dot(&x) + &self.bias;
        Ok(out.to_vec())
    }

    /// Load a model artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::ArtifactMissing {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact =
            serde_json::from_str(&raw).map_err(|e| AppError::ArtifactFormat {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if artifact.window != WINDOW {
            return Err(AppError::ArtifactFormat {
                path: path.display().to_string(),
                reason: format!("window {} not supported, expected {}", artifact.window, WINDOW),
            });
        }

        let rows = artifact.weights.len();
        let flat: Vec<f64> = artifact.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((rows, WINDOW), flat).map_err(|e| {
            AppError::ArtifactFormat {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        let bias = Array1::from_vec(artifact.bias);

        Self::new(artifact.city, artifact.capability, weights, bias)
    }
}
