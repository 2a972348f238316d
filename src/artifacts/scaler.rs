//! Min-max scaler fitted by the upstream training pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Invertible min-max transform mapping raw AQI values into [0, 1] for
/// model input and back for output interpretation. Fitted externally;
/// this service only applies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    /// City slug this scaler was fitted for. Checked against the model
    /// at load time, a silent mismatch would produce wrong numbers.
    pub city: String,
    pub data_min: f64,
    pub data_max: f64,
}

impl MinMaxScaler {
    /// Range the scaler divides by. Degenerate fits fall back to 1.0 so
    /// transform/inverse stay well-defined.
    fn scale(&self) -> f64 {
        let range = self.data_max - self.data_min;
        if range.abs() < 1e-10 {
            1.0
        } else {
            range
        }
    }

    /// Map raw values into the normalized range.
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        let scale = self.scale();
        values.iter().map(|&x| (x - self.data_min) / scale).collect()
    }

    /// Map normalized values back to original AQI units.
    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        let scale = self.scale();
        values.iter().map(|&x| x * scale + self.data_min).collect()
    }

    /// Load a scaler artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::ArtifactMissing {
                path: path.display().to_string(),
            });
        }
        let raw = std::fs::read_to_string(path)?;
        let scaler: MinMaxScaler =
            serde_json::from_str(&raw).map_err(|e| AppError::ArtifactFormat {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(scaler)
    }
}
