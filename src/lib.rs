//! AQI forecast dashboard library.
//!
//! Loads pre-serialized per-city artifacts (pretrained model weights, a
//! fitted min-max scaler, a historical readings CSV), produces a
//! deterministic 7-day forecast from the last 14 points, and renders it
//! as charts, a table, and a CSV export.

pub mod artifacts;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod render;
pub mod types;

pub use artifacts::{CityArtifacts, MinMaxScaler, ModelCapability, PretrainedModel};
pub use error::{AppError, Result};
pub use models::{forecast, AqiCategory};
pub use types::{City, ForecastResponse, ForecastRow, Page, Reading, RenderRequest};
