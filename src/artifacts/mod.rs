//! Pre-serialized per-city artifacts: model weights, fitted scaler,
//! historical readings. All three are treated as opaque external inputs,
//! loaded fresh on every render.

pub mod loader;
pub mod model;
pub mod scaler;

pub use loader::CityArtifacts;
pub use model::{ModelCapability, PretrainedModel};
pub use scaler::MinMaxScaler;
