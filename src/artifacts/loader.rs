//! Per-city artifact loading: model, scaler, historical series.

use std::path::{Path, PathBuf};

use crate::artifacts::{MinMaxScaler, PretrainedModel};
use crate::error::{AppError, Result};
use crate::preprocessing::table;
use crate::types::{City, Reading};

/// Everything one forecast render needs, loaded fresh from disk.
#[derive(Debug, Clone)]
pub struct CityArtifacts {
    pub model: PretrainedModel,
    pub scaler: MinMaxScaler,
    pub history: Vec<Reading>,
}

/// Path of the model artifact for a city, by file-name convention.
pub fn model_path(data_dir: &Path, city: City) -> PathBuf {
    data_dir.join(format!("lstm_{}.json", city.slug()))
}

/// Path of the scaler artifact for a city.
pub fn scaler_path(data_dir: &Path, city: City) -> PathBuf {
    data_dir.join(format!("scaler_{}.json", city.slug()))
}

/// Path of the historical readings CSV for a city.
pub fn history_path(data_dir: &Path, city: City) -> PathBuf {
    data_dir.join(format!("{}_aqi.csv", city.slug()))
}

impl CityArtifacts {
    /// Load the (model, scaler, history) triple for a city.
    ///
    /// Any missing or malformed file is fatal for the current render.
    /// The model and scaler each carry the city slug they were fitted
    /// for; both are checked here so a swapped artifact fails loudly
    /// instead of producing silently wrong numbers.
    pub fn load(city: City, data_dir: &Path) -> Result<Self> {
        let model = PretrainedModel::load(&model_path(data_dir, city))?;
        let scaler = MinMaxScaler::load(&scaler_path(data_dir, city))?;

        let expected = city.slug();
        if model.city != expected {
            return Err(AppError::ArtifactMismatch {
                expected: expected.to_string(),
                found: model.city.clone(),
            });
        }
        if scaler.city != expected {
            return Err(AppError::ArtifactMismatch {
                expected: expected.to_string(),
                found: scaler.city.clone(),
            });
        }

        let history = table::load_history(&history_path(data_dir, city))?;
        tracing::info!(
            "loaded artifacts for {}: {} readings, capability {:?}",
            city,
            history.len(),
            model.capability
        );

        Ok(Self {
            model,
            scaler,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_conventions_follow_city_slug() {
        let dir = Path::new("data");
        assert_eq!(
            model_path(dir, City::Delhi),
            Path::new("data/lstm_delhi.json")
        );
        assert_eq!(
            scaler_path(dir, City::Bengaluru),
            Path::new("data/scaler_blr.json")
        );
        assert_eq!(history_path(dir, City::Tvm), Path::new("data/tvm_aqi.csv"));
    }

    #[test]
    fn missing_model_is_fatal() {
        let err = CityArtifacts::load(City::Delhi, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, AppError::ArtifactMissing { .. }));
    }
}
