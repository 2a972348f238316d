//! AQI severity classification.

use serde::{Deserialize, Serialize};

/// The six ordered AQI severity bands. Ordering follows severity, so the
/// derived `Ord` gives Good < Satisfactory < ... < Severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Severe,
}

impl AqiCategory {
    /// Classify a numeric AQI value. Total over all reals; thresholds are
    /// closed upper bounds, so any value at or below 50 (including
    /// negative values) is Good.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Satisfactory
        } else if aqi <= 200.0 {
            AqiCategory::Moderate
        } else if aqi <= 300.0 {
            AqiCategory::Poor
        } else if aqi <= 400.0 {
            AqiCategory::VeryPoor
        } else {
            AqiCategory::Severe
        }
    }

    /// Human-readable label, as shown in the table and CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Satisfactory => "Satisfactory",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Severe => "Severe",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
