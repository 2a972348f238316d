//! Core data types for the forecast service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::category::AqiCategory;

/// The closed set of cities the dashboard serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Delhi,
    Bengaluru,
    #[serde(rename = "TVM")]
    Tvm,
}

impl City {
    pub const ALL: [City; 3] = [City::Delhi, City::Bengaluru, City::Tvm];

    /// Display name as shown in the city selector.
    pub fn name(&self) -> &'static str {
        match self {
            City::Delhi => "Delhi",
            City::Bengaluru => "Bengaluru",
            City::Tvm => "TVM",
        }
    }

    /// Short identifier used in artifact file names.
    pub fn slug(&self) -> &'static str {
        match self {
            City::Delhi => "delhi",
            City::Bengaluru => "blr",
            City::Tvm => "tvm",
        }
    }

    /// Accepts either the display name or the slug, case-insensitively.
    pub fn parse(s: &str) -> Result<City, AppError> {
        let lower = s.trim().to_ascii_lowercase();
        City::ALL
            .into_iter()
            .find(|c| lower == c.name().to_ascii_lowercase() || lower == c.slug())
            .ok_or_else(|| AppError::UnknownCity(s.to_string()))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The two dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Forecast,
    Comparison,
}

/// Explicit page-render context: which page and which city one request
/// renders. No process-wide mutable state exists outside of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub page: Page,
    pub city: City,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            page: Page::Forecast,
            city: City::Delhi,
        }
    }
}

/// One historical (date, AQI) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub date: NaiveDate,
    pub aqi: f64,
}

/// One forecast day: date, predicted value in original AQI units, category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted_aqi: f64,
    pub category: AqiCategory,
}

/// Payload for the JSON forecast endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub city: City,
    /// Tail of the historical series, at most 100 points.
    pub history: Vec<Reading>,
    /// Exactly 7 forecast days.
    pub forecast: Vec<ForecastRow>,
}
