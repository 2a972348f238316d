//! Forecast engine and category classifier.

pub mod category;
pub mod forecasting;

pub use category::AqiCategory;
pub use forecasting::forecast;
