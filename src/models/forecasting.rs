//! Recursive and direct multi-step forecasting over the historical tail.

use chrono::Duration;

use crate::artifacts::model::{HORIZON, WINDOW};
use crate::artifacts::{MinMaxScaler, ModelCapability, PretrainedModel};
use crate::error::{AppError, Result};
use crate::models::category::AqiCategory;
use crate::types::{ForecastRow, Reading};

/// Produce the 7-day forecast from the tail of the historical series.
///
/// The history is normalized with the city's scaler, the last 14 values
/// form the input window, and the branch between one direct multi-step
/// call and seven recursive single-step calls was fixed when the model
/// artifact declared its capability. Output values are back in original
/// AQI units; dates are the 7 consecutive calendar days after the last
/// historical date. Deterministic for a given (model, scaler, history).
pub fn forecast(
    model: &PretrainedModel,
    scaler: &MinMaxScaler,
    history: &[Reading],
) -> Result<Vec<ForecastRow>> {
    if history.len() < WINDOW {
        return Err(AppError::InsufficientHistory {
            needed: WINDOW,
            got: history.len(),
        });
    }

    let values: Vec<f64> = history.iter().map(|r| r.aqi).collect();
    let scaled = scaler.transform(&values);
    let window: Vec<f64> = scaled[scaled.len() - WINDOW..].to_vec();

    let scaled_preds = match model.capability {
        ModelCapability::MultiStep => predict_direct(model, &window)?,
        ModelCapability::SingleStep => predict_recursive(model, window)?,
    };
    debug_assert_eq!(scaled_preds.len(), HORIZON);

    let preds = scaler.inverse_transform(&scaled_preds);

    let last_date = history[history.len() - 1].date;
    let rows = preds
        .into_iter()
        .enumerate()
        .map(|(i, predicted_aqi)| ForecastRow {
            date: last_date + Duration::days(i as i64 + 1),
            predicted_aqi,
            category: AqiCategory::from_aqi(predicted_aqi),
        })
        .collect();

    Ok(rows)
}

/// One inference call emitting all 7 steps.
fn predict_direct(model: &PretrainedModel, window: &[f64]) -> Result<Vec<f64>> {
    let out = model.predict(window)?;
    if out.len() != HORIZON {
        return Err(AppError::Render(format!(
            "multi-step model emitted {} values, expected {}",
            out.len(),
            HORIZON
        )));
    }
    Ok(out)
}

/// Seven single-step calls, each feeding its own prediction back as the
/// newest window value.
fn predict_recursive(model: &PretrainedModel, mut window: Vec<f64>) -> Result<Vec<f64>> {
    let mut preds = Vec::with_capacity(HORIZON);
    for _ in 0..HORIZON {
        let out = model.predict(&window)?;
        let next = out[0];
        preds.push(next);
        window.remove(0);
        window.push(next);
    }
    Ok(preds)
}
