use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastRow, ForecastTable};
use chrono::NaiveDate;

/// Zips real-unit prices with their target dates into the presentation
/// table. All three inputs must have the same length.
pub fn format_forecast(
    baseline: &[f64],
    fusion: &[f64],
    dates: &[NaiveDate],
) -> Result<ForecastTable, ForecastError> {
    if baseline.len() != fusion.len() || baseline.len() != dates.len() {
        return Err(ForecastError::MalformedForecastResult {
            baseline: baseline.len(),
            fusion: fusion.len(),
            dates: dates.len(),
        });
    }

    let rows = dates
        .iter()
        .zip(baseline.iter().zip(fusion.iter()))
        .map(|(&date, (&baseline_price, &fusion_price))| {
            let spread = fusion_price - baseline_price;
            ForecastRow {
                date,
                baseline_price,
                fusion_price,
                spread,
                spread_pct: spread / baseline_price * 100.0,
            }
        })
        .collect();

    Ok(ForecastTable { rows })
}
