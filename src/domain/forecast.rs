use crate::domain::market::instrument::Instrument;
use anyhow::{Result, anyhow};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which trained model architecture produced a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Quantitative features only
    Baseline,
    /// Quantitative and qualitative features
    Fusion,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Baseline, Scenario::Fusion];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Baseline => "baseline",
            Scenario::Fusion => "fusion",
        }
    }

    /// Number of input tensors the model artifact must declare.
    pub fn expected_inputs(&self) -> usize {
        match self {
            Scenario::Baseline => 1,
            Scenario::Fusion => 2,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baseline" => Ok(Scenario::Baseline),
            "fusion" => Ok(Scenario::Fusion),
            _ => Err(anyhow!(
                "Invalid scenario: {}. Must be 'baseline' or 'fusion'",
                s
            )),
        }
    }
}

/// One forecast day in the presentation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub baseline_price: f64,
    pub fusion_price: f64,
    /// fusion - baseline
    pub spread: f64,
    /// spread relative to the baseline price, in percent
    pub spread_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Raw model outputs, still in scaled units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaledForecast {
    pub baseline: Vec<f32>,
    pub fusion: Vec<f32>,
}

/// H+1 prices compared with the last observed close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextDaySummary {
    pub last_date: NaiveDate,
    pub last_close: f64,
    pub baseline_price: f64,
    pub fusion_price: f64,
    pub baseline_delta: f64,
    pub fusion_delta: f64,
}

impl NextDaySummary {
    /// Built from the first row of a forecast table, `None` when the table
    /// is empty.
    pub fn from_table(table: &ForecastTable, last_date: NaiveDate, last_close: f64) -> Option<Self> {
        let first = table.rows.first()?;
        Some(Self {
            last_date,
            last_close,
            baseline_price: first.baseline_price,
            fusion_price: first.fusion_price,
            baseline_delta: first.baseline_price - last_close,
            fusion_delta: first.fusion_price - last_close,
        })
    }
}

/// Everything a forecast request hands to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    pub instrument: Instrument,
    pub table: ForecastTable,
    pub scaled: ScaledForecast,
    pub next_day: Option<NextDaySummary>,
}

/// Target dates `last_date + 1..=horizon` calendar days.
pub fn forecast_dates(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as u64)
        .filter_map(|k| last_date.checked_add_days(Days::new(k)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_parse_and_display() {
        assert_eq!("Fusion".parse::<Scenario>().unwrap(), Scenario::Fusion);
        assert_eq!(Scenario::Baseline.to_string(), "baseline");
        assert!("hybrid".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_forecast_dates_are_calendar_days() {
        // Friday: weekends are not skipped
        let friday = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let dates = forecast_dates(friday, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_next_day_summary_deltas() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let table = ForecastTable {
            rows: vec![ForecastRow {
                date,
                baseline_price: 9_150.0,
                fusion_price: 9_050.0,
                spread: -100.0,
                spread_pct: -100.0 / 9_150.0 * 100.0,
            }],
        };

        let summary = NextDaySummary::from_table(&table, date, 9_100.0).unwrap();
        assert_eq!(summary.baseline_delta, 50.0);
        assert_eq!(summary.fusion_delta, -50.0);
        assert!(NextDaySummary::from_table(&ForecastTable::default(), date, 1.0).is_none());
    }
}
