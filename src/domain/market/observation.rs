//! Historical observations, per-instrument series and the full dataset.

use crate::domain::market::instrument::Instrument;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, TARGET_COLUMN};
use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One trading day of features for one instrument.
/// `values` follows the `FEATURE_NAMES` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub date: NaiveDate,
    pub instrument: Instrument,
    pub values: [f64; FEATURE_COUNT],
}

impl ObservationRow {
    pub fn new(date: NaiveDate, instrument: Instrument, values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            date,
            instrument,
            values,
        }
    }

    /// Closing price (`Yt`)
    pub fn target(&self) -> f64 {
        self.values[TARGET_COLUMN]
    }
}

/// Date-ascending rows of a single instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    instrument: Instrument,
    rows: Vec<ObservationRow>,
}

impl HistoricalSeries {
    /// Keeps only rows of `instrument` and sorts them by date.
    pub fn new(instrument: Instrument, rows: Vec<ObservationRow>) -> Self {
        let mut rows: Vec<ObservationRow> = rows
            .into_iter()
            .filter(|r| r.instrument == instrument)
            .collect();
        rows.sort_by_key(|r| r.date);
        Self { instrument, rows }
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ObservationRow> {
        self.rows.last()
    }

    /// Full history as an N×11 matrix (used to fit the scaler).
    pub fn to_matrix(&self) -> Array2<f64> {
        rows_to_matrix(&self.rows)
    }
}

pub(crate) fn rows_to_matrix(rows: &[ObservationRow]) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), FEATURE_COUNT), |(i, j)| rows[i].values[j])
}

/// Every observation loaded from the historical table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<ObservationRow>,
}

impl Dataset {
    /// Rows are kept ordered by (instrument, date).
    pub fn new(mut rows: Vec<ObservationRow>) -> Self {
        rows.sort_by(|a, b| a.instrument.cmp(&b.instrument).then(a.date.cmp(&b.date)));
        Self { rows }
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn series(&self, instrument: Instrument) -> HistoricalSeries {
        HistoricalSeries::new(
            instrument,
            self.rows
                .iter()
                .filter(|r| r.instrument == instrument)
                .cloned()
                .collect(),
        )
    }

    /// Most recent date across all instruments
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).max()
    }

    pub fn rows_on(&self, date: NaiveDate) -> impl Iterator<Item = &ObservationRow> {
        self.rows.iter().filter(move |r| r.date == date)
    }

    /// Instruments with at least one row, in symbol order.
    pub fn instruments(&self) -> Vec<Instrument> {
        let mut seen: Vec<Instrument> = self.rows.iter().map(|r| r.instrument).collect();
        seen.dedup();
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, instrument: Instrument, price: f64) -> ObservationRow {
        let mut values = [0.0; FEATURE_COUNT];
        values[TARGET_COLUMN] = price;
        ObservationRow::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            instrument,
            values,
        )
    }

    #[test]
    fn test_series_sorts_and_filters() {
        let series = HistoricalSeries::new(
            Instrument::Bbca,
            vec![
                row(3, Instrument::Bbca, 103.0),
                row(1, Instrument::Bbca, 101.0),
                row(2, Instrument::Goto, 50.0),
                row(2, Instrument::Bbca, 102.0),
            ],
        );

        let prices: Vec<f64> = series.rows().iter().map(|r| r.target()).collect();
        assert_eq!(prices, vec![101.0, 102.0, 103.0]);
        assert_eq!(series.last().unwrap().target(), 103.0);
    }

    #[test]
    fn test_series_to_matrix_shape() {
        let series = HistoricalSeries::new(
            Instrument::Bbri,
            vec![row(1, Instrument::Bbri, 1.0), row(2, Instrument::Bbri, 2.0)],
        );
        let m = series.to_matrix();
        assert_eq!(m.dim(), (2, FEATURE_COUNT));
        assert_eq!(m[[1, TARGET_COLUMN]], 2.0);
    }

    #[test]
    fn test_dataset_queries() {
        let dataset = Dataset::new(vec![
            row(2, Instrument::Goto, 60.0),
            row(1, Instrument::Bbca, 9000.0),
            row(2, Instrument::Bbca, 9100.0),
        ]);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.instruments(), vec![Instrument::Bbca, Instrument::Goto]);
        assert_eq!(dataset.latest_date(), NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(dataset.rows_on(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()).count(), 2);
        assert_eq!(dataset.series(Instrument::Bbca).len(), 2);
        assert!(dataset.series(Instrument::Arto).is_empty());
    }
}
