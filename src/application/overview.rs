use crate::domain::forecast::Scenario;
use crate::domain::market::instrument::Instrument;
use crate::domain::market::observation::Dataset;
use crate::domain::ml::feature_registry::MARKET_SENTIMENT_COLUMN;
use chrono::NaiveDate;
use serde::Serialize;

/// Headline figures for the most recent trading day in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOverview {
    pub last_update: NaiveDate,
    pub top_instrument: Instrument,
    pub top_price: f64,
    /// Mean of X7 across instruments reporting on `last_update`
    pub sentiment_index: f64,
    pub active_scenarios: Vec<Scenario>,
}

/// `None` when the dataset is empty.
pub fn market_overview(dataset: &Dataset) -> Option<MarketOverview> {
    let last_update = dataset.latest_date()?;
    let latest: Vec<_> = dataset.rows_on(last_update).collect();

    let top = latest
        .iter()
        .max_by(|a, b| a.target().total_cmp(&b.target()))?;

    let sentiment_index = latest
        .iter()
        .map(|r| r.values[MARKET_SENTIMENT_COLUMN])
        .sum::<f64>()
        / latest.len() as f64;

    Some(MarketOverview {
        last_update,
        top_instrument: top.instrument,
        top_price: top.target(),
        sentiment_index,
        active_scenarios: Scenario::ALL.to_vec(),
    })
}
