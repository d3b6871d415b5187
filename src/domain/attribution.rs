//! Pre-computed SHAP attributions for the fusion model.

use crate::domain::market::instrument::{Instrument, Sector};
use crate::domain::ml::feature_registry::{FeatureGroup, FeatureLayout, feature_index};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the SHAP export. Also reads the dashboard's own headers
/// (`Feature Name, Importance, Category`), where the instrument column is
/// absent and the row belongs to the global panel only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapRecord {
    #[serde(alias = "Emiten", alias = "emiten", default)]
    pub instrument: String,
    #[serde(alias = "Feature Name")]
    pub feature: String,
    #[serde(alias = "Importance")]
    pub mean_abs_shap: f64,
    /// `Technical` or `Sentiment`; used when the feature name is a display
    /// label rather than a column name
    #[serde(alias = "Category", default)]
    pub category: Option<String>,
}

impl ShapRecord {
    fn group(&self, layout: &FeatureLayout) -> Option<FeatureGroup> {
        if let Some(group) = feature_index(&self.feature).and_then(|i| layout.group_of(i)) {
            return Some(group);
        }
        match self.category.as_deref().map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("sentiment") => Some(FeatureGroup::Sentiment),
            Some(c) if c.eq_ignore_ascii_case("technical") => Some(FeatureGroup::Technical),
            _ => None,
        }
    }
}

/// Instrument groupings compared side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectorPanel {
    Global,
    Banking,
    Technology,
}

impl SectorPanel {
    pub const ALL: [SectorPanel; 3] = [
        SectorPanel::Global,
        SectorPanel::Banking,
        SectorPanel::Technology,
    ];

    /// `None` is a record without an instrument; only the global panel
    /// takes it.
    fn includes(&self, instrument: Option<Instrument>) -> bool {
        match (self, instrument) {
            (SectorPanel::Global, _) => true,
            (SectorPanel::Banking, Some(i)) => i.sector() == Sector::Banking,
            (SectorPanel::Technology, Some(i)) => i.sector() == Sector::Technology,
            (_, None) => false,
        }
    }
}

impl fmt::Display for SectorPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectorPanel::Global => write!(f, "Global"),
            SectorPanel::Banking => write!(f, "Banking (non-GOTO)"),
            SectorPanel::Technology => write!(f, "Tech (GOTO)"),
        }
    }
}

/// Mean |SHAP| per feature group within one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupContribution {
    pub panel: SectorPanel,
    pub technical: f64,
    pub sentiment: f64,
    pub samples: usize,
}

impl GroupContribution {
    pub fn sentiment_share(&self) -> f64 {
        let total = self.technical + self.sentiment;
        if total > 0.0 { self.sentiment / total } else { 0.0 }
    }
}

/// Compares technical and sentiment attribution across sector panels.
/// Records with an unknown instrument or an unclassifiable feature are
/// ignored.
pub fn sector_comparison(records: &[ShapRecord], layout: &FeatureLayout) -> Vec<GroupContribution> {
    let classified: Vec<(Option<Instrument>, FeatureGroup, f64)> = records
        .iter()
        .filter_map(|r| {
            let instrument = match r.instrument.trim() {
                "" => None,
                symbol => Some(symbol.parse::<Instrument>().ok()?),
            };
            let group = r.group(layout)?;
            Some((instrument, group, r.mean_abs_shap.abs()))
        })
        .collect();

    SectorPanel::ALL
        .into_iter()
        .map(|panel| {
            let mut technical = (0.0, 0usize);
            let mut sentiment = (0.0, 0usize);
            for (instrument, group, value) in &classified {
                if !panel.includes(*instrument) {
                    continue;
                }
                let bucket = match group {
                    FeatureGroup::Technical => &mut technical,
                    FeatureGroup::Sentiment => &mut sentiment,
                };
                bucket.0 += value;
                bucket.1 += 1;
            }

            GroupContribution {
                panel,
                technical: mean(technical),
                sentiment: mean(sentiment),
                samples: technical.1 + sentiment.1,
            }
        })
        .collect()
}

/// Highest-impact features of one instrument.
pub fn top_features(records: &[ShapRecord], instrument: Instrument, n: usize) -> Vec<&ShapRecord> {
    let mut matching: Vec<&ShapRecord> = records
        .iter()
        .filter(|r| r.instrument.parse::<Instrument>().ok() == Some(instrument))
        .collect();
    matching.sort_by(|a, b| b.mean_abs_shap.abs().total_cmp(&a.mean_abs_shap.abs()));
    matching.truncate(n);
    matching
}

fn mean((sum, count): (f64, usize)) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}
