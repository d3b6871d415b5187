//! Backtest evaluation tables produced offline during model validation.
//!
//! The Diebold-Mariano table compares baseline and fusion H+1 errors under
//! an MSE loss; the horizon table holds MAPE per model for H+1..H+3.

use crate::domain::forecast::Scenario;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmTestRecord {
    #[serde(alias = "Emiten", alias = "emiten")]
    pub instrument: String,
    #[serde(alias = "DM Statistic")]
    pub dm_statistic: f64,
    #[serde(alias = "P-Value")]
    pub p_value: f64,
    #[serde(alias = "Kesimpulan", default)]
    pub conclusion: String,
}

impl DmTestRecord {
    /// Rejects the equal-accuracy hypothesis at `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Model with the lower loss when the difference is significant.
    /// A positive statistic means the baseline loss is larger.
    pub fn preferred(&self, alpha: f64) -> Option<Scenario> {
        if !self.is_significant(alpha) {
            return None;
        }
        if self.dm_statistic > 0.0 {
            Some(Scenario::Fusion)
        } else {
            Some(Scenario::Baseline)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonRecord {
    #[serde(alias = "Emiten", alias = "emiten")]
    pub instrument: String,
    pub horizon: u8,
    pub mape_baseline: f64,
    pub mape_fusion: f64,
}

impl HorizonRecord {
    /// Lower MAPE wins; ties go to the baseline.
    pub fn better_model(&self) -> Scenario {
        if self.mape_fusion < self.mape_baseline {
            Scenario::Fusion
        } else {
            Scenario::Baseline
        }
    }
}

/// MAPE path of one model on one instrument, ordered by horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonDegradation {
    pub instrument: String,
    pub scenario: Scenario,
    pub mape_by_horizon: Vec<(u8, f64)>,
    /// MAPE never improves as the horizon grows
    pub degrades: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HorizonSummary {
    pub degradations: Vec<HorizonDegradation>,
    pub baseline_wins: usize,
    pub fusion_wins: usize,
}

impl HorizonSummary {
    pub fn degrading_share(&self) -> f64 {
        if self.degradations.is_empty() {
            return 0.0;
        }
        let degrading = self.degradations.iter().filter(|d| d.degrades).count();
        degrading as f64 / self.degradations.len() as f64
    }
}

pub fn horizon_degradation(records: &[HorizonRecord]) -> HorizonSummary {
    let mut by_instrument: BTreeMap<&str, Vec<&HorizonRecord>> = BTreeMap::new();
    for record in records {
        by_instrument
            .entry(record.instrument.as_str())
            .or_default()
            .push(record);
    }

    let mut summary = HorizonSummary::default();

    for (instrument, mut rows) in by_instrument {
        rows.sort_by_key(|r| r.horizon);

        for scenario in Scenario::ALL {
            let mape_by_horizon: Vec<(u8, f64)> = rows
                .iter()
                .map(|r| {
                    let mape = match scenario {
                        Scenario::Baseline => r.mape_baseline,
                        Scenario::Fusion => r.mape_fusion,
                    };
                    (r.horizon, mape)
                })
                .collect();
            let degrades = mape_by_horizon.windows(2).all(|w| w[1].1 >= w[0].1);

            summary.degradations.push(HorizonDegradation {
                instrument: instrument.to_string(),
                scenario,
                mape_by_horizon,
                degrades,
            });
        }

        for row in rows {
            match row.better_model() {
                Scenario::Baseline => summary.baseline_wins += 1,
                Scenario::Fusion => summary.fusion_wins += 1,
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizon(instrument: &str, h: u8, base: f64, fusion: f64) -> HorizonRecord {
        HorizonRecord {
            instrument: instrument.to_string(),
            horizon: h,
            mape_baseline: base,
            mape_fusion: fusion,
        }
    }

    #[test]
    fn test_dm_significance_uses_p_value() {
        let record = DmTestRecord {
            instrument: "BBCA".to_string(),
            dm_statistic: -2.4,
            p_value: 0.016,
            conclusion: "Tidak Signifikan".to_string(),
        };

        assert!(record.is_significant(DEFAULT_SIGNIFICANCE));
        assert_eq!(record.preferred(DEFAULT_SIGNIFICANCE), Some(Scenario::Baseline));
        assert_eq!(record.preferred(0.01), None);
    }

    #[test]
    fn test_horizon_degradation_and_wins() {
        let records = vec![
            horizon("GOTO", 3, 4.0, 3.5),
            horizon("GOTO", 1, 2.0, 2.5),
            horizon("GOTO", 2, 3.0, 2.9),
            horizon("BBRI", 1, 1.0, 1.2),
            horizon("BBRI", 2, 0.9, 1.3),
        ];

        let summary = horizon_degradation(&records);

        assert_eq!(summary.degradations.len(), 4);
        let bbri_base = &summary.degradations[0];
        assert_eq!(bbri_base.instrument, "BBRI");
        assert_eq!(bbri_base.scenario, Scenario::Baseline);
        assert!(!bbri_base.degrades);

        let goto_fusion = &summary.degradations[3];
        assert_eq!(goto_fusion.mape_by_horizon, vec![(1, 2.5), (2, 2.9), (3, 3.5)]);
        assert!(goto_fusion.degrades);

        assert_eq!(summary.baseline_wins, 3);
        assert_eq!(summary.fusion_wins, 2);
        assert_eq!(summary.degrading_share(), 0.75);
    }
}
