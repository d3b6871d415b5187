use std::fs;
use stockfusion::domain::attribution::{SectorPanel, sector_comparison, top_features};
use stockfusion::domain::evaluation::{DEFAULT_SIGNIFICANCE, horizon_degradation};
use stockfusion::domain::forecast::Scenario;
use stockfusion::domain::market::instrument::Instrument;
use stockfusion::domain::ml::feature_registry::FeatureLayout;
use stockfusion::infrastructure::reports;

fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("stockfusion-reports-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_dm_table_decides_from_p_value() {
    let path = scratch_file(
        "tabel_dm_test.csv",
        "Emiten,DM Statistic,P-Value,Kesimpulan\n\
         BBCA,2.91,0.004,Signifikan\n\
         BBRI,-2.10,0.036,Signifikan\n\
         GOTO,0.80,0.42,Signifikan\n",
    );

    let table = reports::load_dm_table(&path).unwrap().unwrap();

    let preferred: Vec<Option<Scenario>> = table
        .iter()
        .map(|r| r.preferred(DEFAULT_SIGNIFICANCE))
        .collect();
    // the free-text conclusion of GOTO is ignored
    assert_eq!(
        preferred,
        vec![Some(Scenario::Fusion), Some(Scenario::Baseline), None]
    );
}

#[test]
fn test_horizon_table_summary() {
    let path = scratch_file(
        "df_horizon.csv",
        "instrument,horizon,mape_baseline,mape_fusion\n\
         BBCA,1,1.10,0.95\n\
         BBCA,2,1.40,1.30\n\
         BBCA,3,1.90,1.70\n\
         GOTO,1,3.00,3.20\n\
         GOTO,3,2.50,3.90\n\
         GOTO,2,3.50,3.60\n",
    );

    let table = reports::load_horizon_table(&path).unwrap().unwrap();
    let summary = horizon_degradation(&table);

    assert_eq!(summary.fusion_wins, 3);
    assert_eq!(summary.baseline_wins, 3);
    let goto_baseline = summary
        .degradations
        .iter()
        .find(|d| d.instrument == "GOTO" && d.scenario == Scenario::Baseline)
        .unwrap();
    assert_eq!(goto_baseline.mape_by_horizon[1], (2, 3.5));
    assert!(!goto_baseline.degrades);
    assert_eq!(summary.degrading_share(), 0.75);
}

#[test]
fn test_shap_sector_panels() {
    let path = scratch_file(
        "shap_values.csv",
        "instrument,feature,mean_abs_shap\n\
         BBCA,Yt,0.40\n\
         BBCA,X7,0.10\n\
         BMRI,X1,0.20\n\
         BMRI,X8,0.20\n\
         GOTO,Yt,0.10\n\
         GOTO,X7,0.30\n",
    );

    let shap = reports::load_shap_values(&path).unwrap().unwrap();
    let panels = sector_comparison(&shap, &FeatureLayout::default());

    let tech = panels
        .iter()
        .find(|p| p.panel == SectorPanel::Technology)
        .unwrap();
    assert!((tech.sentiment_share() - 0.75).abs() < 1e-12);

    let banking = panels.iter().find(|p| p.panel == SectorPanel::Banking).unwrap();
    assert!((banking.technical - 0.30).abs() < 1e-12);
    assert!((banking.sentiment - 0.15).abs() < 1e-12);
    assert_eq!(banking.samples, 4);

    let top = top_features(&shap, Instrument::Bbca, 1);
    assert_eq!(top[0].feature, "Yt");
}

#[test]
fn test_shap_export_with_dashboard_headers() {
    let path = scratch_file(
        "shap_dashboard.csv",
        "Feature Name,Importance,Category\n\
         Yt,0.50,Technical\n\
         Twitter Sentiment,0.25,Sentiment\n",
    );

    let shap = reports::load_shap_values(&path).unwrap().unwrap();

    assert_eq!(shap[1].feature, "Twitter Sentiment");
    assert_eq!(shap[1].mean_abs_shap, 0.25);
    assert!(shap[0].instrument.is_empty());

    let panels = sector_comparison(&shap, &FeatureLayout::default());
    let global = &panels[0];
    assert_eq!(global.panel, SectorPanel::Global);
    assert!((global.sentiment_share() - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_absent_reports_are_none() {
    let dir = std::env::temp_dir().join("stockfusion-no-reports");
    assert!(reports::load_dm_table(&dir.join("x.csv")).unwrap().is_none());
    assert!(reports::load_shap_values(&dir.join("y.csv")).unwrap().is_none());
}
