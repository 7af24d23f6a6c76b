use std::path::Path;

use campaign_ml::extract::read_csv;
use campaign_ml::store::SqliteStore;
use campaign_ml::{
    run_etl, run_training, CampaignClassifier, MalformedPolicy, PipelineConfig, PipelineError,
    TransformError,
};

const AUDIENCES: [&str; 4] = ["Men 18-24", "Women 35-44", "All Ages", "Men 25-34"];
const CHANNELS: [&str; 3] = ["Email", "Facebook", "Instagram"];

fn write_campaigns(path: &Path, rows: usize, bad_row: Option<usize>) {
    let mut csv = String::from(
        "Campaign_ID,Company,Campaign_Type,Target_Audience,Duration,Channel_Used,Conversion_Rate,\
Acquisition_Cost,ROI,Location,Language,Clicks,Impressions,Engagement_Score,Customer_Segment,Date\n",
    );
    for i in 0..rows {
        let level = (i * 3) % 10;
        let duration = if bad_row == Some(i) {
            "two weeks".to_string()
        } else {
            format!("{} days", 15 * (1 + i % 4))
        };
        csv.push_str(&format!(
            "{},Innovate Industries,Display,{},{},{},{:.2},\"${},{:03}.00\",{:.2},Houston,Spanish,{},{},{},Health & Wellness,2021-01-{:02}\n",
            i + 1,
            AUDIENCES[i % 4],
            duration,
            CHANNELS[i % 3],
            0.02 + 0.01 * (i % 5) as f64,
            5 + i % 10,
            (i * 91) % 1000,
            level as f64 + 0.25,
            200 + i % 37,
            3000 + (i * 11) % 900,
            level + 1,
            1 + i % 28,
        ));
    }
    std::fs::write(path, csv).unwrap();
}

fn config_in(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::new(dir.join("campaigns.csv"));
    config.store.database = dir.join("marketing.db");
    config.store.batch_size = 7;
    config.training.artifact = dir.join("model.json");
    config
}

#[test]
fn etl_loads_every_transformed_row() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_campaigns(&config.source, 40, None);

    assert_eq!(run_etl(&config).unwrap(), 40);
    assert_eq!(run_etl(&config).unwrap(), 40);

    let store = SqliteStore::open(&config.store.database, 1).unwrap();
    assert_eq!(store.row_count(&config.store.table).unwrap(), 80);

    let (gender, age, days): (String, String, i64) = store
        .connection()
        .query_row(
            "SELECT Gender, Age_Segment, Duration_Days FROM MarketingCampaignData LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!((gender.as_str(), age.as_str(), days), ("Men", "Gen Z", 15));

    let carried: String = store
        .connection()
        .query_row("SELECT Company FROM MarketingCampaignData LIMIT 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(carried, "Innovate Industries");
}

#[test]
fn malformed_row_aborts_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_campaigns(&config.source, 20, Some(5));

    match run_etl(&config) {
        Err(PipelineError::Transform(TransformError::Malformed { row, column, .. })) => {
            assert_eq!(row, 5);
            assert_eq!(column, "Duration");
        }
        other => panic!("expected malformed-record error, got {other:?}"),
    }
    assert!(!config.store.database.exists());
}

#[test]
fn skip_policy_drops_only_the_bad_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.on_malformed = MalformedPolicy::Skip;
    write_campaigns(&config.source, 20, Some(5));

    assert_eq!(run_etl(&config).unwrap(), 19);
}

#[test]
fn training_writes_a_reusable_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    write_campaigns(&config.source, 100, None);

    let report = run_training(&config).unwrap();
    assert_eq!(report.n_test, 20);
    assert_eq!(report.n_train, 80);
    assert_eq!(report.cv_scores.len(), 5);

    let classifier = CampaignClassifier::load(&config.training.artifact).unwrap();
    let table = campaign_ml::transform(&read_csv(&config.source).unwrap()).unwrap();
    let predicted = classifier.predict(&table).unwrap();
    assert_eq!(predicted.len(), 100);
    assert!(predicted.iter().all(|&label| label <= 1));
}

#[test]
fn missing_source_is_an_extract_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    assert!(matches!(run_etl(&config), Err(PipelineError::Extract { .. })));
}
