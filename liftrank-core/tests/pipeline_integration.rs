//! End-to-end: raw CSV → normalizer → snapshot on disk → ranking service.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use liftrank_core::cache::ManualClock;
use liftrank_core::config::LiftrankConfig;
use liftrank_core::data::schema::{BENCH4_KG, SQUAT4_KG, TESTED};
use liftrank_core::data::{DataIngestor, Normalizer, SnapshotStore};
use liftrank_core::domain::{Attribute, FilterCriteria, Lift, Outcome, RawRecord, UserInput};
use liftrank_core::engine::Standing;
use liftrank_core::export::ExportRecord;
use liftrank_core::{Assessment, RankingService};

const HEADER: &str = "Name,Sex,Equipment,Division,Federation,MeetCountry,WeightClassKg,\
Best3SquatKg,Best3BenchKg,Best3DeadliftKg,TotalKg,Squat4Kg,Bench4Kg,Deadlift4Kg,Tested";

fn write_raw_csv(path: &Path) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for i in 0..10 {
        let squat = 100 + 10 * i;
        let bench = 70 + 5 * i;
        let deadlift = 150 + 10 * i;
        let total = squat + bench + deadlift;
        writeln!(
            file,
            "Lifter {i},M,Raw,Open,IPF,USA,93,{squat},{bench},{deadlift},{total},,,,Yes"
        )
        .unwrap();
    }
    // dropped: invalid sex, missing total, 4th attempt, duplicate
    writeln!(file, "Lifter X,Mx,Raw,Open,IPF,USA,93,100,70,150,320,,,,Yes").unwrap();
    writeln!(file, "Lifter Y,F,Raw,Open,IPF,USA,63,100,70,150,,,,,Yes").unwrap();
    writeln!(file, "Lifter Z,F,Raw,Open,IPF,USA,63,100,70,150,320,,200,,").unwrap();
    writeln!(file, "Lifter 0,M,Raw,Open,IPF,USA,93,100,70,150,320,,,,Yes").unwrap();
    // kept, with Tested filled in
    writeln!(file, "Lifter W,F,Wraps,Open,USPA,CAN,63,90,50,120,260,,,,").unwrap();
}

fn build_snapshot(dir: &Path) -> SnapshotStore {
    let raw_path = dir.join("raw.csv");
    write_raw_csv(&raw_path);

    let raw = DataIngestor::new().ingest(&raw_path).unwrap();
    let normalized = Normalizer::normalize(raw).unwrap();
    let store = SnapshotStore::new(dir.join("clean.parquet"));
    store
        .write(&normalized.table, Some(&raw_path), Some(&normalized.report))
        .unwrap();
    store
}

fn config_for(store: &SnapshotStore) -> LiftrankConfig {
    let mut config = LiftrankConfig::default();
    config.snapshot.path = store.path().to_path_buf();
    config
}

#[test]
fn csv_to_snapshot_report() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());

    let meta = store.meta().unwrap().unwrap();
    let report = meta.report.unwrap();
    assert_eq!(report.input_rows, 15);
    assert_eq!(report.dropped_invalid_sex, 1);
    assert_eq!(report.dropped_duplicates, 1);
    assert_eq!(report.dropped_missing_total, 1);
    assert_eq!(report.dropped_fourth_attempt, 1);
    assert_eq!(report.output_rows, 11);
    assert_eq!(meta.row_count, 11);

    let table = store.load().unwrap();
    assert_eq!(table.version(), &meta.data_hash);
    assert!(table.frame().column(SQUAT4_KG).is_err());
    assert!(table.frame().column(BENCH4_KG).is_err());
    assert_eq!(table.frame().column(TESTED).unwrap().null_count(), 0);
    // extra columns are carried through
    assert!(table.frame().column("Name").is_ok());
}

#[test]
fn service_ranks_against_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());
    let mut service = RankingService::new(config_for(&store)).unwrap();

    let criteria = FilterCriteria::new()
        .with(Attribute::Sex, "M")
        .with(Attribute::WeightClass, "93");
    let input = UserInput::new(125.0, 200.0, 150.0);

    let assessment = service.assess(&criteria, &input).unwrap();
    let report = assessment.report().unwrap();

    assert_eq!(report.sample_size, 10);
    assert_eq!(report.percentiles.squat, Outcome::Ready(30.0));
    assert_eq!(report.percentiles.bench, Outcome::Ready(100.0));
    assert_eq!(report.percentiles.deadlift, Outcome::Ready(0.0));

    let extremes = report.extremes.as_ref().ready().unwrap();
    assert_eq!(extremes.weakest, Lift::Deadlift);
    assert_eq!(extremes.strongest, Lift::Bench);

    // totals 320..545 step 25; 0.9 quantile = 520 + 0.1 * 25
    let comparison = report.comparison.as_ref().ready().unwrap();
    assert!((comparison.threshold - 522.5).abs() < 1e-9);
    assert_eq!(comparison.standing, Standing::Below);

    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["status"], "ranked");
    assert_eq!(json["percentiles"]["squat"]["value"], 30.0);
}

#[test]
fn zero_match_reports_insufficient_data() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());
    let mut service = RankingService::new(config_for(&store)).unwrap();

    let criteria = FilterCriteria::new().with(Attribute::Country, "NOR");
    let assessment = service
        .assess(&criteria, &UserInput::new(100.0, 100.0, 100.0))
        .unwrap();
    let report = assessment.report().unwrap();

    assert_eq!(report.percentiles.squat, Outcome::InsufficientData);
    assert!(!report.distributions.deadlift.is_ready());
    assert_eq!(report.comparison, Outcome::InsufficientData);

    let json = serde_json::to_value(&report.comparison).unwrap();
    assert_eq!(json, serde_json::json!({ "status": "insufficient_data" }));
}

#[test]
fn incomplete_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());
    let mut service = RankingService::new(config_for(&store)).unwrap();

    let assessment = service
        .assess(&FilterCriteria::new(), &UserInput::new(100.0, 0.0, f64::NAN))
        .unwrap();
    match assessment {
        Assessment::IncompleteInput { invalid } => {
            assert_eq!(invalid, vec![Lift::Bench, Lift::Deadlift]);
        }
        Assessment::Ranked(_) => panic!("expected incomplete input"),
    }
}

#[test]
fn stale_snapshot_reloads_and_clears_views() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());
    let clock = ManualClock::new();
    let mut service = RankingService::with_clock(config_for(&store), clock.clone()).unwrap();
    let criteria = FilterCriteria::new();
    let input = UserInput::new(150.0, 100.0, 200.0);

    let before = service.assess(&criteria, &input).unwrap().report().cloned().unwrap();
    assert_eq!(before.sample_size, 11);
    assert_eq!(service.cached_views(), 1);

    // replace the snapshot on disk with a smaller one
    let records: Vec<RawRecord> = (0..3)
        .map(|i| RawRecord::full_power("F", 80.0 + i as f64, 50.0, 120.0))
        .collect();
    let smaller = Normalizer::normalize(DataIngestor::from_records(&records).unwrap()).unwrap();
    store.write(&smaller.table, None, None).unwrap();

    clock.advance(Duration::from_secs(3599));
    let cached = service.assess(&criteria, &input).unwrap().report().cloned().unwrap();
    assert_eq!(cached.snapshot_version, before.snapshot_version);
    assert_eq!(cached.sample_size, 11);

    clock.advance(Duration::from_secs(1));
    let reloaded = service.assess(&criteria, &input).unwrap().report().cloned().unwrap();
    assert_ne!(reloaded.snapshot_version, before.snapshot_version);
    assert_eq!(reloaded.sample_size, 3);
    assert_eq!(service.cached_views(), 1);
}

#[test]
fn options_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = build_snapshot(dir.path());
    let mut service = RankingService::new(config_for(&store)).unwrap();

    let sexes = service.distinct_values(Attribute::Sex).unwrap();
    assert_eq!(sexes, vec![("M".to_string(), 10), ("F".to_string(), 1)]);

    let criteria = FilterCriteria::new().with(Attribute::Federation, "USPA");
    let export_path = dir.path().join("user.csv");
    ExportRecord::new(&criteria, &UserInput::new(90.0, 50.0, 120.0))
        .write_csv(&export_path)
        .unwrap();
    let content = std::fs::read_to_string(&export_path).unwrap();
    assert_eq!(content.lines().nth(1), Some(",,,,USPA,,90.0,50.0,120.0,260.0"));
}
