use std::path::PathBuf;

use fbref_ingest::categories::{Category, Level, StatKind};
use fbref_ingest::coerce::Value;
use fbref_ingest::error::IngestIssue;
use fbref_ingest::raw_table::{HeaderLayout, RawTable};
use fbref_ingest::transform::{CategoryTable, RowIdentity, transform};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn read_fixture(name: &str) -> RawTable {
    RawTable::from_path(&fixture_path(name), HeaderLayout::TwoLevel)
        .expect("fixture should parse")
}

fn value(table: &CategoryTable, row: usize, column: &str) -> Value {
    let idx = table
        .spec
        .fields
        .iter()
        .position(|f| f.name == column)
        .expect("column should be declared");
    table.records[row].values[idx].clone()
}

#[test]
fn shooting_table_end_to_end() {
    let spec = Category::new(StatKind::Shooting, Level::Player).spec();
    let table = transform("Premier_League", spec, read_fixture("shooting_player.csv"));

    assert_eq!(table.report.source_rows, 2);
    assert_eq!(table.report.repeated_headers_dropped, 1);
    assert_eq!(table.records.len(), 1);

    let record = &table.records[0];
    assert_eq!(record.stat_id, None);
    assert_eq!(record.owner_id, None);
    assert_eq!(record.source_row, 0);
    let RowIdentity::Player(player) = &record.identity else {
        panic!("player table should carry player identity");
    };
    assert_eq!(player.name, "Bukayo Saka");
    assert_eq!(player.nation, "ENG");
    assert_eq!(player.squad, "Arsenal");
    assert_eq!(player.age, Some(23));
    assert_eq!(player.born, Some(2001));

    assert_eq!(value(&table, 0, "ninety_s"), Value::Float(20.5));
    assert_eq!(value(&table, 0, "gls"), Value::Int(6));
    assert_eq!(value(&table, 0, "sot_percent"), Value::Float(40.0));
    assert_eq!(value(&table, 0, "npg_minus_xg"), Value::Float(-1.3));

    let columns = table.columns();
    assert_eq!(&columns[..3], &["stat_id", "player_id", "ninety_s"]);
    assert_eq!(record.output_row().len(), columns.len());
    assert_eq!(table.report.dropped_columns, vec!["Matches".to_string()]);
    assert!(table.report.issues.is_empty());
}

#[test]
fn every_category_emits_its_declared_schema() {
    let raw = RawTable::flat(
        &["Squad", "Player", "Gls", "Unknown"],
        vec![vec!["Arsenal".into(), "Bukayo Saka".into(), "4".into(), "x".into()]],
    );
    for category in Category::all() {
        let spec = category.spec();
        let table = transform("Premier_League", spec, raw.clone());
        assert_eq!(table.columns(), spec.output_columns(), "{category}");
        assert_eq!(table.records.len(), 1, "{category}");
        assert_eq!(
            table.records[0].output_row().len(),
            spec.fields.len() + 2,
            "{category}"
        );
    }
}

#[test]
fn missing_columns_are_reported_and_defaulted() {
    let spec = Category::new(StatKind::Possession, Level::Team).spec();
    let raw = RawTable::flat(&["Squad", "90s"], vec![vec!["Roma".into(), "20.0".into()]]);
    let table = transform("Serie_A", spec, raw);

    let missing = table
        .report
        .issues
        .iter()
        .filter_map(|issue| match issue {
            IngestIssue::SchemaShape { column, .. } => Some(column.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(missing.len(), spec.fields.len() - 1);
    assert!(missing.contains(&"touches"));
    assert_eq!(value(&table, 0, "ninety_s"), Value::Float(20.0));
    assert_eq!(value(&table, 0, "touches"), Value::Int(0));
    assert_eq!(value(&table, 0, "succ_percent"), Value::Float(0.0));
}

#[test]
fn defense_groups_keep_repeated_metrics_apart() {
    let spec = Category::new(StatKind::Defense, Level::Team).spec();
    let table = transform(
        "Premier_League",
        spec,
        read_fixture("raw/Premier_League/Premier_League_Squad_Defensive_Actions.csv"),
    );
    assert_eq!(table.records.len(), 3);
    assert_eq!(table.report.repeated_headers_dropped, 1);
    assert_eq!(value(&table, 0, "tkl_tackles"), Value::Int(300));
    assert_eq!(value(&table, 0, "tkl_challenges"), Value::Int(140));
    assert_eq!(value(&table, 0, "att_3rd_tackles"), Value::Int(50));
    assert_eq!(value(&table, 0, "att_challenges"), Value::Int(300));
    assert_eq!(value(&table, 0, "tkl_percent_challenges"), Value::Float(46.7));
    assert_eq!(value(&table, 0, "sh_blocks"), Value::Int(40));
    assert_eq!(value(&table, 1, "err"), Value::Int(7));
    assert_eq!(table.records[2].identity.squad(), "Atlantis FC");
}

#[test]
fn standard_per_90_block_is_suffixed() {
    let spec = Category::new(StatKind::Standard, Level::Team).spec();
    let table = transform(
        "Premier_League",
        spec,
        read_fixture("raw/Premier_League/Premier_League_Squad_Standard_Stats.csv"),
    );
    assert_eq!(table.records.len(), 2);
    assert_eq!(value(&table, 0, "age"), Value::Float(26.4));
    assert_eq!(value(&table, 0, "gls"), Value::Int(38));
    assert_eq!(value(&table, 0, "gls_per_90"), Value::Float(1.90));
    assert_eq!(value(&table, 0, "npxg_xag_per_90"), Value::Float(3.04));
    assert_eq!(table.records[1].source_row, 1);
    assert!(table.report.issues.is_empty());
}

#[test]
fn malformed_cells_default_and_are_counted() {
    let spec = Category::new(StatKind::Standard, Level::Player).spec();
    let table = transform(
        "Premier_League",
        spec,
        read_fixture("raw/Premier_League/Standard.csv"),
    );
    assert_eq!(table.records.len(), 3);
    assert_eq!(value(&table, 2, "crd_y"), Value::Int(0));
    let coercion = table
        .report
        .issues
        .iter()
        .find_map(|issue| match issue {
            IngestIssue::ColumnCoercion {
                column,
                sample,
                count,
                ..
            } if column == "crd_y" => Some((sample.clone(), *count)),
            _ => None,
        })
        .expect("crd_y coercion should be reported");
    assert_eq!(coercion, ("n/a".to_string(), 1));
}

#[test]
fn transform_is_deterministic() {
    let spec = Category::new(StatKind::Shooting, Level::Player).spec();
    let a = transform("Premier_League", spec, read_fixture("shooting_player.csv"));
    let b = transform("Premier_League", spec, read_fixture("shooting_player.csv"));
    assert_eq!(a.records, b.records);
    assert_eq!(a.report, b.report);
}

#[test]
fn passing_distance_bands_are_suffixed() {
    let spec = Category::new(StatKind::Passing, Level::Player).spec();
    let table = transform("Premier_League", spec, read_fixture("passing_player.csv"));

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.report.repeated_headers_dropped, 1);
    assert_eq!(value(&table, 0, "cmp_total"), Value::Int(1100));
    assert_eq!(value(&table, 0, "tot_dist_total"), Value::Float(19000.0));
    assert_eq!(value(&table, 0, "att_short"), Value::Int(540));
    assert_eq!(value(&table, 0, "cmp_percent_medium"), Value::Float(91.8));
    assert_eq!(value(&table, 0, "att_long"), Value::Int(170));
    assert_eq!(value(&table, 0, "cmp_percent_long"), Value::Float(64.7));
    assert_eq!(value(&table, 0, "xa"), Value::Float(3.9));
    assert_eq!(value(&table, 0, "one_third_ppa"), Value::Int(95));
    assert!(table.report.dropped_columns.contains(&"PPA".to_string()));
    assert!(table.report.issues.is_empty());
}

#[test]
fn shot_and_goal_creation_types_stay_apart() {
    let spec = Category::new(StatKind::GoalShotCreation, Level::Team).spec();
    let table = transform("Premier_League", spec, read_fixture("gca_team.csv"));

    assert_eq!(table.records.len(), 1);
    assert_eq!(table.records[0].identity.squad(), "Arsenal");
    assert_eq!(value(&table, 0, "sca_per_90"), Value::Float(24.0));
    assert_eq!(value(&table, 0, "passlive_sca"), Value::Int(360));
    assert_eq!(value(&table, 0, "passlive_gca"), Value::Int(42));
    assert_eq!(value(&table, 0, "def_sca"), Value::Int(10));
    assert_eq!(value(&table, 0, "def_gca"), Value::Int(2));
    assert_eq!(value(&table, 0, "gca"), Value::Int(60));
    assert!(table.report.issues.is_empty());
}

#[test]
fn penalty_save_rate_does_not_shadow_overall_save_rate() {
    let spec = Category::new(StatKind::Goalkeeping, Level::Player).spec();
    let table = transform("Premier_League", spec, read_fixture("goalkeeping_player.csv"));

    assert_eq!(table.records.len(), 1);
    assert_eq!(value(&table, 0, "save_percent"), Value::Float(75.0));
    assert_eq!(value(&table, 0, "cs_percent"), Value::Float(45.0));
    assert_eq!(value(&table, 0, "pkatt"), Value::Int(4));
    assert_eq!(value(&table, 0, "pka"), Value::Int(3));
    assert_eq!(value(&table, 0, "pk_sv"), Value::Int(1));
    assert_eq!(value(&table, 0, "pk_missed"), Value::Int(0));
    assert!(
        table
            .report
            .dropped_columns
            .contains(&"Save%_penalty".to_string())
    );
    assert!(table.report.issues.is_empty());
}

#[test]
fn goal_kick_columns_do_not_shadow_launched_passes() {
    let spec = Category::new(StatKind::AdvancedGoalkeeping, Level::Team).spec();
    let table = transform("Premier_League", spec, read_fixture("adv_goalkeeping_team.csv"));

    assert_eq!(table.records.len(), 1);
    assert_eq!(value(&table, 0, "att"), Value::Int(200));
    assert_eq!(value(&table, 0, "cmp_percent"), Value::Float(40.0));
    assert_eq!(value(&table, 0, "att_gk"), Value::Int(600));
    assert_eq!(value(&table, 0, "launch_percent"), Value::Float(30.0));
    assert_eq!(value(&table, 0, "avg_len"), Value::Float(35.5));
    assert_eq!(value(&table, 0, "psxg_plus_minus_per_90"), Value::Float(0.13));
    for dropped in ["Att_kicks", "Launch%_kicks", "AvgLen_kicks"] {
        assert!(
            table.report.dropped_columns.contains(&dropped.to_string()),
            "{dropped}"
        );
    }
    assert!(table.report.issues.is_empty());
}
