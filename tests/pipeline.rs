use std::fs;
use std::path::{Path, PathBuf};

use fbref_ingest::config::PipelineConfig;
use fbref_ingest::error::IngestIssue;
use fbref_ingest::pipeline::{self, PipelineSummary};
use fbref_ingest::raw_table::HeaderLayout;
use fbref_ingest::sqlite_sink::SqliteSink;

fn raw_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("raw");
    path
}

fn config(out: &Path, db: Option<PathBuf>) -> PipelineConfig {
    PipelineConfig {
        raw_dir: raw_dir(),
        output_dir: out.to_path_buf(),
        db_path: db,
        reference_path: None,
        header_layout: HeaderLayout::TwoLevel,
        write_csv: true,
    }
}

fn run(cfg: &PipelineConfig) -> PipelineSummary {
    pipeline::run(cfg).expect("pipeline run should succeed")
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("output file should exist")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn writes_reference_and_category_csvs() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run(&config(dir.path(), None));

    assert_eq!(summary.leagues, 5);
    assert_eq!(summary.teams, 4);
    assert_eq!(summary.players, 4);
    assert_eq!(summary.tables_processed, 6);
    assert_eq!(summary.tables_missing, 22 * 5 - 6);
    assert_eq!(summary.records_emitted, 2 + 3 + 1 + 3 + 2 + 1);

    let teams = read_lines(&dir.path().join("First_Tables/teams.csv"));
    assert_eq!(
        teams,
        vec![
            "team_id,team_name,league_id",
            "1,Arsenal,4",
            "2,Chelsea,4",
            "3,Lazio,5",
            "4,Roma,5",
        ]
    );

    let players = read_lines(&dir.path().join("First_Tables/players.csv"));
    assert_eq!(
        players[0],
        "player_id,player_name,nation,position,team_id,age,date_of_birth"
    );
    assert_eq!(players[1], ",Bukayo Saka,ENG,\"FW,MF\",1,23,2001");
    assert_eq!(players[3], ",Nobody Known,BRA,DF,,30,1994");

    let shooting = read_lines(&dir.path().join("Premier_League/Shooting_cleaned.csv"));
    assert_eq!(shooting.len(), 2);
    assert!(shooting[0].starts_with("stat_id,player_id,ninety_s,gls,sh,sot,"));
    assert!(shooting[1].starts_with(",,20.5,6,45,18,40,"));

    let defense = read_lines(
        &dir.path()
            .join("Premier_League/Premier_League_Squad_Defensive_Actions_cleaned.csv"),
    );
    assert_eq!(defense.len(), 4);
    assert!(defense[1].starts_with(",1,20,300,180,"));
    assert!(defense[3].starts_with(",,1,1,1,"));
}

#[test]
fn missing_and_unresolved_inputs_are_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run(&config(dir.path(), None));

    let missing = summary
        .issues
        .iter()
        .filter(|i| matches!(i, IngestIssue::MissingInput { .. }))
        .count();
    assert_eq!(missing, summary.tables_missing);
    assert!(summary.issues.iter().any(|i| matches!(
        i,
        IngestIssue::UnresolvedForeignKey { entity: "team", name, .. } if name == "Atlantis FC"
    )));
    assert!(summary.issues.iter().any(|i| matches!(
        i,
        IngestIssue::ColumnCoercion { column, .. } if column == "crd_y"
    )));

    let pl = &summary.per_league["Premier_League"];
    assert_eq!(pl.tables_processed, 4);
    assert_eq!(pl.tables_missing, 18);
    let bundesliga = &summary.per_league["Bundesliga"];
    assert_eq!(bundesliga.tables_processed, 0);
    assert_eq!(bundesliga.tables_missing, 22);
    assert_eq!(summary.errors.len(), summary.issues.len());
}

#[test]
fn sqlite_load_assigns_keys_and_skips_duplicates_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("fbref.sqlite");
    let cfg = config(&dir.path().join("out"), Some(db.clone()));

    let first = run(&cfg);
    let loaded = first.sink_reports["sqlite"];
    // 5 leagues + 4 teams + 4 players + 12 category rows.
    assert_eq!(loaded.inserted, 5 + 4 + 4 + 12);
    assert_eq!(loaded.skipped, 0);

    let second = run(&cfg);
    let reloaded = second.sink_reports["sqlite"];
    assert_eq!(reloaded.inserted, 0);
    assert_eq!(reloaded.skipped, loaded.inserted);

    let sink = SqliteSink::open(&db).unwrap();
    assert_eq!(sink.count_rows("team_standard_stats").unwrap(), 4);
    assert_eq!(sink.count_rows("player_shooting").unwrap(), 1);
    assert_eq!(sink.count_rows("players").unwrap(), 4);

    let conn = sink.connection();
    let (player_id, saka_id): (Option<i64>, i64) = conn
        .query_row(
            "SELECT s.player_id, p.player_id
             FROM player_shooting s, players p
             WHERE p.player_name = 'Bukayo Saka'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(player_id, Some(saka_id));

    let orphan: Option<i64> = conn
        .query_row(
            "SELECT team_id FROM team_defensive_actions WHERE source_key = 'Atlantis FC'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan, None);

    let finished: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ingest_runs WHERE finished_at IS NOT NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(finished, 2);
}

#[test]
fn csv_output_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let mut cfg = config(&out, Some(dir.path().join("only.sqlite")));
    cfg.write_csv = false;

    let summary = run(&cfg);
    assert!(!out.exists());
    assert!(summary.sink_reports.contains_key("sqlite"));
    assert!(!summary.sink_reports.contains_key("csv"));
}

fn copy_league(dest: &Path, league: &str) {
    let from = raw_dir().join(league);
    let to = dest.join(league);
    fs::create_dir_all(&to).unwrap();
    for entry in fs::read_dir(&from).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

#[test]
fn separate_runs_into_one_database_link_teams_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("fbref.sqlite");

    for league in ["Premier_League", "Serie_A"] {
        let raw = dir.path().join(format!("raw_{league}"));
        copy_league(&raw, league);
        let mut cfg = config(&dir.path().join("out"), Some(db.clone()));
        cfg.raw_dir = raw;
        cfg.write_csv = false;
        run(&cfg);
    }

    let sink = SqliteSink::open(&db).unwrap();
    let conn = sink.connection();
    let mut stmt = conn
        .prepare("SELECT team_name FROM teams ORDER BY team_id")
        .unwrap();
    let teams = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(teams, vec!["Arsenal", "Chelsea", "Lazio", "Roma"]);

    let linked: String = conn
        .query_row(
            "SELECT t.team_name FROM team_standard_stats s
             JOIN teams t ON t.team_id = s.team_id
             WHERE s.league = 'Serie_A' AND s.source_key = 'Lazio'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(linked, "Lazio");

    let player_team: String = conn
        .query_row(
            "SELECT t.team_name FROM players p
             JOIN teams t ON t.team_id = p.team_id
             WHERE p.player_name = 'Mattia Zaccagni'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(player_team, "Lazio");
}
