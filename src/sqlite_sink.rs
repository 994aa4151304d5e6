use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use tracing::{info, warn};

use crate::categories::{Category, CategorySpec, Level};
use crate::coerce::Value;
use crate::entities::{League, Player, Team};
use crate::pipeline::PipelineSummary;
use crate::sink::{RecordSink, SinkReport};
use crate::transform::{CategoryTable, RowIdentity};

/// Relational load target. Rows that already exist are left alone.
///
/// Teams are matched by name, so the database assigns its own `team_id`
/// and the run-local ids from the resolver are translated on the way in.
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
    team_ids: HashMap<i64, i64>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS leagues (
            league_id INTEGER PRIMARY KEY,
            league_name TEXT NOT NULL UNIQUE
        );
        CREATE TABLE IF NOT EXISTS teams (
            team_id INTEGER PRIMARY KEY,
            team_name TEXT NOT NULL UNIQUE,
            league_id INTEGER NULL REFERENCES leagues(league_id)
        );
        CREATE TABLE IF NOT EXISTS players (
            player_id INTEGER PRIMARY KEY AUTOINCREMENT,
            player_name TEXT NOT NULL,
            nation TEXT NOT NULL,
            position TEXT NOT NULL,
            team_id INTEGER NULL REFERENCES teams(team_id),
            age INTEGER NULL,
            date_of_birth INTEGER NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_players_identity
            ON players(player_name, IFNULL(date_of_birth, 0));

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            tables_processed INTEGER NOT NULL,
            tables_missing INTEGER NOT NULL,
            records_inserted INTEGER NOT NULL,
            records_skipped INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;

    for category in Category::all() {
        conn.execute_batch(&category_table_ddl(&category.spec()))
            .with_context(|| format!("create table {}", category.sink_table()))?;
    }
    Ok(())
}

fn category_table_ddl(spec: &CategorySpec) -> String {
    let table = spec.category.sink_table();
    let key = spec.category.level.key_column();
    let parent = match spec.category.level {
        Level::Player => "players(player_id)",
        Level::Team => "teams(team_id)",
    };
    let metrics = spec
        .fields
        .iter()
        .map(|f| format!("    \"{}\" {} NOT NULL,\n", f.name, f.kind.sql_type()))
        .collect::<String>();
    format!(
        "CREATE TABLE IF NOT EXISTS \"{table}\" (\n    \
         stat_id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
         {key} INTEGER NULL REFERENCES {parent},\n    \
         league TEXT NOT NULL,\n    \
         source_key TEXT NOT NULL,\n\
         {metrics}    \
         UNIQUE(league, source_key)\n);"
    )
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Text(v) => SqlValue::Text(v.clone()),
    }
}

impl SqliteSink {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = open_db(path)?;
        let started_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO ingest_runs(started_at, finished_at, tables_processed, tables_missing,
                                     records_inserted, records_skipped, errors_json)
             VALUES (?1, NULL, 0, 0, 0, 0, '[]')",
            params![started_at],
        )
        .context("insert ingest run")?;
        let run_id = conn.last_insert_rowid();
        Ok(Self {
            conn,
            run_id,
            team_ids: HashMap::new(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("count rows in {table}"))
    }
}

fn lookup_team_id(tx: &Transaction<'_>, team_name: &str) -> Result<Option<i64>> {
    tx.query_row(
        "SELECT team_id FROM teams WHERE team_name = ?1",
        params![team_name],
        |row| row.get(0),
    )
    .optional()
    .context("query team id")
}

fn lookup_player_id(tx: &Transaction<'_>, name: &str, born: Option<i64>) -> Result<Option<i64>> {
    tx.query_row(
        "SELECT player_id FROM players
         WHERE player_name = ?1 AND IFNULL(date_of_birth, 0) = IFNULL(?2, 0)",
        params![name, born],
        |row| row.get(0),
    )
    .optional()
    .context("query player id")
}

impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn put_leagues(&mut self, leagues: &[League]) -> Result<SinkReport> {
        let tx = self.conn.transaction().context("begin leagues transaction")?;
        let mut report = SinkReport::default();
        for league in leagues {
            let changed = tx
                .execute(
                    "INSERT INTO leagues(league_id, league_name) VALUES (?1, ?2)
                     ON CONFLICT DO NOTHING",
                    params![league.league_id, league.league_name],
                )
                .context("insert league")?;
            tally(&mut report, changed);
        }
        tx.commit().context("commit leagues transaction")?;
        Ok(report)
    }

    fn put_teams(&mut self, teams: &[Team]) -> Result<SinkReport> {
        let tx = self.conn.transaction().context("begin teams transaction")?;
        let mut report = SinkReport::default();
        let mut team_ids = HashMap::with_capacity(teams.len());
        for team in teams {
            let changed = tx
                .execute(
                    "INSERT INTO teams(team_name, league_id) VALUES (?1, ?2)
                     ON CONFLICT(team_name) DO NOTHING",
                    params![team.team_name, team.league_id],
                )
                .context("insert team")?;
            tally(&mut report, changed);
            if let Some(db_id) = lookup_team_id(&tx, &team.team_name)? {
                team_ids.insert(team.team_id, db_id);
            }
        }
        tx.commit().context("commit teams transaction")?;
        self.team_ids = team_ids;
        Ok(report)
    }

    fn put_players(&mut self, players: &[Player]) -> Result<SinkReport> {
        let tx = self.conn.transaction().context("begin players transaction")?;
        let mut report = SinkReport::default();
        for player in players {
            let team_id = player.team_id.and_then(|id| self.team_ids.get(&id).copied());
            let changed = tx
                .execute(
                    "INSERT INTO players(player_name, nation, position, team_id, age, date_of_birth)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT DO NOTHING",
                    params![
                        player.player_name,
                        player.nation,
                        player.position,
                        team_id,
                        player.age,
                        player.date_of_birth
                    ],
                )
                .context("insert player")?;
            tally(&mut report, changed);
        }
        tx.commit().context("commit players transaction")?;
        Ok(report)
    }

    fn put_category(&mut self, table: &CategoryTable) -> Result<SinkReport> {
        let spec = table.spec;
        let sink_table = spec.category.sink_table();
        let key = spec.category.level.key_column();
        let columns = spec
            .fields
            .iter()
            .map(|f| format!("\"{}\"", f.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=spec.fields.len() + 3)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO \"{sink_table}\" ({key}, league, source_key, {columns})
             VALUES ({placeholders})
             ON CONFLICT(league, source_key) DO NOTHING"
        );

        let tx = self
            .conn
            .transaction()
            .with_context(|| format!("begin {sink_table} transaction"))?;
        let mut report = SinkReport::default();
        {
            let mut stmt = tx
                .prepare(&sql)
                .with_context(|| format!("prepare insert into {sink_table}"))?;
            for record in &table.records {
                let owner_id = match &record.identity {
                    RowIdentity::Team { squad } => lookup_team_id(&tx, squad)?,
                    RowIdentity::Player(p) => lookup_player_id(&tx, &p.name, p.born)?,
                };
                if owner_id.is_none() {
                    warn!(
                        table = %sink_table,
                        league = %table.league,
                        source_key = %record.source_key(),
                        "no matching {key} in database; storing null"
                    );
                }
                let mut values = Vec::with_capacity(record.values.len() + 3);
                values.push(owner_id.map(SqlValue::Integer).unwrap_or(SqlValue::Null));
                values.push(SqlValue::Text(table.league.clone()));
                values.push(SqlValue::Text(record.source_key()));
                values.extend(record.values.iter().map(to_sql));
                let changed = stmt
                    .execute(params_from_iter(values))
                    .with_context(|| format!("insert into {sink_table}"))?;
                tally(&mut report, changed);
            }
        }
        tx.commit()
            .with_context(|| format!("commit {sink_table} transaction"))?;

        info!(
            table = %sink_table,
            league = %table.league,
            inserted = report.inserted,
            skipped = report.skipped,
            "loaded category table"
        );
        Ok(report)
    }

    fn finish(&mut self, summary: &PipelineSummary) -> Result<()> {
        let finished_at = Utc::now().to_rfc3339();
        let errors_json =
            serde_json::to_string(&summary.errors).unwrap_or_else(|_| "[]".to_string());
        let sink = summary.sink_reports.get(self.name()).copied().unwrap_or_default();
        self.conn
            .execute(
                "UPDATE ingest_runs
                 SET finished_at = ?1, tables_processed = ?2, tables_missing = ?3,
                     records_inserted = ?4, records_skipped = ?5, errors_json = ?6
                 WHERE run_id = ?7",
                params![
                    finished_at,
                    summary.tables_processed as i64,
                    summary.tables_missing as i64,
                    sink.inserted as i64,
                    sink.skipped as i64,
                    errors_json,
                    self.run_id
                ],
            )
            .context("update ingest run")?;
        Ok(())
    }
}

fn tally(report: &mut SinkReport, changed: usize) {
    if changed == 0 {
        report.skipped += 1;
    } else {
        report.inserted += 1;
    }
}
