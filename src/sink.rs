use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::entities::{League, Player, Team};
use crate::pipeline::PipelineSummary;
use crate::transform::CategoryTable;

pub const REFERENCE_DIR: &str = "First_Tables";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl SinkReport {
    pub fn add(&mut self, other: SinkReport) {
        self.inserted += other.inserted;
        self.skipped += other.skipped;
    }
}

/// Destination for finalized records. Sinks never overwrite: rows that
/// already exist are counted as skipped.
pub trait RecordSink {
    fn name(&self) -> &'static str;
    fn put_leagues(&mut self, leagues: &[League]) -> Result<SinkReport>;
    fn put_teams(&mut self, teams: &[Team]) -> Result<SinkReport>;
    fn put_players(&mut self, players: &[Player]) -> Result<SinkReport>;
    fn put_category(&mut self, table: &CategoryTable) -> Result<SinkReport>;

    fn finish(&mut self, _summary: &PipelineSummary) -> Result<()> {
        Ok(())
    }
}

/// Writes the cleaned/final CSV layout: reference tables under
/// `First_Tables/`, category tables under one directory per league.
#[derive(Debug, Clone)]
pub struct CsvSink {
    root: PathBuf,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn reference_path(&self, file: &str) -> PathBuf {
        self.root.join(REFERENCE_DIR).join(file)
    }

    pub fn category_path(&self, table: &CategoryTable) -> PathBuf {
        self.root
            .join(&table.league)
            .join(table.spec.category.output_file_name(&table.league))
    }
}

fn opt(v: Option<i64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn put_leagues(&mut self, leagues: &[League]) -> Result<SinkReport> {
        let rows = leagues
            .iter()
            .map(|l| vec![l.league_id.to_string(), l.league_name.clone()])
            .collect::<Vec<_>>();
        write_csv_atomic(
            &self.reference_path("leagues.csv"),
            &["league_id", "league_name"],
            &rows,
        )
    }

    fn put_teams(&mut self, teams: &[Team]) -> Result<SinkReport> {
        let rows = teams
            .iter()
            .map(|t| {
                vec![
                    t.team_id.to_string(),
                    t.team_name.clone(),
                    opt(t.league_id),
                ]
            })
            .collect::<Vec<_>>();
        write_csv_atomic(
            &self.reference_path("teams.csv"),
            &["team_id", "team_name", "league_id"],
            &rows,
        )
    }

    fn put_players(&mut self, players: &[Player]) -> Result<SinkReport> {
        let rows = players
            .iter()
            .map(|p| {
                vec![
                    opt(p.player_id),
                    p.player_name.clone(),
                    p.nation.clone(),
                    p.position.clone(),
                    opt(p.team_id),
                    opt(p.age),
                    opt(p.date_of_birth),
                ]
            })
            .collect::<Vec<_>>();
        write_csv_atomic(
            &self.reference_path("players.csv"),
            &[
                "player_id",
                "player_name",
                "nation",
                "position",
                "team_id",
                "age",
                "date_of_birth",
            ],
            &rows,
        )
    }

    fn put_category(&mut self, table: &CategoryTable) -> Result<SinkReport> {
        let rows = table
            .records
            .iter()
            .map(|r| r.output_row().iter().map(|v| v.to_string()).collect())
            .collect::<Vec<Vec<String>>>();
        write_csv_atomic(&self.category_path(table), &table.columns(), &rows)
    }
}

fn write_csv_atomic(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<SinkReport> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .with_context(|| format!("create {}", tmp.display()))?;
        writer.write_record(header).context("write csv header")?;
        for row in rows {
            writer.write_record(row).context("write csv row")?;
        }
        writer.flush().context("flush csv")?;
    }
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(SinkReport {
        inserted: rows.len(),
        skipped: 0,
    })
}
