use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::categories::{Category, Level, StatKind};
use crate::config::PipelineConfig;
use crate::entities::EntityResolver;
use crate::error::IngestIssue;
use crate::raw_table::{HeaderLayout, RawTable};
use crate::reference_data::ReferenceData;
use crate::sink::{CsvSink, RecordSink, SinkReport};
use crate::sqlite_sink::SqliteSink;
use crate::transform::{CategoryTable, transform};

#[derive(Debug, Clone, Default)]
pub struct LeagueSummary {
    pub tables_processed: usize,
    pub tables_missing: usize,
    pub records_emitted: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub leagues: usize,
    pub teams: usize,
    pub players: usize,
    pub tables_processed: usize,
    pub tables_missing: usize,
    pub records_emitted: usize,
    pub records_inserted: usize,
    pub records_skipped: usize,
    pub sink_reports: BTreeMap<&'static str, SinkReport>,
    pub per_league: BTreeMap<String, LeagueSummary>,
    pub issues: Vec<IngestIssue>,
    pub errors: Vec<String>,
}

/// Transformed tables for one run, in league order then category order.
#[derive(Debug, Default)]
pub struct LoadedTables {
    pub tables: Vec<CategoryTable>,
    pub issues: Vec<IngestIssue>,
    pub missing: Vec<(String, Category)>,
}

impl LoadedTables {
    pub fn standard(&self, level: Level) -> Vec<&CategoryTable> {
        self.tables
            .iter()
            .filter(|t| t.spec.category == Category::new(StatKind::Standard, level))
            .collect()
    }
}

/// Reads and transforms every requested category for every league. Missing
/// or unreadable files are recorded and skipped.
pub fn load_tables(
    raw_dir: &Path,
    layout: HeaderLayout,
    reference: &ReferenceData,
    categories: &[Category],
) -> LoadedTables {
    let mut loaded = LoadedTables::default();
    for league in reference.league_names() {
        for category in categories {
            let path = raw_dir.join(league).join(category.raw_file_name(league));
            if !path.exists() {
                let issue = IngestIssue::MissingInput {
                    league: league.to_string(),
                    table: category.to_string(),
                    path,
                };
                warn!("{issue}");
                loaded.issues.push(issue);
                loaded.missing.push((league.to_string(), *category));
                continue;
            }
            match RawTable::from_path(&path, layout) {
                Ok(raw) => loaded.tables.push(transform(league, category.spec(), raw)),
                Err(err) => {
                    let issue = IngestIssue::UnreadableInput {
                        league: league.to_string(),
                        table: category.to_string(),
                        path,
                        reason: format!("{err:#}"),
                    };
                    warn!("{issue}");
                    loaded.issues.push(issue);
                    loaded.missing.push((league.to_string(), *category));
                }
            }
        }
    }
    loaded
}

pub fn load_reference(config: &PipelineConfig) -> Result<ReferenceData> {
    match &config.reference_path {
        Some(path) => ReferenceData::from_path(path),
        None => ReferenceData::builtin().cloned(),
    }
}

pub fn open_sinks(config: &PipelineConfig) -> Result<Vec<Box<dyn RecordSink>>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();
    if config.write_csv {
        sinks.push(Box::new(CsvSink::new(&config.output_dir)));
    }
    if let Some(db_path) = &config.db_path {
        sinks.push(Box::new(SqliteSink::open(db_path)?));
    }
    Ok(sinks)
}

pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    let reference = load_reference(config)?;
    let mut sinks = open_sinks(config)?;
    run_with_sinks(config, &reference, &mut sinks)
}

pub fn run_with_sinks(
    config: &PipelineConfig,
    reference: &ReferenceData,
    sinks: &mut [Box<dyn RecordSink>],
) -> Result<PipelineSummary> {
    info!(
        raw_dir = %config.raw_dir.display(),
        season = %reference.season,
        "starting ingest"
    );
    let mut loaded = load_tables(
        &config.raw_dir,
        config.header_layout,
        reference,
        &Category::all(),
    );

    let (resolver, entity_issues) = EntityResolver::build(
        reference,
        &loaded.standard(Level::Team),
        &loaded.standard(Level::Player),
    );

    let mut summary = PipelineSummary {
        leagues: resolver.leagues().len(),
        teams: resolver.teams().len(),
        players: resolver.players().len(),
        tables_missing: loaded.missing.len(),
        ..PipelineSummary::default()
    };
    for league in reference.league_names() {
        summary.per_league.insert(league.to_string(), LeagueSummary::default());
    }
    for (league, _) in &loaded.missing {
        if let Some(item) = summary.per_league.get_mut(league) {
            item.tables_missing += 1;
        }
    }
    for issue in loaded.issues.drain(..).chain(entity_issues) {
        if let Some(item) = summary.per_league.get_mut(issue.league()) {
            item.errors.push(issue.to_string());
        }
        summary.issues.push(issue);
    }

    for table in &mut loaded.tables {
        resolver.resolve(table);
    }

    for sink in sinks.iter_mut() {
        let mut report = SinkReport::default();
        report.add(sink.put_leagues(resolver.leagues())?);
        report.add(sink.put_teams(resolver.teams())?);
        report.add(sink.put_players(resolver.players())?);
        for table in &loaded.tables {
            let loaded_report = sink
                .put_category(table)
                .with_context(|| format!("{} sink: {}", sink.name(), table.table_label()))?;
            report.add(loaded_report);
        }
        summary.records_inserted += report.inserted;
        summary.records_skipped += report.skipped;
        summary.sink_reports.insert(sink.name(), report);
    }

    for table in loaded.tables {
        summary.tables_processed += 1;
        summary.records_emitted += table.records.len();
        let item = summary.per_league.entry(table.league.clone()).or_default();
        item.tables_processed += 1;
        item.records_emitted += table.records.len();
        item.errors
            .extend(table.report.issues.iter().map(|i| i.to_string()));
        summary.issues.extend(table.report.issues);
    }
    summary.errors = summary.issues.iter().map(|i| i.to_string()).collect();

    for sink in sinks.iter_mut() {
        sink.finish(&summary)?;
    }

    info!(
        tables = summary.tables_processed,
        missing = summary.tables_missing,
        records = summary.records_emitted,
        issues = summary.issues.len(),
        "ingest complete"
    );
    Ok(summary)
}
