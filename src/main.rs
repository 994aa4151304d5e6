use anyhow::Result;

use fbref_ingest::config::PipelineConfig;
use fbref_ingest::logging::init_tracing;
use fbref_ingest::pipeline;

fn main() -> Result<()> {
    init_tracing();
    let config = PipelineConfig::load()?;
    let summary = pipeline::run(&config)?;

    println!("FBref ingest complete");
    println!("Raw: {}", config.raw_dir.display());
    if config.write_csv {
        println!("Out: {}", config.output_dir.display());
    }
    if let Some(db) = &config.db_path {
        println!("DB: {}", db.display());
    }
    println!(
        "Reference: leagues={} teams={} players={}",
        summary.leagues, summary.teams, summary.players
    );
    println!(
        "Tables: {} processed, {} missing",
        summary.tables_processed, summary.tables_missing
    );
    println!("Records emitted: {}", summary.records_emitted);
    for (sink, report) in &summary.sink_reports {
        println!(
            "{sink}: inserted={} skipped={}",
            report.inserted, report.skipped
        );
    }

    for (league, item) in &summary.per_league {
        println!(
            "{}: tables {}/{} records={}",
            league,
            item.tables_processed,
            item.tables_processed + item.tables_missing,
            item.records_emitted
        );
        if !item.errors.is_empty() {
            println!("  issues: {}", item.errors.len());
            for err in item.errors.iter().take(6) {
                println!("   - {err}");
            }
        }
    }

    Ok(())
}
