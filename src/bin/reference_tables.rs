use anyhow::Result;

use fbref_ingest::categories::{Category, Level, StatKind};
use fbref_ingest::config::PipelineConfig;
use fbref_ingest::entities::EntityResolver;
use fbref_ingest::logging::init_tracing;
use fbref_ingest::pipeline::{load_reference, load_tables};
use fbref_ingest::sink::{CsvSink, RecordSink};

fn main() -> Result<()> {
    init_tracing();
    let config = PipelineConfig::load()?;
    let reference = load_reference(&config)?;

    let standard = [
        Category::new(StatKind::Standard, Level::Team),
        Category::new(StatKind::Standard, Level::Player),
    ];
    let loaded = load_tables(&config.raw_dir, config.header_layout, &reference, &standard);
    let (resolver, issues) = EntityResolver::build(
        &reference,
        &loaded.standard(Level::Team),
        &loaded.standard(Level::Player),
    );

    let mut sink = CsvSink::new(&config.output_dir);
    sink.put_leagues(resolver.leagues())?;
    sink.put_teams(resolver.teams())?;
    sink.put_players(resolver.players())?;

    println!("Reference tables written");
    println!("Out: {}", config.output_dir.display());
    println!(
        "leagues={} teams={} players={}",
        resolver.leagues().len(),
        resolver.teams().len(),
        resolver.players().len()
    );
    let errors = loaded.issues.iter().chain(issues.iter()).collect::<Vec<_>>();
    if !errors.is_empty() {
        println!("Issues: {}", errors.len());
        for err in errors.iter().take(8) {
            println!(" - {err}");
        }
    }

    Ok(())
}
