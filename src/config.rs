use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::raw_table::HeaderLayout;

pub const DEFAULT_RAW_DIR: &str = "data/fbref_raw";
pub const DEFAULT_OUTPUT_DIR: &str = "data/final";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub raw_dir: PathBuf,
    pub output_dir: PathBuf,
    /// No database load when unset.
    pub db_path: Option<PathBuf>,
    /// Built-in reference data when unset.
    pub reference_path: Option<PathBuf>,
    pub header_layout: HeaderLayout,
    pub write_csv: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            db_path: None,
            reference_path: None,
            header_layout: HeaderLayout::TwoLevel,
            write_csv: true,
        }
    }
}

impl PipelineConfig {
    /// Loads `.env.local` / `.env`, then reads the process environment and
    /// command line.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::from_sources(|key| std::env::var(key).ok(), &args)
    }

    /// Defaults, overridden by `env`, overridden by `args`.
    pub fn from_sources<F>(env: F, args: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = PipelineConfig::default();
        let env_value = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = env_value("APP_FBREF_RAW_DIR") {
            cfg.raw_dir = PathBuf::from(v.trim());
        }
        if let Some(v) = env_value("APP_FBREF_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(v.trim());
        }
        if let Some(v) = env_value("APP_FBREF_DB") {
            cfg.db_path = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = env_value("APP_FBREF_REFERENCE") {
            cfg.reference_path = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = env_value("APP_FBREF_HEADER_ROWS") {
            cfg.header_layout = parse_header_rows(&v)?;
        }

        if let Some(v) = flag_value(args, "--raw") {
            cfg.raw_dir = PathBuf::from(v);
        }
        if let Some(v) = flag_value(args, "--out") {
            cfg.output_dir = PathBuf::from(v);
        }
        if let Some(v) = flag_value(args, "--db") {
            cfg.db_path = Some(PathBuf::from(v));
        }
        if let Some(v) = flag_value(args, "--reference") {
            cfg.reference_path = Some(PathBuf::from(v));
        }
        if let Some(v) = flag_value(args, "--header-rows") {
            cfg.header_layout = parse_header_rows(&v)?;
        }
        if args.iter().any(|a| a == "--no-csv") {
            cfg.write_csv = false;
        }
        Ok(cfg)
    }
}

fn parse_header_rows(raw: &str) -> Result<HeaderLayout> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(HeaderLayout::from_rows)
        .ok_or_else(|| anyhow!("header rows must be 1 or 2, got {raw:?}"))
}

/// Accepts `--flag value` and `--flag=value`; blank values are ignored.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
