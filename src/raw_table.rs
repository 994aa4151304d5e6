use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderLayout {
    /// Group label row followed by metric label row.
    #[default]
    TwoLevel,
    Flat,
}

impl HeaderLayout {
    pub fn from_rows(rows: u8) -> Option<Self> {
        match rows {
            1 => Some(HeaderLayout::Flat),
            2 => Some(HeaderLayout::TwoLevel),
            _ => None,
        }
    }

    fn header_rows(self) -> usize {
        match self {
            HeaderLayout::Flat => 1,
            HeaderLayout::TwoLevel => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Empty when the column has no group label.
    pub group: String,
    pub metric: String,
}

impl HeaderCell {
    pub fn new(group: &str, metric: &str) -> Self {
        Self {
            group: normalize_group(group),
            metric: metric.trim().to_string(),
        }
    }

    pub fn bare(metric: &str) -> Self {
        Self::new("", metric)
    }
}

/// Placeholder group labels ("Unnamed: 3_level_0") mean "no group".
fn normalize_group(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("Unnamed") {
        return String::new();
    }
    trimmed.to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub header: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Vec<HeaderCell>, rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { header, rows }
    }

    /// Convenience for single-level tables.
    pub fn flat(columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        let header = columns.iter().map(|c| HeaderCell::bare(c)).collect();
        Self::new(header, rows)
    }

    pub fn from_path(path: &Path, layout: HeaderLayout) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open raw table {}", path.display()))?;
        Self::from_reader(file, layout).with_context(|| format!("parse {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, layout: HeaderLayout) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut header_rows: Vec<Vec<String>> = Vec::with_capacity(layout.header_rows());
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("read csv record")?;
            let cells = record.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            if header_rows.len() < layout.header_rows() {
                header_rows.push(cells);
            } else {
                rows.push(cells);
            }
        }
        if header_rows.len() < layout.header_rows() {
            return Err(anyhow!("table has no header"));
        }

        let header = match layout {
            HeaderLayout::Flat => header_rows[0].iter().map(|m| HeaderCell::bare(m)).collect(),
            HeaderLayout::TwoLevel => {
                let metrics = &header_rows[1];
                metrics
                    .iter()
                    .enumerate()
                    .map(|(idx, metric)| {
                        let group = header_rows[0].get(idx).map(String::as_str).unwrap_or("");
                        HeaderCell::new(group, metric)
                    })
                    .collect()
            }
        };
        Ok(Self::new(header, rows))
    }

    pub fn metric_labels(&self) -> Vec<&str> {
        self.header.iter().map(|h| h.metric.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_two_level_header_and_pads_rows() {
        let raw = "Unnamed: 0_level_0,Total,Total\nSquad,Cmp,Att\nArsenal,10\n";
        let table = RawTable::from_reader(raw.as_bytes(), HeaderLayout::TwoLevel).unwrap();
        assert_eq!(table.header[0], HeaderCell::bare("Squad"));
        assert_eq!(table.header[1], HeaderCell::new("Total", "Cmp"));
        assert_eq!(table.rows, vec![vec!["Arsenal", "10", ""]]);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(RawTable::from_reader("".as_bytes(), HeaderLayout::Flat).is_err());
    }
}
