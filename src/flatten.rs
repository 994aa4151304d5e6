use std::collections::HashMap;

use crate::raw_table::{HeaderCell, RawTable};

pub const PER_90_SUFFIX: &str = "_per_90";

/// A header group whose metrics repeat elsewhere in the table and therefore
/// get a suffix when flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSuffix {
    pub group: &'static str,
    pub suffix: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub repeated_headers_dropped: usize,
}

impl FlatTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One flat name per column. Column order matters: the per-90 rule only
/// tells first from later occurrences of the same name.
pub fn flatten_header(header: &[HeaderCell], groups: &[GroupSuffix]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let name = match groups.iter().find(|g| g.group == cell.group) {
                Some(g) => format!("{}{}", cell.metric, g.suffix),
                None => cell.metric.clone(),
            };
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                format!("{name}{PER_90_SUFFIX}")
            } else {
                name
            }
        })
        .collect()
}

/// True when the row is an in-page echo of the header.
pub fn is_repeated_header(row: &[String], labels: &[&str]) -> bool {
    row.len() == labels.len()
        && row
            .iter()
            .zip(labels.iter())
            .all(|(cell, label)| cell.trim() == *label)
}

pub fn flatten(raw: RawTable, groups: &[GroupSuffix]) -> FlatTable {
    let columns = flatten_header(&raw.header, groups);
    let metric_labels = raw.metric_labels();
    let flat_labels = columns.iter().map(String::as_str).collect::<Vec<_>>();

    let mut repeated_headers_dropped = 0usize;
    let mut rows = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        if is_repeated_header(row, &metric_labels) || is_repeated_header(row, &flat_labels) {
            repeated_headers_dropped += 1;
            continue;
        }
        rows.push(row.clone());
    }

    FlatTable {
        columns,
        rows,
        repeated_headers_dropped,
    }
}
