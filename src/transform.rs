use tracing::{debug, info, warn};

use crate::categories::{CategorySpec, Level};
use crate::coerce::{SemanticType, Value, parse_age, parse_nation, try_coerce};
use crate::error::IngestIssue;
use crate::flatten::{FlatTable, flatten};
use crate::mapping::map_columns;
use crate::raw_table::RawTable;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerIdentity {
    pub name: String,
    pub nation: String,
    pub position: String,
    pub squad: String,
    pub age: Option<i64>,
    pub born: Option<i64>,
}

/// Who a record describes. Kept alongside the metrics so key resolution never
/// depends on row order in some other table.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIdentity {
    Team { squad: String },
    Player(PlayerIdentity),
}

impl RowIdentity {
    pub fn squad(&self) -> &str {
        match self {
            RowIdentity::Team { squad } => squad,
            RowIdentity::Player(p) => &p.squad,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    /// Assigned by the sink at load time.
    pub stat_id: Option<i64>,
    /// `player_id` or `team_id`, depending on the category level.
    pub owner_id: Option<i64>,
    /// Index in the source table after repeated headers were dropped.
    pub source_row: usize,
    pub identity: RowIdentity,
    /// One value per declared field, in declared order.
    pub values: Vec<Value>,
}

impl CategoryRecord {
    /// Stable per-league provenance key used for duplicate detection on load.
    pub fn source_key(&self) -> String {
        match &self.identity {
            RowIdentity::Team { squad } if !squad.is_empty() => squad.clone(),
            RowIdentity::Player(p) if !p.name.is_empty() => {
                let born = p.born.map(|b| b.to_string()).unwrap_or_default();
                format!("{}|{}|{}", p.name, born, p.squad)
            }
            _ => format!("row:{}", self.source_row),
        }
    }

    /// Full output row: keys first, then metrics.
    pub fn output_row(&self) -> Vec<Value> {
        let mut row = Vec::with_capacity(self.values.len() + 2);
        row.push(self.stat_id.map(Value::Int).unwrap_or(Value::Null));
        row.push(self.owner_id.map(Value::Int).unwrap_or(Value::Null));
        row.extend(self.values.iter().cloned());
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableReport {
    pub source_rows: usize,
    pub repeated_headers_dropped: usize,
    pub dropped_columns: Vec<String>,
    pub issues: Vec<IngestIssue>,
}

#[derive(Debug, Clone)]
pub struct CategoryTable {
    pub league: String,
    pub spec: CategorySpec,
    pub records: Vec<CategoryRecord>,
    pub report: TableReport,
}

impl CategoryTable {
    pub fn columns(&self) -> Vec<&'static str> {
        self.spec.output_columns()
    }

    pub fn table_label(&self) -> String {
        format!("{}/{}", self.league, self.spec.category)
    }
}

struct IdentityColumns {
    player: Option<usize>,
    nation: Option<usize>,
    position: Option<usize>,
    squad: Option<usize>,
    age: Option<usize>,
    born: Option<usize>,
}

impl IdentityColumns {
    fn locate(flat: &FlatTable) -> Self {
        Self {
            player: flat.column_index("Player"),
            nation: flat.column_index("Nation"),
            position: flat.column_index("Pos"),
            squad: flat.column_index("Squad"),
            age: flat.column_index("Age"),
            born: flat.column_index("Born"),
        }
    }

    fn read(&self, level: Level, row: &[String]) -> RowIdentity {
        let cell = |idx: Option<usize>| cell_at(row, idx);
        match level {
            Level::Team => RowIdentity::Team {
                squad: cell(self.squad).to_string(),
            },
            Level::Player => RowIdentity::Player(PlayerIdentity {
                name: cell(self.player).to_string(),
                nation: parse_nation(cell(self.nation)),
                position: cell(self.position).to_string(),
                squad: cell(self.squad).to_string(),
                age: parse_age(cell(self.age)),
                born: try_coerce(cell(self.born), SemanticType::NullableInt)
                    .ok()
                    .and_then(|v| v.as_i64()),
            }),
        }
    }
}

fn cell_at(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or_default()
}

#[derive(Default)]
struct CoercionTally {
    count: usize,
    sample: String,
}

/// Runs one raw table through flattening, mapping and coercion. Never fails:
/// every data problem is recovered and recorded in the table report.
pub fn transform(league: &str, spec: CategorySpec, raw: RawTable) -> CategoryTable {
    let category = spec.category;
    let table = format!("{league}/{category}");
    let source_rows = raw.rows.len();

    let flat = flatten(raw, spec.groups);
    let identity = IdentityColumns::locate(&flat);
    let mapping = map_columns(&flat.columns, spec.fields);

    let mut report = TableReport {
        source_rows,
        repeated_headers_dropped: flat.repeated_headers_dropped,
        ..TableReport::default()
    };

    let identity_names = category.level.identity_columns();
    report.dropped_columns = mapping
        .dropped
        .iter()
        .filter(|name| !identity_names.contains(&name.as_str()))
        .cloned()
        .collect();
    if !report.dropped_columns.is_empty() {
        debug!(table = %table, dropped = ?report.dropped_columns, "unmapped source columns");
    }

    for field in &mapping.missing {
        let issue = IngestIssue::SchemaShape {
            table: table.clone(),
            column: field.name.to_string(),
        };
        warn!("{issue}");
        report.issues.push(issue);
    }

    // Declared field index -> source column, None when absent.
    let sources = spec
        .fields
        .iter()
        .map(|f| mapping.source_index(f.name))
        .collect::<Vec<_>>();
    let mut tallies = (0..spec.fields.len())
        .map(|_| CoercionTally::default())
        .collect::<Vec<_>>();

    let mut records = Vec::with_capacity(flat.rows.len());
    for (source_row, row) in flat.rows.iter().enumerate() {
        let mut values = Vec::with_capacity(spec.fields.len());
        for (idx, field) in spec.fields.iter().enumerate() {
            let Some(col) = sources[idx] else {
                values.push(field.kind.default_value());
                continue;
            };
            let cell = row.get(col).map(String::as_str).unwrap_or_default();
            match try_coerce(cell, field.kind) {
                Ok(value) => values.push(value),
                Err(err) => {
                    let tally = &mut tallies[idx];
                    if tally.count == 0 {
                        tally.sample = err.value;
                    }
                    tally.count += 1;
                    values.push(field.kind.default_value());
                }
            }
        }
        records.push(CategoryRecord {
            stat_id: None,
            owner_id: None,
            source_row,
            identity: identity.read(category.level, row),
            values,
        });
    }

    for (field, tally) in spec.fields.iter().zip(tallies) {
        if tally.count == 0 {
            continue;
        }
        let issue = IngestIssue::ColumnCoercion {
            table: table.clone(),
            column: field.name.to_string(),
            kind: field.kind,
            sample: tally.sample,
            count: tally.count,
        };
        warn!("{issue}");
        report.issues.push(issue);
    }

    info!(
        table = %table,
        rows = records.len(),
        repeated_headers = report.repeated_headers_dropped,
        issues = report.issues.len(),
        "transformed table"
    );

    CategoryTable {
        league: league.to_string(),
        spec,
        records,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::{Category, StatKind};
    use crate::raw_table::HeaderCell;

    fn misc_table(rows: Vec<Vec<&str>>) -> RawTable {
        let header = ["Squad", "# Pl", "90s", "CrdY", "Won%"]
            .iter()
            .map(|m| HeaderCell::bare(m))
            .collect();
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        RawTable::new(header, rows)
    }

    #[test]
    fn records_carry_squad_and_defaults() {
        let spec = Category::new(StatKind::Miscellaneous, Level::Team).spec();
        let table = transform(
            "Serie_A",
            spec,
            misc_table(vec![vec!["Lazio", "25", "38.0", "N/A", "51.2"]]),
        );
        assert_eq!(table.records.len(), 1);
        let record = &table.records[0];
        assert_eq!(record.identity.squad(), "Lazio");
        assert_eq!(record.source_key(), "Lazio");
        assert_eq!(record.values[0], Value::Float(38.0));
        assert_eq!(record.values[1], Value::Int(0));

        let coercion = table
            .report
            .issues
            .iter()
            .filter(|i| {
                matches!(
                    i,
                    IngestIssue::ColumnCoercion { column, count: 1, .. } if column == "crd_y"
                )
            })
            .count();
        assert_eq!(coercion, 1);
        // Everything else declared for misc is absent from this narrow table.
        let shape = table
            .report
            .issues
            .iter()
            .filter(|i| matches!(i, IngestIssue::SchemaShape { .. }))
            .count();
        assert_eq!(shape, spec.fields.len() - 3);
        assert!(table.report.dropped_columns.is_empty());
    }

    #[test]
    fn output_row_has_null_keys_up_front() {
        let spec = Category::new(StatKind::Miscellaneous, Level::Team).spec();
        let table = transform("Serie_A", spec, misc_table(vec![vec!["Roma"]]));
        let row = table.records[0].output_row();
        assert_eq!(row.len(), table.columns().len());
        assert!(row[0].is_null());
        assert!(row[1].is_null());
    }
}
