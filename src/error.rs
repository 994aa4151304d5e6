use std::path::PathBuf;

use thiserror::Error;

use crate::coerce::SemanticType;

/// Non-fatal data-quality conditions. Each is recovered where it happens and
/// reported through the run summary; none of them stops a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestIssue {
    #[error("{league}/{table}: input file {} not found", path.display())]
    MissingInput {
        league: String,
        table: String,
        path: PathBuf,
    },

    #[error("{league}/{table}: unreadable input {}: {reason}", path.display())]
    UnreadableInput {
        league: String,
        table: String,
        path: PathBuf,
        reason: String,
    },

    #[error(
        "{table}: {count} cell(s) in {column} not parseable as {kind} (e.g. {sample:?}), defaulted"
    )]
    ColumnCoercion {
        table: String,
        column: String,
        kind: SemanticType,
        sample: String,
        count: usize,
    },

    #[error("{league}: {entity} {name:?} has no match in the {entity} table")]
    UnresolvedForeignKey {
        league: String,
        entity: &'static str,
        name: String,
    },

    #[error("{table}: expected column {column} absent from source, filled with defaults")]
    SchemaShape { table: String, column: String },
}

impl IngestIssue {
    pub fn league(&self) -> &str {
        match self {
            IngestIssue::MissingInput { league, .. }
            | IngestIssue::UnreadableInput { league, .. }
            | IngestIssue::UnresolvedForeignKey { league, .. } => league.as_str(),
            // Table labels are "<league>/<category>".
            IngestIssue::ColumnCoercion { table, .. } | IngestIssue::SchemaShape { table, .. } => {
                table.split('/').next().unwrap_or_default()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse {value:?} as {kind}")]
pub struct CoercionError {
    pub value: String,
    pub kind: SemanticType,
}
