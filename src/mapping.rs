use crate::coerce::SemanticType;

/// One declared output column: the flattened source name, the canonical
/// name it is renamed to, and the type cells are coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub raw: &'static str,
    pub name: &'static str,
    pub kind: SemanticType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedColumn {
    pub field: FieldSpec,
    pub source_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Declared fields found in the source, in declared order.
    pub columns: Vec<MappedColumn>,
    /// Declared fields the source does not carry.
    pub missing: Vec<FieldSpec>,
    /// Source columns with no declared field.
    pub dropped: Vec<String>,
}

impl ColumnMapping {
    pub fn source_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.field.name == name)
            .map(|c| c.source_index)
    }
}

/// Renames flattened columns to canonical names. Nothing is fabricated here:
/// a declared field with no source column only lands in `missing`.
///
/// If the same raw name appears twice in the source the first column wins.
pub fn map_columns(flat_columns: &[String], fields: &[FieldSpec]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    let mut used = vec![false; flat_columns.len()];

    for field in fields {
        match flat_columns.iter().position(|c| c == field.raw) {
            Some(idx) => {
                used[idx] = true;
                mapping.columns.push(MappedColumn {
                    field: *field,
                    source_index: idx,
                });
            }
            None => mapping.missing.push(*field),
        }
    }

    mapping.dropped = flat_columns
        .iter()
        .zip(used)
        .filter(|(_, used)| !used)
        .map(|(name, _)| name.clone())
        .collect();
    mapping
}
