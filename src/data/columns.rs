use std::fmt;

use thiserror::Error;

use super::model::ExpressionTable;

// ---------------------------------------------------------------------------
// Column roles and mapping strategies
// ---------------------------------------------------------------------------

/// Semantic role a raw column can play in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Gene,
    Log2FoldChange,
    Padj,
    Regulation,
}

impl ColumnRole {
    /// Substring patterns matched against normalized header names.
    fn patterns(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Gene => &["gene"],
            ColumnRole::Log2FoldChange => &["log2fc", "log2foldchange"],
            ColumnRole::Padj => &["padj"],
            ColumnRole::Regulation => &["regulation"],
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnRole::Gene => "gene",
            ColumnRole::Log2FoldChange => "log2FoldChange",
            ColumnRole::Padj => "padj",
            ColumnRole::Regulation => "regulation",
        };
        write!(f, "{name}")
    }
}

/// How raw columns are assigned to roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingStrategy {
    /// Infer roles by normalized substring matching on header names.
    Fuzzy,
    /// Caller supplies the exact header name per role; no inference.
    Explicit {
        gene: String,
        log2_fold_change: String,
        padj: String,
        regulation: Option<String>,
    },
}

impl Default for MappingStrategy {
    fn default() -> Self {
        MappingStrategy::Fuzzy
    }
}

/// Resolved column indices into an [`ExpressionTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub gene: usize,
    pub log2_fold_change: usize,
    pub padj: usize,
    pub regulation: Option<usize>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal column-resolution failures. Resolution runs before any numeric
/// processing, so a failed resolution aborts the whole invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("missing required column(s) {}; available columns: {}",
        format_roles(missing), available.join(", "))]
    MissingRequiredColumns {
        missing: Vec<ColumnRole>,
        available: Vec<String>,
    },
    #[error("column match for role '{role}' is ambiguous: {}", candidates.join(", "))]
    AmbiguousColumnMatch {
        role: ColumnRole,
        candidates: Vec<String>,
    },
}

fn format_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|r| format!("'{r}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Map the table's raw headers onto semantic roles.
///
/// Both strategies fail with [`ColumnError::MissingRequiredColumns`] when any
/// of gene / log2FoldChange / padj cannot be resolved; the regulation role is
/// optional and its absence is never an error. Fuzzy matching additionally
/// fails with [`ColumnError::AmbiguousColumnMatch`] when more than one header
/// matches the same role, instead of silently picking one.
pub fn resolve_columns(
    table: &ExpressionTable,
    strategy: &MappingStrategy,
) -> Result<ResolvedColumns, ColumnError> {
    match strategy {
        MappingStrategy::Fuzzy => resolve_fuzzy(&table.headers),
        MappingStrategy::Explicit {
            gene,
            log2_fold_change,
            padj,
            regulation,
        } => resolve_explicit(table, gene, log2_fold_change, padj, regulation.as_deref()),
    }
}

/// Normalize a header for fuzzy matching: trim, lowercase, strip spaces and
/// underscores. `"Padj_value"` and `" padj "` both normalize to contain
/// `"padj"`.
fn normalize(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '_')
        .collect()
}

fn resolve_fuzzy(headers: &[String]) -> Result<ResolvedColumns, ColumnError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();

    let find = |role: ColumnRole| -> Result<Option<usize>, ColumnError> {
        let candidates: Vec<usize> = normalized
            .iter()
            .enumerate()
            .filter(|(_, n)| role.patterns().iter().any(|p| n.contains(p)))
            .map(|(i, _)| i)
            .collect();
        match candidates.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            many => Err(ColumnError::AmbiguousColumnMatch {
                role,
                candidates: many.iter().map(|&i| headers[i].clone()).collect(),
            }),
        }
    };

    let gene = find(ColumnRole::Gene)?;
    let log2fc = find(ColumnRole::Log2FoldChange)?;
    let padj = find(ColumnRole::Padj)?;
    let regulation = find(ColumnRole::Regulation)?;

    match (gene, log2fc, padj) {
        (Some(gene), Some(log2_fold_change), Some(padj)) => Ok(ResolvedColumns {
            gene,
            log2_fold_change,
            padj,
            regulation,
        }),
        (gene, log2fc, padj) => {
            let mut missing = Vec::new();
            if gene.is_none() {
                missing.push(ColumnRole::Gene);
            }
            if log2fc.is_none() {
                missing.push(ColumnRole::Log2FoldChange);
            }
            if padj.is_none() {
                missing.push(ColumnRole::Padj);
            }
            Err(ColumnError::MissingRequiredColumns {
                missing,
                available: headers.to_vec(),
            })
        }
    }
}

fn resolve_explicit(
    table: &ExpressionTable,
    gene: &str,
    log2fc: &str,
    padj: &str,
    regulation: Option<&str>,
) -> Result<ResolvedColumns, ColumnError> {
    let mut missing = Vec::new();
    let gene_idx = table.column_index(gene);
    let log2fc_idx = table.column_index(log2fc);
    let padj_idx = table.column_index(padj);
    if gene_idx.is_none() {
        missing.push(ColumnRole::Gene);
    }
    if log2fc_idx.is_none() {
        missing.push(ColumnRole::Log2FoldChange);
    }
    if padj_idx.is_none() {
        missing.push(ColumnRole::Padj);
    }
    // A named regulation column that is absent counts as unresolved too:
    // the caller asked for it explicitly.
    let regulation_idx = match regulation {
        Some(name) => match table.column_index(name) {
            Some(idx) => Some(idx),
            None => {
                missing.push(ColumnRole::Regulation);
                None
            }
        },
        None => None,
    };

    match (gene_idx, log2fc_idx, padj_idx, missing.is_empty()) {
        (Some(gene), Some(log2_fold_change), Some(padj), true) => Ok(ResolvedColumns {
            gene,
            log2_fold_change,
            padj,
            regulation: regulation_idx,
        }),
        _ => Err(ColumnError::MissingRequiredColumns {
            missing,
            available: table.headers.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_headers(headers: &[&str]) -> ExpressionTable {
        ExpressionTable::new(headers.iter().map(|h| h.to_string()).collect(), Vec::new())
    }

    #[test]
    fn fuzzy_resolves_messy_headers() {
        let table = table_with_headers(&["Gene Name", "Log2FC", "Padj_value"]);
        let resolved = resolve_columns(&table, &MappingStrategy::Fuzzy).unwrap();
        assert_eq!(resolved.gene, 0);
        assert_eq!(resolved.log2_fold_change, 1);
        assert_eq!(resolved.padj, 2);
        assert_eq!(resolved.regulation, None);
    }

    #[test]
    fn fuzzy_finds_optional_regulation() {
        let table = table_with_headers(&["gene", "log2FoldChange", "padj", "Regulation "]);
        let resolved = resolve_columns(&table, &MappingStrategy::Fuzzy).unwrap();
        assert_eq!(resolved.regulation, Some(3));
    }

    #[test]
    fn fuzzy_missing_padj_lists_role_and_headers() {
        let table = table_with_headers(&["Gene", "Log2FC", "pvalue"]);
        let err = resolve_columns(&table, &MappingStrategy::Fuzzy).unwrap_err();
        match err {
            ColumnError::MissingRequiredColumns { missing, available } => {
                assert_eq!(missing, vec![ColumnRole::Padj]);
                assert_eq!(available, vec!["Gene", "Log2FC", "pvalue"]);
            }
            other => panic!("expected MissingRequiredColumns, got {other:?}"),
        }
    }

    #[test]
    fn fuzzy_two_gene_columns_is_ambiguous() {
        let table = table_with_headers(&["Gene", "gene_id", "log2FC", "padj"]);
        let err = resolve_columns(&table, &MappingStrategy::Fuzzy).unwrap_err();
        match err {
            ColumnError::AmbiguousColumnMatch { role, candidates } => {
                assert_eq!(role, ColumnRole::Gene);
                assert_eq!(candidates, vec!["Gene", "gene_id"]);
            }
            other => panic!("expected AmbiguousColumnMatch, got {other:?}"),
        }
    }

    #[test]
    fn explicit_resolves_exact_names() {
        let table = table_with_headers(&["id", "fc", "q", "direction"]);
        let strategy = MappingStrategy::Explicit {
            gene: "id".into(),
            log2_fold_change: "fc".into(),
            padj: "q".into(),
            regulation: Some("direction".into()),
        };
        let resolved = resolve_columns(&table, &strategy).unwrap();
        assert_eq!(
            resolved,
            ResolvedColumns { gene: 0, log2_fold_change: 1, padj: 2, regulation: Some(3) }
        );
    }

    #[test]
    fn explicit_does_no_inference() {
        // "padj" exists under a fuzzy-matchable name, but the explicit
        // strategy only accepts exact names.
        let table = table_with_headers(&["Gene", "log2FC", "Padj_value"]);
        let strategy = MappingStrategy::Explicit {
            gene: "Gene".into(),
            log2_fold_change: "log2FC".into(),
            padj: "padj".into(),
            regulation: None,
        };
        let err = resolve_columns(&table, &strategy).unwrap_err();
        assert!(matches!(
            err,
            ColumnError::MissingRequiredColumns { ref missing, .. } if missing == &[ColumnRole::Padj]
        ));
    }

    #[test]
    fn error_messages_are_user_facing() {
        let table = table_with_headers(&["a", "b"]);
        let err = resolve_columns(&table, &MappingStrategy::Fuzzy).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'gene'"), "{msg}");
        assert!(msg.contains("available columns: a, b"), "{msg}");
    }
}
