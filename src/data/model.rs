use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell mirroring common dataframe dtypes.
/// Loaders produce these; numeric coercion happens later via [`CellValue::as_f64`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the cell as an `f64` if possible.
    ///
    /// String cells are parsed; anything unparseable (including `Null` and
    /// the empty string) yields `None` rather than an error, so a single
    /// malformed cell never aborts a pipeline pass.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) | CellValue::Null => None,
        }
    }

    /// The cell as text, `None` for `Null` and empty strings.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ExpressionTable – the raw uploaded table
// ---------------------------------------------------------------------------

/// The loaded table exactly as uploaded: a header row plus row-major cells.
/// Loaded once per upload and never mutated; every processing pass derives a
/// fresh view from it.
#[derive(Debug, Clone, Default)]
pub struct ExpressionTable {
    /// Ordered raw column names from the header row.
    pub headers: Vec<String>,
    /// One `Vec<CellValue>` per data row, each as long as `headers`.
    pub rows: Vec<Vec<CellValue>>,
}

impl ExpressionTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        ExpressionTable { headers, rows }
    }

    /// Index of a raw column name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (row, column), `Null` if the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Null)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AnnotatedRecord – one processed row with derived columns
// ---------------------------------------------------------------------------

/// One gene row after coercion and classification.
///
/// `Serialize` so the significant-genes table can be exported as CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    /// Gene identifier (semantic key, not required unique).
    pub gene: String,
    /// Coerced log2 fold change; `None` when missing or unparseable.
    pub log2_fold_change: Option<f64>,
    /// Coerced adjusted p-value; `None` when missing or unparseable.
    pub padj: Option<f64>,
    /// Regulation label, only when the source table has the column.
    pub regulation: Option<String>,
    /// `-log10(padj)` for strictly positive `padj`, otherwise `None`.
    /// Zero or negative p-values are never coerced to a sentinel.
    pub neg_log10_padj: Option<f64>,
    /// Passes both thresholds; never true when an input is missing.
    pub significant: bool,
}

impl AnnotatedRecord {
    /// Whether the record can appear in the volcano plot: both axes defined.
    pub fn plottable(&self) -> bool {
        self.log2_fold_change.is_some() && self.neg_log10_padj.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_f64_parses_strings_and_numbers() {
        assert_eq!(CellValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(CellValue::Integer(-3).as_f64(), Some(-3.0));
        assert_eq!(CellValue::String(" 0.05 ".into()).as_f64(), Some(0.05));
        assert_eq!(CellValue::String("NA".into()).as_f64(), None);
        assert_eq!(CellValue::String("".into()).as_f64(), None);
        assert_eq!(CellValue::Null.as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn as_text_drops_null_and_blank() {
        assert_eq!(CellValue::String("Upregulated".into()).as_text().as_deref(), Some("Upregulated"));
        assert_eq!(CellValue::String("   ".into()).as_text(), None);
        assert_eq!(CellValue::Null.as_text(), None);
        assert_eq!(CellValue::Integer(7).as_text().as_deref(), Some("7"));
    }

    #[test]
    fn short_rows_read_as_null() {
        let table = ExpressionTable::new(
            vec!["Gene".into(), "padj".into()],
            vec![vec![CellValue::String("G1".into())]],
        );
        assert_eq!(*table.cell(0, 1), CellValue::Null);
        assert_eq!(*table.cell(5, 0), CellValue::Null);
    }
}
