use std::collections::BTreeSet;

use super::columns::{resolve_columns, ColumnError, MappingStrategy, ResolvedColumns};
use super::model::{AnnotatedRecord, CellValue, ExpressionTable};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Regulation-label filter: the `All` sentinel keeps every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegulationFilter {
    #[default]
    All,
    Label(String),
}

impl RegulationFilter {
    fn keeps(&self, record: &AnnotatedRecord) -> bool {
        match self {
            RegulationFilter::All => true,
            RegulationFilter::Label(label) => record.regulation.as_deref() == Some(label),
        }
    }
}

/// Immutable per-invocation configuration, rebuilt from the UI controls on
/// every pass. `log2fc_threshold` is expected in `[0, 5]` and
/// `padj_threshold` in `[0, 0.1]` (the slider ranges); the processor itself
/// only assumes `log2fc_threshold >= 0` and `padj_threshold` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    pub mapping: MappingStrategy,
    pub log2fc_threshold: f64,
    pub padj_threshold: f64,
    pub regulation_filter: RegulationFilter,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            mapping: MappingStrategy::Fuzzy,
            log2fc_threshold: 1.0,
            padj_threshold: 0.05,
            regulation_filter: RegulationFilter::All,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// How many cells per numeric column failed coercion to a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionStats {
    pub log2_fold_change_missing: usize,
    pub padj_missing: usize,
}

impl CoercionStats {
    pub fn total(&self) -> usize {
        self.log2_fold_change_missing + self.padj_missing
    }
}

/// One full pipeline pass over an [`ExpressionTable`].
///
/// `records` is the processed (post-regulation-filter) table for diagnostic
/// display; `significant` indexes into it, ascending by `padj` with original
/// row order preserved on ties. Empty vectors are a valid "no data" state,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    pub records: Vec<AnnotatedRecord>,
    pub significant: Vec<usize>,
    /// Distinct labels in the regulation column of the *unfiltered* table;
    /// `None` when the table has no regulation column.
    pub regulation_labels: Option<BTreeSet<String>>,
    pub coercion: CoercionStats,
}

impl ProcessOutput {
    pub fn significant_count(&self) -> usize {
        self.significant.len()
    }

    /// Significant records in display order.
    pub fn significant_records(&self) -> impl Iterator<Item = &AnnotatedRecord> {
        self.significant.iter().map(|&i| &self.records[i])
    }

    /// Records with both volcano-plot axes defined.
    pub fn plottable_records(&self) -> impl Iterator<Item = &AnnotatedRecord> {
        self.records.iter().filter(|r| r.plottable())
    }
}

// ---------------------------------------------------------------------------
// The pipeline
// ---------------------------------------------------------------------------

/// Run the full upload → classify → filter → assemble pass.
///
/// The input table is borrowed immutably and never changed, so re-running
/// with different thresholds is idempotent over the same table. The only
/// fatal failure is column resolution, which happens before any numeric
/// work.
pub fn process(
    table: &ExpressionTable,
    config: &ProcessorConfig,
) -> Result<ProcessOutput, ColumnError> {
    let resolved = resolve_columns(table, &config.mapping)?;

    let mut coercion = CoercionStats::default();
    let mut all_records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        all_records.push(annotate_row(table, &resolved, config, row, &mut coercion));
    }

    // Label set comes from the unfiltered table so the UI can always offer
    // the full choice of filters.
    let regulation_labels = resolved.regulation.map(|_| {
        all_records
            .iter()
            .filter_map(|r| r.regulation.clone())
            .collect::<BTreeSet<String>>()
    });

    let records: Vec<AnnotatedRecord> = all_records
        .into_iter()
        .filter(|r| resolved.regulation.is_none() || config.regulation_filter.keeps(r))
        .collect();

    let mut significant: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.significant)
        .map(|(i, _)| i)
        .collect();
    // Vec::sort_by is stable: equal padj keeps original row order.
    significant.sort_by(|&a, &b| {
        let pa = records[a].padj.unwrap_or(f64::INFINITY);
        let pb = records[b].padj.unwrap_or(f64::INFINITY);
        pa.total_cmp(&pb)
    });

    Ok(ProcessOutput {
        records,
        significant,
        regulation_labels,
        coercion,
    })
}

fn annotate_row(
    table: &ExpressionTable,
    resolved: &ResolvedColumns,
    config: &ProcessorConfig,
    row: usize,
    coercion: &mut CoercionStats,
) -> AnnotatedRecord {
    let gene = table
        .cell(row, resolved.gene)
        .as_text()
        .unwrap_or_default();

    let log2_fold_change = coerce(table.cell(row, resolved.log2_fold_change));
    if log2_fold_change.is_none() {
        coercion.log2_fold_change_missing += 1;
    }
    let padj = coerce(table.cell(row, resolved.padj));
    if padj.is_none() {
        coercion.padj_missing += 1;
    }

    let regulation = resolved
        .regulation
        .and_then(|col| table.cell(row, col).as_text());

    let neg_log10_padj = padj.filter(|&p| p > 0.0).map(|p| -p.log10());

    let significant = match (log2_fold_change, padj) {
        (Some(fc), Some(p)) => p < config.padj_threshold && fc.abs() >= config.log2fc_threshold,
        _ => false,
    };

    AnnotatedRecord {
        gene,
        log2_fold_change,
        padj,
        regulation,
        neg_log10_padj,
        significant,
    }
}

fn coerce(cell: &CellValue) -> Option<f64> {
    cell.as_f64().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> CellValue {
        CellValue::Float(v)
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn basic_table(rows: &[(&str, f64, f64)]) -> ExpressionTable {
        ExpressionTable::new(
            vec!["Gene".into(), "log2FoldChange".into(), "padj".into()],
            rows.iter()
                .map(|(g, fc, p)| vec![text(g), num(*fc), num(*p)])
                .collect(),
        )
    }

    fn run(table: &ExpressionTable, fc: f64, p: f64) -> ProcessOutput {
        let config = ProcessorConfig {
            log2fc_threshold: fc,
            padj_threshold: p,
            ..ProcessorConfig::default()
        };
        process(table, &config).unwrap()
    }

    #[test]
    fn scenario_two_of_three_significant() {
        let table = basic_table(&[("G1", 2.0, 0.01), ("G2", 0.5, 0.2), ("G3", -3.0, 0.001)]);
        let out = run(&table, 1.0, 0.05);
        let genes: Vec<&str> = out.significant_records().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["G3", "G1"]);
        assert_eq!(out.significant_count(), 2);
    }

    #[test]
    fn missing_inputs_are_never_significant() {
        let table = ExpressionTable::new(
            vec!["Gene".into(), "log2FoldChange".into(), "padj".into()],
            vec![
                vec![text("A"), text("NA"), num(0.001)],
                vec![text("B"), num(5.0), CellValue::Null],
                vec![text("C"), CellValue::Null, text("not a number")],
            ],
        );
        let out = run(&table, 0.0, 1.0);
        assert!(out.records.iter().all(|r| !r.significant));
        assert_eq!(out.coercion.log2_fold_change_missing, 2);
        assert_eq!(out.coercion.padj_missing, 2);
    }

    #[test]
    fn zero_padj_excluded_from_plot_but_kept_in_table() {
        let table = basic_table(&[("G1", 2.0, 0.0), ("G2", 2.0, -0.5), ("G3", 2.0, 0.01)]);
        let out = run(&table, 1.0, 0.05);
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].neg_log10_padj, None);
        assert_eq!(out.records[1].neg_log10_padj, None);
        assert!(out.records[2].neg_log10_padj.is_some());
        let plotted: Vec<&str> = out.plottable_records().map(|r| r.gene.as_str()).collect();
        assert_eq!(plotted, vec!["G3"]);
    }

    #[test]
    fn neg_log10_matches_padj() {
        let table = basic_table(&[("G1", 1.0, 0.01)]);
        let out = run(&table, 1.0, 0.05);
        let v = out.records[0].neg_log10_padj.unwrap();
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundaries() {
        // |fc| >= threshold is inclusive, padj < threshold is exclusive.
        let table = basic_table(&[("Edge", -1.0, 0.05), ("In", 1.0, 0.049)]);
        let out = run(&table, 1.0, 0.05);
        let genes: Vec<&str> = out.significant_records().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["In"]);
    }

    #[test]
    fn classification_is_idempotent() {
        let table = basic_table(&[("G1", 2.0, 0.01), ("G2", 0.5, 0.2), ("G3", -3.0, 0.0)]);
        let first = run(&table, 1.0, 0.05);
        let second = run(&table, 1.0, 0.05);
        assert_eq!(first, second);
    }

    #[test]
    fn significant_count_is_monotone_in_thresholds() {
        let table = basic_table(&[
            ("A", 0.2, 0.001),
            ("B", 1.1, 0.04),
            ("C", -2.5, 0.01),
            ("D", 3.0, 0.09),
            ("E", 0.9, 0.002),
        ]);
        let padj_grid = [0.0, 0.005, 0.02, 0.05, 0.1];
        let fc_grid = [0.0, 0.5, 1.0, 2.0, 5.0];

        for &fc in &fc_grid {
            let mut last = 0;
            for &p in &padj_grid {
                let count = run(&table, fc, p).significant_count();
                assert!(count >= last, "count dropped as padj threshold grew");
                last = count;
            }
        }
        for &p in &padj_grid {
            let mut last = usize::MAX;
            for &fc in &fc_grid {
                let count = run(&table, fc, p).significant_count();
                assert!(count <= last, "count grew as log2fc threshold grew");
                last = count;
            }
        }
    }

    #[test]
    fn equal_padj_keeps_original_order() {
        let table = basic_table(&[
            ("First", 2.0, 0.01),
            ("Earlier", 2.0, 0.001),
            ("Second", -2.0, 0.01),
            ("Third", 3.0, 0.01),
        ]);
        let out = run(&table, 1.0, 0.05);
        let genes: Vec<&str> = out.significant_records().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["Earlier", "First", "Second", "Third"]);
    }

    fn regulated_table() -> ExpressionTable {
        ExpressionTable::new(
            vec![
                "Gene".into(),
                "log2FoldChange".into(),
                "padj".into(),
                "regulation".into(),
            ],
            vec![
                vec![text("G1"), num(2.0), num(0.01), text("Upregulated")],
                vec![text("G2"), num(-2.0), num(0.02), text("Downregulated")],
                vec![text("G3"), num(3.0), num(0.03), text("Upregulated")],
                vec![text("G4"), num(0.1), num(0.9), CellValue::Null],
            ],
        )
    }

    #[test]
    fn regulation_labels_come_from_unfiltered_table() {
        let config = ProcessorConfig {
            regulation_filter: RegulationFilter::Label("Upregulated".into()),
            ..ProcessorConfig::default()
        };
        let out = process(&regulated_table(), &config).unwrap();
        let labels = out.regulation_labels.unwrap();
        assert_eq!(
            labels.into_iter().collect::<Vec<_>>(),
            vec!["Downregulated".to_string(), "Upregulated".to_string()]
        );
        assert_eq!(out.records.len(), 2);
        assert!(out.records.iter().all(|r| r.regulation.as_deref() == Some("Upregulated")));
    }

    #[test]
    fn filter_on_absent_label_yields_valid_empty_state() {
        let table = ExpressionTable::new(
            vec![
                "Gene".into(),
                "log2FoldChange".into(),
                "padj".into(),
                "regulation".into(),
            ],
            vec![vec![text("G1"), num(2.0), num(0.01), text("Downregulated")]],
        );
        let config = ProcessorConfig {
            regulation_filter: RegulationFilter::Label("Upregulated".into()),
            ..ProcessorConfig::default()
        };
        let out = process(&table, &config).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.significant_count(), 0);
    }

    #[test]
    fn filter_is_noop_without_regulation_column() {
        let table = basic_table(&[("G1", 2.0, 0.01), ("G2", 0.5, 0.2)]);
        let config = ProcessorConfig {
            regulation_filter: RegulationFilter::Label("Upregulated".into()),
            ..ProcessorConfig::default()
        };
        let out = process(&table, &config).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.regulation_labels, None);
    }

    #[test]
    fn resolution_failure_aborts_before_numeric_work() {
        let table = ExpressionTable::new(
            vec!["id".into(), "value".into()],
            vec![vec![text("G1"), text("garbage")]],
        );
        assert!(process(&table, &ProcessorConfig::default()).is_err());
    }
}
