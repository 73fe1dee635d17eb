use anyhow::Result;

use super::loader::load_delimited_reader;
use super::model::ExpressionTable;

/// Bundled demo dataset: differential expression results for a small panel
/// of well-known genes, including a few deliberately awkward rows (a zero
/// p-value, `NA` cells).
///
/// The demo is just another data source: the embedded CSV goes through the
/// regular loader and satisfies the same table contract as an upload.
static DEMO_CSV: &str = include_str!("../../assets/demo_data.csv");

pub fn demo_table() -> Result<ExpressionTable> {
    load_delimited_reader(DEMO_CSV.as_bytes(), b',')
}
