/// Data layer: core types, loading, and the processing pipeline.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ExpressionTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  columns  │  resolve gene / log2FC / padj / regulation roles
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  process  │  coerce, classify, filter → ProcessOutput
///   └──────────┘
/// ```

pub mod columns;
pub mod demo;
pub mod loader;
pub mod model;
pub mod process;
