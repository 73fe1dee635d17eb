use crate::color::ColorMap;
use crate::data::columns::MappingStrategy;
use crate::data::model::ExpressionTable;
use crate::data::process::{process, ProcessOutput, ProcessorConfig, RegulationFilter};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// How column roles are assigned: inferred from header names, or picked by
/// the user per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingMode {
    #[default]
    Auto,
    Manual,
}

/// User-selected column names for manual mapping.
#[derive(Debug, Clone, Default)]
pub struct ManualMapping {
    pub gene: String,
    pub log2_fold_change: String,
    pub padj: String,
    /// `None` means "no regulation column".
    pub regulation: Option<String>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<ExpressionTable>,

    /// Display name of the loaded source (file name or "demo").
    pub source_name: Option<String>,

    /// Column mapping controls.
    pub mapping_mode: MappingMode,
    pub manual: ManualMapping,

    /// Threshold sliders.
    pub log2fc_threshold: f64,
    pub padj_threshold: f64,

    /// Regulation selectbox ("All" or one label).
    pub regulation_filter: RegulationFilter,

    /// Colour plot points by regulation label instead of significance.
    pub color_by_regulation: bool,

    /// Colour map over the dataset's regulation labels.
    pub color_map: Option<ColorMap>,

    /// Cached pipeline output for the current dataset + config.
    pub output: Option<ProcessOutput>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let defaults = ProcessorConfig::default();
        Self {
            dataset: None,
            source_name: None,
            mapping_mode: MappingMode::default(),
            manual: ManualMapping::default(),
            log2fc_threshold: defaults.log2fc_threshold,
            padj_threshold: defaults.padj_threshold,
            regulation_filter: RegulationFilter::All,
            color_by_regulation: false,
            color_map: None,
            output: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: reset the controls, seed the manual
    /// mapping selections, and run the first pipeline pass.
    pub fn set_dataset(&mut self, table: ExpressionTable, source_name: String) {
        self.manual = ManualMapping {
            gene: table.headers.first().cloned().unwrap_or_default(),
            log2_fold_change: table.headers.first().cloned().unwrap_or_default(),
            padj: table.headers.first().cloned().unwrap_or_default(),
            regulation: None,
        };
        // Seed the manual combos from a fuzzy pass when it succeeds, so
        // switching to manual mode starts from sensible picks.
        if let Ok(resolved) =
            crate::data::columns::resolve_columns(&table, &MappingStrategy::Fuzzy)
        {
            self.manual.gene = table.headers[resolved.gene].clone();
            self.manual.log2_fold_change = table.headers[resolved.log2_fold_change].clone();
            self.manual.padj = table.headers[resolved.padj].clone();
            self.manual.regulation = resolved.regulation.map(|i| table.headers[i].clone());
        }

        self.regulation_filter = RegulationFilter::All;
        self.source_name = Some(source_name);
        self.status_message = None;
        self.dataset = Some(table);
        self.reprocess();
    }

    /// The immutable per-invocation configuration built from the controls.
    pub fn config(&self) -> ProcessorConfig {
        let mapping = match self.mapping_mode {
            MappingMode::Auto => MappingStrategy::Fuzzy,
            MappingMode::Manual => MappingStrategy::Explicit {
                gene: self.manual.gene.clone(),
                log2_fold_change: self.manual.log2_fold_change.clone(),
                padj: self.manual.padj.clone(),
                regulation: self.manual.regulation.clone(),
            },
        };
        ProcessorConfig {
            mapping,
            log2fc_threshold: self.log2fc_threshold,
            padj_threshold: self.padj_threshold,
            regulation_filter: self.regulation_filter.clone(),
        }
    }

    /// Re-run the pipeline after any control change.
    pub fn reprocess(&mut self) {
        let Some(table) = &self.dataset else {
            return;
        };
        match process(table, &self.config()) {
            Ok(mut output) => {
                // A label filter can go stale when the mapping changes to a
                // different regulation column; fall back to "All" and rerun.
                if let RegulationFilter::Label(label) = &self.regulation_filter {
                    let known = output
                        .regulation_labels
                        .as_ref()
                        .map(|labels| labels.contains(label))
                        .unwrap_or(false);
                    if !known {
                        self.regulation_filter = RegulationFilter::All;
                        if let Ok(rerun) = process(table, &self.config()) {
                            output = rerun;
                        }
                    }
                }
                self.color_map = output.regulation_labels.as_ref().map(ColorMap::new);
                if output.coercion.total() > 0 {
                    log::warn!(
                        "{} log2FC and {} padj cells could not be parsed as numbers",
                        output.coercion.log2_fold_change_missing,
                        output.coercion.padj_missing
                    );
                }
                self.output = Some(output);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("processing failed: {e}");
                self.output = None;
                self.color_map = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
