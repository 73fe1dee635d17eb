use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Significant-genes table (bottom panel)
// ---------------------------------------------------------------------------

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_else(|| "NA".to_string())
}

fn fmt_padj(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3e}")).unwrap_or_else(|| "NA".to_string())
}

/// Render the table of significant genes, sorted ascending by padj.
pub fn significant_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Significantly Differentially Expressed Genes");

    let Some(output) = &state.output else {
        ui.label("No results.");
        return;
    };

    if output.significant.is_empty() {
        ui.label("No significant genes under the current thresholds.");
        return;
    }

    let has_regulation = output.regulation_labels.is_some();
    let n_cols = if has_regulation { 5 } else { 4 };

    let mut builder = TableBuilder::new(ui).striped(true);
    for _ in 0..n_cols {
        builder = builder.column(Column::auto().resizable(true));
    }

    builder
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Gene");
            });
            header.col(|ui| {
                ui.strong("log2FC");
            });
            header.col(|ui| {
                ui.strong("padj");
            });
            header.col(|ui| {
                ui.strong("-log10(padj)");
            });
            if has_regulation {
                header.col(|ui| {
                    ui.strong("Regulation");
                });
            }
        })
        .body(|body| {
            body.rows(18.0, output.significant.len(), |mut row| {
                let record = &output.records[output.significant[row.index()]];
                row.col(|ui| {
                    ui.label(record.gene.as_str());
                });
                row.col(|ui| {
                    ui.label(fmt_opt(record.log2_fold_change));
                });
                row.col(|ui| {
                    ui.label(fmt_padj(record.padj));
                });
                row.col(|ui| {
                    ui.label(fmt_opt(record.neg_log10_padj));
                });
                if has_regulation {
                    row.col(|ui| {
                        ui.label(record.regulation.as_deref().unwrap_or("NA"));
                    });
                }
            });
        });
}
