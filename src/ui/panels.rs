use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::process::RegulationFilter;
use crate::state::{AppState, MappingMode};

// ---------------------------------------------------------------------------
// Left side panel – pipeline controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= mapping_section(ui, state);
            ui.separator();
            changed |= threshold_section(ui, state);
            ui.separator();
            changed |= regulation_section(ui, state);
            diagnostics_section(ui, state);
        });

    if changed {
        state.reprocess();
    }
}

fn mapping_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;

    ui.strong("Column mapping");
    egui::ComboBox::from_id_salt("mapping_mode")
        .selected_text(match state.mapping_mode {
            MappingMode::Auto => "Auto-detect",
            MappingMode::Manual => "Manual",
        })
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui
                .selectable_value(&mut state.mapping_mode, MappingMode::Auto, "Auto-detect")
                .changed();
            changed |= ui
                .selectable_value(&mut state.mapping_mode, MappingMode::Manual, "Manual")
                .changed();
        });

    if state.mapping_mode == MappingMode::Manual {
        let headers = state
            .dataset
            .as_ref()
            .map(|t| t.headers.clone())
            .unwrap_or_default();

        changed |= column_combo(ui, "gene_col", "Gene column", &mut state.manual.gene, &headers);
        changed |= column_combo(
            ui,
            "log2fc_col",
            "Log2 fold change column",
            &mut state.manual.log2_fold_change,
            &headers,
        );
        changed |= column_combo(ui, "padj_col", "Adjusted p-value column", &mut state.manual.padj, &headers);
        changed |= regulation_combo(ui, &mut state.manual.regulation, &headers);
    }

    changed
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, selected: &mut String, headers: &[String]) -> bool {
    let mut changed = false;
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for header in headers {
                changed |= ui
                    .selectable_value(selected, header.clone(), header)
                    .changed();
            }
        });
    changed
}

fn regulation_combo(ui: &mut Ui, selected: &mut Option<String>, headers: &[String]) -> bool {
    let mut changed = false;
    ui.label("Regulation column (optional)");
    egui::ComboBox::from_id_salt("regulation_col")
        .selected_text(selected.clone().unwrap_or_else(|| "None".to_string()))
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui.selectable_value(selected, None, "None").changed();
            for header in headers {
                changed |= ui
                    .selectable_value(selected, Some(header.clone()), header)
                    .changed();
            }
        });
    changed
}

fn threshold_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut changed = false;

    ui.strong("Thresholds");
    changed |= ui
        .add(
            egui::Slider::new(&mut state.log2fc_threshold, 0.0..=5.0)
                .step_by(0.1)
                .text("log2 fold change"),
        )
        .changed();
    changed |= ui
        .add(
            egui::Slider::new(&mut state.padj_threshold, 0.0..=0.1)
                .step_by(0.005)
                .text("adjusted p-value"),
        )
        .changed();

    changed
}

fn regulation_section(ui: &mut Ui, state: &mut AppState) -> bool {
    let labels = match state.output.as_ref().and_then(|o| o.regulation_labels.clone()) {
        Some(labels) => labels,
        None => return false,
    };

    let mut changed = false;

    ui.strong("Regulation");
    let current = match &state.regulation_filter {
        RegulationFilter::All => "All".to_string(),
        RegulationFilter::Label(l) => l.clone(),
    };
    egui::ComboBox::from_id_salt("regulation_filter")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            changed |= ui
                .selectable_value(&mut state.regulation_filter, RegulationFilter::All, "All")
                .changed();
            for label in &labels {
                changed |= ui
                    .selectable_value(
                        &mut state.regulation_filter,
                        RegulationFilter::Label(label.clone()),
                        label,
                    )
                    .changed();
            }
        });

    changed |= ui
        .checkbox(&mut state.color_by_regulation, "Color plot by regulation")
        .changed();
    if state.color_by_regulation {
        if let Some(color_map) = &state.color_map {
            for (label, color) in color_map.legend_entries() {
                ui.label(RichText::new(label).color(color));
            }
        }
    }

    ui.separator();
    changed
}

fn diagnostics_section(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        return;
    };

    ui.strong("Dataset");
    ui.label(format!("{} records after filtering", output.records.len()));
    ui.label(format!("{} significant", output.significant_count()));
    if output.coercion.total() > 0 {
        ui.label(
            RichText::new(format!(
                "{} log2FC / {} padj cells not numeric",
                output.coercion.log2_fold_change_missing, output.coercion.padj_missing
            ))
            .color(Color32::YELLOW),
        );
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Load demo dataset").clicked() {
                load_demo(state);
                ui.close_menu();
            }
            ui.separator();
            let can_export = state
                .output
                .as_ref()
                .map(|o| o.significant_count() > 0)
                .unwrap_or(false);
            if ui
                .add_enabled(can_export, egui::Button::new("Export significant…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(name) = &state.source_name {
            ui.label(name);
            ui.separator();
        }
        if let Some(output) = &state.output {
            ui.label(format!(
                "{} genes, {} significant",
                output.records.len(),
                output.significant_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open differential expression results")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                if table.is_empty() {
                    log::warn!("{} has a header row but no data", path.display());
                }
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.len(),
                    table.headers
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                state.set_dataset(table, name);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

pub fn load_demo(state: &mut AppState) {
    match crate::data::demo::demo_table() {
        Ok(table) => {
            log::info!("Loaded demo dataset with {} rows", table.len());
            state.set_dataset(table, "demo dataset".to_string());
        }
        Err(e) => {
            log::error!("Failed to load demo dataset: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(output) = &state.output else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export significant genes")
        .set_file_name("significant_genes.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = (|| -> anyhow::Result<()> {
            let mut writer = csv::Writer::from_path(&path)?;
            for record in output.significant_records() {
                writer.serialize(record)?;
            }
            writer.flush()?;
            Ok(())
        })();
        match result {
            Ok(()) => {
                log::info!(
                    "Exported {} significant genes to {}",
                    output.significant_count(),
                    path.display()
                );
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
