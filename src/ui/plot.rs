use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Volcano plot (central panel)
// ---------------------------------------------------------------------------

/// Render the volcano plot: log2 fold change against -log10(padj).
///
/// Only records with both axes defined are plotted; rows with missing or
/// non-positive p-values stay out of the plot entirely.
pub fn volcano_plot(ui: &mut Ui, state: &AppState) {
    let Some(output) = &state.output else {
        let message = if state.dataset.is_some() {
            "No processed data. Check the column mapping."
        } else {
            "Open a file to view results  (File → Open…)"
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return;
    };

    if output.records.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data to plot. Try relaxing your filters.");
        });
        return;
    }

    let series = match (&state.color_map, state.color_by_regulation) {
        (Some(color_map), true) => regulation_series(color_map, output),
        _ => significance_series(output),
    };

    Plot::new("volcano_plot")
        .legend(Legend::default())
        .x_axis_label("log2 Fold Change")
        .y_axis_label("-log10 Adjusted P-value")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, color, coords) in series {
                let points = Points::new(PlotPoints::from(coords))
                    .name(&name)
                    .color(color)
                    .shape(MarkerShape::Circle)
                    .filled(true)
                    .radius(2.5);
                plot_ui.points(points);
            }
        });
}

type Series = (String, Color32, Vec<[f64; 2]>);

fn significance_series(output: &crate::data::process::ProcessOutput) -> Vec<Series> {
    let mut significant = Vec::new();
    let mut rest = Vec::new();
    for record in output.plottable_records() {
        let point = [
            record.log2_fold_change.unwrap_or_default(),
            record.neg_log10_padj.unwrap_or_default(),
        ];
        if record.significant {
            significant.push(point);
        } else {
            rest.push(point);
        }
    }
    vec![
        ("Not significant".to_string(), Color32::GRAY, rest),
        ("Significant".to_string(), Color32::RED, significant),
    ]
}

fn regulation_series(
    color_map: &crate::color::ColorMap,
    output: &crate::data::process::ProcessOutput,
) -> Vec<Series> {
    let mut groups: BTreeMap<Option<String>, Vec<[f64; 2]>> = BTreeMap::new();
    for record in output.plottable_records() {
        groups.entry(record.regulation.clone()).or_default().push([
            record.log2_fold_change.unwrap_or_default(),
            record.neg_log10_padj.unwrap_or_default(),
        ]);
    }

    groups
        .into_iter()
        .map(|(label, coords)| {
            let color = color_map.color_for(label.as_deref());
            let name = label.unwrap_or_else(|| "unlabelled".to_string());
            (name, color, coords)
        })
        .collect()
}
