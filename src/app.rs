use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct VolcanoApp {
    pub state: AppState,
}

impl eframe::App for VolcanoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: pipeline controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: significant genes ----
        egui::TopBottomPanel::bottom("results_table")
            .default_height(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::significant_table(ui, &self.state);
            });

        // ---- Central panel: volcano plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::volcano_plot(ui, &self.state);
        });
    }
}
