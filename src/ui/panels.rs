use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top panel – title, view toggles, status
// ---------------------------------------------------------------------------

/// Render the top bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("NIST diode SN 448 – spectral responsivity");
        ui.separator();

        ui.checkbox(&mut state.show_measured, "Measured");
        ui.checkbox(&mut state.show_fit, "Spline fit");
        ui.checkbox(&mut state.show_harmonics, "Harmonics");

        if let Some(msg) = state.status_message.clone() {
            ui.with_layout(
                egui::Layout::right_to_left(egui::Align::Center),
                |ui: &mut Ui| {
                    ui.label(RichText::new(msg).weak());
                },
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – harmonic readout and measurement table
// ---------------------------------------------------------------------------

/// Render the left calibration panel.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Calibration");
    let (lo, hi) = state.dataset.wavelength_range();
    ui.label(format!(
        "{} points, {lo:.1}–{hi:.1} nm, k=2 uncertainties",
        state.dataset.len()
    ));
    ui.separator();

    ui.strong("Laser harmonics");
    for mark in &state.harmonics {
        ui.label(RichText::new(mark.label()).color(state.colors.harmonic.egui()));
    }
    ui.separator();

    ui.strong("Measurements");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            measurement_table(ui, state);
        });
}

fn measurement_table(ui: &mut Ui, state: &AppState) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("λ (nm)");
            });
            header.col(|ui| {
                ui.strong("R (A/W)");
            });
            header.col(|ui| {
                ui.strong("u(R) (A/W)");
            });
        })
        .body(|body| {
            body.rows(16.0, state.dataset.len(), |mut row| {
                let i = row.index();
                let wl = state.dataset.wavelengths_nm()[i];
                let r = state.dataset.responsivities_a_per_w()[i];
                let u = state.dataset.uncertainties_a_per_w()[i];
                row.col(|ui| {
                    ui.label(format!("{wl:.1}"));
                });
                row.col(|ui| {
                    ui.label(format!("{r:.3e}"));
                });
                row.col(|ui| {
                    ui.label(format!("{u:.2e}"));
                });
            });
        });
}
