use eframe::egui::{Align2, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::render::log_floor;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Stacked calibration plots (central panel)
// ---------------------------------------------------------------------------

/// Render the linear and log responsivity plots stacked vertically.
pub fn stacked_plots(ui: &mut Ui, state: &AppState) {
    let height = (ui.available_height() - 8.0) / 2.0;
    linear_plot(ui, state, height);
    ui.add_space(4.0);
    log_plot(ui, state, height);
}

fn linear_plot(ui: &mut Ui, state: &AppState, height: f32) {
    Plot::new("linear_plot")
        .legend(Legend::default())
        .height(height)
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("Responsivity (A/W)")
        .show(ui, |plot_ui| {
            if state.show_measured {
                let color = state.colors.measured.egui();

                // k=2 error bars as vertical segments; unnamed so the
                // legend carries one entry for the whole series.
                for m in state.dataset.iter() {
                    let bar: PlotPoints = vec![
                        [
                            m.wavelength_nm,
                            m.responsivity_a_per_w - m.uncertainty_a_per_w,
                        ],
                        [
                            m.wavelength_nm,
                            m.responsivity_a_per_w + m.uncertainty_a_per_w,
                        ],
                    ]
                    .into();
                    plot_ui.line(Line::new(bar).color(color).width(1.0));
                }

                let points: PlotPoints = state
                    .dataset
                    .iter()
                    .map(|m| [m.wavelength_nm, m.responsivity_a_per_w])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name("NIST measured data")
                        .color(color)
                        .radius(3.0),
                );
            }

            if state.show_fit {
                let line: PlotPoints = state
                    .curve_samples
                    .iter()
                    .map(|&(x, y)| [x, y])
                    .collect();
                plot_ui.line(
                    Line::new(line)
                        .name("Spline fit")
                        .color(state.colors.fit.egui())
                        .width(1.5),
                );
            }
        });
}

/// egui_plot has no log axis, so this plots log10(responsivity) on a
/// linear axis; values at or below zero are clamped to the shared floor.
fn log_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let floor = log_floor(&state.dataset);

    Plot::new("log_plot")
        .height(height)
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("log10 Responsivity (A/W)")
        .show(ui, |plot_ui| {
            if state.show_measured {
                let color = state.colors.measured.egui();

                for m in state.dataset.iter() {
                    let top = (m.responsivity_a_per_w + m.uncertainty_a_per_w)
                        .max(floor)
                        .log10();
                    let bottom = (m.responsivity_a_per_w - m.uncertainty_a_per_w)
                        .max(floor)
                        .log10();
                    let bar: PlotPoints =
                        vec![[m.wavelength_nm, bottom], [m.wavelength_nm, top]].into();
                    plot_ui.line(Line::new(bar).color(color).width(1.0));
                }

                let points: PlotPoints = state
                    .dataset
                    .iter()
                    .filter(|m| m.responsivity_a_per_w > 0.0)
                    .map(|m| [m.wavelength_nm, m.responsivity_a_per_w.log10()])
                    .collect();
                plot_ui.points(Points::new(points).color(color).radius(3.0));
            }

            if state.show_fit {
                let line: PlotPoints = state
                    .curve_samples
                    .iter()
                    .filter(|&&(_, y)| y > 0.0)
                    .map(|&(x, y)| [x, y.log10()])
                    .collect();
                plot_ui.line(
                    Line::new(line)
                        .color(state.colors.fit.egui())
                        .width(1.5),
                );
            }

            if state.show_harmonics {
                let color = state.colors.harmonic.egui();
                for mark in &state.harmonics {
                    let y = mark.responsivity_a_per_w.max(floor).log10();
                    plot_ui.points(
                        Points::new(vec![[mark.wavelength_nm, y]])
                            .color(color)
                            .radius(4.0)
                            .shape(MarkerShape::Circle),
                    );
                    plot_ui.text(
                        Text::new(PlotPoint::new(mark.wavelength_nm, y), mark.label())
                            .color(color)
                            .anchor(Align2::LEFT_BOTTOM),
                    );
                }
            }
        });
}
