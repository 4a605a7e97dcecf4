//! Status sidebar for the atom viewer
//!
//! Shows the selected element, its load state and the key bindings using egui.

use egui::{Color32, Context, RichText};

use crate::element::{Element, ELEMENT_COUNT};
use crate::scene::MAX_ELECTRON_LIGHTS;
use crate::store::LoadState;

/// Snapshot of what the panel displays
pub struct ElementStatus<'a> {
    pub element: Element,
    pub state: &'a LoadState,
    pub texture: &'a str,
    pub paused: bool,
}

pub const CONTROLS: &[(&str, &str)] = &[
    ("→ / N", "Next element"),
    ("← / P", "Previous element"),
    ("W A S D", "Orbit camera"),
    ("Q / E", "Zoom out / in"),
    ("Drag", "Orbit camera"),
    ("Scroll", "Zoom"),
    ("R", "Reset camera"),
    ("Space", "Pause electrons"),
    ("H", "Hide this panel"),
];

pub fn draw_status_panel(ctx: &Context, status: &ElementStatus) {
    egui::SidePanel::right("status_panel")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading(
                RichText::new(format!("{} ({})", status.element.name(), status.element.symbol()))
                    .color(Color32::LIGHT_BLUE),
            );
            ui.label(format!("Element {} of {}", status.element.index() + 1, ELEMENT_COUNT));
            ui.separator();

            match status.state {
                LoadState::NotLoaded => {
                    ui.label(RichText::new("Loading…").italics());
                }
                LoadState::LoadFailed(reason) => {
                    ui.label(RichText::new("Failed to load").color(Color32::LIGHT_RED).strong());
                    ui.label(RichText::new(reason).small());
                }
                LoadState::Loaded(data) => {
                    egui::Grid::new("element_grid")
                        .num_columns(2)
                        .spacing([10.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("Particles");
                            ui.label(data.particles.len().to_string());
                            ui.end_row();

                            ui.label("Electrons");
                            let lit = data.electrons.len().min(MAX_ELECTRON_LIGHTS);
                            if lit < data.electrons.len() {
                                ui.label(
                                    RichText::new(format!("{} ({} lit)", data.electrons.len(), lit))
                                        .color(Color32::YELLOW),
                                );
                            } else {
                                ui.label(data.electrons.len().to_string());
                            }
                            ui.end_row();

                            ui.label("Texture");
                            ui.label(RichText::new(status.texture).monospace());
                            ui.end_row();
                        });

                    if !data.diagnostics.is_empty() {
                        ui.add_space(4.0);
                        ui.collapsing(
                            RichText::new(format!("⚠ {} skipped lines", data.diagnostics.len()))
                                .color(Color32::YELLOW),
                            |ui| {
                                for diagnostic in &data.diagnostics {
                                    ui.label(
                                        RichText::new(format!(
                                            "line {}: {}",
                                            diagnostic.line, diagnostic.error
                                        ))
                                        .small(),
                                    );
                                }
                            },
                        );
                    }
                }
            }

            if status.paused {
                ui.add_space(4.0);
                ui.label(RichText::new("PAUSED").color(Color32::YELLOW));
            }

            ui.add_space(8.0);
            ui.collapsing(RichText::new("⌨ Controls").strong(), |ui| {
                egui::Grid::new("controls_grid")
                    .num_columns(2)
                    .spacing([10.0, 4.0])
                    .show(ui, |ui| {
                        for (keys, action) in CONTROLS {
                            ui.label(RichText::new(*keys).monospace().color(Color32::LIGHT_GREEN));
                            ui.label(*action);
                            ui.end_row();
                        }
                    });
            });
        });
}
