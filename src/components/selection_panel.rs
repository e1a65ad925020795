// ============================================================================
// SELECTION PANEL: manual entry, channel filter, recorded pixel table
// ============================================================================

use eframe::egui;
use egui::{Color32, RichText};

use pixelprobe::filter::{Channel, FilterSpec};
use pixelprobe::selection::PixelRecord;

/// What the user asked for this frame. The app applies it to the session
/// so every outcome lands in one status line.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SelectManual { x: u32, y: u32 },
    ApplyFilter(FilterSpec),
    Clear,
    Export,
}

/// Per-channel value + enable toggle. Values start at 255, all disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControls {
    pub values: [u8; 4],
    pub enabled: [bool; 4],
}

impl Default for FilterControls {
    fn default() -> Self {
        Self {
            values: [255; 4],
            enabled: [false; 4],
        }
    }
}

impl FilterControls {
    /// Only enabled channels become constraints.
    pub fn spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::default();
        for (i, channel) in Channel::ALL.into_iter().enumerate() {
            if self.enabled[i] {
                spec.set(channel, Some(self.values[i]));
            }
        }
        spec
    }
}

#[derive(Default)]
pub struct SelectionPanel {
    manual_x: u32,
    manual_y: u32,
    pub filter: FilterControls,
}

impl SelectionPanel {
    pub fn show(&mut self, ui: &mut egui::Ui, records: &[PixelRecord]) -> Option<PanelAction> {
        let mut action = None;

        // -- Manual selection --
        ui.heading("Manual Selection");
        ui.horizontal(|ui| {
            ui.label("X");
            ui.add(egui::DragValue::new(&mut self.manual_x).clamp_range(0..=99_999).speed(1));
            ui.label("Y");
            ui.add(egui::DragValue::new(&mut self.manual_y).clamp_range(0..=99_999).speed(1));
            if ui.button("Select Pixel").clicked() {
                action = Some(PanelAction::SelectManual {
                    x: self.manual_x,
                    y: self.manual_y,
                });
            }
        });

        ui.separator();

        // -- Filter --
        ui.heading("Filter by Value");
        egui::Grid::new("filter_grid")
            .num_columns(3)
            .spacing([8.0, 4.0])
            .show(ui, |ui| {
                for (i, channel) in Channel::ALL.into_iter().enumerate() {
                    ui.checkbox(&mut self.filter.enabled[i], channel.label());
                    ui.add_enabled(
                        self.filter.enabled[i],
                        egui::DragValue::new(&mut self.filter.values[i])
                            .clamp_range(0..=255)
                            .speed(1),
                    );
                    ui.end_row();
                }
            });
        if ui.button("Apply Filter").clicked() {
            action = Some(PanelAction::ApplyFilter(self.filter.spec()));
        }

        ui.separator();

        // -- Table --
        ui.heading(format!("Selected Pixels ({})", records.len()));
        ui.horizontal(|ui| {
            if ui.button("Clear Selection").clicked() {
                action = Some(PanelAction::Clear);
            }
            if ui.button("Export CSV…").clicked() {
                action = Some(PanelAction::Export);
            }
        });
        ui.add_space(4.0);
        pixel_table(ui, records);

        action
    }
}

fn pixel_table(ui: &mut egui::Ui, records: &[PixelRecord]) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            egui::Grid::new("pixel_table")
                .num_columns(6)
                .min_col_width(36.0)
                .spacing([4.0, 2.0])
                .show(ui, |ui| {
                    for title in ["X", "Y", "R", "G", "B", "A"] {
                        ui.label(RichText::new(title).strong());
                    }
                    ui.end_row();

                    for rec in records {
                        let bg = Color32::from_rgba_unmultiplied(rec.r, rec.g, rec.b, rec.a);
                        let fg = contrast_text(rec);
                        for value in [rec.x, rec.y, rec.r as u32, rec.g as u32, rec.b as u32, rec.a as u32] {
                            ui.label(
                                RichText::new(format!("{:>5}", value))
                                    .monospace()
                                    .background_color(bg)
                                    .color(fg),
                            );
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Black on light pixels, white on dark or mostly transparent ones.
fn contrast_text(rec: &PixelRecord) -> Color32 {
    let luma = 0.299 * rec.r as f32 + 0.587 * rec.g as f32 + 0.114 * rec.b as f32;
    if rec.a >= 128 && luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
