use eframe::egui;
use egui::{Color32, RichText, Sense, Vec2};

use pixelprobe::pixels::PixelSample;

/// Readout for the pixel under the pointer (or the last pick).
pub fn show(ui: &mut egui::Ui, sample: Option<PixelSample>) {
    ui.heading("Pixel Info");
    ui.add_space(4.0);

    egui::Grid::new("pixel_info_grid")
        .num_columns(2)
        .min_col_width(70.0)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            let (position, rgba, hex) = match sample {
                Some(s) => {
                    let [r, g, b, a] = s.color.0;
                    (
                        format!("({}, {})", s.coord.x, s.coord.y),
                        format!("({}, {}, {}, {})", r, g, b, a),
                        s.hex(),
                    )
                }
                None => ("-".to_string(), "-".to_string(), "-".to_string()),
            };

            ui.label("Position");
            ui.label(RichText::new(position).monospace());
            ui.end_row();

            ui.label("RGBA");
            ui.label(RichText::new(rgba).monospace());
            ui.end_row();

            ui.label("Hex");
            ui.label(RichText::new(hex).monospace());
            ui.end_row();

            ui.label("Color");
            let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 20.0), Sense::hover());
            match sample {
                Some(s) => {
                    let [r, g, b, a] = s.color.0;
                    ui.painter()
                        .rect_filled(rect, 2.0, Color32::from_rgba_unmultiplied(r, g, b, a));
                }
                None => {
                    ui.painter()
                        .rect_stroke(rect, 2.0, (1.0, Color32::from_gray(90)));
                }
            }
            ui.end_row();
        });
}
