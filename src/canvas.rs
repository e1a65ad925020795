// ============================================================================
// CANVAS: image viewport widget (texture, input routing, overlays)
// ============================================================================

use eframe::egui;
use egui::{
    Align2, Color32, ColorImage, CursorIcon, FontId, PointerButton, Pos2, Rect, Sense, Stroke,
    TextureHandle, TextureOptions, Vec2,
};

use pixelprobe::pixels::PixelCoord;
use pixelprobe::selection::PixelRecord;
use pixelprobe::session::Inspector;

/// Scroll distance (points) that counts as one wheel notch.
const WHEEL_NOTCH: f32 = 50.0;
/// Grid lines only appear once a pixel is at least this many points wide.
const GRID_MIN_SCALE: f32 = 8.0;
/// Marker sizes, in image pixels.
const SELECTED_MARKER: f32 = 10.0;
const HOVER_MARKER: f32 = 5.0;

const BACKGROUND: Color32 = Color32::from_gray(32);

pub struct Canvas {
    texture: Option<TextureHandle>,
    /// Image generation the texture was built from.
    texture_generation: u64,
    /// Sub-notch wheel movement carried to the next frame.
    scroll_accum: f32,
    pub show_pixel_grid: bool,
}

impl Canvas {
    pub fn new(show_pixel_grid: bool) -> Self {
        Self {
            texture: None,
            texture_generation: 0,
            scroll_accum: 0.0,
            show_pixel_grid,
        }
    }

    /// Draw the viewport and route pointer input into the inspector.
    /// Returns the record added by a click this frame, if any.
    pub fn show(&mut self, ui: &mut egui::Ui, inspector: &mut Inspector) -> Option<PixelRecord> {
        let sense = Sense::click_and_drag().union(Sense::hover());
        let (response, painter) = ui.allocate_painter(ui.available_size(), sense);
        let canvas_rect = response.rect;
        inspector.set_viewport(canvas_rect);

        self.sync_texture(ui.ctx(), inspector);

        // -- input --------------------------------------------------------
        if response.dragged_by(PointerButton::Primary) || response.dragged_by(PointerButton::Middle)
        {
            inspector.pan_by(response.drag_delta());
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        }

        let mut picked = None;
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                picked = inspector.pointer_pressed(pos);
            }
        }

        if let Some(pos) = response.hover_pos() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            self.scroll_accum += scroll;
            let notches = (self.scroll_accum / WHEEL_NOTCH).trunc() as i32;
            if notches != 0 {
                self.scroll_accum -= notches as f32 * WHEEL_NOTCH;
                inspector.wheel(pos, notches);
            }

            if inspector.pointer_moved(pos).is_some() && !response.dragged() {
                ui.ctx().set_cursor_icon(CursorIcon::Crosshair);
            }
        } else {
            self.scroll_accum = 0.0;
        }

        // -- paint --------------------------------------------------------
        painter.rect_filled(canvas_rect, 0.0, BACKGROUND);

        let (Some(texture), Some(image_rect)) = (&self.texture, inspector.view().image_rect())
        else {
            painter.text(
                canvas_rect.center(),
                Align2::CENTER_CENTER,
                "File → Open Image… to start inspecting",
                FontId::proportional(16.0),
                Color32::from_gray(150),
            );
            return picked;
        };

        draw_checkerboard(&painter, image_rect, canvas_rect);
        painter.image(
            texture.id(),
            image_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );

        let scale = inspector.view().scale();
        if self.show_pixel_grid && scale >= GRID_MIN_SCALE {
            draw_pixel_grid(&painter, image_rect, canvas_rect, scale);
        }

        if let Some(sample) = inspector.selected() {
            if let Some(rect) = marker_rect(inspector, sample.coord, SELECTED_MARKER) {
                painter.rect_stroke(rect, 0.0, Stroke::new(1.5, Color32::WHITE));
            }
        }
        if let Some(sample) = inspector.hovered() {
            if let Some(rect) = marker_rect(inspector, sample.coord, HOVER_MARKER) {
                painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::RED));
            }
        }

        picked
    }

    /// Rebuild the texture when a different image became active.
    fn sync_texture(&mut self, ctx: &egui::Context, inspector: &Inspector) {
        if self.texture.is_some() && self.texture_generation == inspector.image_generation() {
            return;
        }
        self.texture_generation = inspector.image_generation();
        self.texture = inspector.image().map(|image| {
            let size = [image.width() as usize, image.height() as usize];
            let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
            ctx.load_texture("pixelprobe_image", color_image, TextureOptions::NEAREST)
        });
    }
}

/// Square of `size` image pixels centred on the pixel at `coord`.
fn marker_rect(inspector: &Inspector, coord: PixelCoord, size: f32) -> Option<Rect> {
    let center = Pos2::new(coord.x as f32 + 0.5, coord.y as f32 + 0.5);
    let center = inspector.view().image_to_viewport(center)?;
    Some(Rect::from_center_size(
        center,
        Vec2::splat(size * inspector.view().scale()),
    ))
}

fn draw_pixel_grid(painter: &egui::Painter, image_rect: Rect, viewport: Rect, pixel_size: f32) {
    let visible = image_rect.intersect(viewport);
    if !visible.is_positive() {
        return;
    }

    let start_x = ((visible.min.x - image_rect.min.x) / pixel_size).floor().max(0.0) as u32;
    let end_x = ((visible.max.x - image_rect.min.x) / pixel_size).ceil() as u32;
    let start_y = ((visible.min.y - image_rect.min.y) / pixel_size).floor().max(0.0) as u32;
    let end_y = ((visible.max.y - image_rect.min.y) / pixel_size).ceil() as u32;

    // Dark outline under a light centre line reads on any pixel colour.
    let outline = Stroke::new(1.0, Color32::from_black_alpha(90));
    let center = Stroke::new(0.5, Color32::from_white_alpha(100));

    for x in start_x..=end_x {
        let sx = image_rect.min.x + x as f32 * pixel_size;
        if sx < visible.min.x || sx > visible.max.x {
            continue;
        }
        let seg = [Pos2::new(sx, visible.min.y), Pos2::new(sx, visible.max.y)];
        painter.line_segment(seg, outline);
        painter.line_segment(seg, center);
    }
    for y in start_y..=end_y {
        let sy = image_rect.min.y + y as f32 * pixel_size;
        if sy < visible.min.y || sy > visible.max.y {
            continue;
        }
        let seg = [Pos2::new(visible.min.x, sy), Pos2::new(visible.max.x, sy)];
        painter.line_segment(seg, outline);
        painter.line_segment(seg, center);
    }
}

/// Fixed-size screen-space checkerboard behind transparent pixels.
fn draw_checkerboard(painter: &egui::Painter, rect: Rect, clip: Rect) {
    const CELL: f32 = 10.0;
    let light = Color32::from_gray(200);
    let dark = Color32::from_gray(160);

    let visible = rect.intersect(clip);
    if !visible.is_positive() {
        return;
    }
    painter.rect_filled(visible, 0.0, light);

    let start_x = ((visible.min.x - rect.min.x) / CELL).floor() as i32;
    let start_y = ((visible.min.y - rect.min.y) / CELL).floor() as i32;
    let end_x = ((visible.max.x - rect.min.x) / CELL).ceil() as i32;
    let end_y = ((visible.max.y - rect.min.y) / CELL).ceil() as i32;

    for cy in start_y..end_y {
        for cx in start_x..end_x {
            if (cx + cy) % 2 == 0 {
                continue;
            }
            let min = Pos2::new(rect.min.x + cx as f32 * CELL, rect.min.y + cy as f32 * CELL);
            let cell = Rect::from_min_size(min, Vec2::splat(CELL)).intersect(visible);
            if cell.is_positive() {
                painter.rect_filled(cell, 0.0, dark);
            }
        }
    }
}
