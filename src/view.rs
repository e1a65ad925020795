//! Viewport ⇄ image coordinate mapping under pan and zoom.
//!
//! Layout follows the usual canvas convention: the scaled image is centred
//! in the viewport and then shifted by `pan_offset`. The effective scale
//! (screen points per image pixel) is `fit_scale * zoom`, where `fit_scale`
//! is recomputed on every reset so that zoom `1.0` always means
//! "whole image visible, aspect ratio kept".
//!
//! Hover, click and marker drawing all go through [`ViewTransform::image_rect`],
//! so what the pointer is over is exactly what a click records.

use egui::{Pos2, Rect, Vec2};

use crate::pixels::PixelCoord;

/// Multiplier for one zoom-in step; zoom-out divides by it.
pub const ZOOM_STEP: f32 = 1.25;
/// Lower bound for the logical zoom factor.
pub const MIN_ZOOM: f32 = 0.01;
/// Upper bound for the logical zoom factor.
pub const MAX_ZOOM: f32 = 100.0;

const MAX_WHEEL_NOTCHES: i32 = 64;

/// Snapshot of the pan/zoom parameters. Replaced wholesale on every change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Logical zoom, `1.0` right after a reset.
    pub zoom: f32,
    /// Scale that fits the image inside the viewport at zoom `1.0`.
    pub fit_scale: f32,
    /// Screen-space shift of the image centre from the viewport centre.
    pub pan_offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            fit_scale: 1.0,
            pan_offset: Vec2::ZERO,
        }
    }
}

impl ViewState {
    /// Screen points per image pixel. Always positive.
    pub fn scale(&self) -> f32 {
        self.fit_scale * self.zoom
    }
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
    state: ViewState,
    viewport: Rect,
    image_size: Option<Vec2>,
    /// A reset happened while the viewport had no area yet; fit on the
    /// first real viewport instead.
    fit_pending: bool,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self {
            state: ViewState::default(),
            viewport: Rect::from_min_size(Pos2::ZERO, Vec2::ZERO),
            image_size: None,
            fit_pending: false,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn zoom(&self) -> f32 {
        self.state.zoom
    }

    pub fn scale(&self) -> f32 {
        self.state.scale()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Attach to a newly loaded image of `size` pixels and reset to fit.
    pub fn bind(&mut self, size: [u32; 2]) {
        self.image_size = Some(Vec2::new(size[0] as f32, size[1] as f32));
        self.reset();
    }

    /// Update the on-screen viewport rectangle (called once per frame).
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        if self.fit_pending && has_area(viewport) {
            self.reset();
        }
    }

    /// Zoom back to `1.0`, clear the pan and refit the image to the viewport.
    pub fn reset(&mut self) {
        let fit_scale = match self.image_size {
            Some(size) if has_area(self.viewport) => {
                self.fit_pending = false;
                (self.viewport.width() / size.x).min(self.viewport.height() / size.y)
            }
            Some(_) => {
                self.fit_pending = true;
                1.0
            }
            None => 1.0,
        };
        self.state = ViewState {
            zoom: 1.0,
            fit_scale,
            pan_offset: Vec2::ZERO,
        };
    }

    /// Screen rectangle covered by the whole image.
    pub fn image_rect(&self) -> Option<Rect> {
        let size = self.image_size?;
        let center = self.viewport.center() + self.state.pan_offset;
        Some(Rect::from_center_size(center, size * self.state.scale()))
    }

    /// Continuous image-space position under a viewport point. Not bounds
    /// checked: points left of / above the image give negative values.
    pub fn viewport_to_image(&self, point: Pos2) -> Option<Pos2> {
        let rect = self.image_rect()?;
        let scale = self.state.scale();
        Some(Pos2::new(
            (point.x - rect.min.x) / scale,
            (point.y - rect.min.y) / scale,
        ))
    }

    /// Viewport position of an image-space point.
    pub fn image_to_viewport(&self, point: Pos2) -> Option<Pos2> {
        let rect = self.image_rect()?;
        let scale = self.state.scale();
        Some(Pos2::new(
            rect.min.x + point.x * scale,
            rect.min.y + point.y * scale,
        ))
    }

    /// Screen rectangle of a single image pixel.
    pub fn pixel_rect(&self, coord: PixelCoord) -> Option<Rect> {
        let min = self.image_to_viewport(Pos2::new(coord.x as f32, coord.y as f32))?;
        Some(Rect::from_min_size(min, Vec2::splat(self.state.scale())))
    }

    /// Map a viewport point to the image pixel beneath it.
    ///
    /// Inverse transform, floor, then a strict `[0, W) × [0, H)` check.
    /// `None` when outside the image or when no image is bound.
    pub fn resolve(&self, point: Pos2) -> Option<PixelCoord> {
        let size = self.image_size?;
        let pos = self.viewport_to_image(point)?;
        let x = pos.x.floor();
        let y = pos.y.floor();
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        if x < 0.0 || y < 0.0 || x >= size.x || y >= size.y {
            return None;
        }
        Some(PixelCoord::new(x as u32, y as u32))
    }

    /// Rescale by `factor` keeping the image point under `anchor` fixed.
    ///
    /// The logical zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`; the anchor is
    /// honoured for whatever factor survives the clamp.
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        if !(factor.is_finite() && factor > 0.0 && anchor.x.is_finite() && anchor.y.is_finite()) {
            return;
        }
        let zoom = (self.state.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let Some(size) = self.image_size else {
            self.state = ViewState { zoom, ..self.state };
            return;
        };
        let Some(under_anchor) = self.viewport_to_image(anchor) else {
            return;
        };

        let next = ViewState { zoom, ..self.state };
        let scale = next.scale();
        // anchor == centre + pan - size * scale / 2 + under_anchor * scale
        let center = self.viewport.center();
        let pan_offset = Vec2::new(
            anchor.x - center.x + size.x * scale / 2.0 - under_anchor.x * scale,
            anchor.y - center.y + size.y * scale / 2.0 - under_anchor.y * scale,
        );
        self.state = ViewState { pan_offset, ..next };
    }

    /// Wheel zoom: positive notches zoom in, negative zoom out.
    pub fn wheel(&mut self, anchor: Pos2, notches: i32) {
        // 1.25^64 already spans the whole zoom range; larger powers overflow.
        let notches = notches.clamp(-MAX_WHEEL_NOTCHES, MAX_WHEEL_NOTCHES);
        if notches != 0 {
            self.zoom_at(anchor, ZOOM_STEP.powi(notches));
        }
    }

    /// One zoom-in step anchored at the viewport centre.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.viewport.center(), ZOOM_STEP);
    }

    /// One zoom-out step anchored at the viewport centre.
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.viewport.center(), 1.0 / ZOOM_STEP);
    }

    /// Shift the image by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.state = ViewState {
                pan_offset: self.state.pan_offset + delta,
                ..self.state
            };
        }
    }
}

fn has_area(rect: Rect) -> bool {
    rect.is_positive() && rect.is_finite()
}
