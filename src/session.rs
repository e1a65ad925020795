//! Inspection session: the single owner of the active image, the view
//! transform and the recorded picks.
//!
//! Every user interaction maps onto one method here. The GUI and the
//! headless runner only translate their input into these calls and render
//! what the accessors return.

use std::path::Path;

use egui::{Pos2, Rect, Vec2};

use crate::error::{Error, Result};
use crate::export;
use crate::filter::{self, FilterOutcome, FilterSpec};
use crate::pixels::{PixelCoord, PixelSample, SourceImage};
use crate::selection::{PixelRecord, SelectionStore};
use crate::view::ViewTransform;
use crate::{log_err, log_info, log_warn};

pub struct Inspector {
    image: Option<SourceImage>,
    /// Bumped every time a new image becomes active.
    image_generation: u64,
    view: ViewTransform,
    store: SelectionStore,
    hover_enabled: bool,
    hovered: Option<PixelSample>,
    selected: Option<PixelSample>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            image: None,
            image_generation: 0,
            view: ViewTransform::new(),
            store: SelectionStore::new(),
            hover_enabled: true,
            hovered: None,
            selected: None,
        }
    }

    // ---- image lifecycle -------------------------------------------------

    /// Decode `path` and make it the active image.
    ///
    /// On failure nothing changes: the previous image, view and picks stay.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        let image = SourceImage::load(path).inspect_err(|e| {
            log_err!("{}", e);
        })?;
        self.install_image(image);
        Ok(())
    }

    /// Make a fully decoded image active.
    ///
    /// Everything derived from the previous image is dropped first so no
    /// stale coordinate can be resolved against the new one.
    pub fn install_image(&mut self, image: SourceImage) {
        self.store.clear();
        self.hovered = None;
        self.selected = None;
        self.view.bind(image.size());
        log_info!(
            "Loaded {} ({}x{})",
            image
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<memory>".to_string()),
            image.width(),
            image.height()
        );
        self.image = Some(image);
        self.image_generation += 1;
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn image_generation(&self) -> u64 {
        self.image_generation
    }

    // ---- viewport events -------------------------------------------------

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.view.set_viewport(viewport);
    }

    /// Resolve a viewport point to a pixel sample. Shared by hover and click.
    pub fn probe(&self, point: Pos2) -> Option<PixelSample> {
        let image = self.image.as_ref()?;
        let coord = self.view.resolve(point)?;
        image.sample(coord).ok()
    }

    /// Hover path. A miss keeps the last hovered pixel on display.
    pub fn pointer_moved(&mut self, point: Pos2) -> Option<PixelSample> {
        if !self.hover_enabled {
            return None;
        }
        let sample = self.probe(point)?;
        self.hovered = Some(sample);
        Some(sample)
    }

    /// Click path: record the pixel under `point`. Silent on a miss.
    pub fn pointer_pressed(&mut self, point: Pos2) -> Option<PixelRecord> {
        let sample = self.probe(point)?;
        Some(self.record(sample))
    }

    /// Wheel zoom anchored at the pointer.
    pub fn wheel(&mut self, anchor: Pos2, notches: i32) {
        self.view.wheel(anchor, notches);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.pan_by(delta);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.view.reset();
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    // ---- hover tracking --------------------------------------------------

    pub fn hover_enabled(&self) -> bool {
        self.hover_enabled
    }

    /// Turning tracking off also drops the hovered marker.
    pub fn set_hover_enabled(&mut self, enabled: bool) {
        self.hover_enabled = enabled;
        if !enabled {
            self.hovered = None;
        }
    }

    pub fn hovered(&self) -> Option<PixelSample> {
        self.hovered
    }

    /// Most recently picked pixel (click or manual entry).
    pub fn selected(&self) -> Option<PixelSample> {
        self.selected
    }

    /// What the info panel should show: the live hover, else the last pick.
    pub fn displayed(&self) -> Option<PixelSample> {
        self.hovered.or(self.selected)
    }

    // ---- selection -------------------------------------------------------

    /// Manual coordinate entry.
    pub fn select_manual(&mut self, x: u32, y: u32) -> Result<PixelRecord> {
        let image = self.image.as_ref().ok_or(Error::NoImageLoaded)?;
        let sample = image.sample(PixelCoord::new(x, y)).inspect_err(|e| {
            log_warn!("Manual selection rejected: {}", e);
        })?;
        Ok(self.record(sample))
    }

    fn record(&mut self, sample: PixelSample) -> PixelRecord {
        let record = PixelRecord::from(sample);
        self.store.append(record);
        self.selected = Some(sample);
        log_info!("Picked ({}, {}) {}", record.x, record.y, record.hex());
        record
    }

    pub fn records(&self) -> &[PixelRecord] {
        self.store.snapshot()
    }

    /// Destructive filter: non-matching records are discarded.
    pub fn apply_filter(&mut self, spec: &FilterSpec) -> FilterOutcome {
        let outcome = filter::filter_store(&mut self.store, spec);
        log_info!(
            "Filter {:?}: kept {}, removed {}",
            spec,
            outcome.kept,
            outcome.removed
        );
        outcome
    }

    /// Drop every record and reset the displayed pixel info.
    pub fn clear(&mut self) {
        self.store.clear();
        self.hovered = None;
        self.selected = None;
        log_info!("Selection cleared");
    }

    // ---- export ----------------------------------------------------------

    /// Write the picks to `path` as CSV; returns the row count.
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        if self.image.is_none() {
            return Err(Error::NoImageLoaded);
        }
        let rows = export::export_csv(self.store.snapshot(), path)?;
        log_info!("Exported {} rows to {}", rows, path.display());
        Ok(rows)
    }
}
