use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::egui;
use egui::{Color32, Key, RichText};

use pixelprobe::error::Error;
use pixelprobe::io::{self, ImageLoader, LoadResult};
use pixelprobe::session::Inspector;
use pixelprobe::settings::AppSettings;
use pixelprobe::{log_err, log_info, log_warn};

use crate::canvas::Canvas;
use crate::components::pixel_info;
use crate::components::selection_panel::{PanelAction, SelectionPanel};

#[derive(Clone, Copy, PartialEq, Eq)]
enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-line status message shown at the bottom of the window.
struct Notice {
    level: NoticeLevel,
    text: String,
}

pub struct PixelProbeApp {
    inspector: Inspector,
    loader: ImageLoader,
    canvas: Canvas,
    panel: SelectionPanel,
    settings: AppSettings,
    notice: Option<Notice>,
    /// Generation the window title was last set for.
    title_generation: u64,
}

impl PixelProbeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, startup_files: Vec<PathBuf>) -> Self {
        let settings = AppSettings::load();
        let mut inspector = Inspector::new();
        inspector.set_hover_enabled(settings.hover_tracking);

        let mut app = Self {
            inspector,
            loader: ImageLoader::new(),
            canvas: Canvas::new(settings.show_pixel_grid),
            panel: SelectionPanel::default(),
            settings,
            notice: None,
            title_generation: 0,
        };

        // Only one image is active at a time; the first argument wins.
        if let Some(path) = startup_files.into_iter().next() {
            app.open_path(path);
        }
        app
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    fn handle_open_file(&mut self) {
        if let Some(path) = io::pick_image_path(self.settings.last_open_dir.as_deref()) {
            self.open_path(path);
        }
    }

    fn open_path(&mut self, path: PathBuf) {
        self.notice(NoticeLevel::Info, format!("Loading {}…", display_name(&path)));
        self.loader.request(path);
    }

    fn poll_loader(&mut self) {
        let Some(result) = self.loader.poll() else { return };
        match result {
            LoadResult::Loaded { image, .. } => {
                let name = image.path().map(display_name).unwrap_or_default();
                let (w, h) = (image.width(), image.height());
                if let Some(dir) = image.path().and_then(Path::parent) {
                    self.settings.last_open_dir = Some(dir.to_path_buf());
                    self.settings.save();
                }
                self.inspector.install_image(image);
                self.notice(NoticeLevel::Info, format!("Opened {} ({}x{})", name, w, h));
            }
            LoadResult::Failed { error, .. } => self.report(&error),
        }
    }

    fn handle_export(&mut self) {
        // Refuse before the dialog opens so the user is not asked for a
        // path that would never be written.
        if self.inspector.image().is_none() {
            self.report(&Error::NoImageLoaded);
            return;
        }
        if self.inspector.records().is_empty() {
            self.report(&Error::EmptySelection);
            return;
        }

        let suggested = io::suggested_export_name(self.inspector.image().and_then(|i| i.path()));
        let start_dir = self
            .settings
            .last_export_dir
            .as_deref()
            .or(self.settings.last_open_dir.as_deref());
        let Some(path) = io::pick_export_path(start_dir, &suggested) else { return };

        match self.inspector.export_csv(&path) {
            Ok(rows) => {
                if let Some(dir) = path.parent() {
                    self.settings.last_export_dir = Some(dir.to_path_buf());
                    self.settings.save();
                }
                self.notice(
                    NoticeLevel::Info,
                    format!("Exported {} pixels to {}", rows, path.display()),
                );
            }
            Err(e) => self.report(&e),
        }
    }

    fn apply_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::SelectManual { x, y } => match self.inspector.select_manual(x, y) {
                Ok(rec) => self.notice(
                    NoticeLevel::Info,
                    format!("Selected ({}, {}) {}", rec.x, rec.y, rec.hex()),
                ),
                Err(e) => self.report(&e),
            },
            PanelAction::ApplyFilter(spec) => {
                let outcome = self.inspector.apply_filter(&spec);
                self.notice(
                    NoticeLevel::Info,
                    format!("Filter kept {}, removed {}", outcome.kept, outcome.removed),
                );
            }
            PanelAction::Clear => {
                self.inspector.clear();
                self.notice(NoticeLevel::Info, "Selection cleared".to_string());
            }
            PanelAction::Export => self.handle_export(),
        }
    }

    fn set_hover_tracking(&mut self, enabled: bool) {
        self.inspector.set_hover_enabled(enabled);
        self.settings.hover_tracking = enabled;
        self.settings.save();
    }

    fn set_pixel_grid(&mut self, enabled: bool) {
        self.canvas.show_pixel_grid = enabled;
        self.settings.show_pixel_grid = enabled;
        self.settings.save();
    }

    fn notice(&mut self, level: NoticeLevel, text: String) {
        self.notice = Some(Notice { level, text });
    }

    fn report(&mut self, err: &Error) {
        if err.is_warning() {
            log_warn!("{}", err);
            self.notice(NoticeLevel::Warning, err.to_string());
        } else {
            log_err!("{}", err);
            self.notice(NoticeLevel::Error, err.to_string());
        }
    }

    // ========================================================================
    // UI
    // ========================================================================

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (open, export, zoom_in, zoom_out, reset) = ctx.input(|i| {
            let cmd = i.modifiers.command;
            (
                cmd && i.key_pressed(Key::O),
                cmd && i.key_pressed(Key::E),
                cmd && i.key_pressed(Key::PlusEquals),
                cmd && i.key_pressed(Key::Minus),
                cmd && i.key_pressed(Key::Num0),
            )
        });
        if open {
            self.handle_open_file();
        }
        if export {
            self.handle_export();
        }
        if zoom_in {
            self.inspector.zoom_in();
        }
        if zoom_out {
            self.inspector.zoom_out();
        }
        if reset {
            self.inspector.reset_zoom();
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image…  (Ctrl+O)").clicked() {
                        ui.close_menu();
                        self.handle_open_file();
                    }
                    if ui.button("Export CSV…  (Ctrl+E)").clicked() {
                        ui.close_menu();
                        self.handle_export();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ui.close_menu();
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let mut hover = self.inspector.hover_enabled();
                    if ui.checkbox(&mut hover, "Hover Tracking").changed() {
                        self.set_hover_tracking(hover);
                    }
                    let mut grid = self.canvas.show_pixel_grid;
                    if ui.checkbox(&mut grid, "Pixel Grid").changed() {
                        self.set_pixel_grid(grid);
                    }
                    ui.separator();
                    if ui.button("Zoom In").clicked() {
                        self.inspector.zoom_in();
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.inspector.zoom_out();
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom").clicked() {
                        self.inspector.reset_zoom();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(notice) = &self.notice {
                    let color = match notice.level {
                        NoticeLevel::Info => ui.visuals().text_color(),
                        NoticeLevel::Warning => Color32::from_rgb(230, 180, 60),
                        NoticeLevel::Error => Color32::from_rgb(230, 80, 80),
                    };
                    ui.label(RichText::new(&notice.text).color(color));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(image) = self.inspector.image() {
                        ui.label(format!(
                            "{}x{}  |  {:.0}%",
                            image.width(),
                            image.height(),
                            self.inspector.view().scale() * 100.0
                        ));
                    }
                    if let Some(pending) = self.loader.pending_path() {
                        ui.label(format!("Loading {}", display_name(pending)));
                        ui.spinner();
                    }
                });
            });
        });
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        let mut action = None;
        egui::SidePanel::right("inspector_panel")
            .resizable(true)
            .default_width(320.0)
            .min_width(260.0)
            .show(ctx, |ui| {
                pixel_info::show(ui, self.inspector.displayed());
                ui.separator();
                action = self.panel.show(ui, self.inspector.records());
            });
        if let Some(action) = action {
            self.apply_panel_action(action);
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let generation = self.inspector.image_generation();
        if generation == self.title_generation {
            return;
        }
        self.title_generation = generation;
        let title = match self.inspector.image().and_then(|i| i.path()) {
            Some(path) => format!("PixelProbe - {}", display_name(path)),
            None => "PixelProbe".to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
    }
}

impl eframe::App for PixelProbeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        if self.loader.is_busy() {
            // The decode thread cannot wake the UI; keep polling.
            ctx.request_repaint_after(Duration::from_millis(30));
        }
        self.update_title(ctx);
        self.handle_shortcuts(ctx);

        self.menu_bar(ctx);
        self.status_bar(ctx);
        self.side_panel(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                if let Some(rec) = self.canvas.show(ui, &mut self.inspector) {
                    self.notice = Some(Notice {
                        level: NoticeLevel::Info,
                        text: format!("Selected ({}, {}) {}", rec.x, rec.y, rec.hex()),
                    });
                }
            });
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl Drop for PixelProbeApp {
    fn drop(&mut self) {
        log_info!("Session closed");
    }
}
