use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::config::DashboardConfig;
use crate::coordinator::{DashboardCoordinator, PanelSurfaces};
use crate::data::loader;
use crate::data::record::Dataset;
use crate::state::theme::{EntityPalette, Theme};
use crate::ui::{controls, panel_view};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pending async dataset load.
struct PendingLoad {
    path: PathBuf,
    result: Arc<Mutex<Option<Result<Dataset, String>>>>,
}

/// The linked dashboard window.
pub struct DashboardApp {
    config: DashboardConfig,
    theme: Theme,
    coordinator: Option<DashboardCoordinator>,
    palette: EntityPalette,
    surfaces: PanelSurfaces,
    /// An error message shown in the footer until dismissed.
    error_message: Option<String>,
    pending_load: Option<PendingLoad>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig, dataset: Option<PathBuf>) -> Self {
        let ctx = &cc.egui_ctx;
        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(14.0));
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(20.0));
        style.spacing.button_padding = egui::vec2(10.0, 5.0);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.visuals.window_corner_radius = egui::CornerRadius::same(8);
        ctx.set_style(style);

        let theme = Theme::default();
        ctx.set_visuals(theme.visuals());

        let mut app = Self {
            config,
            theme,
            coordinator: None,
            palette: EntityPalette::default(),
            surfaces: PanelSurfaces::default(),
            error_message: None,
            pending_load: None,
        };
        if let Some(path) = dataset {
            app.load_file(&path);
        }
        app
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_title("Open Dataset")
            .add_filter("Data Files", &["json", "csv"])
            .add_filter("All Files", &["*"])
            .pick_file()
        {
            self.load_file(&path);
        }
    }

    /// Parse a dataset on a worker thread so the UI stays responsive.
    fn load_file(&mut self, path: &Path) {
        let path_buf = path.to_path_buf();
        let result: Arc<Mutex<Option<Result<Dataset, String>>>> = Arc::new(Mutex::new(None));
        let result_clone = Arc::clone(&result);

        std::thread::spawn(move || {
            let loaded = loader::load_dataset(&path_buf).map_err(|e| e.to_string());
            if let Ok(mut slot) = result_clone.lock() {
                *slot = Some(loaded);
            }
        });

        tracing::info!("Loading {}", path.display());
        self.pending_load = Some(PendingLoad { path: path.to_path_buf(), result });
    }

    fn install_dataset(&mut self, dataset: Dataset, now: f64) {
        let palette = EntityPalette::new(dataset.entity_ids());
        match DashboardCoordinator::new(dataset, &self.config, now) {
            Ok(coordinator) => {
                self.palette = palette;
                self.surfaces = PanelSurfaces::default();
                self.coordinator = Some(coordinator);
                self.error_message = None;
            }
            Err(e) => {
                tracing::error!("Failed to start dashboard: {e}");
                self.error_message = Some(format!("Failed to start dashboard: {e}"));
            }
        }
    }

    fn poll_pending_load(&mut self, now: f64) {
        let Some(pending) = &self.pending_load else {
            return;
        };
        let taken = match pending.result.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => Some(Err("loader thread panicked".to_string())),
        };
        let Some(result) = taken else {
            return;
        };
        let path = pending.path.clone();
        self.pending_load = None;
        match result {
            Ok(dataset) => {
                tracing::info!("Loaded {} entities from {}", dataset.len(), path.display());
                self.install_dataset(dataset, now);
            }
            Err(e) => {
                tracing::error!("Failed to load file: {e}");
                self.error_message = Some(format!("Failed to load file: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        ctx.set_visuals(self.theme.visuals());

        // Drag and drop
        let dropped: Vec<PathBuf> =
            ctx.input(|i| i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect());
        if let Some(path) = dropped.first() {
            self.load_file(path);
        }

        self.poll_pending_load(now);

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 8)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("linkdash");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let theme_label = match self.theme {
                            Theme::Dark => "Light Mode",
                            Theme::Light => "Dark Mode",
                        };
                        if ui.button(theme_label).clicked() {
                            self.theme = self.theme.toggle();
                        }
                        ui.separator();
                        ui.small(format!("v{VERSION}"));
                    });
                });
            });

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(16, 6)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    match &self.coordinator {
                        Some(c) => {
                            let sel = c.selection();
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} of {} entities, {} days",
                                    sel.active_entities.len(),
                                    c.dataset().len(),
                                    sel.date_range.span_days() + 1,
                                ))
                                .weak(),
                            );
                        }
                        None => {
                            ui.label(egui::RichText::new("Drop a JSON or CSV file to begin").weak());
                        }
                    }
                    if let Some(msg) = &self.error_message {
                        ui.separator();
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), msg);
                        if ui.small_button("dismiss").clicked() {
                            self.error_message = None;
                        }
                    }
                });
            });

        let mut open_dataset = false;
        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                let outcome = controls::show_controls(ui, self.coordinator.as_mut(), &self.palette, now);
                open_dataset = outcome.open_dataset;
                if outcome.error.is_some() {
                    self.error_message = outcome.error;
                }
            });
        if open_dataset {
            self.open_file_dialog();
        }

        let theme = self.theme;
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(coordinator) = self.coordinator.as_mut() else {
                ui.centered_and_justified(|ui| ui.label("No dataset loaded"));
                return;
            };
            let height = ui.available_height();
            let spacing = ui.spacing().item_spacing.y;
            let top = (height * 0.5 - spacing).max(120.0);
            let middle = (height * 0.32 - spacing).max(120.0);
            let bottom = (height * 0.18 - spacing).max(60.0);

            panel_view::show_time_series(ui, coordinator, &self.surfaces, theme, top, now);
            ui.columns(2, |columns| {
                for (index, column) in columns.iter_mut().enumerate() {
                    panel_view::show_ring(column, coordinator, index, &self.surfaces.rings[index], theme, middle, now);
                }
            });
            panel_view::show_timeline(ui, coordinator, &self.surfaces.timeline, theme, bottom, now);
        });

        // Shapes drawn next frame reflect everything dispatched this frame.
        let animating = match self.coordinator.as_mut() {
            Some(c) => c.sample(now, &mut self.surfaces),
            None => false,
        };
        if animating {
            ctx.request_repaint();
        }

        if self.pending_load.is_some() {
            egui::Window::new("Loading")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading file...");
                    });
                });
            ctx.request_repaint();
        }
    }
}
