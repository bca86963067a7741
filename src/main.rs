use std::path::PathBuf;

use eframe::egui;
use eframe::egui_wgpu;
use linkdash::app::DashboardApp;
use linkdash::DashboardConfig;

/// Usage: `linkdash [DATASET] [CONFIG]`
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let dataset = args.next();
    let config = match args.next() {
        Some(path) => DashboardConfig::load(&path).unwrap_or_else(|e| {
            tracing::error!("Falling back to default config: {e}");
            DashboardConfig::default()
        }),
        None => DashboardConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("linkdash")
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true),
        wgpu_options: egui_wgpu::WgpuConfiguration {
            present_mode: eframe::wgpu::PresentMode::AutoVsync,
            ..Default::default()
        },
        ..Default::default()
    };

    eframe::run_native(
        "linkdash",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, dataset)))),
    )
}
