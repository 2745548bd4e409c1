//! Civic Desktop: application entry.

mod app;
mod speech;

use eframe::egui;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Civic",
        options,
        Box::new(|cc| Box::new(app::CivicApp::new(cc))),
    )
}
