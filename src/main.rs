use eframe::egui;

use venture_lens::app::VentureLensApp;
use venture_lens::data::loader;

fn main() -> eframe::Result {
    env_logger::init();

    // A missing or structurally invalid default input file is fatal.
    let dataset = match loader::load_default() {
        Ok(ds) => ds.clone(),
        Err(e) => {
            log::error!("Failed to load dataset: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "VentureLens – Startup Investment Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(VentureLensApp::new(dataset)))),
    )
}
