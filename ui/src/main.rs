#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use liaison_ui::LiaisonApp;

#[global_allocator]
static MALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> eframe::Result {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    env_logger::Builder::from_env(env_logger::Env::default()).init();

    let base_url = std::env::var("LIAISON_API_URL")
        .unwrap_or_else(|_| liaison_ui::api::DEFAULT_BASE_URL.to_owned());
    log::info!("talking to {base_url}");

    let native_options = eframe::NativeOptions {
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Liaison",
        native_options,
        Box::new(move |_cc| Ok(Box::new(LiaisonApp::new(base_url)))),
    )
}
