use midia::{HttpTransformService, MidiaApp, SessionDriver, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = match Settings::load_or_default(settings_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let service = match HttpTransformService::new(&settings.service) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let probe = service.clone();
    std::thread::spawn(move || match probe.health() {
        Ok(health) => tracing::info!(
            "Processing service {} is {} (version {})",
            probe.process_url(),
            health.status,
            health.version
        ),
        Err(e) => tracing::warn!("Processing service not reachable yet: {}", e),
    });

    let driver = SessionDriver::new(service);
    let app = MidiaApp::new(driver, settings.synth);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 420.0])
            .with_title("MIDI-A"),
        ..Default::default()
    };

    let _ = eframe::run_native("midia", options, Box::new(|_cc| Ok(Box::new(app))));
}
