//! Application entry point for the nettle field viewer.
//!
//! This binary sets up tracing and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use nettle_core::config::Config;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;

/// Starts the native eframe application.
///
/// Logging defaults to `info` unless `RUST_LOG` says otherwise. The
/// window opens at the default canvas size; the viewer then re-sows the
/// sketch on a canvas matching its drawing panel.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop,
///   or if the sketch configuration is rejected.
fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = Config::with_canvas(WIDTH, HEIGHT);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Nettles")
            .with_inner_size([WIDTH, HEIGHT + 60.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nettles",
        options,
        Box::new(move |_cc| {
            // Construct the root app state for the viewer.
            Ok(Box::new(Viewer::new(cfg)?))
        }),
    )
}
