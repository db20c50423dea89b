//! Application entry point for the flocking viewer.
//!
//! This binary installs logging, loads `flock.json` (or the built-in
//! defaults) and delegates everything else to [`Viewer`].

mod viewer;

use flock_core::FlockConfig;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

const CONFIG_PATH: &str = "flock.json";

/// Starts the native eframe application.
///
/// Log verbosity comes from `RUST_LOG`, e.g. `RUST_LOG=flock_core=debug`.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if no valid configuration can be built or eframe fails to create
///   the native window or event loop.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = FlockConfig::load_or_default(CONFIG_PATH);
    let viewer = match Viewer::new(config) {
        Ok(viewer) => viewer,
        Err(err) => {
            warn!(%err, path = CONFIG_PATH, "rejected config, using defaults");
            Viewer::new(FlockConfig::default())?
        }
    };

    eframe::run_native(
        "Flock",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(viewer))),
    )?;
    Ok(())
}
