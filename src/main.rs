// EventScope - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. Backend selection and eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export modules from the library crate so that `gui.rs` can use
// `crate::app::...`, `crate::core::...` etc.
pub use eventscope::app;
pub use eventscope::core;
pub use eventscope::platform;
pub use eventscope::ui;
pub use eventscope::util;

use std::sync::Arc;

use clap::Parser;

use crate::core::backend::LogBackend;
use crate::platform::config::{self, ViewerConfig};

/// EventScope - Windows event log viewer.
///
/// Browses the machine's classic and provider-based event logs in one
/// incremental, severity-coloured view.
#[derive(Parser, Debug)]
#[command(name = "EventScope", version, about)]
struct Cli {
    /// Use the built-in demo backend instead of the machine's logs.
    #[arg(long)]
    demo: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Pick the log backend for this run.
///
/// On Windows the machine's channel files are the default; everywhere
/// else (and under --demo) the scripted demo backend stands in so the
/// viewer still runs.
#[cfg(windows)]
fn select_backend(demo: bool) -> Arc<dyn LogBackend> {
    if demo {
        Arc::new(crate::platform::mock::MockBackend::with_demo_data())
    } else {
        Arc::new(crate::platform::winevt::EvtxBackend::new())
    }
}

#[cfg(not(windows))]
fn select_backend(demo: bool) -> Arc<dyn LogBackend> {
    if !demo {
        tracing::info!("No native log backend on this platform; using demo data");
    }
    Arc::new(crate::platform::mock::MockBackend::with_demo_data())
}

/// Load config.toml from the platform config directory.
fn load_configuration(
    paths: &config::PlatformPaths,
) -> util::error::Result<(ViewerConfig, Vec<String>)> {
    Ok(config::load_config(&paths.config_file())?)
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths and load configuration before logging init so
    // the configured level can apply.
    let platform_paths = config::PlatformPaths::resolve();
    let (viewer_config, config_warnings) = match load_configuration(&platform_paths) {
        Ok(pair) => pair,
        Err(e) => {
            // A broken config file must not block the viewer; fall back to
            // defaults.
            eprintln!("Warning: {e}");
            (ViewerConfig::default(), Vec::new())
        }
    };

    util::logging::init(cli.debug, viewer_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        demo = cli.demo,
        read_batch = viewer_config.read_batch_size,
        "EventScope starting"
    );

    let backend = select_backend(cli.demo);
    let state = app::state::ViewerState::new(viewer_config.read_batch_size);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| Ok(Box::new(gui::EventScopeApp::new(state, backend)))),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch EventScope GUI: {e}");
        std::process::exit(1);
    }
}
