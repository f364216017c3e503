#![cfg(not(target_arch = "wasm32"))]

use std::backtrace::Backtrace;
use std::fs::File;
use std::io::Write;
use std::panic;

use anyhow::Context;
use log::{info, LevelFilter};
use raybox2d::SandboxConfig;

const CRASH_LOG: &str = "raybox_crash.log";

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    setup_diagnostics();
    setup_os_priority();

    let config = SandboxConfig::load();
    info!(
        "Starting RayBox2D: {}x{} px at {} px/m, box capacity {}",
        config.window.width, config.window.height, config.window.ppm, config.capacities.boxes
    );

    raybox2d::run_native(config).context("sandbox terminated with an error")?;
    info!("Bye.");
    Ok(())
}

fn setup_os_priority() {
    #[cfg(feature = "high_priority")]
    {
        // The render loop thread owns physics too; keep it scheduled.
        match thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max) {
            Ok(()) => info!("Elevated main thread priority to Max."),
            Err(e) => log::warn!("Could not raise thread priority: {:?}", e),
        }
    }
}

/// Logger plus a panic hook that leaves a crash report behind.
fn setup_diagnostics() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Warn })
        // wgpu and naga are chatty at debug.
        .filter_module("wgpu_core", LevelFilter::Warn)
        .filter_module("wgpu_hal", LevelFilter::Warn)
        .filter_module("naga", LevelFilter::Warn)
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();

        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<dyn Any>",
            },
        };

        let location = panic_info
            .location()
            .map_or("Unknown location".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));

        let crash_msg = format!(
            "=== RAYBOX CRASH ===\nReason: {}\nLocation: {}\n\nStack Trace:\n{}",
            msg, location, backtrace
        );

        eprintln!("\x1b[31;1m{}\x1b[0m", crash_msg);

        if let Ok(mut file) = File::create(CRASH_LOG) {
            let _ = file.write_all(crash_msg.as_bytes());
            eprintln!("Crash report saved to {}", CRASH_LOG);
        }
    }));
}
