mod alert;
mod app;
mod cli;
mod config;
mod controller;
mod debounce;
mod decoration;
mod launcher;
mod platform;
mod resolver;
mod steam_api;
mod storage;

use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use crate::cli::Invocation;
use crate::controller::{Controller, StartupError, Timings};
use crate::launcher::CommandLauncher;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let idle = match cli::parse(std::env::args_os()) {
        Invocation::Run { idle } => idle,
        Invocation::Exit { text, code } => {
            if code == 0 {
                print!("{text}");
            } else {
                eprint!("{text}");
            }
            return ExitCode::from(code);
        }
    };

    init_logging();

    let config = storage::load();
    let icon = decoration::load_icon(&config);

    let steam = match steam_api::open(&config) {
        Ok(steam) => steam,
        Err(e) => {
            alert::show(&config, icon, alert::Level::Error, &e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let timings = Timings {
        initial_poll_delay: config.initial_poll_delay(),
        poll_interval: config.poll_interval(),
        debounce: config.debounce(),
    };
    let launcher = CommandLauncher::new(&config.relaunch_command, config.relaunch_args.clone());

    let controller = match Controller::start(steam, launcher, idle, timings, Instant::now()) {
        Ok(controller) => controller,
        Err(e @ StartupError::NotRunning) => {
            alert::show(&config, icon, alert::Level::Info, &e.to_string());
            return ExitCode::SUCCESS;
        }
    };
    tracing::info!(idle, "Keeping a \"{}\" entry in the taskbar", config.window_title);

    let options = eframe::NativeOptions {
        viewport: decoration::viewport(&config, icon)
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };

    let result = eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |cc| {
            decoration::apply_theme(&cc.egui_ctx);
            Ok(Box::new(app::ProxyApp::new(controller)))
        }),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Window system error: {e}");
            ExitCode::FAILURE
        }
    }
}
