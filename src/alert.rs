use std::sync::Arc;

use eframe::egui;

use crate::config::Config;
use crate::decoration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

struct AlertApp {
    message: String,
}

impl eframe::App for AlertApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.label(&self.message);
                ui.add_space(12.0);
                let ok = ui.button("  OK  ");
                if ok.clicked() || ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
        });
    }
}

/// Show a modal-style message window and block until it is dismissed.
///
/// The message always goes to the log too, so it isn't lost when no
/// display is available.
pub fn show(config: &Config, icon: Option<Arc<egui::IconData>>, level: Level, message: &str) {
    match level {
        Level::Info => tracing::warn!("{message}"),
        Level::Error => tracing::error!("{message}"),
    }

    let options = eframe::NativeOptions {
        viewport: decoration::viewport(config, icon)
            .with_inner_size([320.0, 110.0])
            .with_resizable(false),
        ..Default::default()
    };

    let message = message.to_owned();
    let result = eframe::run_native(
        &config.window_title,
        options,
        Box::new(move |cc| {
            decoration::apply_theme(&cc.egui_ctx);
            Ok(Box::new(AlertApp { message }))
        }),
    );
    if let Err(e) = result {
        tracing::warn!("Could not display alert window: {e}");
    }
}
