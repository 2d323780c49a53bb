use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui;

use crate::config::Config;
use crate::platform;

/// Where to look for the window icon, in order.
pub fn icon_candidates(config: &Config, exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(dir) = exe_dir {
        paths.push(dir.join(&config.icon_file));
    }
    paths.push(PathBuf::from(&config.icon_fallback));
    paths
}

pub fn decode_icon(bytes: &[u8]) -> Result<egui::IconData, image::ImageError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.into_rgba8();
    let (width, height) = image.dimensions();
    Ok(egui::IconData {
        rgba: image.into_raw(),
        width,
        height,
    })
}

/// First candidate that reads and decodes. A missing icon is not an error.
pub fn load_icon_from(candidates: &[PathBuf]) -> Option<Arc<egui::IconData>> {
    for path in candidates {
        let Ok(bytes) = fs::read(path) else {
            continue;
        };
        match decode_icon(&bytes) {
            Ok(icon) => {
                tracing::debug!("Icon loaded from {}", path.display());
                return Some(Arc::new(icon));
            }
            Err(e) => tracing::warn!("Ignoring icon {}: {e}", path.display()),
        }
    }
    None
}

pub fn load_icon(config: &Config) -> Option<Arc<egui::IconData>> {
    load_icon_from(&icon_candidates(config, platform::exe_dir().as_deref()))
}

/// Viewport shared by the proxy window and alerts: title and icon.
pub fn viewport(config: &Config, icon: Option<Arc<egui::IconData>>) -> egui::ViewportBuilder {
    let builder = egui::ViewportBuilder::default().with_title(config.window_title.clone());
    match icon {
        Some(icon) => builder.with_icon(icon),
        None => builder,
    }
}

/// Follow the desktop's light/dark preference.
pub fn apply_theme(ctx: &egui::Context) {
    ctx.set_theme(egui::ThemePreference::System);
}
