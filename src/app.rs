use std::time::Instant;

use eframe::egui;

use crate::controller::{Controller, ProxyWindow, VisibilityState};
use crate::launcher::Launcher;
use crate::steam_api::SteamApi;

/// Turns per-frame viewport info into restore signals.
///
/// Nothing counts until the app has asked for the window to be iconized (or
/// it was seen iconified). After each iconize request a focus gain only
/// counts once the window has lost focus or been seen minimized, which drops
/// the focus a freshly mapped window gets. Wayland never reports minimized
/// state, so there the focus edges are all we get.
#[derive(Debug, Default)]
pub struct RestoreDetector {
    last_minimized: Option<bool>,
    armed: bool,
    awaiting_blur: bool,
}

impl RestoreDetector {
    pub fn iconize_sent(&mut self) {
        self.armed = true;
        self.awaiting_blur = true;
    }

    /// `focus` is the last focus change reported this frame, if any.
    pub fn observe(&mut self, minimized: Option<bool>, focus: Option<bool>) -> bool {
        let was_minimized = self.last_minimized;
        if minimized.is_some() {
            self.last_minimized = minimized;
        }

        if minimized == Some(true) {
            self.armed = true;
            self.awaiting_blur = false;
            return false;
        }
        if focus == Some(false) {
            self.awaiting_blur = false;
        }
        if !self.armed {
            return false;
        }

        let deiconified = was_minimized == Some(true) && minimized == Some(false);
        let refocused = focus == Some(true) && !self.awaiting_blur;
        deiconified || refocused
    }
}

/// Drives the real window through viewport commands.
struct ViewportWindow<'a> {
    ctx: &'a egui::Context,
}

impl ProxyWindow for ViewportWindow<'_> {
    fn iconize(&mut self) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
    }

    fn hide(&mut self) {
        // Closing the only viewport ends the event loop.
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

/// Tells the detector about every iconize, whoever asked for it.
struct Tracked<'a, W> {
    inner: &'a mut W,
    restores: &'a mut RestoreDetector,
}

impl<W: ProxyWindow> ProxyWindow for Tracked<'_, W> {
    fn iconize(&mut self) {
        self.restores.iconize_sent();
        self.inner.iconize();
    }

    fn hide(&mut self) {
        self.inner.hide();
    }
}

pub struct ProxyApp<S, L> {
    controller: Controller<S, L>,
    restores: RestoreDetector,
    initialized: bool,
}

impl<S: SteamApi, L: Launcher> ProxyApp<S, L> {
    pub fn new(controller: Controller<S, L>) -> Self {
        Self {
            controller,
            restores: RestoreDetector::default(),
            initialized: false,
        }
    }

    /// One event-loop pass. Returns when the next timer is due, or `None`
    /// once the window is gone.
    pub fn frame<W: ProxyWindow>(
        &mut self,
        now: Instant,
        minimized: Option<bool>,
        focus: Option<bool>,
        window: &mut W,
    ) -> Option<Instant> {
        let mut window = Tracked {
            inner: window,
            restores: &mut self.restores,
        };

        if !self.initialized {
            self.initialized = true;
            window.iconize();
        }

        if window.restores.observe(minimized, focus) {
            tracing::debug!(idle = self.controller.is_idle(), "Taskbar entry restored");
            self.controller.on_restore(now, &mut window);
        }

        self.controller.tick(now, &mut window);
        if self.controller.state() == VisibilityState::Terminated {
            return None;
        }
        self.controller.next_deadline()
    }
}

impl<S: SteamApi, L: Launcher> eframe::App for ProxyApp<S, L> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        let (minimized, focus) = ctx.input(|i| {
            let focus = i.events.iter().rev().find_map(|e| match e {
                egui::Event::WindowFocused(focused) => Some(*focused),
                _ => None,
            });
            (i.viewport().minimized, focus)
        });

        let Some(deadline) = self.frame(now, minimized, focus, &mut ViewportWindow { ctx }) else {
            return;
        };
        ctx.request_repaint_after(deadline.saturating_duration_since(now));

        // The window has no content; it only needs to exist in the taskbar.
        egui::CentralPanel::default().show(ctx, |_ui| {});
    }
}
