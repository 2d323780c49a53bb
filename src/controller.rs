use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::launcher::Launcher;
use crate::steam_api::SteamApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    /// Waiting for Steam to show up before doing anything.
    Idle,
    /// Iconized in the taskbar while Steam runs.
    ActiveVisible,
    /// A restore came in and the relaunch has not been issued yet.
    PendingRestore,
    /// Window hidden for good.
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartupError {
    #[error("Steam is not running")]
    NotRunning,
}

/// The toolkit window the controller drives.
pub trait ProxyWindow {
    fn iconize(&mut self);
    fn hide(&mut self);
}

#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub initial_poll_delay: Duration,
    pub poll_interval: Duration,
    pub debounce: Duration,
}

/// Liveness-driven visibility state machine for the proxy window.
///
/// All callbacks run on the UI thread and take the current time explicitly,
/// so the whole machine can be driven from tests without a toolkit.
pub struct Controller<S, L> {
    steam: S,
    launcher: L,
    state: VisibilityState,
    idle: bool,
    poll_interval: Duration,
    next_poll: Option<Instant>,
    relaunch: Debouncer,
}

impl<S: SteamApi, L: Launcher> Controller<S, L> {
    /// Fails if Steam isn't running and we weren't asked to wait for it.
    pub fn start(
        steam: S,
        launcher: L,
        idle: bool,
        timings: Timings,
        now: Instant,
    ) -> Result<Self, StartupError> {
        if !idle && !steam.is_steam_running() {
            return Err(StartupError::NotRunning);
        }

        let state = if idle {
            VisibilityState::Idle
        } else {
            VisibilityState::ActiveVisible
        };
        tracing::debug!("Controller starting in {state:?}");

        Ok(Self {
            steam,
            launcher,
            state,
            idle,
            poll_interval: timings.poll_interval,
            next_poll: Some(now + timings.initial_poll_delay),
            relaunch: Debouncer::new(timings.debounce),
        })
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Earliest moment a timer needs servicing, if any is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.state == VisibilityState::Terminated {
            return None;
        }
        match (self.next_poll, self.relaunch.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Service whichever timers are due.
    pub fn tick(&mut self, now: Instant, window: &mut impl ProxyWindow) {
        if self.state == VisibilityState::Terminated {
            return;
        }

        if self.relaunch.next_deadline().is_some_and(|at| at <= now) {
            self.on_debounce_elapsed(now);
        }

        if self.next_poll.is_some_and(|at| at <= now) {
            self.on_poll(now, window);
        }
    }

    fn on_poll(&mut self, now: Instant, window: &mut impl ProxyWindow) {
        let running = self.steam.is_steam_running();

        if self.idle && running {
            tracing::info!("Steam is up, leaving idle mode");
            self.idle = false;
            self.state = VisibilityState::ActiveVisible;
        }

        if !self.idle && !running {
            tracing::info!("Steam is gone, hiding the taskbar entry");
            self.next_poll = None;
            self.state = VisibilityState::Terminated;
            window.hide();
            return;
        }

        self.next_poll = Some(now + self.poll_interval);
    }

    /// The user clicked the taskbar entry (or the toolkit says the window
    /// was shown/restored some other way).
    pub fn on_restore(&mut self, now: Instant, window: &mut impl ProxyWindow) {
        if self.state == VisibilityState::Terminated {
            return;
        }

        // The proxy itself must never stay on screen.
        window.iconize();

        let running = self.steam.is_steam_running();
        if self.idle {
            if !running {
                tracing::debug!("Restore ignored, still waiting for Steam");
                return;
            }
            self.idle = false;
        }

        self.relaunch.trigger(now);
        self.state = VisibilityState::PendingRestore;
    }

    fn on_debounce_elapsed(&mut self, now: Instant) {
        if self.relaunch.poll(now) && self.steam.is_steam_running() {
            self.launcher.relaunch();
        }
        if !self.relaunch.is_pending() && self.state == VisibilityState::PendingRestore {
            self.state = if self.idle {
                VisibilityState::Idle
            } else {
                VisibilityState::ActiveVisible
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[derive(Clone, Default)]
    struct FakeSteam(Rc<Cell<bool>>);

    impl FakeSteam {
        fn running(running: bool) -> Self {
            Self(Rc::new(Cell::new(running)))
        }

        fn set(&self, running: bool) {
            self.0.set(running);
        }
    }

    impl SteamApi for FakeSteam {
        fn is_steam_running(&self) -> bool {
            self.0.get()
        }
    }

    #[derive(Clone, Default)]
    struct CountingLauncher(Rc<Cell<usize>>);

    impl CountingLauncher {
        fn count(&self) -> usize {
            self.0.get()
        }
    }

    impl Launcher for CountingLauncher {
        fn relaunch(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[derive(Default)]
    struct FakeWindow {
        iconized: usize,
        hidden: usize,
    }

    impl ProxyWindow for FakeWindow {
        fn iconize(&mut self) {
            self.iconized += 1;
        }

        fn hide(&mut self) {
            self.hidden += 1;
        }
    }

    const TIMINGS: Timings = Timings {
        initial_poll_delay: Duration::from_millis(500),
        poll_interval: Duration::from_secs(1),
        debounce: Duration::from_millis(200),
    };

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn start(
        running: bool,
        idle: bool,
    ) -> (Controller<FakeSteam, CountingLauncher>, FakeSteam, CountingLauncher, Instant) {
        let steam = FakeSteam::running(running);
        let launcher = CountingLauncher::default();
        let t0 = Instant::now();
        let c = Controller::start(steam.clone(), launcher.clone(), idle, TIMINGS, t0).unwrap();
        (c, steam, launcher, t0)
    }

    #[test]
    fn test_start_without_steam_fails() {
        let result = Controller::start(
            FakeSteam::running(false),
            CountingLauncher::default(),
            false,
            TIMINGS,
            Instant::now(),
        );
        assert_eq!(result.err(), Some(StartupError::NotRunning));
    }

    #[test]
    fn test_first_poll_uses_initial_delay() {
        let (c, _, _, t0) = start(true, false);
        assert_eq!(c.state(), VisibilityState::ActiveVisible);
        assert_eq!(c.next_deadline(), Some(ms(t0, 500)));
    }

    #[test]
    fn test_poll_reschedules_while_running() {
        let (mut c, _, _, t0) = start(true, false);
        let mut win = FakeWindow::default();

        c.tick(ms(t0, 500), &mut win);
        assert_eq!(c.next_deadline(), Some(ms(t0, 1500)));
        c.tick(ms(t0, 1500), &mut win);
        assert_eq!(c.next_deadline(), Some(ms(t0, 2500)));
        assert_eq!(win.hidden, 0);
    }

    #[test]
    fn test_tick_before_deadline_does_nothing() {
        let (mut c, steam, _, t0) = start(true, false);
        let mut win = FakeWindow::default();
        steam.set(false);

        c.tick(ms(t0, 499), &mut win);
        assert_eq!(c.state(), VisibilityState::ActiveVisible);
        assert_eq!(win.hidden, 0);
    }

    #[test]
    fn test_hidden_is_terminal() {
        let (mut c, steam, launcher, t0) = start(true, false);
        let mut win = FakeWindow::default();

        steam.set(false);
        c.tick(ms(t0, 500), &mut win);
        assert_eq!(c.state(), VisibilityState::Terminated);
        assert_eq!(win.hidden, 1);
        assert_eq!(c.next_deadline(), None);

        // Steam coming back doesn't bring the window back.
        steam.set(true);
        for step in 1..10 {
            c.tick(ms(t0, 500 + step * 1000), &mut win);
            c.on_restore(ms(t0, 600 + step * 1000), &mut win);
        }
        assert_eq!(c.state(), VisibilityState::Terminated);
        assert_eq!(win.hidden, 1);
        assert_eq!(win.iconized, 0);
        assert_eq!(launcher.count(), 0);
    }

    #[test]
    fn test_idle_without_steam_stays_quiet() {
        let (mut c, _, launcher, t0) = start(false, true);
        let mut win = FakeWindow::default();
        assert_eq!(c.state(), VisibilityState::Idle);

        for step in 0..5 {
            c.tick(ms(t0, 500 + step * 1000), &mut win);
            c.on_restore(ms(t0, 700 + step * 1000), &mut win);
            c.tick(ms(t0, 900 + step * 1000), &mut win);
        }

        assert_eq!(c.state(), VisibilityState::Idle);
        assert!(c.is_idle());
        assert_eq!(win.hidden, 0);
        // Each absorbed restore still puts the proxy back into the taskbar.
        assert_eq!(win.iconized, 5);
        assert_eq!(launcher.count(), 0);
    }

    #[test]
    fn test_idle_ends_when_steam_appears() {
        let (mut c, steam, _, t0) = start(false, true);
        let mut win = FakeWindow::default();

        c.tick(ms(t0, 500), &mut win);
        assert_eq!(c.state(), VisibilityState::Idle);

        steam.set(true);
        c.tick(ms(t0, 1500), &mut win);
        assert_eq!(c.state(), VisibilityState::ActiveVisible);
        assert!(!c.is_idle());

        // From here on Steam going away ends the helper.
        steam.set(false);
        c.tick(ms(t0, 2500), &mut win);
        assert_eq!(c.state(), VisibilityState::Terminated);
        assert_eq!(win.hidden, 1);
    }

    #[test]
    fn test_restore_in_idle_with_steam_running_relaunches() {
        let (mut c, steam, launcher, t0) = start(false, true);
        let mut win = FakeWindow::default();

        steam.set(true);
        c.on_restore(ms(t0, 100), &mut win);
        assert!(!c.is_idle());
        c.tick(ms(t0, 300), &mut win);
        assert_eq!(launcher.count(), 1);
    }

    #[test]
    fn test_restore_burst_relaunches_once() {
        let (mut c, _, launcher, t0) = start(true, false);
        let mut win = FakeWindow::default();

        for at in [1000, 1010, 1040, 1100, 1150] {
            c.on_restore(ms(t0, at), &mut win);
        }
        assert_eq!(c.state(), VisibilityState::PendingRestore);
        assert_eq!(win.iconized, 5);
        assert_eq!(launcher.count(), 0);

        for at in (1000..2000).step_by(10) {
            c.tick(ms(t0, at), &mut win);
        }
        assert_eq!(launcher.count(), 1);
        assert_eq!(c.state(), VisibilityState::ActiveVisible);
    }

    #[test]
    fn test_separate_clicks_relaunch_each_time() {
        let (mut c, _, launcher, t0) = start(true, false);
        let mut win = FakeWindow::default();

        c.on_restore(ms(t0, 1000), &mut win);
        c.tick(ms(t0, 1200), &mut win);
        c.on_restore(ms(t0, 3000), &mut win);
        c.tick(ms(t0, 3200), &mut win);

        assert_eq!(launcher.count(), 2);
    }

    #[test]
    fn test_no_relaunch_if_steam_gone_before_debounce() {
        let (mut c, steam, launcher, t0) = start(true, false);
        let mut win = FakeWindow::default();

        c.on_restore(ms(t0, 100), &mut win);
        steam.set(false);
        c.tick(ms(t0, 300), &mut win);

        assert_eq!(launcher.count(), 0);
        assert_eq!(c.state(), VisibilityState::ActiveVisible);

        c.tick(ms(t0, 500), &mut win);
        assert_eq!(c.state(), VisibilityState::Terminated);
    }

    #[test]
    fn test_next_deadline_prefers_debounce() {
        let (mut c, _, _, t0) = start(true, false);
        let mut win = FakeWindow::default();

        c.on_restore(ms(t0, 100), &mut win);
        assert_eq!(c.next_deadline(), Some(ms(t0, 300)));
        c.tick(ms(t0, 300), &mut win);
        assert_eq!(c.next_deadline(), Some(ms(t0, 500)));
    }
}
