use crate::config::Config;
#[cfg(not(feature = "static-link"))]
use crate::resolver::{ResolveError, Resolver};

/// The parts of the Steam client API the helper calls.
pub trait SteamApi {
    /// True iff the Steam client runtime is currently active.
    fn is_steam_running(&self) -> bool;
}

/// `SteamAPI_IsSteamRunning` bound from `libsteam_api` at startup.
#[cfg(not(feature = "static-link"))]
pub struct DynamicSteamApi {
    resolver: Resolver,
}

#[cfg(not(feature = "static-link"))]
impl DynamicSteamApi {
    pub fn open<S: AsRef<str>>(candidates: &[S]) -> Result<Self, ResolveError> {
        let mut resolver = Resolver::new();
        resolver.load(candidates)?;
        resolver.bind()?;

        let lib = resolver.lib_name().unwrap_or_default().to_owned();
        match resolver.origin() {
            Some(path) => tracing::info!("Using {lib} from {}", path.display()),
            None => tracing::info!("Using {lib}"),
        }

        Ok(Self { resolver })
    }
}

#[cfg(not(feature = "static-link"))]
impl Drop for DynamicSteamApi {
    fn drop(&mut self) {
        if let Err(e) = self.resolver.close() {
            tracing::warn!("Closing libsteam_api failed: {e}");
        }
    }
}

#[cfg(not(feature = "static-link"))]
impl SteamApi for DynamicSteamApi {
    fn is_steam_running(&self) -> bool {
        self.resolver.is_steam_running().unwrap_or(false)
    }
}

#[cfg(feature = "static-link")]
mod linked {
    #[link(name = "steam_api")]
    extern "C" {
        pub fn SteamAPI_IsSteamRunning() -> bool;
    }
}

/// `SteamAPI_IsSteamRunning` resolved by the linker.
#[cfg(feature = "static-link")]
pub struct StaticSteamApi;

#[cfg(feature = "static-link")]
impl SteamApi for StaticSteamApi {
    fn is_steam_running(&self) -> bool {
        // SAFETY: takes no arguments and only reads client state.
        unsafe { linked::SteamAPI_IsSteamRunning() }
    }
}

/// Open whichever implementation this build was configured for.
#[cfg(not(feature = "static-link"))]
pub fn open(config: &Config) -> Result<Box<dyn SteamApi>, ResolveError> {
    Ok(Box::new(DynamicSteamApi::open(&config.library_candidates)?))
}

#[cfg(feature = "static-link")]
pub fn open(_config: &Config) -> Result<Box<dyn SteamApi>, crate::resolver::ResolveError> {
    Ok(Box::new(StaticSteamApi))
}

impl<T: SteamApi + ?Sized> SteamApi for Box<T> {
    fn is_steam_running(&self) -> bool {
        (**self).is_steam_running()
    }
}
