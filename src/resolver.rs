//! Runtime loading of `libsteam_api` so the helper can start (and say what is
//! wrong) even when the library is not installed.

use std::ffi::c_void;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

pub const IS_STEAM_RUNNING: &str = "SteamAPI_IsSteamRunning";

pub type IsSteamRunningFn = unsafe extern "C" fn() -> bool;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("no library candidates given")]
    NoCandidates,
    #[error("{0}")]
    Load(String),
    #[error("cannot resolve {0}: no library loaded")]
    NotLoaded(String),
    #[error("{0}")]
    Symbol(String),
    #[error("{0}")]
    Close(String),
}

/// Owns the library handle and the function pointers bound from it.
///
/// Bound pointers are only valid while `library` is `Some`; every path that
/// drops the handle clears them too.
#[derive(Default)]
pub struct Resolver {
    library: Option<Library>,
    lib_name: Option<String>,
    error: Option<String>,
    last_symbol: Option<*const c_void>,
    origin: Option<PathBuf>,
    is_steam_running: Option<IsSteamRunningFn>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the first candidate that loads. On failure the error of the last
    /// candidate tried is kept.
    pub fn load<S: AsRef<str>>(&mut self, candidates: &[S]) -> Result<(), ResolveError> {
        if candidates.is_empty() {
            return Err(self.save_error(ResolveError::NoCandidates));
        }

        let mut result = Err(ResolveError::NoCandidates);
        for name in candidates {
            result = self.load_one(name.as_ref());
            if result.is_ok() {
                break;
            }
            tracing::debug!("{} did not load: {}", name.as_ref(), self.last_error().unwrap_or(""));
        }
        result
    }

    fn load_one(&mut self, name: &str) -> Result<(), ResolveError> {
        self.clear_error();

        // SAFETY: loading runs the library's initialisers; libsteam_api has none
        // with preconditions we could violate from here.
        match unsafe { Library::new(name) } {
            Ok(library) => {
                self.forget_symbols();
                self.library = Some(library);
                self.lib_name = Some(name.to_owned());
                Ok(())
            }
            Err(e) => Err(self.save_error(ResolveError::Load(e.to_string()))),
        }
    }

    /// Look up `symbol` in the loaded library and return its address.
    pub fn resolve(&mut self, symbol: &str) -> Result<*const c_void, ResolveError> {
        self.clear_error();

        let Some(library) = self.library.as_ref() else {
            return Err(self.save_error(ResolveError::NotLoaded(symbol.to_owned())));
        };

        // SAFETY: the symbol is read as an untyped address and not dereferenced.
        let lookup = unsafe { library.get::<*const c_void>(symbol.as_bytes()) }
            .map(|sym: Symbol<*const c_void>| *sym)
            .map_err(|e| e.to_string());
        let address = match lookup {
            Ok(address) if !address.is_null() => address,
            Ok(_) => {
                return Err(self.save_error(ResolveError::Symbol(format!(
                    "{symbol}: resolved to a null address"
                ))))
            }
            Err(e) => return Err(self.save_error(ResolveError::Symbol(format!("{symbol}: {e}")))),
        };

        self.last_symbol = Some(address);
        self.origin = None;
        Ok(address)
    }

    /// Bind every external function the helper calls. Slots that are already
    /// bound are reused.
    pub fn bind(&mut self) -> Result<(), ResolveError> {
        if self.is_steam_running.is_none() {
            let address = self.resolve(IS_STEAM_RUNNING)?;
            // SAFETY: SteamAPI_IsSteamRunning is declared `bool (void)` with C linkage.
            self.is_steam_running =
                Some(unsafe { std::mem::transmute::<*const c_void, IsSteamRunningFn>(address) });
        }
        self.clear_error();
        Ok(())
    }

    /// Calls the bound `SteamAPI_IsSteamRunning`, or `None` if it isn't bound.
    pub fn is_steam_running(&self) -> Option<bool> {
        // SAFETY: the pointer was bound from `library`, which is still open.
        self.is_steam_running.map(|f| unsafe { f() })
    }

    /// Path of the file that provided the last resolved symbol.
    pub fn origin(&mut self) -> Option<&Path> {
        if self.origin.is_none() {
            let Some(address) = self.last_symbol else {
                self.save_error(ResolveError::Symbol("no symbol has been resolved yet".into()));
                return None;
            };
            match symbol_origin(address) {
                Some(path) => self.origin = Some(path),
                None => {
                    self.save_error(ResolveError::Symbol(
                        "cannot determine which file provides the symbol".into(),
                    ));
                    return None;
                }
            }
        }
        self.clear_error();
        self.origin.as_deref()
    }

    /// Close the library. Closing when nothing is loaded is a no-op.
    pub fn close(&mut self) -> Result<(), ResolveError> {
        self.clear_error();
        self.forget_symbols();

        let Some(library) = self.library.take() else {
            return Ok(());
        };
        self.lib_name = None;
        library
            .close()
            .map_err(|e| self.save_error(ResolveError::Close(e.to_string())))
    }

    pub fn lib_name(&self) -> Option<&str> {
        self.lib_name.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn forget_symbols(&mut self) {
        self.is_steam_running = None;
        self.last_symbol = None;
        self.origin = None;
    }

    fn save_error(&mut self, err: ResolveError) -> ResolveError {
        let msg = err.to_string();
        self.error = Some(if msg.is_empty() {
            "unknown dynamic loader error".into()
        } else {
            msg
        });
        err
    }

    fn clear_error(&mut self) {
        self.error = None;
    }
}

#[cfg(unix)]
fn symbol_origin(address: *const c_void) -> Option<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;

    // SAFETY: dladdr only inspects the address; Dl_info is plain data.
    let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
    if unsafe { libc::dladdr(address, &mut info) } == 0 || info.dli_fname.is_null() {
        return None;
    }
    // SAFETY: dli_fname points to a NUL-terminated string owned by the loader.
    let name = unsafe { CStr::from_ptr(info.dli_fname) };
    Some(PathBuf::from(OsStr::from_bytes(name.to_bytes())))
}

#[cfg(not(unix))]
fn symbol_origin(_address: *const c_void) -> Option<PathBuf> {
    None
}
