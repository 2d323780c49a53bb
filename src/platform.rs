use std::path::{Path, PathBuf};

/// Directory holding the running executable, used to find files shipped
/// next to it.
pub fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Name the program was invoked as, without directory or extension.
///
/// Uses argv[0] rather than the resolved executable so a
/// `steam_taskbar_idle` symlink is told apart from the real binary.
pub fn progname(argv0: Option<&str>) -> String {
    argv0
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_BIN_NAME").to_owned())
}
