use clap::error::ErrorKind;
use clap::Parser;

use crate::platform;

/// Invoking the binary under this name starts it in idle mode.
pub const IDLE_PROGNAME: &str = "steam_taskbar_idle";

#[derive(Parser, Debug)]
#[command(
    name = "steam_taskbar",
    about = "Keep an additional \"Steam\" entry in your taskbar.",
    long_about = "Keep an additional \"Steam\" entry in your taskbar.\n\
                  This should help to restore the Steam window on desktops\n\
                  where the tray icon is not present."
)]
pub struct Cli {
    /// Wait for Steam to start instead of complaining that it isn't running
    #[arg(long)]
    pub idle: bool,
}

/// What `main` should do after looking at the command line.
#[derive(Debug)]
pub enum Invocation {
    Run { idle: bool },
    /// Help was requested or the arguments were bad; print `text` and exit.
    Exit { text: String, code: u8 },
}

pub fn parse<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(Into::into).collect();
    let argv0 = args.first().map(|a| a.to_string_lossy().into_owned());

    match Cli::try_parse_from(&args) {
        Ok(cli) => Invocation::Run {
            idle: cli.idle || platform::progname(argv0.as_deref()) == IDLE_PROGNAME,
        },
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            Invocation::Exit {
                text: e.render().to_string(),
                code,
            }
        }
    }
}
