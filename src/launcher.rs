use std::process::{Command, Stdio};
use std::thread;

/// Asks the external application to bring its own window to the front.
pub trait Launcher {
    fn relaunch(&mut self);
}

/// Runs the application's launcher command. Fire-and-forget: the result is
/// never waited on by the caller and failures only end up in the log.
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn spawn(&self) -> Result<(), String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| format!("Failed to run '{}': {error}", self.program))?;

        // Reap the child off the UI thread so it doesn't linger as a zombie.
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

impl Launcher for CommandLauncher {
    fn relaunch(&mut self) {
        tracing::info!("Running {} to raise its window", self.program);
        if let Err(e) = self.spawn() {
            tracing::warn!("{e}");
        }
    }
}
