// SPDX-License-Identifier: GPL-3.0-only

//! External tool invocation

use std::io;
use std::path::PathBuf;
use std::process::Command;

/// Captured result of one finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Short reason for a failed run, preferring the tool's own stderr
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external tools synchronously. No timeout is applied.
pub trait CommandRunner {
    /// Spawn `program` with `args`, wait for it and capture its output.
    ///
    /// A non-zero exit is reported through `CommandOutput::success`; `Err`
    /// means the process could not be started at all.
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        (**self).run(program, args)
    }
}

/// Runs tools on the host through `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn resolve(program: &str) -> io::Result<PathBuf> {
        if program.contains('/') {
            return Ok(PathBuf::from(program));
        }
        which::which(program).map_err(|e| {
            io::Error::new(io::ErrorKind::NotFound, format!("{program} not found: {e}"))
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<CommandOutput> {
        let path = Self::resolve(program)?;
        tracing::debug!("Running {}", render(&path.to_string_lossy(), args));

        let output = Command::new(&path).args(args).output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Render a command line for logs and dry-run output
pub fn render(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}
