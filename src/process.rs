use std::fmt;
use std::process::Command;

use crate::error::{MigrateError, Result};

/// One external command: run it, then read what it printed.
pub trait Process: fmt::Display {
    fn run(&mut self) -> Result<()>;
    fn stdout(&self) -> &str;
    fn stderr(&self) -> &str;
}

/// Builds processes. Swapped for a scripted runner in tests.
pub trait ProcessRunner: Send + Sync {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Process>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn command(&self, program: &str, args: Vec<String>) -> Box<dyn Process> {
        Box::new(SystemProcess::new(program, args))
    }
}

/// A process backed by `std::process::Command` with captured output.
#[derive(Debug)]
pub struct SystemProcess {
    program: String,
    args: Vec<String>,
    stdout: String,
    stderr: String,
}

impl SystemProcess {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

impl fmt::Display for SystemProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl Process for SystemProcess {
    fn run(&mut self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|source| MigrateError::CommandSpawn {
                command: self.to_string(),
                source,
            })?;

        self.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        self.stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(())
        } else {
            Err(MigrateError::CommandFailed {
                command: self.to_string(),
                stderr: self.stderr.trim().to_string(),
            })
        }
    }

    fn stdout(&self) -> &str {
        &self.stdout
    }

    fn stderr(&self) -> &str {
        &self.stderr
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let p = SystemProcess::new("helm", vec!["list".into(), "--output".into(), "json".into()]);
        assert_eq!(p.to_string(), "helm list --output json");
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let mut p = SystemProcess::new("definitely-not-a-real-binary-4242", vec![]);
        let err = p.run().unwrap_err();
        assert!(matches!(err, MigrateError::CommandSpawn { .. }));
        assert_eq!(err.code(), "command_spawn");
    }
}
