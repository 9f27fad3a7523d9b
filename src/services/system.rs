//! Host operating system access

use std::process::Command;

use tracing::debug;

use crate::core::error::{HeraldError, Result};

pub trait SystemCapability: Send + Sync {
    /// Run a shell command line and return its trimmed stdout
    fn run_shell(&self, command: &str) -> Result<String>;

    fn os_name(&self) -> String;
}

/// Runs commands through the platform shell
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSystem;

impl SystemCapability for ShellSystem {
    fn run_shell(&self, command: &str) -> Result<String> {
        debug!("Running shell command: {}", command);
        let output = if cfg!(windows) {
            Command::new("cmd").args(["/C", command]).output()?
        } else {
            Command::new("sh").args(["-c", command]).output()?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("command exited with {}", output.status)
            } else {
                stderr
            };
            return Err(HeraldError::external("shell", message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn os_name(&self) -> String {
        match std::env::consts::OS {
            "linux" => "Linux".into(),
            "macos" => "macOS".into(),
            "windows" => "Windows".into(),
            other => other.to_string(),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_shell_captures_stdout() {
        assert_eq!(ShellSystem.run_shell("echo herald").unwrap(), "herald");
    }

    #[test]
    fn test_shell_failure_is_external_error() {
        let err = ShellSystem.run_shell("exit 3").unwrap_err();
        assert!(matches!(err, HeraldError::ExternalService { .. }));
    }
}
