use crate::core::service::{CommandOutput, Supervisor};
use crate::error::{Result, ZimanError};
use std::process::{Command, Stdio};

/// The host's systemd, driven through `systemctl`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    binary: String,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self {
            binary: "systemctl".to_string(),
        }
    }
}

impl Systemctl {
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Supervisor for Systemctl {
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ZimanError::SupervisorUnavailable(format!("{}: {}", self.binary, e)))?;
        tracing::debug!(
            command = %self.binary,
            args = ?args,
            status = ?output.status.code(),
            "supervisor command finished"
        );
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let ctl = Systemctl::with_binary("/nonexistent/systemctl-for-tests");
        assert!(matches!(
            ctl.run(&["is-active", "zivpn"]),
            Err(ZimanError::SupervisorUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_exit_status_and_output() {
        let ctl = Systemctl::with_binary("false");
        let out = ctl.run(&[]).unwrap();
        assert!(!out.success);

        let ctl = Systemctl::with_binary("echo");
        let out = ctl.run(&["active"]).unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "active");
    }
}
