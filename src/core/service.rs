//! Lifecycle control and status queries for the managed service.
//!
//! Commands go through a [`Supervisor`], which on a real host is `systemctl`.
//! Lifecycle failures are reported, not raised: the caller decides whether a
//! failed restart matters.

use crate::error::Result;
use crate::models::settings::ServiceSection;
use crate::models::status::ServiceStatus;
use crate::util::{logfile, process};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Textual result of one supervisor command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Opaque command interface to the host's service supervisor.
///
/// Returns `Err(SupervisorUnavailable)` only when the command could not be
/// issued at all; a non-zero exit is reported through `CommandOutput`.
pub trait Supervisor {
    fn run(&self, args: &[&str]) -> Result<CommandOutput>;
}

impl<S: Supervisor + ?Sized> Supervisor for &S {
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        (**self).run(args)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Start,
    Stop,
    Restart,
}

impl Lifecycle {
    pub fn verb(self) -> &'static str {
        match self {
            Lifecycle::Start => "start",
            Lifecycle::Stop => "stop",
            Lifecycle::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleReport {
    pub action: Lifecycle,
    pub ok: bool,
    pub diagnostic: Option<String>,
    /// Restart only: whether the service was active after the settle wait.
    /// `None` when the check itself could not run.
    pub verified_active: Option<bool>,
}

impl LifecycleReport {
    fn failed(action: Lifecycle, diagnostic: String) -> Self {
        Self {
            action,
            ok: false,
            diagnostic: Some(diagnostic),
            verified_active: None,
        }
    }
}

pub struct ServiceController<S> {
    supervisor: S,
    unit: String,
    log_path: PathBuf,
    log_lines: usize,
    settle: Duration,
}

impl<S: Supervisor> ServiceController<S> {
    pub fn new(supervisor: S, settings: &ServiceSection) -> Self {
        Self {
            supervisor,
            unit: settings.name.clone(),
            log_path: settings.log_path.clone(),
            log_lines: settings.log_lines,
            settle: Duration::from_secs(settings.settle_secs),
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn log_path(&self) -> &std::path::Path {
        &self.log_path
    }

    pub fn is_active(&self) -> Result<bool> {
        let out = self.supervisor.run(&["is-active", self.unit.as_str()])?;
        Ok(out.stdout.trim() == "active")
    }

    pub fn is_enabled(&self) -> Result<bool> {
        let out = self.supervisor.run(&["is-enabled", self.unit.as_str()])?;
        Ok(matches!(out.stdout.trim(), "enabled" | "enabled-runtime"))
    }

    pub fn main_pid(&self) -> Result<Option<u32>> {
        let out = self
            .supervisor
            .run(&["show", "--property=MainPID", "--value", self.unit.as_str()])?;
        if !out.success {
            return Ok(None);
        }
        Ok(out.stdout.trim().parse::<u32>().ok().filter(|pid| *pid > 0))
    }

    /// Fresh snapshot: active/enabled are mandatory, process figures and the
    /// log tail are best effort.
    pub fn status(&self) -> Result<ServiceStatus> {
        let running = self.is_active()?;
        let autostart_enabled = self.is_enabled()?;
        let pid = if running {
            self.main_pid().unwrap_or_else(|e| {
                tracing::debug!(error = %e, "main pid lookup failed");
                None
            })
        } else {
            None
        };
        let process = pid.and_then(process::metrics);
        let log_tail = self.logs(self.log_lines).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "log tail unavailable");
            Vec::new()
        });
        Ok(ServiceStatus {
            unit: self.unit.clone(),
            running,
            autostart_enabled,
            pid,
            process,
            log_tail,
        })
    }

    pub fn logs(&self, lines: usize) -> Result<Vec<String>> {
        logfile::tail_lines(&self.log_path, lines)
    }

    pub fn start(&self) -> LifecycleReport {
        self.transition(Lifecycle::Start)
    }

    pub fn stop(&self) -> LifecycleReport {
        self.transition(Lifecycle::Stop)
    }

    /// Restart, wait the settle interval, and confirm the service is active.
    pub fn restart(&self) -> LifecycleReport {
        let mut report = self.transition(Lifecycle::Restart);
        if !report.ok {
            return report;
        }
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        match self.is_active() {
            Ok(true) => report.verified_active = Some(true),
            Ok(false) => {
                tracing::warn!(unit = %self.unit, "service is not active after restart");
                report.verified_active = Some(false);
                report.diagnostic = Some(format!(
                    "{} is not active after restart; check `journalctl -u {}`",
                    self.unit, self.unit
                ));
            }
            Err(e) => {
                tracing::warn!(unit = %self.unit, error = %e, "cannot verify restart");
                report.diagnostic = Some(format!("cannot verify restart: {}", e));
            }
        }
        report
    }

    fn transition(&self, action: Lifecycle) -> LifecycleReport {
        match self.supervisor.run(&[action.verb(), self.unit.as_str()]) {
            Ok(out) if out.success => LifecycleReport {
                action,
                ok: true,
                diagnostic: None,
                verified_active: None,
            },
            Ok(out) => {
                let diagnostic = format!("{} {} failed: {}", action.verb(), self.unit, out.diagnostic());
                tracing::warn!(unit = %self.unit, action = action.verb(), "{}", diagnostic);
                LifecycleReport::failed(action, diagnostic)
            }
            Err(e) => {
                tracing::warn!(unit = %self.unit, action = action.verb(), error = %e, "supervisor unavailable");
                LifecycleReport::failed(action, e.to_string())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeSupervisor;
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn controller<'a>(
        sup: &'a FakeSupervisor,
        dir: &TempDir,
    ) -> ServiceController<&'a FakeSupervisor> {
        let settings = ServiceSection {
            log_path: dir.path().join("zivpn.log"),
            log_lines: 2,
            ..Default::default()
        };
        ServiceController::new(sup, &settings).with_settle(Duration::ZERO)
    }

    #[test]
    fn test_status_running_with_log() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("zivpn.log"), "boot\nlisten :5667\nclient ok\n").unwrap();
        let sup = FakeSupervisor {
            pid: Some(4_000_000_000),
            ..FakeSupervisor::running()
        };
        let status = controller(&sup, &dir).status().unwrap();
        assert!(status.running);
        assert!(status.autostart_enabled);
        assert_eq!(status.pid, Some(4_000_000_000));
        // pid does not resolve to a live process
        assert!(status.process.is_none());
        assert_eq!(status.log_tail, vec!["listen :5667", "client ok"]);
    }

    #[test]
    fn test_status_stopped_omits_pid() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor {
            pid: Some(99),
            ..FakeSupervisor::stopped()
        };
        let status = controller(&sup, &dir).status().unwrap();
        assert!(!status.running);
        assert!(!status.autostart_enabled);
        assert_eq!(status.pid, None);
        assert!(status.log_tail.is_empty());
        assert!(!sup.verbs().contains(&"show".to_string()));
    }

    #[test]
    fn test_status_zero_pid_is_absent() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor::running();
        let status = controller(&sup, &dir).status().unwrap();
        assert!(status.running);
        assert_eq!(status.pid, None);
    }

    #[test]
    fn test_status_supervisor_unavailable() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor {
            unavailable: true,
            ..Default::default()
        };
        assert!(matches!(
            controller(&sup, &dir).status(),
            Err(crate::error::ZimanError::SupervisorUnavailable(_))
        ));
    }

    #[test]
    fn test_start_stop() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor::stopped();
        let ctl = controller(&sup, &dir);
        assert!(ctl.start().ok);
        assert!(ctl.is_active().unwrap());
        assert!(ctl.stop().ok);
        assert!(!ctl.is_active().unwrap());
    }

    #[test]
    fn test_restart_verified() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor::running();
        let report = controller(&sup, &dir).restart();
        assert!(report.ok);
        assert_eq!(report.verified_active, Some(true));
        assert_eq!(report.diagnostic, None);
        assert_eq!(sup.verbs(), vec!["restart", "is-active"]);
    }

    #[test]
    fn test_restart_not_active_afterwards_warns() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor {
            restart_comes_up: false,
            ..FakeSupervisor::running()
        };
        let report = controller(&sup, &dir).restart();
        assert!(report.ok);
        assert_eq!(report.verified_active, Some(false));
        assert!(report.diagnostic.unwrap().contains("not active after restart"));
    }

    #[test]
    fn test_restart_failure_reported() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor {
            fail_verbs: vec!["restart"],
            ..FakeSupervisor::running()
        };
        let report = controller(&sup, &dir).restart();
        assert!(!report.ok);
        assert!(report.diagnostic.unwrap().contains("failed"));
        assert_eq!(report.verified_active, None);
        assert_eq!(sup.verbs(), vec!["restart"]);
    }

    #[test]
    fn test_lifecycle_without_supervisor_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let sup = FakeSupervisor {
            unavailable: true,
            ..Default::default()
        };
        let report = controller(&sup, &dir).start();
        assert!(!report.ok);
        assert!(report.diagnostic.unwrap().contains("unavailable"));
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = CommandOutput {
            success: false,
            stdout: "out\n".into(),
            stderr: " err \n".into(),
        };
        assert_eq!(out.diagnostic(), "err");
        let out = CommandOutput {
            success: false,
            stdout: "out\n".into(),
            stderr: String::new(),
        };
        assert_eq!(out.diagnostic(), "out");
    }
}
