//! Per-process resource figures via sysinfo.

use crate::models::status::ProcessMetrics;
use std::thread;
use std::time::Duration;
use sysinfo::{Pid, System};

/// CPU usage is a delta between two refreshes.
const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Uptime, RSS, and CPU of `pid`, or `None` if no such process exists.
pub fn metrics(pid: u32) -> Option<ProcessMetrics> {
    let pid = Pid::from_u32(pid);
    let mut sys = System::new();
    if !sys.refresh_process(pid) {
        return None;
    }
    thread::sleep(CPU_SAMPLE_INTERVAL);
    sys.refresh_process(pid);
    let process = sys.process(pid)?;
    Some(ProcessMetrics {
        uptime: Duration::from_secs(process.run_time()),
        resident_memory_bytes: process.memory(),
        cpu_percent: process.cpu_usage(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_resolves() {
        let m = metrics(std::process::id()).expect("current process visible");
        assert!(m.resident_memory_bytes > 0);
    }

    #[test]
    fn test_impossible_pid_is_none() {
        // above any kernel pid_max
        assert!(metrics(4_000_000_000).is_none());
    }
}
