//! Point-in-time observations of the service and the host.

use serde::Serialize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Outcome of a best-effort query: data or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Probe<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Probe<T> {
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Probe::Available(v),
            Err(e) => Probe::Unavailable(e.to_string()),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Probe::Available(v) => Some(v),
            Probe::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Probe::Available(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub unit: String,
    pub running: bool,
    pub autostart_enabled: bool,
    /// Main process id, only while running.
    pub pid: Option<u32>,
    /// Present only when `pid` resolves to a live process.
    pub process: Option<ProcessMetrics>,
    /// Last lines of the service log; empty when the log does not exist.
    pub log_tail: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    #[serde(with = "duration_secs")]
    pub uptime: Duration,
    pub resident_memory_bytes: u64,
    pub cpu_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigMetadata {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub last_modified: Option<SystemTime>,
    pub top_level_keys: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub outbound_ip: Option<IpAddr>,
    pub interfaces: Option<Vec<InterfaceAddrs>>,
    pub listening: Option<Vec<ListeningSocket>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceAddrs {
    pub name: String,
    pub addresses: Vec<IpAddr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListeningSocket {
    pub protocol: String,
    pub port: u16,
    pub bind_address: String,
    pub owner_pid: Option<u32>,
}

/// Everything the dashboard shows, gathered in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub service: Probe<ServiceStatus>,
    pub credential_count: Probe<usize>,
    pub config: Probe<ConfigMetadata>,
    pub listen_address: Option<String>,
    pub network: Probe<NetworkSnapshot>,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

/// Render a duration as `1d 02h 03m` style text.
pub fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{}d {:02}h {:02}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else {
        format!("{}m {:02}s", minutes, secs % 60)
    }
}

/// Render a byte count with a binary unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
