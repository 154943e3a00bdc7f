//! Best-effort host network inspection.
//!
//! Each part is collected independently; a part that cannot be read is left
//! as `None` instead of being replaced with a placeholder.

use crate::constants;
use crate::core::dashboard::NetworkInspector;
use crate::error::{Result, ZimanError};
use crate::models::status::{InterfaceAddrs, ListeningSocket, NetworkSnapshot};
use std::net::{IpAddr, SocketAddrV4, SocketAddrV6, UdpSocket};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Default)]
pub struct HostNetwork;

impl NetworkInspector for HostNetwork {
    fn inspect(&self) -> Result<NetworkSnapshot> {
        let snapshot = NetworkSnapshot {
            outbound_ip: outbound_ip(),
            interfaces: interfaces(),
            listening: listening_sockets(),
        };
        if snapshot.outbound_ip.is_none()
            && snapshot.interfaces.is_none()
            && snapshot.listening.is_none()
        {
            return Err(ZimanError::Inspection(
                "no network information could be collected".into(),
            ));
        }
        Ok(snapshot)
    }
}

/// Source address the kernel picks for outbound traffic. Connecting a UDP
/// socket sends nothing.
pub fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(constants::OUTBOUND_PROBE_ADDR).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

pub fn interfaces() -> Option<Vec<InterfaceAddrs>> {
    let addrs = match nix::ifaddrs::getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::debug!(error = %e, "getifaddrs failed");
            return None;
        }
    };
    let mut out: Vec<InterfaceAddrs> = Vec::new();
    for ifa in addrs {
        let ip = ifa.address.as_ref().and_then(|storage| {
            if let Some(v4) = storage.as_sockaddr_in() {
                Some(IpAddr::V4(*SocketAddrV4::from(*v4).ip()))
            } else {
                storage
                    .as_sockaddr_in6()
                    .map(|v6| IpAddr::V6(*SocketAddrV6::from(*v6).ip()))
            }
        });
        let entry = match out.iter_mut().position(|i| i.name == ifa.interface_name) {
            Some(idx) => &mut out[idx],
            None => {
                out.push(InterfaceAddrs {
                    name: ifa.interface_name.clone(),
                    addresses: Vec::new(),
                });
                let last = out.len() - 1;
                &mut out[last]
            }
        };
        if let Some(ip) = ip {
            if !entry.addresses.contains(&ip) {
                entry.addresses.push(ip);
            }
        }
    }
    Some(out)
}

/// Listening TCP and UDP sockets as reported by `ss`.
pub fn listening_sockets() -> Option<Vec<ListeningSocket>> {
    let output = Command::new("ss")
        .args(["-H", "-l", "-n", "-p", "-t", "-u"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        tracing::debug!(status = ?output.status.code(), "ss exited with failure");
        return None;
    }
    Some(parse_ss(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `ss -H -lnptu` output.
pub fn parse_ss(output: &str) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }
        let (bind, port) = match fields[4].rsplit_once(':') {
            Some((bind, port)) => match port.parse::<u16>() {
                Ok(port) => (bind, port),
                Err(_) => continue,
            },
            None => continue,
        };
        let owner_pid = fields.get(6..).and_then(|rest| parse_pid(&rest.join(" ")));
        sockets.push(ListeningSocket {
            protocol: fields[0].to_string(),
            port,
            bind_address: bind.to_string(),
            owner_pid,
        });
    }
    sockets
}

fn parse_pid(process: &str) -> Option<u32> {
    let start = process.find("pid=")? + 4;
    let digits: String = process[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
