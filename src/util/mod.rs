//! Host utilities: filesystem, systemd, logs, processes, network.

pub mod fs;
pub mod logfile;
pub mod network;
pub mod privilege;
pub mod process;
pub mod systemd;
