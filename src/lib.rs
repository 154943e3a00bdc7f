//! ZIVPN password manager.
//!
//! Keeps the password list in the ZIVPN configuration document consistent
//! with the running service: atomic config edits, restart-on-change, password
//! generation, and a status dashboard.
//!
//! ## Modules
//! - `cli` — Command-line handlers and the interactive menu
//! - `core` — Config store, password manager, service control, dashboard
//! - `models` — Data structures
//! - `util` — Host utilities (systemctl, logs, processes, network)

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;
