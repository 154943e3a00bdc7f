//! Core logic: config persistence, password management, service control.

pub mod config_store;
pub mod credentials;
pub mod dashboard;
pub mod file_lock;
pub mod generator;
pub mod paths;
pub mod service;
