//! Data structures shared by core and CLI.

pub mod config_doc;
pub mod settings;
pub mod status;
