//! CLI routing and command dispatch.

use crate::core::config_store::ConfigStore;
use crate::core::credentials::CredentialManager;
use crate::core::paths::ZimanPaths;
use crate::core::service::ServiceController;
use crate::models::settings::Settings;
use crate::util::privilege;
use crate::util::systemd::Systemctl;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod dashboard;
pub mod menu;
pub mod password;
pub mod service;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: ZimanPaths,
    pub settings: Settings,
    pub settings_warning: Option<String>,
    pub non_interactive: bool,
}

impl CliContext {
    /// A fresh manager bound to the resolved config path and the host systemd.
    pub fn manager(&self) -> CredentialManager<Systemctl> {
        let store = ConfigStore::new(&self.paths);
        let service = ServiceController::new(Systemctl::default(), &self.settings.service);
        CredentialManager::new(store, service, self.settings.policy.clone())
    }
}

#[derive(Parser, Debug)]
#[command(name = "ziman", version, about = "Password manager for the ZIVPN service")]
pub struct Cli {
    /// Path to the ZIVPN config.json
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to the ziman.toml settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// systemd unit to manage (overrides settings)
    #[arg(long, global = true, env = "ZIMAN_SERVICE", value_name = "UNIT")]
    pub service: Option<String>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "ZIMAN_NON_INTERACTIVE")]
    pub non_interactive: bool,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let paths = ZimanPaths::resolve(self.config, self.settings);

        // Settings are optional; a broken file falls back to defaults with a warning.
        let (mut settings, settings_warning) = match load_settings(&paths.settings) {
            Ok(s) => (s, None),
            Err(e) => (
                Settings::default(),
                Some(format!("ignoring {}: {:#}", paths.settings.display(), e)),
            ),
        };
        if let Some(unit) = self.service {
            settings.service.name = unit;
        }

        let ctx = CliContext {
            paths,
            settings,
            settings_warning,
            non_interactive: self.non_interactive,
        };
        if let Some(w) = &ctx.settings_warning {
            eprintln!("warning: {}", w);
        }

        let command = match self.command {
            Some(command) => command,
            None if ctx.non_interactive => {
                bail!("no command given (see --help); the menu needs an interactive terminal")
            }
            None => Commands::Menu,
        };

        if command.mutates() {
            if let Some(w) = privilege::root_warning() {
                eprintln!("warning: {}", w);
            }
        }

        match command {
            Commands::Add(args) => password::run_add(&ctx, args),
            Commands::Generate(args) => password::run_generate(&ctx, args),
            Commands::Remove(args) => password::run_remove(&ctx, args),
            Commands::List(args) => password::run_list(&ctx, args),
            Commands::Dashboard(args) => dashboard::run(&ctx, args),
            Commands::Service { command } => service::run(&ctx, command),
            Commands::Logs(args) => service::run_logs(&ctx, args),
            Commands::Config => config::run_details(&ctx),
            Commands::Network => dashboard::run_network(),
            Commands::Backup => config::run_backup(&ctx),
            Commands::Menu => menu::run(&ctx),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a password (prompted when omitted)
    Add(password::AddArgs),
    /// Generate a random password and add it
    Generate(password::GenerateArgs),
    /// Remove a password by its number in `list`
    Remove(password::RemoveArgs),
    /// List registered passwords
    List(password::ListArgs),
    /// Service, password, config, and network overview
    Dashboard(dashboard::DashboardArgs),
    /// Start, stop, restart, or inspect the service
    Service {
        #[command(subcommand)]
        command: service::ServiceCommand,
    },
    /// Show the last lines of the service log
    Logs(service::LogsArgs),
    /// Show configuration file details
    Config,
    /// Show network interfaces and listening sockets
    Network,
    /// Copy the configuration to a timestamped backup
    Backup,
    /// Interactive menu (default when no command is given)
    Menu,
}

impl Commands {
    /// Whether this command writes the config or changes the service.
    pub fn mutates(&self) -> bool {
        match self {
            Commands::Add(_)
            | Commands::Generate(_)
            | Commands::Remove(_)
            | Commands::Backup
            | Commands::Menu => true,
            Commands::Service { command } => command.mutates(),
            _ => false,
        }
    }
}

/// Install the stderr tracing subscriber. `ZIMAN_LOG` takes precedence.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ZIMAN_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    // a second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("read settings {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse settings {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_settings_missing_is_default() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("ziman.toml")).unwrap();
        assert_eq!(settings.service.name, "zivpn");
    }

    #[test]
    fn test_load_settings_malformed_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ziman.toml");
        fs::write(&path, "[service\nname=").unwrap();
        assert!(load_settings(&path).is_err());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["ziman", "--config", "/tmp/c.json", "remove", "2"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(
            cli.command,
            Some(Commands::Remove(password::RemoveArgs { index: Some(2) }))
        ));

        let cli = Cli::try_parse_from(["ziman", "add", "secret1", "--allow-weak"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.password.as_deref(), Some("secret1"));
                assert!(args.allow_weak);
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = Cli::try_parse_from(["ziman"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_mutating_commands() {
        let cli = Cli::try_parse_from(["ziman", "service", "restart"]).unwrap();
        assert!(cli.command.unwrap().mutates());
        let cli = Cli::try_parse_from(["ziman", "service", "status"]).unwrap();
        assert!(!cli.command.unwrap().mutates());
        let cli = Cli::try_parse_from(["ziman", "list"]).unwrap();
        assert!(!cli.command.unwrap().mutates());
    }
}
