//! Centralized constants for paths, limits, and policy defaults.

/// Default location of the ZIVPN configuration document.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/zivpn/config.json";

/// Default location of the operator settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/zivpn/ziman.toml";

/// Default systemd unit managed by this tool.
pub const DEFAULT_SERVICE_NAME: &str = "zivpn";

/// Default append-only service log.
pub const DEFAULT_LOG_PATH: &str = "/var/log/zivpn.log";

/// Seconds to wait after a restart before re-checking the service.
pub const DEFAULT_SETTLE_SECS: u64 = 2;

/// Number of log lines shown by default.
pub const DEFAULT_LOG_LINES: usize = 20;

/// Passwords shorter than this need an explicit override.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Length used when the operator does not pick one.
pub const DEFAULT_GENERATED_LENGTH: usize = 12;

/// Supported range for generated passwords (inclusive).
pub const MIN_GENERATED_LENGTH: usize = 8;
pub const MAX_GENERATED_LENGTH: usize = 32;

/// Punctuation characters eligible for generated passwords.
pub const PUNCTUATION: &[u8] = b"!@#$%^&*";

/// Indentation used when writing the configuration document.
pub const CONFIG_INDENT: &[u8] = b"  ";

/// Permission mode for the configuration document and its backups.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Suffix appended to the config path for the advisory lock file.
pub const LOCK_SUFFIX: &str = ".lock";

/// Address used to discover the primary outbound interface (no packets are sent).
pub const OUTBOUND_PROBE_ADDR: &str = "8.8.8.8:80";
