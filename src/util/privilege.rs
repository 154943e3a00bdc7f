//! Privilege checks for operations that touch /etc and systemd.

/// Check if the current process is running as root (euid 0).
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Warning shown to non-root operators, if any.
pub fn root_warning() -> Option<&'static str> {
    if is_root() {
        None
    } else {
        Some("some operations may require root privileges; consider running with sudo")
    }
}
