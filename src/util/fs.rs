use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(mode);
        fs::set_permissions(path, perm)
            .with_context(|| format!("set permissions {:o} on {}", mode, path.display()))?;
    }
    Ok(())
}

/// Copy `path` to `<path>.bak-<timestamp>` and return the new path.
pub fn backup_copy(path: &Path, now: DateTime<Local>, mode: u32) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .with_context(|| format!("no file name in {}", path.display()))?;
    name.push(format!(".bak-{}", now.format("%Y%m%d-%H%M%S")));
    let target = path.with_file_name(name);
    fs::copy(path, &target)
        .with_context(|| format!("copy {} to {}", path.display(), target.display()))?;
    set_permissions(&target, mode)?;
    Ok(target)
}
