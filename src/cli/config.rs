use crate::cli::dashboard::print_metadata;
use crate::cli::CliContext;
use crate::constants;
use crate::util::fs::backup_copy;
use anyhow::Result;
use chrono::Local;

pub fn run_details(ctx: &CliContext) -> Result<()> {
    let mgr = ctx.manager();
    let store = mgr.store();
    let meta = store.metadata()?;
    let doc = store.load()?;

    print_metadata(&meta);
    println!("Auth:       {}", doc.auth_method().unwrap_or("-"));
    println!(
        "Listen:     {}",
        doc.listen_address().as_deref().unwrap_or("-")
    );
    println!("Passwords:  {}", doc.credentials().len());
    println!("Settings:   {}", ctx.paths.settings.display());
    Ok(())
}

pub fn run_backup(ctx: &CliContext) -> Result<()> {
    let target = backup_copy(&ctx.paths.config, Local::now(), constants::CONFIG_FILE_MODE)?;
    tracing::info!(backup = %target.display(), "config backed up");
    println!("Backup written to {}", target.display());
    Ok(())
}
