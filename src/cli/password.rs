use crate::cli::CliContext;
use crate::constants;
use crate::core::credentials::{Change, CredentialManager, RestartOutcome};
use crate::core::service::Supervisor;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use dialoguer::{Confirm, Input, Password, Select};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Password to add (prompted when omitted)
    pub password: Option<String>,

    /// Accept a password shorter than the policy minimum
    #[arg(long)]
    pub allow_weak: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Password length (clamped to 8-32; default from settings)
    #[arg(long, short)]
    pub length: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Number shown by `list` (prompted when omitted)
    pub index: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct ListOutput<'a> {
    passwords: &'a [String],
    total: usize,
}

pub fn run_add(ctx: &CliContext, args: AddArgs) -> Result<()> {
    let mgr = ctx.manager();
    let candidate = match args.password {
        Some(p) => p.trim().to_string(),
        None => {
            if ctx.non_interactive {
                bail!("--non-interactive requires the password as an argument");
            }
            Password::new()
                .with_prompt("New password")
                .with_confirmation("Repeat password", "passwords do not match")
                .interact()
                .context("read password from prompt")?
                .trim()
                .to_string()
        }
    };

    let allow_weak = args.allow_weak || confirm_weak(ctx, &mgr, &candidate)?;
    let change = mgr.add(&candidate, allow_weak)?;
    println!("Added password '{}' ({} total)", change.credential, change.remaining);
    report_restart(mgr.service().unit(), &change);
    Ok(())
}

pub fn run_generate(ctx: &CliContext, args: GenerateArgs) -> Result<()> {
    let length = args
        .length
        .unwrap_or(ctx.settings.policy.default_generated_length);
    generate_with_length(ctx, length)
}

pub(crate) fn generate_with_length(ctx: &CliContext, length: usize) -> Result<()> {
    let mgr = ctx.manager();
    let (generated, change) = mgr.add_generated(length)?;
    if let Some(actual) = generated.clamped_to {
        eprintln!(
            "warning: length {} outside {}-{}, using {}",
            generated.requested,
            constants::MIN_GENERATED_LENGTH,
            constants::MAX_GENERATED_LENGTH,
            actual
        );
    }
    println!("Generated password: {}", generated.password);
    println!("Added ({} total)", change.remaining);
    report_restart(mgr.service().unit(), &change);
    Ok(())
}

/// Prompt for the generated length, with the settings default.
pub(crate) fn prompt_length(ctx: &CliContext) -> Result<usize> {
    let length: usize = Input::new()
        .with_prompt("Password length")
        .default(ctx.settings.policy.default_generated_length)
        .interact_text()
        .context("read length")?;
    Ok(length)
}

pub fn run_remove(ctx: &CliContext, args: RemoveArgs) -> Result<()> {
    let mgr = ctx.manager();
    let snapshot = mgr.list()?;

    let index = match args.index {
        Some(index) => index,
        None if snapshot.is_empty() => {
            println!("No passwords to remove");
            return Ok(());
        }
        None => {
            if ctx.non_interactive {
                bail!("--non-interactive requires the password number as an argument");
            }
            let items: Vec<String> = snapshot
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{:3}. {}", i + 1, p))
                .collect();
            let Some(choice) = Select::new()
                .with_prompt("Password to remove (Esc to cancel)")
                .items(&items)
                .default(0)
                .interact_opt()
                .context("read selection")?
            else {
                println!("Cancelled");
                return Ok(());
            };
            choice + 1
        }
    };

    let change = mgr.remove(index, &snapshot)?;
    println!("Removed password '{}' ({} left)", change.credential, change.remaining);
    report_restart(mgr.service().unit(), &change);
    Ok(())
}

pub fn run_list(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let passwords = ctx.manager().list()?;

    if args.format == "json" {
        let out = ListOutput {
            passwords: &passwords,
            total: passwords.len(),
        };
        let json = serde_json::to_string_pretty(&out).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if passwords.is_empty() {
        println!("No passwords registered");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Password").add_attribute(Attribute::Bold),
    ]);
    for (idx, password) in passwords.iter().enumerate() {
        table.add_row(vec![(idx + 1).to_string(), password.clone()]);
    }
    println!("{}", table);
    println!("\nTotal: {} password(s)", passwords.len());
    Ok(())
}

/// Ask before accepting a short password. Non-interactive callers must pass
/// `--allow-weak` instead.
fn confirm_weak<S: Supervisor>(
    ctx: &CliContext,
    mgr: &CredentialManager<S>,
    candidate: &str,
) -> Result<bool> {
    let policy = mgr.policy();
    if ctx.non_interactive || candidate.trim().is_empty() || !policy.is_weak(candidate) {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(format!(
            "Password is shorter than {} characters. Add it anyway?",
            policy.min_password_length
        ))
        .default(false)
        .interact()
        .context("read confirmation")
}

pub(crate) fn report_restart(unit: &str, change: &Change) {
    match &change.restart {
        RestartOutcome::Restarted { report } if !report.ok => {
            eprintln!(
                "warning: {} (configuration saved; it applies on the next restart)",
                report.diagnostic.as_deref().unwrap_or("restart failed")
            );
        }
        RestartOutcome::Restarted { report } => match report.verified_active {
            Some(true) => println!("Service {} restarted", unit),
            _ => eprintln!(
                "warning: {}",
                report
                    .diagnostic
                    .as_deref()
                    .unwrap_or("restart issued but not verified")
            ),
        },
        RestartOutcome::SkippedInactive => {
            println!("Service {} is not running; the change applies when it starts", unit)
        }
        RestartOutcome::SkippedUnknown { reason } => {
            eprintln!(
                "warning: cannot read {} state ({}); restart it manually",
                unit, reason
            )
        }
    }
}
