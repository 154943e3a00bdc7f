//! Interactive menu over the same handlers the subcommands use.

use crate::cli::{config, dashboard, password, service, CliContext};
use crate::error::ZimanError;
use anyhow::{Context, Result};
use dialoguer::console::Term;
use dialoguer::{Input, Select};

const ITEMS: &[&str] = &[
    "Dashboard",
    "List passwords",
    "Add password",
    "Generate password",
    "Remove password",
    "Service status",
    "Start service",
    "Stop service",
    "Restart service",
    "Show logs",
    "Config details",
    "Network",
    "Backup config",
    "Exit",
];

pub fn run(ctx: &CliContext) -> Result<()> {
    let term = Term::stdout();
    loop {
        // clearing fails when stdout is not a tty; the menu still works
        let _ = term.clear_screen();
        let choice = Select::new()
            .with_prompt(format!("ziman ({})", ctx.paths))
            .items(ITEMS)
            .default(0)
            .interact_opt()
            .context("read menu selection")?;

        let Some(choice) = choice else {
            return Ok(());
        };
        if ITEMS[choice] == "Exit" {
            return Ok(());
        }

        if let Err(e) = dispatch(ctx, ITEMS[choice]) {
            match e.downcast_ref::<ZimanError>() {
                // operator input mistakes
                Some(inner) if inner.is_user_error() => eprintln!("{}", inner),
                _ => eprintln!("error: {:#}", e),
            }
        }
        pause()?;
    }
}

fn dispatch(ctx: &CliContext, item: &str) -> Result<()> {
    match item {
        "Dashboard" => dashboard::run(
            ctx,
            dashboard::DashboardArgs {
                format: "table".into(),
            },
        ),
        "List passwords" => password::run_list(
            ctx,
            password::ListArgs {
                format: "table".into(),
            },
        ),
        "Add password" => password::run_add(
            ctx,
            password::AddArgs {
                password: None,
                allow_weak: false,
            },
        ),
        "Generate password" => {
            let length = password::prompt_length(ctx)?;
            password::generate_with_length(ctx, length)
        }
        "Remove password" => password::run_remove(ctx, password::RemoveArgs { index: None }),
        "Service status" => service::run(ctx, service::ServiceCommand::Status),
        "Start service" => service::run(ctx, service::ServiceCommand::Start),
        "Stop service" => service::run(ctx, service::ServiceCommand::Stop),
        "Restart service" => service::run(ctx, service::ServiceCommand::Restart),
        "Show logs" => service::run_logs(ctx, service::LogsArgs { lines: None }),
        "Config details" => config::run_details(ctx),
        "Network" => dashboard::run_network(),
        "Backup config" => config::run_backup(ctx),
        _ => Ok(()),
    }
}

fn pause() -> Result<()> {
    let _: String = Input::new()
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()
        .context("read confirmation")?;
    Ok(())
}
