use crate::cli::CliContext;
use crate::core::service::LifecycleReport;
use crate::models::status::{format_bytes, format_uptime, ServiceStatus};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    /// Start the service
    Start,
    /// Stop the service
    Stop,
    /// Restart the service and verify it comes back
    Restart,
    /// Show running/enabled state and process figures
    Status,
}

impl ServiceCommand {
    pub fn mutates(&self) -> bool {
        !matches!(self, ServiceCommand::Status)
    }
}

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Number of lines (default from settings)
    #[arg(long, short = 'n')]
    pub lines: Option<usize>,
}

pub fn run(ctx: &CliContext, cmd: ServiceCommand) -> Result<()> {
    let mgr = ctx.manager();
    let service = mgr.service();
    let report = match cmd {
        ServiceCommand::Start => service.start(),
        ServiceCommand::Stop => service.stop(),
        ServiceCommand::Restart => service.restart(),
        ServiceCommand::Status => {
            print_status(&service.status()?);
            return Ok(());
        }
    };
    print_report(service.unit(), &report)
}

pub fn run_logs(ctx: &CliContext, args: LogsArgs) -> Result<()> {
    let mgr = ctx.manager();
    let service = mgr.service();
    let lines = args.lines.unwrap_or(ctx.settings.service.log_lines);
    let tail = service.logs(lines)?;
    if tail.is_empty() {
        println!("No log entries at {}", service.log_path().display());
        return Ok(());
    }
    for line in tail {
        println!("{}", line);
    }
    Ok(())
}

/// Print a lifecycle result; a failed transition is an error, an unverified
/// restart only a warning.
pub(crate) fn print_report(unit: &str, report: &LifecycleReport) -> Result<()> {
    if !report.ok {
        bail!(
            "{}",
            report
                .diagnostic
                .clone()
                .unwrap_or_else(|| format!("{} {} failed", report.action.verb(), unit))
        );
    }
    match &report.diagnostic {
        Some(diagnostic) => eprintln!("warning: {}", diagnostic),
        None => println!("Service {}: {} ok", unit, report.action.verb()),
    }
    Ok(())
}

pub(crate) fn print_status(status: &ServiceStatus) {
    println!("Service:    {}", status.unit);
    println!(
        "State:      {}",
        if status.running { "running" } else { "stopped" }
    );
    println!(
        "Autostart:  {}",
        if status.autostart_enabled { "enabled" } else { "disabled" }
    );
    if let Some(pid) = status.pid {
        println!("PID:        {}", pid);
    }
    if let Some(p) = &status.process {
        println!("Uptime:     {}", format_uptime(p.uptime));
        println!("Memory:     {}", format_bytes(p.resident_memory_bytes));
        println!("CPU:        {:.1}%", p.cpu_percent);
    }
    if !status.log_tail.is_empty() {
        println!("\nRecent log:");
        for line in &status.log_tail {
            println!("  {}", line);
        }
    }
}
