use crate::cli::service::print_status;
use crate::cli::CliContext;
use crate::core::dashboard::{NetworkInspector, StatusAggregator};
use crate::models::status::{format_bytes, ConfigMetadata, DashboardSnapshot, NetworkSnapshot, Probe};
use crate::util::network::HostNetwork;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

pub fn run(ctx: &CliContext, args: DashboardArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let mgr = ctx.manager();
    let snap = StatusAggregator::new(&mgr, HostNetwork).snapshot();

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&snap).context("serialize dashboard")?;
        println!("{}", json);
        return Ok(());
    }
    print_dashboard(&snap);
    Ok(())
}

pub fn run_network() -> Result<()> {
    let snap = HostNetwork.inspect()?;
    print_network(&snap);
    Ok(())
}

fn print_dashboard(snap: &DashboardSnapshot) {
    println!("== Service ==");
    match &snap.service {
        Probe::Available(status) => print_status(status),
        Probe::Unavailable(reason) => println!("unavailable: {}", reason),
    }

    println!("\n== Passwords ==");
    match &snap.credential_count {
        Probe::Available(n) => println!("Registered: {}", n),
        Probe::Unavailable(reason) => println!("unavailable: {}", reason),
    }
    if let Some(listen) = &snap.listen_address {
        println!("Listen:     {}", listen);
    }

    println!("\n== Config ==");
    match &snap.config {
        Probe::Available(meta) => print_metadata(meta),
        Probe::Unavailable(reason) => println!("unavailable: {}", reason),
    }

    println!("\n== Network ==");
    match &snap.network {
        Probe::Available(net) => print_network(net),
        Probe::Unavailable(reason) => println!("unavailable: {}", reason),
    }
}

pub(crate) fn print_metadata(meta: &ConfigMetadata) {
    println!("Path:       {}", meta.path.display());
    println!("Size:       {}", format_bytes(meta.size_bytes));
    match meta.last_modified {
        Some(t) => {
            let local: DateTime<Local> = t.into();
            println!("Modified:   {}", local.format("%Y-%m-%d %H:%M:%S"));
        }
        None => println!("Modified:   unknown"),
    }
    println!("Keys:       {}", meta.top_level_keys.join(", "));
}

fn print_network(net: &NetworkSnapshot) {
    match net.outbound_ip {
        Some(ip) => println!("Outbound IP: {}", ip),
        None => println!("Outbound IP: unavailable"),
    }

    match &net.interfaces {
        Some(ifaces) if !ifaces.is_empty() => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Interface").add_attribute(Attribute::Bold),
                Cell::new("Addresses").add_attribute(Attribute::Bold),
            ]);
            for iface in ifaces {
                let addrs: Vec<String> = iface.addresses.iter().map(|a| a.to_string()).collect();
                table.add_row(vec![iface.name.clone(), addrs.join("\n")]);
            }
            println!("{}", table);
        }
        Some(_) => println!("Interfaces: none"),
        None => println!("Interfaces: unavailable"),
    }

    match &net.listening {
        Some(sockets) if !sockets.is_empty() => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Proto").add_attribute(Attribute::Bold),
                Cell::new("Port").add_attribute(Attribute::Bold),
                Cell::new("Bind").add_attribute(Attribute::Bold),
                Cell::new("PID").add_attribute(Attribute::Bold),
            ]);
            for s in sockets {
                table.add_row(vec![
                    s.protocol.clone(),
                    s.port.to_string(),
                    s.bind_address.clone(),
                    s.owner_pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
                ]);
            }
            println!("{}", table);
        }
        Some(_) => println!("Listening sockets: none"),
        None => println!("Listening sockets: unavailable"),
    }
}
