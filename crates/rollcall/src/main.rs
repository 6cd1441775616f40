//! `rollcall` - CLI and server for the attendance tracker.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::Context;
use clap::Parser;

use rollcall::cli::{Cli, Collection, Command, ConfigCommand, ExportCommand, ServeCommand};
use rollcall::{init_logging, server, Config, DashboardStats, Tracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Serve(cmd) => handle_serve(config, cmd).await,
        Command::Stats(cmd) => handle_stats(&config, cmd.json),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: ServeCommand) -> anyhow::Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    config.validate()?;
    server::serve(&config).await?;
    Ok(())
}

fn handle_stats(config: &Config, json: bool) -> anyhow::Result<()> {
    let tracker = Tracker::from_config(config)?;
    let stats = tracker.dashboard_stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn print_stats(stats: &DashboardStats) {
    println!("Dashboard");
    println!("=========");
    println!("  Students:  {}", stats.total_students);
    println!("  Present:   {}", stats.present_today);
    println!("  Absent:    {}", stats.absent_today);
    println!("  Late:      {}", stats.late_today);
    println!();
    println!("[Years]");
    for (year, count) in &stats.year_distribution {
        println!("  {year:<10} {count}");
    }
    println!();
    println!("[Sections]");
    for (section, count) in &stats.section_distribution {
        println!("  {section:<10} {count}");
    }
    println!();
    println!("[Present, last 7 days]");
    for day in &stats.weekly_trend {
        println!("  {}  {}", day.date, day.present);
    }
}

fn handle_export(config: &Config, cmd: &ExportCommand) -> anyhow::Result<()> {
    let tracker = Tracker::from_config(config)?;
    let bytes = match cmd.collection {
        Collection::Students => tracker.export_students()?,
        Collection::Attendance => tracker.export_attendance()?,
    };
    match &cmd.output {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(cmd.collection.export_file_name())
            } else {
                path.clone()
            };
            std::fs::write(&path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => std::io::stdout().lock().write_all(&bytes)?,
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Address:          {}", config.bind_address());
                println!();
                println!("[Storage]");
                println!("  Data directory:   {}", config.storage.data_dir().display());
                println!(
                    "  Students file:    {}",
                    config.storage.students_path().display()
                );
                println!(
                    "  Attendance file:  {}",
                    config.storage.attendance_path().display()
                );
                println!("  Atomic rewrite:   {}", config.storage.atomic_rewrite);
                println!();
                println!("[Notifier]");
                println!("  Channel capacity: {}", config.notifier.channel_capacity);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
