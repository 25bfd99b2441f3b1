// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ricochet CLI entrypoint.
//!
//! # Usage
//! ```text
//! ricochet [--config-dir DIR] run [drop|pong|mixed] [--steps N] [--dt SECONDS] [--json]
//! ricochet [--config-dir DIR] settings [--save-defaults]
//! ```
//!
//! Settings come from `physics.json` in the config directory; a missing or
//! unreadable file falls back to the defaults. Logs go to stderr and honour
//! `RUST_LOG`.

// The CLI is expected to print to stdout.
#![allow(clippy::print_stdout)]

mod demo;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ricochet_config_fs::FsConfigStore;
use ricochet_core::config::{ConfigError, ConfigService};
use ricochet_core::PhysicsSettings;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::demo::{Demo, Report};

#[derive(Parser, Debug)]
#[command(name = "ricochet", author, version, about = "Ricochet rigid-body demos and settings")]
struct Cli {
    /// Config directory (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Step a demo scene and print a report
    Run {
        /// Scene to simulate
        #[arg(value_enum, default_value_t = Demo::Drop)]
        demo: Demo,
        /// Number of fixed steps
        #[arg(long, default_value_t = 120)]
        steps: u64,
        /// Step length in seconds (defaults to the configured fixed time step)
        #[arg(long)]
        dt: Option<f32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective settings as JSON
    Settings {
        /// Write the default settings to the config directory first
        #[arg(long)]
        save_defaults: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    match cli.command {
        Commands::Run {
            demo,
            steps,
            dt,
            json,
        } => {
            let settings = load_settings(cli.config_dir.as_deref());
            let dt = dt.unwrap_or(settings.fixed_time_step);
            if !dt.is_finite() || dt <= 0.0 {
                bail!("--dt must be a positive number of seconds, got {dt}");
            }
            let mut scene = demo::build(demo, settings)?;
            let report = demo::run(&mut scene, steps, dt)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Settings { save_defaults } => {
            let service = ConfigService::new(open_store(cli.config_dir.as_deref())?);
            if save_defaults {
                service.save_settings(&PhysicsSettings::default())?;
                info!(path = %service.store().base().display(), "saved default settings");
            }
            let settings = service.load_settings()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }
    Ok(())
}

fn open_store(dir: Option<&Path>) -> Result<FsConfigStore, ConfigError> {
    match dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
}

/// Best-effort: a broken config never stops a run.
fn load_settings(dir: Option<&Path>) -> PhysicsSettings {
    let loaded = open_store(dir).and_then(|store| ConfigService::new(store).load_settings());
    loaded.unwrap_or_else(|err| {
        warn!(%err, "using default settings");
        PhysicsSettings::default()
    })
}

fn print_report(report: &Report) {
    println!(
        "steps={} dt={:.4} collisions={}",
        report.steps, report.dt, report.collisions
    );
    for body in &report.bodies {
        let [x, y, z] = body.position;
        let state = if body.awake { "awake" } else { "asleep" };
        println!("entity {:>3}  pos=({x:.3}, {y:.3}, {z:.3})  {state}", body.entity);
    }
}
