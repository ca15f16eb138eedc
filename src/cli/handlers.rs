//! Subcommand handlers
//!
//! Each handler takes the configuration `main` read at startup, runs the library call and
//! maps the outcome to the exit code the lifecycle expects.

use super::commands::{BuildArgs, DetectArgs};
use super::output::OutputFormatter;
use crate::config::{BehaviorConfig, PlanPolicy};
use crate::detect::{detect, DetectContext, DetectResult};
use crate::dotnet::DependencyCatalog;
use crate::fs::RealFileSystem;
use crate::launch::{build, BuildContext};
use crate::port::{choose_port, write_exports};
use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::{debug, error};

pub const EXIT_PASS: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_NOT_APPLICABLE: i32 = 100;

/// exec.d output channel
const EXEC_D_OUTPUT: &str = "/dev/fd/3";

pub fn handle_detect(args: &DetectArgs, config: BehaviorConfig) -> i32 {
    match run_detect(args, config) {
        Ok(DetectResult::Pass(plan)) => {
            match OutputFormatter::new(args.format.into()).format_build_plan(&plan) {
                Ok(output) => {
                    print!("{}", output);
                    EXIT_PASS
                }
                Err(e) => {
                    error!("{:#}", e);
                    EXIT_ERROR
                }
            }
        }
        Ok(DetectResult::NotApplicable(reason)) => {
            debug!("Not applicable: {}", reason);
            EXIT_NOT_APPLICABLE
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_ERROR
        }
    }
}

fn run_detect(args: &DetectArgs, config: BehaviorConfig) -> Result<DetectResult> {
    let working_dir = resolve_path(args.path.as_ref())?;

    let policy = PlanPolicy {
        sdk_at_launch: !args.sdk_at_build,
        icu_narrowing: args.icu_narrowing.into(),
    };
    debug!("Plan policy: {:?}", policy);

    let fs = RealFileSystem::new();
    let mut ctx = DetectContext::new(&working_dir, config).with_policy(policy);
    if let Some(ref catalog_path) = args.catalog {
        let catalog = DependencyCatalog::load(&fs, catalog_path)
            .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
        ctx = ctx.with_catalog(catalog);
    }

    detect(&ctx, &fs).with_context(|| format!("Detection failed for {}", working_dir.display()))
}

pub fn handle_build(args: &BuildArgs, config: BehaviorConfig) -> i32 {
    let result = run_build(args, config).and_then(|plan| {
        OutputFormatter::new(args.format.into()).format_launch_plan(&plan)
    });

    match result {
        Ok(output) => {
            print!("{}", output);
            EXIT_PASS
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_ERROR
        }
    }
}

fn run_build(args: &BuildArgs, config: BehaviorConfig) -> Result<crate::output::LaunchPlan> {
    let working_dir = resolve_path(args.path.as_ref())?;

    let ctx = BuildContext::new(&working_dir, config);
    build(&ctx, &RealFileSystem::new())
        .with_context(|| format!("Failed to assign launch processes for {}", working_dir.display()))
}

pub fn handle_port_chooser() -> i32 {
    let env_vars = choose_port(|key| env::var(key).ok());
    if env_vars.is_empty() {
        return EXIT_PASS;
    }

    for (key, value) in &env_vars {
        println!("Setting {}={}", key, value);
    }

    let result = OpenOptions::new()
        .write(true)
        .open(EXEC_D_OUTPUT)
        .with_context(|| format!("Failed to open {}", EXEC_D_OUTPUT))
        .and_then(|mut file| {
            write_exports(&mut file, &env_vars)
                .with_context(|| format!("Failed to write {}", EXEC_D_OUTPUT))
        });

    match result {
        Ok(()) => EXIT_PASS,
        Err(e) => {
            error!("{:#}", e);
            EXIT_ERROR
        }
    }
}

fn resolve_path(path: Option<&PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.clone()),
        None => env::current_dir().context("Failed to get current directory"),
    }
}
