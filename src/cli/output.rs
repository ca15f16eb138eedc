//! Output formatting for build and launch plans
//!
//! TOML is what the lifecycle reads; JSON and YAML are for people and scripts.

use crate::output::{BuildPlan, LaunchPlan};
use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Toml,
    Json,
    Yaml,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_build_plan(&self, plan: &BuildPlan) -> Result<String> {
        match self.format {
            OutputFormat::Toml => plan.to_toml(),
            OutputFormat::Json => plan.to_json(),
            OutputFormat::Yaml => plan.to_yaml(),
        }
    }

    pub fn format_launch_plan(&self, plan: &LaunchPlan) -> Result<String> {
        match self.format {
            OutputFormat::Toml => plan.to_toml(),
            OutputFormat::Json => plan.to_json(),
            OutputFormat::Yaml => plan.to_yaml(),
        }
    }
}
