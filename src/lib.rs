//! dotnet-launch - .NET app detection and launch command synthesis
//!
//! Inspects a directory holding a .NET application and answers two questions for a
//! container lifecycle: which runtime components does the app need, and which command
//! starts it.
//!
//! # Core Concepts
//!
//! - **Runtime config**: the `<app>.runtimeconfig.json` written by `dotnet publish`, naming
//!   the shared frameworks a compiled app needs
//! - **Project file**: the `*.csproj` / `*.fsproj` / `*.vbproj` of an app that has not been
//!   compiled yet
//! - **App shape**: executable, framework-dependent deployment or source, decided once by
//!   [`detect::classify`]
//! - **Build plan**: the ordered requirements handed to a dependency resolver
//! - **Launch plan**: the processes the launcher starts
//!
//! # Example Usage
//!
//! ```no_run
//! use dotnet_launch::{detect, launch, BehaviorConfig, RealFileSystem};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fs = RealFileSystem::new();
//! let config = BehaviorConfig::from_env()?;
//!
//! let ctx = detect::DetectContext::new("/workspace", config.clone());
//! if let detect::DetectResult::Pass(plan) = detect::detect(&ctx, &fs)? {
//!     println!("{}", plan.to_toml()?);
//! }
//!
//! let launch_plan = launch::build(&launch::BuildContext::new("/workspace", config), &fs)?;
//! println!("{}", launch_plan.to_toml()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`dotnet`]: readers for runtimeconfig.json, project files, buildpack.yml, catalogs
//!   and version arithmetic
//! - [`detect`]: classification and build plan synthesis
//! - [`launch`]: launch process synthesis
//! - [`port`]: launch-time `ASPNETCORE_URLS` selection
//! - [`fs`]: file system abstraction with real and in-memory implementations

pub mod cli;
pub mod config;
pub mod detect;
pub mod dotnet;
pub mod error;
pub mod fs;
pub mod launch;
pub mod output;
pub mod port;
pub mod util;

pub use config::{BehaviorConfig, ConfigError, IcuNarrowing, PlanPolicy};
pub use detect::{AppShape, DetectContext, DetectResult};
pub use error::{Error, Result};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use launch::BuildContext;
pub use output::{BuildPlan, LaunchPlan, Process, Requirement};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "dotnet-launch");
    }
}
