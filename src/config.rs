//! Configuration for detection and launch synthesis
//!
//! Behavioral settings are read once from the environment at the process boundary and
//! threaded explicitly into `detect` and `launch`. Nothing below this module reads the
//! environment.
//!
//! # Environment Variables
//!
//! - `BP_DOTNET_PROJECT_PATH`: relative path of the project inside the working directory
//! - `BP_LIVE_RELOAD_ENABLED`: wrap the start command in `watchexec` - default: "false"
//! - `BP_DEBUG_ENABLED`: require `vsdbg` and set `ASPNETCORE_ENVIRONMENT=Development` - default: "false"
//! - `BP_LOG_LEVEL`: logging level - default: "INFO"
//!
//! # Example
//!
//! ```
//! use dotnet_launch::BehaviorConfig;
//!
//! let config = BehaviorConfig::from_lookup(|key| match key {
//!     "BP_LIVE_RELOAD_ENABLED" => Some("true".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//!
//! assert!(config.live_reload_enabled);
//! assert!(!config.debug_enabled);
//! ```

use std::env;
use std::fmt;
use thiserror::Error;

pub const PROJECT_PATH_VAR: &str = "BP_DOTNET_PROJECT_PATH";
pub const LIVE_RELOAD_VAR: &str = "BP_LIVE_RELOAD_ENABLED";
pub const DEBUG_VAR: &str = "BP_DEBUG_ENABLED";
pub const LOG_LEVEL_VAR: &str = "BP_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "INFO";

/// ICU release line that the 3.x runtimes are known to work with
pub const NARROWED_ICU_VERSION: &str = "70.*";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse {field}: '{value}' is not a boolean (true|false|1|0|yes|no)")]
    InvalidBool { field: String, value: String },
}

/// Process-wide behavior switches, immutable after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// Relative project directory; `None` when unset or empty
    pub project_path: Option<String>,

    pub live_reload_enabled: bool,

    pub debug_enabled: bool,

    /// Logging level as given (INFO, DEBUG, ...)
    pub log_level: String,
}

impl BehaviorConfig {
    /// Reads the `BP_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_path = lookup(PROJECT_PATH_VAR)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let live_reload_enabled = parse_bool(LIVE_RELOAD_VAR, lookup(LIVE_RELOAD_VAR))?;
        let debug_enabled = parse_bool(DEBUG_VAR, lookup(DEBUG_VAR))?;

        let log_level = lookup(LOG_LEVEL_VAR)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            project_path,
            live_reload_enabled,
            debug_enabled,
            log_level,
        })
    }

    /// Variables that were set, for debug logging
    pub fn to_display_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref path) = self.project_path {
            pairs.push((PROJECT_PATH_VAR, path.clone()));
        }
        pairs.push((LIVE_RELOAD_VAR, self.live_reload_enabled.to_string()));
        pairs.push((DEBUG_VAR, self.debug_enabled.to_string()));
        pairs.push((LOG_LEVEL_VAR, self.log_level.clone()));
        pairs
    }
}

impl fmt::Display for BehaviorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.to_display_pairs() {
            writeln!(f, "    {}: {}", key, value)?;
        }
        Ok(())
    }
}

fn parse_bool(field: &str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };

    match value.trim().to_lowercase().as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        _ => Err(ConfigError::InvalidBool {
            field: field.to_string(),
            value,
        }),
    }
}

/// Which runtime lines get the narrowed ICU requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcuNarrowing {
    /// Never narrow; ICU stays unversioned
    None,
    /// Narrow every runtime on this major line
    Major(u64),
    /// Narrow only this major.minor line
    Minor(u64, u64),
}

impl IcuNarrowing {
    /// Whether a runtime version string falls in the narrowed family.
    /// Wildcarded or empty components never match.
    pub fn applies_to(&self, runtime_version: &str) -> bool {
        let mut parts = runtime_version.split('.');
        let major = parts.next().and_then(|p| p.parse::<u64>().ok());
        let minor = parts.next().and_then(|p| p.parse::<u64>().ok());

        match (*self, major, minor) {
            (IcuNarrowing::None, _, _) => false,
            (IcuNarrowing::Major(want), Some(major), _) => major == want,
            (IcuNarrowing::Minor(want_major, want_minor), Some(major), Some(minor)) => {
                major == want_major && minor == want_minor
            }
            _ => false,
        }
    }
}

/// Policy for the points where historical behavior diverged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Framework-dependent deployments need the SDK's `dotnet` host at launch.
    /// When false the SDK is only requested at build time.
    pub sdk_at_launch: bool,

    pub icu_narrowing: IcuNarrowing,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            sdk_at_launch: true,
            icu_narrowing: IcuNarrowing::Major(3),
        }
    }
}
