//! Launch command synthesis
//!
//! Turns a compiled app into the processes the launcher starts. Executables run as is;
//! framework-dependent deployments run through `dotnet <app>.dll`. With live reload the
//! command is wrapped in `watchexec`, and the unwrapped command stays available under the
//! plain process type.

use crate::config::BehaviorConfig;
use crate::detect::{classify, resolve_root, AppShape};
use crate::dotnet::buildpack_yml::BUILDPACK_YML;
use crate::dotnet::BuildpackYml;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::output::{LaunchPlan, Process};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DOTNET_COMMAND: &str = "dotnet";
pub const WATCHEXEC_COMMAND: &str = "watchexec";
pub const DEFAULT_PROCESS_TYPE: &str = "web";
pub const RELOAD_PREFIX: &str = "reload-";

pub const ASPNETCORE_ENVIRONMENT: &str = "ASPNETCORE_ENVIRONMENT";
const DEVELOPMENT: &str = "Development";

/// Inputs to [`build`]
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub working_dir: PathBuf,
    pub config: BehaviorConfig,
}

impl BuildContext {
    pub fn new(working_dir: impl Into<PathBuf>, config: BehaviorConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            config,
        }
    }
}

/// Produces the launch plan for the compiled app under `ctx.working_dir`.
///
/// # Errors
///
/// - [`Error::EntrypointNotFound`] when the app was never compiled or its `.dll` is missing
/// - every classification error from [`classify`], including "no application found"
pub fn build(ctx: &BuildContext, fs: &dyn FileSystem) -> Result<LaunchPlan> {
    let buildpack_yml = BuildpackYml::load(fs, &ctx.working_dir.join(BUILDPACK_YML))?;
    let root = resolve_root(&ctx.working_dir, &ctx.config, &buildpack_yml);

    let config = match classify(&root, fs)? {
        AppShape::Executable(config) | AppShape::FrameworkDependent(config) => config,
        AppShape::Source(project) => {
            debug!("Project {} has not been compiled", project.path.display());
            return Err(Error::EntrypointNotFound { path: root });
        }
    };

    let (command, args) = entrypoint(&root, &config.app_name, config.executable, fs)?;
    let process_type = process_type(&config.app_name);

    let processes = if ctx.config.live_reload_enabled {
        let mut reload_args = vec![
            "--restart".to_string(),
            "--watch".to_string(),
            root.to_string_lossy().to_string(),
            "--shell".to_string(),
            "none".to_string(),
            "--".to_string(),
            command.clone(),
        ];
        reload_args.extend(args.iter().cloned());

        vec![
            Process {
                process_type: format!("{RELOAD_PREFIX}{process_type}"),
                command: WATCHEXEC_COMMAND.to_string(),
                args: reload_args,
                default: true,
                direct: true,
            },
            Process {
                process_type,
                command,
                args,
                default: false,
                direct: true,
            },
        ]
    } else {
        vec![Process {
            process_type,
            command,
            args,
            default: true,
            direct: true,
        }]
    };

    let mut environment = BTreeMap::new();
    if ctx.config.debug_enabled {
        environment.insert(ASPNETCORE_ENVIRONMENT.to_string(), DEVELOPMENT.to_string());
    }

    info!("Assigning launch processes:");
    for process in &processes {
        info!("  {}", process);
    }

    Ok(LaunchPlan {
        processes,
        environment,
    })
}

fn entrypoint(
    root: &Path,
    app_name: &str,
    executable: bool,
    fs: &dyn FileSystem,
) -> Result<(String, Vec<String>)> {
    if executable {
        let command = root.join(app_name).to_string_lossy().to_string();
        return Ok((command, Vec::new()));
    }

    let dll = root.join(format!("{app_name}.dll"));
    if !fs.is_file(&dll) {
        return Err(Error::EntrypointNotFound { path: dll });
    }

    Ok((
        DOTNET_COMMAND.to_string(),
        vec![dll.to_string_lossy().to_string()],
    ))
}

/// `app_name` restricted to `[A-Za-z0-9._-]`, or `web` when nothing is left
pub fn process_type(app_name: &str) -> String {
    let sanitized: String = app_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if sanitized.is_empty() {
        DEFAULT_PROCESS_TYPE.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use yare::parameterized;

    const RUNTIME_CONFIG: &str = r#"{
  "runtimeOptions": {
    "framework": { "name": "Microsoft.NETCore.App", "version": "6.0.0" }
  }
}"#;

    fn ctx(live_reload_enabled: bool, debug_enabled: bool) -> BuildContext {
        BuildContext::new(
            "/mock",
            BehaviorConfig {
                live_reload_enabled,
                debug_enabled,
                ..BehaviorConfig::default()
            },
        )
    }

    #[test]
    fn test_framework_dependent_runs_through_dotnet() {
        let fs = MockFileSystem::new();
        fs.add_file("myapp.runtimeconfig.json", RUNTIME_CONFIG);
        fs.add_file("myapp.dll", "");

        let plan = build(&ctx(false, false), &fs).unwrap();
        assert_eq!(
            plan.processes,
            vec![Process {
                process_type: "myapp".to_string(),
                command: "dotnet".to_string(),
                args: vec!["/mock/myapp.dll".to_string()],
                default: true,
                direct: true,
            }]
        );
        assert!(plan.environment.is_empty());
    }

    #[test]
    fn test_executable_runs_directly() {
        let fs = MockFileSystem::new();
        fs.add_file("myapp.runtimeconfig.json", RUNTIME_CONFIG);
        fs.add_executable("myapp");

        let plan = build(&ctx(false, false), &fs).unwrap();
        assert_eq!(plan.processes.len(), 1);
        assert_eq!(plan.processes[0].command, "/mock/myapp");
        assert!(plan.processes[0].args.is_empty());
    }

    #[test]
    fn test_missing_dll() {
        let fs = MockFileSystem::new();
        fs.add_file("myapp.runtimeconfig.json", RUNTIME_CONFIG);

        match build(&ctx(false, false), &fs).unwrap_err() {
            Error::EntrypointNotFound { path } => {
                assert_eq!(path, PathBuf::from("/mock/myapp.dll"))
            }
            other => panic!("Expected EntrypointNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_source_app_has_no_entrypoint() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "app.csproj",
            "<Project><PropertyGroup><TargetFramework>net6.0</TargetFramework></PropertyGroup></Project>",
        );

        assert!(matches!(
            build(&ctx(false, false), &fs),
            Err(Error::EntrypointNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_directory_is_no_application() {
        let fs = MockFileSystem::new();
        assert!(build(&ctx(false, false), &fs)
            .unwrap_err()
            .is_not_applicable());
    }

    #[test]
    fn test_live_reload_wraps_command() {
        let fs = MockFileSystem::new();
        fs.add_file("myapp.runtimeconfig.json", RUNTIME_CONFIG);
        fs.add_file("myapp.dll", "");

        let plan = build(&ctx(true, false), &fs).unwrap();
        assert_eq!(plan.processes.len(), 2);

        let (reload, direct) = (&plan.processes[0], &plan.processes[1]);
        assert_eq!(reload.process_type, "reload-myapp");
        assert_eq!(reload.command, "watchexec");
        assert_eq!(
            reload.args,
            vec![
                "--restart",
                "--watch",
                "/mock",
                "--shell",
                "none",
                "--",
                "dotnet",
                "/mock/myapp.dll"
            ]
        );
        assert!(reload.default);

        assert_eq!(direct.process_type, "myapp");
        assert!(!direct.default);
        assert!(direct.direct);

        let mut wrapped = vec![direct.command.clone()];
        wrapped.extend(direct.args.iter().cloned());
        assert!(reload.args.ends_with(&wrapped));
    }

    #[test]
    fn test_debug_sets_development_environment() {
        let fs = MockFileSystem::new();
        fs.add_file("myapp.runtimeconfig.json", RUNTIME_CONFIG);
        fs.add_executable("myapp");

        let plan = build(&ctx(false, true), &fs).unwrap();
        assert_eq!(
            plan.environment.get(ASPNETCORE_ENVIRONMENT).map(String::as_str),
            Some("Development")
        );
        assert_eq!(plan.processes[0].command, "/mock/myapp");
    }

    #[test]
    fn test_project_path_relocates_root() {
        let fs = MockFileSystem::new();
        fs.add_file("src/api/api.runtimeconfig.json", RUNTIME_CONFIG);
        fs.add_file("src/api/api.dll", "");

        let ctx = BuildContext::new(
            "/mock",
            BehaviorConfig {
                project_path: Some("src/api".to_string()),
                ..BehaviorConfig::default()
            },
        );
        let plan = build(&ctx, &fs).unwrap();
        assert_eq!(plan.processes[0].args, vec!["/mock/src/api/api.dll"]);
    }

    #[parameterized(
        plain = { "myapp", "myapp" },
        dotted = { "My.App-1_0", "My.App-1_0" },
        spaces = { "my app", "myapp" },
        symbols = { "app+@!", "app" },
        nothing_left = { "!!!", "web" },
        empty = { "", "web" },
    )]
    fn test_process_type(app_name: &str, expected: &str) {
        assert_eq!(process_type(app_name), expected);
    }
}
