//! Application classification and build plan synthesis
//!
//! An app directory is classified once into an [`AppShape`] from the evidence on disk:
//!
//! | Shape | Evidence |
//! |-------|----------|
//! | [`AppShape::Executable`] | runtimeconfig.json and a same-named executable |
//! | [`AppShape::FrameworkDependent`] | runtimeconfig.json only |
//! | [`AppShape::Source`] | no runtimeconfig.json, a project file |
//!
//! Anything else is [`Error::NoApplicationFound`], which [`detect`] reports as
//! [`DetectResult::NotApplicable`] rather than as a failure. The same classification is
//! reused by [`crate::launch`] so both phases always agree on what the app is.

use crate::config::{BehaviorConfig, PlanPolicy, NARROWED_ICU_VERSION, PROJECT_PATH_VAR};
use crate::dotnet::buildpack_yml::BUILDPACK_YML;
use crate::dotnet::version::{self, WILDCARD};
use crate::dotnet::{
    BuildpackYml, DependencyCatalog, ProjectDescriptor, ProjectFileParser, RuntimeConfig,
    RuntimeConfigParser,
};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::output::{BuildPlan, Requirement};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DOTNET_APPLICATION: &str = "dotnet-application";
pub const DOTNET_CORE_RUNTIME: &str = "dotnet-core-runtime";
pub const DOTNET_CORE_ASPNET: &str = "dotnet-core-aspnet";
pub const DOTNET_SDK: &str = "dotnet-sdk";
pub const NODE: &str = "node";
pub const ICU: &str = "icu";
pub const WATCHEXEC: &str = "watchexec";
pub const VSDBG: &str = "vsdbg";

pub const RUNTIME_CONFIG_SOURCE: &str = "runtimeconfig.json";
pub const BUILDPACK_YML_SOURCE: &str = "buildpack.yml";

/// What kind of .NET app lives at the resolved root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppShape {
    /// Self-contained or framework-dependent executable with its own native launcher
    Executable(RuntimeConfig),
    /// Compiled `.dll` that needs the `dotnet` host
    FrameworkDependent(RuntimeConfig),
    /// Uncompiled project
    Source(ProjectDescriptor),
}

impl AppShape {
    pub fn runtime_config(&self) -> Option<&RuntimeConfig> {
        match self {
            AppShape::Executable(config) | AppShape::FrameworkDependent(config) => Some(config),
            AppShape::Source(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppShape::Executable(_) => "executable",
            AppShape::FrameworkDependent(_) => "framework-dependent deployment",
            AppShape::Source(_) => "source",
        }
    }
}

/// Outcome of the detect phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectResult {
    Pass(BuildPlan),
    /// Nothing .NET-shaped was found; carries the reason for the log
    NotApplicable(String),
}

impl DetectResult {
    pub fn plan(&self) -> Option<&BuildPlan> {
        match self {
            DetectResult::Pass(plan) => Some(plan),
            DetectResult::NotApplicable(_) => None,
        }
    }
}

/// Inputs to [`detect`]
#[derive(Debug, Clone)]
pub struct DetectContext {
    pub working_dir: PathBuf,
    pub config: BehaviorConfig,
    pub policy: PlanPolicy,
    /// When present, exact runtime versions are rolled forward against it
    pub catalog: Option<DependencyCatalog>,
}

impl DetectContext {
    pub fn new(working_dir: impl Into<PathBuf>, config: BehaviorConfig) -> Self {
        Self {
            working_dir: working_dir.into(),
            config,
            policy: PlanPolicy::default(),
            catalog: None,
        }
    }

    pub fn with_policy(mut self, policy: PlanPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_catalog(mut self, catalog: DependencyCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

/// Directory the app actually lives in.
///
/// `BP_DOTNET_PROJECT_PATH` wins over the legacy `dotnet-build.project-path` key, which
/// still works but logs a deprecation warning.
pub fn resolve_root(
    working_dir: &Path,
    config: &BehaviorConfig,
    buildpack_yml: &BuildpackYml,
) -> PathBuf {
    if let Some(ref project_path) = config.project_path {
        debug!("Using project path {} from {}", project_path, PROJECT_PATH_VAR);
        return working_dir.join(project_path);
    }

    if let Some(project_path) = buildpack_yml.project_path() {
        warn!(
            "WARNING: Setting the project path through buildpack.yml will be deprecated soon. \
             Please specify the project path through the ${} environment variable instead.",
            PROJECT_PATH_VAR
        );
        return working_dir.join(project_path);
    }

    working_dir.to_path_buf()
}

/// Classifies the app at `root`.
///
/// The runtimeconfig.json is consulted first; the project file is only read when there
/// is none.
///
/// # Errors
///
/// - [`Error::AmbiguousManifest`] when several runtimeconfig.json files exist, even if a
///   project file is also present
/// - [`Error::NoApplicationFound`] when neither artifact exists
/// - any read or decode failure of the artifact that was chosen
pub fn classify(root: &Path, fs: &dyn FileSystem) -> Result<AppShape> {
    match RuntimeConfigParser::new(fs).parse(root) {
        Ok(config) if config.executable => return Ok(AppShape::Executable(config)),
        Ok(config) => return Ok(AppShape::FrameworkDependent(config)),
        Err(e) if e.is_manifest_not_found() => {
            debug!("No runtime config in {}, looking for a project file", root.display());
        }
        Err(e) => return Err(e),
    }

    let parser = ProjectFileParser::new(fs);
    match parser.find_project_file(root)? {
        Some(path) => Ok(AppShape::Source(parser.parse(&path)?)),
        None => Err(Error::NoApplicationFound {
            root: root.to_path_buf(),
        }),
    }
}

/// Runs the detect phase against `ctx.working_dir`.
///
/// # Returns
///
/// [`DetectResult::Pass`] with the ordered requirements, or
/// [`DetectResult::NotApplicable`] when the directory holds no .NET app.
///
/// # Errors
///
/// Every classification error other than "no application found", plus version errors
/// from a `buildpack.yml` pin or catalog roll-forward.
///
/// # Example
///
/// ```no_run
/// use dotnet_launch::detect::{detect, DetectContext, DetectResult};
/// use dotnet_launch::fs::RealFileSystem;
/// use dotnet_launch::BehaviorConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = DetectContext::new("/workspace", BehaviorConfig::from_env()?);
/// if let DetectResult::Pass(plan) = detect(&ctx, &RealFileSystem::new())? {
///     println!("{}", plan.to_toml()?);
/// }
/// # Ok(())
/// # }
/// ```
pub fn detect(ctx: &DetectContext, fs: &dyn FileSystem) -> Result<DetectResult> {
    let buildpack_yml = BuildpackYml::load(fs, &ctx.working_dir.join(BUILDPACK_YML))?;
    let root = resolve_root(&ctx.working_dir, &ctx.config, &buildpack_yml);

    let shape = match classify(&root, fs) {
        Ok(shape) => shape,
        Err(e) if e.is_not_applicable() => {
            info!("{}", e);
            return Ok(DetectResult::NotApplicable(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    info!("Detected {} app in {}", shape.name(), root.display());

    let plan = build_plan(&shape, &buildpack_yml, ctx)?;
    debug!("Build plan:\n{}", plan);

    Ok(DetectResult::Pass(plan))
}

/// Runtime version constraint and where it came from
struct RuntimeVersion {
    version: String,
    source: &'static str,
}

fn build_plan(
    shape: &AppShape,
    buildpack_yml: &BuildpackYml,
    ctx: &DetectContext,
) -> Result<BuildPlan> {
    let mut requires = Vec::new();

    let declared = match shape {
        AppShape::Executable(config) | AppShape::FrameworkDependent(config) => RuntimeVersion {
            version: config.runtime_version.clone(),
            source: RUNTIME_CONFIG_SOURCE,
        },
        AppShape::Source(project) => {
            requires.push(Requirement::launch(DOTNET_APPLICATION));
            RuntimeVersion {
                version: project.framework_version.clone(),
                source: project.version_source,
            }
        }
    };

    let pinned = apply_pin(declared, buildpack_yml)?;
    let apply_patches = shape
        .runtime_config()
        .map(RuntimeConfig::applies_patches)
        .unwrap_or(true);
    let runtime = roll_forward(pinned, ctx.catalog.as_ref(), apply_patches)?;

    let mut runtime_requirement = Requirement::launch(DOTNET_CORE_RUNTIME);
    if !runtime.version.is_empty() {
        runtime_requirement = runtime_requirement
            .with_version(runtime.version.clone())
            .with_version_source(runtime.source);
    }
    requires.push(runtime_requirement);

    match shape {
        AppShape::Executable(config) | AppShape::FrameworkDependent(config) => {
            if config.requires_aspnet() {
                requires.push(
                    Requirement::launch(DOTNET_CORE_ASPNET)
                        .with_version(config.aspnet_version.clone())
                        .with_version_source(RUNTIME_CONFIG_SOURCE),
                );
            }

            if let AppShape::FrameworkDependent(_) = shape {
                let sdk = if ctx.policy.sdk_at_launch {
                    Requirement::launch(DOTNET_SDK)
                } else {
                    Requirement::build(DOTNET_SDK)
                };
                requires.push(sdk.with_version(version::wildcard_family(&runtime.version)));
            }
        }
        AppShape::Source(project) => {
            if project.requires_aspnet {
                requires.push(
                    Requirement::launch(DOTNET_CORE_ASPNET)
                        .with_version(runtime.version.clone())
                        .with_version_source(runtime.source),
                );
            }

            requires.push(
                Requirement::build(DOTNET_SDK)
                    .with_version(version::wildcard_family(&runtime.version)),
            );

            if project.requires_node {
                requires.push(Requirement::build(NODE).at_launch());
            }
        }
    }

    let mut icu = Requirement::launch(ICU);
    if ctx.policy.icu_narrowing.applies_to(&runtime.version) {
        debug!("Narrowing ICU to {} for runtime {}", NARROWED_ICU_VERSION, runtime.version);
        icu = icu.with_version(NARROWED_ICU_VERSION);
    }
    requires.push(icu);

    if ctx.config.live_reload_enabled {
        requires.push(Requirement::launch(WATCHEXEC));
    }

    if ctx.config.debug_enabled {
        requires.push(Requirement::launch(VSDBG));
    }

    Ok(BuildPlan {
        provides: Vec::new(),
        requires,
    })
}

/// Replaces the declared version with a compatible `dotnet-framework.version` pin
fn apply_pin(declared: RuntimeVersion, buildpack_yml: &BuildpackYml) -> Result<RuntimeVersion> {
    let Some(pinned) = buildpack_yml.framework_version() else {
        return Ok(declared);
    };

    if !declared.version.is_empty() && declared.version != WILDCARD {
        version::check_compatible(&declared.version, pinned)?;
    }

    info!(
        "Using runtime version {} from {} instead of {}",
        pinned, BUILDPACK_YML_SOURCE, declared.source
    );

    Ok(RuntimeVersion {
        version: pinned.to_string(),
        source: BUILDPACK_YML_SOURCE,
    })
}

fn roll_forward(
    runtime: RuntimeVersion,
    catalog: Option<&DependencyCatalog>,
    apply_patches: bool,
) -> Result<RuntimeVersion> {
    let Some(catalog) = catalog else {
        return Ok(runtime);
    };

    if runtime.version.is_empty() || version::is_wildcard(&runtime.version) {
        return Ok(runtime);
    }

    let available = catalog.versions(DOTNET_CORE_RUNTIME);
    if available.is_empty() {
        debug!("Catalog offers no {} versions", DOTNET_CORE_RUNTIME);
        return Ok(runtime);
    }

    let requested = version::parse_version(&runtime.version)?;
    let selected = version::roll_forward(&requested, &available, apply_patches)?;

    if selected != requested {
        info!("Rolling runtime {} forward to {}", runtime.version, selected);
    }

    Ok(RuntimeVersion {
        version: selected.to_string(),
        source: runtime.source,
    })
}
