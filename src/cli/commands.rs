use crate::config::IcuNarrowing;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// .NET app detection and launch command synthesis
#[derive(Parser, Debug)]
#[command(
    name = "dotnet-launch",
    about = "Detects .NET application shapes and synthesizes build plans and launch commands",
    version,
    author,
    long_about = "dotnet-launch inspects a directory holding a compiled or uncompiled .NET app, \
                  declares the runtime components it needs and prints the command that starts it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Classify the app and print its build plan",
        long_about = "Classifies the app as an executable, a framework-dependent deployment or \
                      source code and prints the ordered requirements.\n\n\
                      Exit codes: 0 pass, 100 not a .NET app, 1 error.\n\n\
                      Examples:\n  \
                      dotnet-launch detect\n  \
                      dotnet-launch detect /workspace --format json\n  \
                      dotnet-launch detect --catalog buildpack.toml --sdk-at-build"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Print the launch processes for a compiled app",
        long_about = "Resolves the app's entrypoint and prints the launch processes.\n\n\
                      Examples:\n  \
                      dotnet-launch build\n  \
                      BP_LIVE_RELOAD_ENABLED=true dotnet-launch build /workspace"
    )]
    Build(BuildArgs),

    #[command(
        about = "Export ASPNETCORE_URLS for the platform PORT",
        long_about = "Writes ASPNETCORE_URLS to file descriptor 3 in exec.d format unless it is \
                      already set. Uses PORT, or 8080 when PORT is missing or invalid."
    )]
    PortChooser,
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the app (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "buildpack.toml whose [[metadata.dependencies]] runtime versions are rolled forward against"
    )]
    pub catalog: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "toml",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Request the SDK at build time only for framework-dependent deployments")]
    pub sdk_at_build: bool,

    #[arg(
        long,
        value_enum,
        value_name = "MODE",
        default_value = "major",
        help = "Which runtimes get the narrowed ICU version"
    )]
    pub icu_narrowing: IcuNarrowingArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the app (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "toml",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Toml => super::output::OutputFormat::Toml,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcuNarrowingArg {
    /// Leave ICU unversioned
    None,
    /// Every 3.x runtime
    Major,
    /// Only 3.1 runtimes
    Minor,
}

impl From<IcuNarrowingArg> for IcuNarrowing {
    fn from(arg: IcuNarrowingArg) -> Self {
        match arg {
            IcuNarrowingArg::None => IcuNarrowing::None,
            IcuNarrowingArg::Major => IcuNarrowing::Major(3),
            IcuNarrowingArg::Minor => IcuNarrowing::Minor(3, 1),
        }
    }
}
