//! Error taxonomy for classification and launch synthesis

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("multiple *.runtimeconfig.json files present in {}: {files:?}", root.display())]
    AmbiguousManifest { root: PathBuf, files: Vec<PathBuf> },

    /// Expected when the app has not been compiled yet; callers fall back to the project file.
    #[error("no *.runtimeconfig.json found in {}", root.display())]
    ManifestNotFound { root: PathBuf },

    #[error(
        "malformed runtimeconfig.json {}: multiple '{framework}' frameworks specified ({first} and {second})",
        path.display()
    )]
    ConflictingFrameworkEntries {
        path: PathBuf,
        framework: String,
        first: String,
        second: String,
    },

    #[error(
        "failed to find version in project file {}: missing or invalid TargetFramework property",
        path.display()
    )]
    MissingFrameworkVersion { path: PathBuf },

    #[error("no *.runtimeconfig.json or project file (*.csproj, *.fsproj, *.vbproj) found in {}", root.display())]
    NoApplicationFound { root: PathBuf },

    #[error("no entrypoint found: expected an executable or {}", path.display())]
    EntrypointNotFound { path: PathBuf },

    #[error("no compatible versions found for {requested}")]
    NoCompatibleVersion { requested: String },

    #[error("incompatible versions {requested} and {runtime}: {reason}")]
    IncompatibleVersion {
        requested: String,
        runtime: String,
        reason: String,
    },

    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Error {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// True for the recoverable "no manifest" state.
    pub fn is_manifest_not_found(&self) -> bool {
        matches!(self, Error::ManifestNotFound { .. })
    }

    /// True when the error means the app is not a .NET app at all.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Error::NoApplicationFound { .. })
    }
}
