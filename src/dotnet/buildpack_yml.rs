//! Legacy `buildpack.yml` overrides
//!
//! ```yaml
//! dotnet-build:
//!   project-path: src/web
//! dotnet-framework:
//!   version: "6.0.*"
//! ```
//!
//! Both keys predate the `BP_*` environment variables and are kept for old apps.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use serde::Deserialize;
use std::io;
use std::path::Path;

pub const BUILDPACK_YML: &str = "buildpack.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildpackYml {
    #[serde(default, rename = "dotnet-build")]
    pub dotnet_build: DotnetBuild,

    #[serde(default, rename = "dotnet-framework")]
    pub dotnet_framework: DotnetFramework,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DotnetBuild {
    #[serde(default, rename = "project-path")]
    pub project_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DotnetFramework {
    #[serde(default)]
    pub version: Option<String>,
}

impl BuildpackYml {
    /// Reads `path`; a missing file yields the empty configuration
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::io("open", path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| Error::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn project_path(&self) -> Option<&str> {
        self.dotnet_build
            .project_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn framework_version(&self) -> Option<&str> {
        self.dotnet_framework
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn load(fs: &MockFileSystem) -> Result<BuildpackYml> {
        BuildpackYml::load(fs, Path::new("/mock/buildpack.yml"))
    }

    #[test]
    fn test_parses_both_sections() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "buildpack.yml",
            "---\ndotnet-build:\n  project-path: src/proj1\ndotnet-framework:\n  version: \"2.1.*\"\n",
        );

        let config = load(&fs).unwrap();
        assert_eq!(config.project_path(), Some("src/proj1"));
        assert_eq!(config.framework_version(), Some("2.1.*"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let fs = MockFileSystem::new();
        assert_eq!(load(&fs).unwrap(), BuildpackYml::default());
    }

    #[test]
    fn test_empty_file_is_empty() {
        let fs = MockFileSystem::new();
        fs.add_file("buildpack.yml", "");
        assert_eq!(load(&fs).unwrap().project_path(), None);
    }

    #[test]
    fn test_unrelated_sections_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_file("buildpack.yml", "nodejs:\n  version: 16.*\n");

        let config = load(&fs).unwrap();
        assert_eq!(config.project_path(), None);
        assert_eq!(config.framework_version(), None);
    }

    #[test]
    fn test_blank_project_path_is_unset() {
        let fs = MockFileSystem::new();
        fs.add_file("buildpack.yml", "dotnet-build:\n  project-path: \"  \"\n");
        assert_eq!(load(&fs).unwrap().project_path(), None);
    }

    #[test]
    fn test_malformed_yaml() {
        let fs = MockFileSystem::new();
        fs.add_file("buildpack.yml", "dotnet-build: [unclosed");

        let err = load(&fs).unwrap_err();
        assert!(matches!(err, Error::Yaml { .. }));
        assert!(err.to_string().contains("buildpack.yml"));
    }
}
