//! Build plan and launch plan data structures
//!
//! Both documents are consumed by the lifecycle that invoked us, so field names follow its
//! kebab-case TOML conventions. The same structures serialize to JSON and YAML for humans.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Version attributes attached to a requirement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RequirementMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Where the version constraint was read from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_source: Option<String>,

    #[serde(default)]
    pub launch: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub build: bool,
}

/// One named dependency handed to the downstream resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default)]
    pub metadata: RequirementMetadata,
}

impl Requirement {
    /// Unversioned launch-time requirement
    pub fn launch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: RequirementMetadata {
                launch: true,
                ..Default::default()
            },
        }
    }

    /// Unversioned build-time requirement
    pub fn build(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: RequirementMetadata {
                build: true,
                ..Default::default()
            },
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.metadata.version = Some(version.into());
        self
    }

    pub fn with_version_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.version_source = Some(source.into());
        self
    }

    pub fn at_launch(mut self) -> Self {
        self.metadata.launch = true;
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata.version.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provision {
    pub name: String,
}

/// Ordered requirements emitted by a passing detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    #[serde(default)]
    pub provides: Vec<Provision>,
    #[serde(default)]
    pub requires: Vec<Requirement>,
}

impl BuildPlan {
    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.requires.iter().find(|r| r.name == name)
    }

    pub fn requirement_names(&self) -> Vec<&str> {
        self.requires.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize build plan to TOML")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize build plan to JSON")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize build plan to YAML")
    }
}

impl fmt::Display for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for requirement in &self.requires {
            write!(f, "{}", requirement.name)?;
            if let Some(ref version) = requirement.metadata.version {
                write!(f, " {}", version)?;
            }
            let mut phases = Vec::new();
            if requirement.metadata.build {
                phases.push("build");
            }
            if requirement.metadata.launch {
                phases.push("launch");
            }
            writeln!(f, " [{}]", phases.join(", "))?;
        }
        Ok(())
    }
}

/// A process the launcher can start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(rename = "type")]
    pub process_type: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub default: bool,
    /// Exec'd without a shell
    #[serde(default)]
    pub direct: bool,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.process_type, self.command)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    #[serde(default)]
    pub processes: Vec<Process>,

    /// Launch-time environment overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl LaunchPlan {
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize launch plan to TOML")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize launch plan to JSON")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize launch plan to YAML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> BuildPlan {
        BuildPlan {
            provides: vec![],
            requires: vec![
                Requirement::launch("dotnet-core-runtime")
                    .with_version("6.0.0")
                    .with_version_source("runtimeconfig.json"),
                Requirement::build("dotnet-sdk").with_version("6.0.*"),
                Requirement::launch("icu"),
            ],
        }
    }

    #[test]
    fn test_requirement_json_shape() {
        let json = serde_json::to_value(&sample_plan()).unwrap();

        assert_eq!(
            json["requires"][0],
            serde_json::json!({
                "name": "dotnet-core-runtime",
                "metadata": {
                    "version": "6.0.0",
                    "version-source": "runtimeconfig.json",
                    "launch": true
                }
            })
        );
        assert_eq!(
            json["requires"][1]["metadata"],
            serde_json::json!({ "version": "6.0.*", "launch": false, "build": true })
        );
        assert_eq!(
            json["requires"][2]["metadata"],
            serde_json::json!({ "launch": true })
        );
        assert_eq!(json["provides"], serde_json::json!([]));
    }

    #[test]
    fn test_build_plan_to_toml() {
        let toml = sample_plan().to_toml().unwrap();

        assert!(toml.contains("[[requires]]"));
        assert!(toml.contains("name = \"dotnet-core-runtime\""));
        assert!(toml.contains("version-source = \"runtimeconfig.json\""));
        assert!(toml.contains("build = true"));
    }

    #[test]
    fn test_build_plan_yaml_round_trip() {
        let plan = sample_plan();
        let yaml = plan.to_yaml().unwrap();
        let parsed: BuildPlan = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, plan);
    }

    #[test]
    fn test_build_plan_lookup() {
        let plan = sample_plan();
        assert_eq!(
            plan.requirement_names(),
            vec!["dotnet-core-runtime", "dotnet-sdk", "icu"]
        );
        assert_eq!(
            plan.requirement("dotnet-sdk").and_then(|r| r.version()),
            Some("6.0.*")
        );
        assert!(plan.requirement("node").is_none());
    }

    #[test]
    fn test_build_plan_display() {
        let display = sample_plan().to_string();
        assert!(display.contains("dotnet-core-runtime 6.0.0 [launch]"));
        assert!(display.contains("dotnet-sdk 6.0.* [build]"));
        assert!(display.contains("icu [launch]"));
    }

    #[test]
    fn test_launch_plan_serialization() {
        let mut plan = LaunchPlan {
            processes: vec![Process {
                process_type: "myapp".to_string(),
                command: "dotnet".to_string(),
                args: vec!["/workspace/myapp.dll".to_string()],
                default: true,
                direct: true,
            }],
            environment: BTreeMap::new(),
        };

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["processes"][0]["type"], "myapp");
        assert!(json.get("environment").is_none());

        plan.environment.insert(
            "ASPNETCORE_ENVIRONMENT".to_string(),
            "Development".to_string(),
        );
        let toml = plan.to_toml().unwrap();
        assert!(toml.contains("[[processes]]"));
        assert!(toml.contains("type = \"myapp\""));
        assert!(toml.contains("ASPNETCORE_ENVIRONMENT = \"Development\""));

        assert_eq!(
            plan.processes[0].to_string(),
            "myapp: dotnet /workspace/myapp.dll"
        );
    }
}
