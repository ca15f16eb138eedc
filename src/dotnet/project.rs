//! MSBuild project file reader (`*.csproj`, `*.fsproj`, `*.vbproj`)
//!
//! Only consulted when the app has not been compiled, i.e. no runtimeconfig.json exists.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use regex::Regex;
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Searched in this order; the first family with a hit wins
pub const PROJECT_EXTENSIONS: [&str; 3] = [".csproj", ".fsproj", ".vbproj"];

pub const RUNTIME_FRAMEWORK_VERSION: &str = "RuntimeFrameworkVersion";
pub const TARGET_FRAMEWORK: &str = "TargetFramework";

const WEB_SDK: &str = "Microsoft.NET.Sdk.Web";
const WEB_PACKAGES: [&str; 2] = ["Microsoft.AspNetCore.App", "Microsoft.AspNetCore.All"];
const NODE_COMMAND_PREFIXES: [&str; 2] = ["node ", "npm "];

fn target_framework_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // net6.0, net6.0-windows, netcoreapp3.1
    RE.get_or_init(|| {
        Regex::new(r"^net(?:coreapp)?(\d+\.\d+)(?:-?\w+)?$").expect("valid regex")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub path: PathBuf,
    /// `RuntimeFrameworkVersion` verbatim, or `<major>.<minor>.0` from the target moniker
    pub framework_version: String,
    /// Property the version came from
    pub version_source: &'static str,
    pub requires_aspnet: bool,
    pub requires_node: bool,
}

pub struct ProjectFileParser<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ProjectFileParser<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// First project file under `root` by extension precedence, sorted by name within a family
    pub fn find_project_file(&self, root: &Path) -> Result<Option<PathBuf>> {
        for extension in PROJECT_EXTENSIONS {
            let files = self
                .fs
                .files_with_suffix(root, extension)
                .map_err(|e| Error::io("list", root, e))?;

            if let Some(first) = files.into_iter().next() {
                debug!("Found project file {}", first.display());
                return Ok(Some(first));
            }
        }

        Ok(None)
    }

    /// Framework version and the property it was read from
    pub fn parse_version(&self, path: &Path) -> Result<(String, &'static str)> {
        let content = self.read(path)?;
        let doc = decode(path, &content)?;
        version_from(&doc, path)
    }

    pub fn aspnet_is_required(&self, path: &Path) -> Result<bool> {
        let content = self.read(path)?;
        let doc = decode(path, &content)?;
        Ok(aspnet_required_by(&doc))
    }

    pub fn node_is_required(&self, path: &Path) -> Result<bool> {
        let content = self.read(path)?;
        let doc = decode(path, &content)?;
        Ok(node_required_by(&doc))
    }

    /// Reads the file once and collects everything classification needs
    pub fn parse(&self, path: &Path) -> Result<ProjectDescriptor> {
        let content = self.read(path)?;
        let doc = decode(path, &content)?;
        let (framework_version, version_source) = version_from(&doc, path)?;

        let descriptor = ProjectDescriptor {
            path: path.to_path_buf(),
            framework_version,
            version_source,
            requires_aspnet: aspnet_required_by(&doc),
            requires_node: node_required_by(&doc),
        };

        debug!(
            version = %descriptor.framework_version,
            source = descriptor.version_source,
            aspnet = descriptor.requires_aspnet,
            node = descriptor.requires_node,
            "Parsed project file {}",
            path.display()
        );

        Ok(descriptor)
    }

    fn read(&self, path: &Path) -> Result<String> {
        self.fs
            .read_to_string(path)
            .map_err(|e| Error::io("open", path, e))
    }
}

fn decode<'input>(path: &Path, content: &'input str) -> Result<Document<'input>> {
    Document::parse(content).map_err(|source| Error::Xml {
        path: path.to_path_buf(),
        source,
    })
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn property_values<'a>(doc: &'a Document, property: &'static str) -> Vec<&'a str> {
    children_named(doc.root_element(), "PropertyGroup")
        .flat_map(|group| children_named(group, property))
        .filter_map(|n| n.text())
        .map(str::trim)
        .collect()
}

fn version_from(doc: &Document, path: &Path) -> Result<(String, &'static str)> {
    if let Some(version) = property_values(doc, RUNTIME_FRAMEWORK_VERSION)
        .into_iter()
        .find(|v| !v.is_empty())
    {
        return Ok((version.to_string(), RUNTIME_FRAMEWORK_VERSION));
    }

    for moniker in property_values(doc, TARGET_FRAMEWORK) {
        if let Some(captures) = target_framework_regex().captures(moniker) {
            return Ok((format!("{}.0", &captures[1]), TARGET_FRAMEWORK));
        }
    }

    Err(Error::MissingFrameworkVersion {
        path: path.to_path_buf(),
    })
}

fn aspnet_required_by(doc: &Document) -> bool {
    let root = doc.root_element();
    if root.attribute("Sdk") == Some(WEB_SDK) {
        return true;
    }

    children_named(root, "ItemGroup")
        .flat_map(|group| children_named(group, "PackageReference"))
        .filter_map(|reference| reference.attribute("Include"))
        .any(|include| WEB_PACKAGES.contains(&include))
}

fn node_required_by(doc: &Document) -> bool {
    children_named(doc.root_element(), "Target")
        .flat_map(|target| children_named(target, "Exec"))
        .filter_map(|exec| exec.attribute("Command"))
        .any(|command| {
            NODE_COMMAND_PREFIXES
                .iter()
                .any(|prefix| command.starts_with(prefix))
        })
}
