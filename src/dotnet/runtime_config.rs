//! `*.runtimeconfig.json` reader
//!
//! A compiled .NET app ships one `<app>.runtimeconfig.json` next to its entrypoint. The
//! file names the shared frameworks the host must provide, either through the legacy
//! single `framework` object or the `frameworks` list. The format tolerates `//` and
//! `/* */` comments, which are stripped before decoding.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const RUNTIME_CONFIG_SUFFIX: &str = ".runtimeconfig.json";

pub const NETCORE_APP: &str = "Microsoft.NETCore.App";
pub const ASPNETCORE_APP: &str = "Microsoft.AspNetCore.App";
pub const ASPNETCORE_ALL: &str = "Microsoft.AspNetCore.All";

/// Normalized view of a runtimeconfig.json
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub path: PathBuf,
    /// Base runtime version, `*` when declared without a version, empty when not declared
    pub runtime_version: String,
    /// ASP.NET Core version, empty when the app does not need it
    pub aspnet_version: String,
    pub app_name: String,
    /// A same-named file with an execute bit sits beside the config
    pub executable: bool,
    pub apply_patches: Option<bool>,
}

impl RuntimeConfig {
    pub fn requires_aspnet(&self) -> bool {
        !self.aspnet_version.is_empty()
    }

    /// Roll-forward onto newer patches unless the app opted out
    pub fn applies_patches(&self) -> bool {
        self.apply_patches.unwrap_or(true)
    }
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeConfigFile {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    runtime_options: RuntimeOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeOptions {
    #[serde(default)]
    framework: Option<FrameworkEntry>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    frameworks: Vec<FrameworkEntry>,
    #[serde(default)]
    apply_patches: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct FrameworkEntry {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameworkKind {
    Runtime,
    AspNet,
}

impl FrameworkKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            NETCORE_APP => Some(FrameworkKind::Runtime),
            ASPNETCORE_APP | ASPNETCORE_ALL => Some(FrameworkKind::AspNet),
            _ => None,
        }
    }
}

pub struct RuntimeConfigParser<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> RuntimeConfigParser<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Locates and parses the single runtimeconfig.json directly under `root`.
    ///
    /// Returns `ManifestNotFound` when there is none, which callers treat as data.
    pub fn parse(&self, root: &Path) -> Result<RuntimeConfig> {
        let path = self.find(root)?;
        debug!("Parsing runtime config {}", path.display());

        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| Error::io("open", &path, e))?;

        let stripped = strip_comments(&content);
        let data: RuntimeConfigFile = if stripped.trim().is_empty() {
            RuntimeConfigFile::default()
        } else {
            serde_json::from_str(&stripped).map_err(|source| Error::Json {
                path: path.clone(),
                source,
            })?
        };

        let options = data.runtime_options;
        let mut config = RuntimeConfig {
            apply_patches: options.apply_patches,
            ..Default::default()
        };

        if let Some(framework) = options.framework {
            match FrameworkKind::from_name(&framework.name) {
                Some(FrameworkKind::Runtime) => {
                    config.runtime_version = version_or_wildcard(&framework.version);
                }
                Some(FrameworkKind::AspNet) => {
                    config.aspnet_version = version_or_wildcard(&framework.version);
                    config.runtime_version = config.aspnet_version.clone();
                }
                None => {}
            }
        }

        for framework in options.frameworks {
            let slot = match FrameworkKind::from_name(&framework.name) {
                Some(FrameworkKind::Runtime) => &mut config.runtime_version,
                Some(FrameworkKind::AspNet) => &mut config.aspnet_version,
                None => continue,
            };

            let version = version_or_wildcard(&framework.version);
            if slot.is_empty() {
                *slot = version;
            } else if *slot != version {
                return Err(Error::ConflictingFrameworkEntries {
                    path,
                    framework: framework.name,
                    first: slot.clone(),
                    second: version,
                });
            }
        }

        config.app_name = app_name(&path);

        let executable_path = root.join(&config.app_name);
        config.executable = self
            .fs
            .is_executable(&executable_path)
            .map_err(|e| Error::io("stat", &executable_path, e))?;
        config.path = path;

        debug!(
            app = %config.app_name,
            runtime = %config.runtime_version,
            aspnet = %config.aspnet_version,
            executable = config.executable,
            "Parsed runtime config"
        );

        Ok(config)
    }

    fn find(&self, root: &Path) -> Result<PathBuf> {
        let mut files = self
            .fs
            .files_with_suffix(root, RUNTIME_CONFIG_SUFFIX)
            .map_err(|e| Error::io("list", root, e))?;

        match files.len() {
            0 => Err(Error::ManifestNotFound {
                root: root.to_path_buf(),
            }),
            1 => Ok(files.remove(0)),
            _ => Err(Error::AmbiguousManifest {
                root: root.to_path_buf(),
                files,
            }),
        }
    }
}

fn version_or_wildcard(version: &str) -> String {
    if version.is_empty() {
        "*".to_string()
    } else {
        version.to_string()
    }
}

fn app_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    file_name
        .strip_suffix(RUNTIME_CONFIG_SUFFIX)
        .unwrap_or(&file_name)
        .to_string()
}

/// Removes `//` and `/* */` comments outside of string literals.
/// Newlines inside comments are kept so decode errors report the right line.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }

    out
}
