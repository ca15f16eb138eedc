//! Readers for the .NET artifacts an app directory can contain

pub mod buildpack_yml;
pub mod catalog;
pub mod project;
pub mod runtime_config;
pub mod version;

pub use buildpack_yml::BuildpackYml;
pub use catalog::{CatalogEntry, DependencyCatalog};
pub use project::{ProjectDescriptor, ProjectFileParser};
pub use runtime_config::{RuntimeConfig, RuntimeConfigParser};
