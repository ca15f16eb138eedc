//! Serialized documents handed back to the lifecycle

pub mod schema;

pub use schema::{BuildPlan, LaunchPlan, Process, Provision, Requirement, RequirementMetadata};
