//! Roster core library: domain types, normalization, skills, CSV sources
//! and configuration.
//!
//! - [`types`]: newtypes, owned fields, loaded and remote worker records
//! - [`identifier`]: display name → contact identifier
//! - [`normalize`]: CSV cell → attribute value, falsy-equivalent comparison
//! - [`skills`]: skill sets from a delimited column or a side table
//! - [`attributes`]: typed attribute blob with an open bag for unknown keys
//! - [`source`]: CSV loaders
//! - [`config`]: run settings from YAML and environment

pub mod attributes;
pub mod config;
pub mod error;
pub mod identifier;
pub mod normalize;
pub mod skills;
pub mod source;
pub mod types;

pub use attributes::{Routing, WorkerAttributes};
pub use config::RunConfig;
pub use error::CoreError;
pub use skills::{SkillAssignment, SkillSource, SkillTable};
pub use types::{LoadedWorkerRecord, OwnedField, RemoteWorker, WorkerName, WorkerSid};
