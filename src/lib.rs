//! kres: declaration providers, sessions and call resolution for a
//! multi-module compiler front end.
//!
//! The workspace is layered bottom-up:
//!
//! - [`kres_common`] - names, ids, language settings
//! - [`kres_types`] - types, declarations, subtyping
//! - [`kres_providers`] - declaration sources, symbol providers, scope caches
//! - [`kres_session`] - staged session construction
//! - [`kres_resolve`] - overload resolution with SAM conversion and integer
//!   coercion
//!
//! This crate ties them together: a JSON [`config::ProjectConfig`] becomes a
//! [`project::Project`] with one published session per module.

pub mod config;
pub mod project;
pub mod tracing_config;

pub use config::{LIBRARY_BUCKET, ModuleConfig, ModuleKind, ProjectConfig};
pub use project::{Project, ProjectSources, build_project};

pub use kres_common;
pub use kres_providers;
pub use kres_resolve;
pub use kres_session;
pub use kres_types;
