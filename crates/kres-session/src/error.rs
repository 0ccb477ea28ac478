//! Session configuration errors.
//!
//! All of these abort construction of the session being built. Nothing is
//! published for a session whose construction failed.

use crate::builder::BuildStep;
use kres_common::Name;
use kres_providers::SessionKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("module `{module}` depends on `{dependency}`, whose session is not published yet")]
    DependencyNotPublished { module: Name, dependency: Name },

    #[error("library session for {modules:?} was given source providers")]
    LibraryWithSourceProviders { modules: Vec<Name> },

    #[error("source module `{module}` has no library dependency providing the shared declarations")]
    MissingLibraryDependency { module: Name },

    #[error("{kind} session needs a published shared-library session")]
    MissingSharedSession { kind: SessionKind },

    #[error("session step `{attempted}` called while at step `{current}`")]
    OutOfOrder {
        attempted: BuildStep,
        current: BuildStep,
    },

    #[error("module `{module}` is already bound to a session")]
    AlreadyBound { module: Name },

    #[error("a source session binds exactly one module, got {count}")]
    SourceModuleCount { count: usize },
}
