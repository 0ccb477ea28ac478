//! Session identity as seen by providers.
//!
//! Providers never hold a reference to their session. They carry a
//! `ProviderOwner` tag instead, which is all flattening needs to decide
//! visibility.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique session identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

impl SessionId {
    /// Allocate a fresh id. Ids are never reused.
    pub fn fresh() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// One module being compiled.
    Source,
    /// A bucket of binary dependencies.
    Library,
    /// Builtins and synthetic declarations shared by every session.
    SharedLibrary,
}

impl SessionKind {
    /// Library and shared-library sessions both expose binary declarations.
    pub const fn is_library_like(self) -> bool {
        matches!(self, Self::Library | Self::SharedLibrary)
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Library => "library",
            Self::SharedLibrary => "shared-library",
        })
    }
}

/// The session a provider was constructed by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderOwner {
    pub session: SessionId,
    pub kind: SessionKind,
}

impl ProviderOwner {
    pub const fn new(session: SessionId, kind: SessionKind) -> Self {
        Self { session, kind }
    }

    /// Flattening visibility rule: a source consumer sees only its own source
    /// leaves; any other consumer sees library-like leaves.
    pub fn exposes_leaves_of(self, leaf_owner: ProviderOwner) -> bool {
        match self.kind {
            SessionKind::Source => {
                leaf_owner.kind == SessionKind::Source && leaf_owner.session == self.session
            }
            SessionKind::Library | SessionKind::SharedLibrary => leaf_owner.kind.is_library_like(),
        }
    }
}
