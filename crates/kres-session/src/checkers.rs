//! Declaration checkers run over a session's own declarations.

use crate::session::Session;
use kres_common::{CallableId, ClassId};
use kres_types::ClassDecl;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    ConflictingOverloads,
    /// Reported by an extension checker under its own code.
    Extension(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub class: ClassId,
    pub member: Option<CallableId>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{member}: {}", self.message),
            None => write!(f, "{}: {}", self.class, self.message),
        }
    }
}

pub trait DeclarationChecker: Send + Sync {
    fn name(&self) -> &str;

    fn check_class(&self, class: &ClassDecl, session: &Session, diagnostics: &mut Vec<Diagnostic>);
}

/// Two members of one class with the same signature.
#[derive(Debug, Default)]
pub struct ConflictingOverloadsChecker;

impl DeclarationChecker for ConflictingOverloadsChecker {
    fn name(&self) -> &str {
        "conflicting-overloads"
    }

    fn check_class(&self, class: &ClassDecl, _session: &Session, diagnostics: &mut Vec<Diagnostic>) {
        for (index, member) in class.members.iter().enumerate() {
            let conflicts = class.members[..index]
                .iter()
                .any(|earlier| earlier.has_same_signature(member));
            if conflicts {
                diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::ConflictingOverloads,
                    class: class.id.clone(),
                    member: Some(member.id.clone()),
                    message: format!("conflicting overloads of `{}`", member.name()),
                });
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct CheckerRegistry {
    declaration_checkers: Vec<Arc<dyn DeclarationChecker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkers every source session starts with.
    pub fn common() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ConflictingOverloadsChecker));
        registry
    }

    pub fn register(&mut self, checker: Arc<dyn DeclarationChecker>) {
        self.declaration_checkers.push(checker);
    }

    pub fn extend(&mut self, checkers: impl IntoIterator<Item = Arc<dyn DeclarationChecker>>) {
        self.declaration_checkers.extend(checkers);
    }

    pub fn declaration_checkers(&self) -> &[Arc<dyn DeclarationChecker>] {
        &self.declaration_checkers
    }

    pub fn len(&self) -> usize {
        self.declaration_checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declaration_checkers.is_empty()
    }
}

impl fmt::Debug for CheckerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.declaration_checkers.iter().map(|checker| checker.name()))
            .finish()
    }
}
