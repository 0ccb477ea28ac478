//! Declarations and their symbols.
//!
//! A declaration is built once by an ingestion source and then shared as an
//! `Arc` symbol. Symbols are compared by identity (`same_symbol`): two
//! structurally equal declarations from different modules are different
//! symbols.

use crate::types::Type;
use kres_common::{CallableId, ClassId, Name};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Where a declaration comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclarationOrigin {
    /// Parsed from the module being compiled.
    Source,
    /// Deserialized from this language's own binary metadata.
    Library,
    /// Loaded from a foreign (non-native) binary ecosystem.
    Foreign,
    /// Builtin declarations of the shared session.
    BuiltIns,
    /// Synthesized by the compiler (function interfaces and the like).
    Synthetic,
    /// Generated by an extension.
    Plugin(Name),
}

impl DeclarationOrigin {
    pub const fn is_foreign(&self) -> bool {
        matches!(self, Self::Foreign)
    }
}

/// Expect/actual status of a multiplatform declaration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExpectActual {
    #[default]
    Plain,
    Expect,
    Actual,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
}

/// Lazy resolution phases, in the order a declaration goes through them.
///
/// The derived ordering is the "at least as resolved as" relation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ResolvePhase {
    Raw = 0,
    Imports = 1,
    SuperTypes = 2,
    Types = 3,
    Status = 4,
    BodyResolve = 5,
}

impl ResolvePhase {
    pub const ALL: [Self; 6] = [
        Self::Raw,
        Self::Imports,
        Self::SuperTypes,
        Self::Types,
        Self::Status,
        Self::BodyResolve,
    ];

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Raw,
            1 => Self::Imports,
            2 => Self::SuperTypes,
            3 => Self::Types,
            4 => Self::Status,
            _ => Self::BodyResolve,
        }
    }
}

// =============================================================================
// Callables
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameter {
    pub name: Name,
    pub ty: Type,
    pub is_vararg: bool,
    pub has_default_value: bool,
    /// Marked as accepting signed integer arguments for an unsigned type.
    pub implicit_integer_coercion: bool,
}

impl ValueParameter {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: Name::identifier(name),
            ty,
            is_vararg: false,
            has_default_value: false,
            implicit_integer_coercion: false,
        }
    }

    #[must_use]
    pub fn vararg(mut self) -> Self {
        self.is_vararg = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self) -> Self {
        self.has_default_value = true;
        self
    }

    #[must_use]
    pub fn with_implicit_integer_coercion(mut self) -> Self {
        self.implicit_integer_coercion = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct CallableDecl {
    pub id: CallableId,
    pub type_parameters: Vec<Name>,
    pub receiver_type: Option<Type>,
    /// Owning class for members.
    pub dispatch_receiver: Option<ClassId>,
    pub value_parameters: Vec<ValueParameter>,
    pub return_type: Type,
    pub modality: Modality,
    /// `const val` property, usable as an integer-coercion argument.
    pub is_const: bool,
    pub implicit_integer_coercion: bool,
    pub origin: DeclarationOrigin,
    pub expect_actual: ExpectActual,
}

pub type CallableSymbol = Arc<CallableDecl>;

impl CallableDecl {
    pub fn function(id: CallableId, value_parameters: Vec<ValueParameter>, return_type: Type) -> Self {
        Self {
            id,
            type_parameters: Vec::new(),
            receiver_type: None,
            dispatch_receiver: None,
            value_parameters,
            return_type,
            modality: Modality::Final,
            is_const: false,
            implicit_integer_coercion: false,
            origin: DeclarationOrigin::Source,
            expect_actual: ExpectActual::Plain,
        }
    }

    /// A `const val` property of the given type.
    pub fn const_property(id: CallableId, ty: Type) -> Self {
        Self {
            is_const: true,
            ..Self::function(id, Vec::new(), ty)
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, names: &[&str]) -> Self {
        self.type_parameters = names.iter().map(|name| Name::identifier(name)).collect();
        self
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: Type) -> Self {
        self.receiver_type = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: DeclarationOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_expect_actual(mut self, expect_actual: ExpectActual) -> Self {
        self.expect_actual = expect_actual;
        self
    }

    #[must_use]
    pub fn with_implicit_integer_coercion(mut self) -> Self {
        self.implicit_integer_coercion = true;
        self
    }

    pub fn into_symbol(self) -> CallableSymbol {
        Arc::new(self)
    }

    pub fn name(&self) -> &Name {
        &self.id.callable_name
    }

    pub const fn is_abstract(&self) -> bool {
        matches!(self.modality, Modality::Abstract)
    }

    /// Same name, receiver presence and parameter types.
    ///
    /// This is the override-matching relation: return types are not compared.
    pub fn has_same_signature(&self, other: &CallableDecl) -> bool {
        self.id.callable_name == other.id.callable_name
            && self.receiver_type == other.receiver_type
            && self.value_parameters.len() == other.value_parameters.len()
            && self
                .value_parameters
                .iter()
                .zip(&other.value_parameters)
                .all(|(a, b)| a.ty == b.ty && a.is_vararg == b.is_vararg)
    }
}

/// Identity comparison of symbols.
pub fn same_symbol<T>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::ptr_eq(a, b)
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    /// Interface declared as functional: eligible for SAM adaptation.
    FunInterface,
    Object,
    TypeAlias,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variance {
    #[default]
    Invariant,
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParameterDecl {
    pub name: Name,
    pub variance: Variance,
}

impl TypeParameterDecl {
    pub fn new(name: &str, variance: Variance) -> Self {
        Self {
            name: Name::identifier(name),
            variance,
        }
    }
}

#[derive(Debug)]
pub struct ClassDecl {
    pub id: ClassId,
    pub kind: ClassKind,
    pub type_parameters: Vec<TypeParameterDecl>,
    pub supertypes: Vec<Type>,
    pub members: Vec<CallableSymbol>,
    /// Right-hand side for `ClassKind::TypeAlias`.
    pub alias_target: Option<Type>,
    pub origin: DeclarationOrigin,
    pub expect_actual: ExpectActual,
    resolve_phase: AtomicU8,
}

pub type ClassSymbol = Arc<ClassDecl>;

impl ClassDecl {
    pub fn new(id: ClassId, kind: ClassKind) -> Self {
        Self {
            id,
            kind,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            members: Vec::new(),
            alias_target: None,
            origin: DeclarationOrigin::Source,
            expect_actual: ExpectActual::Plain,
            resolve_phase: AtomicU8::new(ResolvePhase::Raw as u8),
        }
    }

    pub fn type_alias(id: ClassId, target: Type) -> Self {
        Self {
            alias_target: Some(target),
            ..Self::new(id, ClassKind::TypeAlias)
        }
    }

    #[must_use]
    pub fn with_type_parameters(mut self, parameters: Vec<TypeParameterDecl>) -> Self {
        self.type_parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: Type) -> Self {
        self.supertypes.push(supertype);
        self
    }

    /// Add a member, stamping this class as its dispatch receiver.
    #[must_use]
    pub fn with_member(mut self, mut member: CallableDecl) -> Self {
        member.dispatch_receiver = Some(self.id.clone());
        member.id = CallableId::member(&self.id, member.name());
        if member.origin == DeclarationOrigin::Source {
            member.origin = self.origin.clone();
        }
        self.members.push(Arc::new(member));
        self
    }

    /// Set the origin of the class and of every member added so far.
    #[must_use]
    pub fn with_origin(mut self, origin: DeclarationOrigin) -> Self {
        self.members = self
            .members
            .into_iter()
            .map(|member| {
                let mut member = Arc::unwrap_or_clone(member);
                member.origin = origin.clone();
                Arc::new(member)
            })
            .collect();
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_expect_actual(mut self, expect_actual: ExpectActual) -> Self {
        self.expect_actual = expect_actual;
        self
    }

    pub fn into_symbol(self) -> ClassSymbol {
        Arc::new(self)
    }

    /// Non-null type of this class applied to its own type parameters.
    pub fn default_type(&self) -> Type {
        Type::class(
            self.id.clone(),
            self.type_parameters
                .iter()
                .map(|parameter| Type::TypeParameter {
                    name: parameter.name.clone(),
                    nullable: false,
                })
                .collect(),
        )
    }

    pub fn members_named<'a>(&'a self, name: &'a Name) -> impl Iterator<Item = &'a CallableSymbol> {
        self.members
            .iter()
            .filter(move |member| member.name() == name)
    }

    /// The single abstract member of a functional interface.
    pub fn single_abstract_member(&self) -> Option<&CallableSymbol> {
        if self.kind != ClassKind::FunInterface {
            return None;
        }
        let mut abstract_members = self.members.iter().filter(|member| member.is_abstract());
        let first = abstract_members.next()?;
        abstract_members.next().is_none().then_some(first)
    }

    pub fn resolve_phase(&self) -> ResolvePhase {
        ResolvePhase::from_u8(self.resolve_phase.load(Ordering::Acquire))
    }

    /// Raise the recorded phase to at least `phase`. Never lowers it.
    pub fn mark_resolved_to(&self, phase: ResolvePhase) {
        self.resolve_phase.fetch_max(phase as u8, Ordering::AcqRel);
    }
}

#[cfg(test)]
#[path = "../tests/declarations_tests.rs"]
mod tests;
