//! Type representation.
//!
//! Types are immutable values. Type argument lists are `Arc<[Type]>` so
//! cloning a deeply parameterised type stays cheap.

use kres_common::{ClassId, Name};
use std::fmt;
use std::sync::Arc;

/// Identifier of an inference type variable owned by one candidate's
/// constraint system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVariableId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// A classifier type, possibly parameterised: `Comparator<Int>?`.
    Class {
        id: ClassId,
        arguments: Arc<[Type]>,
        nullable: bool,
    },
    /// A reference to a declared type parameter `T`.
    TypeParameter { name: Name, nullable: bool },
    /// An in-flight inference variable.
    Variable { id: TypeVariableId, nullable: bool },
    /// Placeholder for a variable during builder inference; compatible with
    /// anything when the subtype checker is configured that way.
    Stub { id: TypeVariableId, nullable: bool },
    /// Type of an integer literal before it is fixed to a concrete width.
    IntegerLiteral { value: i64, nullable: bool },
    /// Unresolved type.
    Error,
}

/// Head of a type, ignoring arguments and nullability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeConstructor {
    Class(ClassId),
    TypeParameter(Name),
    Variable(TypeVariableId),
    Stub(TypeVariableId),
    IntegerLiteral,
    Error,
}

impl Type {
    /// A non-null class type without arguments.
    pub fn simple(id: ClassId) -> Self {
        Self::Class {
            id,
            arguments: Arc::from([]),
            nullable: false,
        }
    }

    /// A non-null class type with arguments.
    pub fn class(id: ClassId, arguments: Vec<Type>) -> Self {
        Self::Class {
            id,
            arguments: Arc::from(arguments),
            nullable: false,
        }
    }

    pub fn type_parameter(name: &str) -> Self {
        Self::TypeParameter {
            name: Name::identifier(name),
            nullable: false,
        }
    }

    pub const fn variable(id: TypeVariableId) -> Self {
        Self::Variable {
            id,
            nullable: false,
        }
    }

    pub const fn integer_literal(value: i64) -> Self {
        Self::IntegerLiteral {
            value,
            nullable: false,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Class { nullable, .. }
            | Self::TypeParameter { nullable, .. }
            | Self::Variable { nullable, .. }
            | Self::Stub { nullable, .. }
            | Self::IntegerLiteral { nullable, .. } => *nullable,
            Self::Error => false,
        }
    }

    /// Copy of this type with the given nullability.
    #[must_use]
    pub fn with_nullability(&self, nullable: bool) -> Self {
        let mut result = self.clone();
        match &mut result {
            Self::Class { nullable: n, .. }
            | Self::TypeParameter { nullable: n, .. }
            | Self::Variable { nullable: n, .. }
            | Self::Stub { nullable: n, .. }
            | Self::IntegerLiteral { nullable: n, .. } => *n = nullable,
            Self::Error => {}
        }
        result
    }

    /// Copy of this type carrying the nullability of `other`.
    #[must_use]
    pub fn with_nullability_of(&self, other: &Type) -> Self {
        self.with_nullability(other.is_nullable())
    }

    #[must_use]
    pub fn make_nullable(&self) -> Self {
        self.with_nullability(true)
    }

    #[must_use]
    pub fn make_not_null(&self) -> Self {
        self.with_nullability(false)
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            Self::Class { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn arguments(&self) -> &[Type] {
        match self {
            Self::Class { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub const fn is_integer_literal(&self) -> bool {
        matches!(self, Self::IntegerLiteral { .. })
    }

    pub const fn is_type_parameter(&self) -> bool {
        matches!(self, Self::TypeParameter { .. })
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn type_constructor(&self) -> TypeConstructor {
        match self {
            Self::Class { id, .. } => TypeConstructor::Class(id.clone()),
            Self::TypeParameter { name, .. } => TypeConstructor::TypeParameter(name.clone()),
            Self::Variable { id, .. } => TypeConstructor::Variable(*id),
            Self::Stub { id, .. } => TypeConstructor::Stub(*id),
            Self::IntegerLiteral { .. } => TypeConstructor::IntegerLiteral,
            Self::Error => TypeConstructor::Error,
        }
    }

    /// Whether any type variable or stub occurs in this type.
    pub fn contains_variables(&self) -> bool {
        match self {
            Self::Variable { .. } | Self::Stub { .. } => true,
            Self::Class { arguments, .. } => arguments.iter().any(Type::contains_variables),
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nullable = self.is_nullable();
        match self {
            Self::Class { id, arguments, .. } => {
                write!(f, "{id}")?;
                if !arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    f.write_str(">")?;
                }
            }
            Self::TypeParameter { name, .. } => write!(f, "{name}")?,
            Self::Variable { id, .. } => write!(f, "TV#{}", id.0)?,
            Self::Stub { id, .. } => write!(f, "Stub#{}", id.0)?,
            Self::IntegerLiteral { value, .. } => write!(f, "ILT({value})")?,
            Self::Error => f.write_str("<error>")?,
        }
        if nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}
