//! Well-known class ids: builtins, integer classes and function interfaces.

use crate::types::Type;
use kres_common::ClassId;
use std::sync::LazyLock;

pub const BUILTINS_PACKAGE: &str = "kotlin";

pub static ANY: LazyLock<ClassId> = LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Any"));
pub static NOTHING: LazyLock<ClassId> =
    LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Nothing"));
pub static UNIT: LazyLock<ClassId> = LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Unit"));
pub static NUMBER: LazyLock<ClassId> = LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Number"));
pub static COMPARABLE: LazyLock<ClassId> =
    LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Comparable"));
pub static STRING: LazyLock<ClassId> = LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "String"));
pub static FUNCTION: LazyLock<ClassId> =
    LazyLock::new(|| ClassId::new(BUILTINS_PACKAGE, "Function"));

pub fn any_type() -> Type {
    Type::simple(ANY.clone())
}

pub fn nullable_any_type() -> Type {
    any_type().make_nullable()
}

pub fn nothing_type() -> Type {
    Type::simple(NOTHING.clone())
}

pub fn unit_type() -> Type {
    Type::simple(UNIT.clone())
}

// =============================================================================
// Integer classes
// =============================================================================

/// Fixed-width integer classes, signed and unsigned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    Byte,
    Short,
    Int,
    Long,
    UByte,
    UShort,
    UInt,
    ULong,
}

impl IntegerKind {
    pub const ALL: [Self; 8] = [
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::UByte,
        Self::UShort,
        Self::UInt,
        Self::ULong,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Int",
            Self::Long => "Long",
            Self::UByte => "UByte",
            Self::UShort => "UShort",
            Self::UInt => "UInt",
            Self::ULong => "ULong",
        }
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::UByte | Self::UShort | Self::UInt | Self::ULong)
    }

    pub fn class_id(self) -> ClassId {
        ClassId::new(BUILTINS_PACKAGE, self.class_name())
    }

    pub fn to_type(self) -> Type {
        Type::simple(self.class_id())
    }

    pub fn from_class_id(id: &ClassId) -> Option<Self> {
        if id.package.as_str() != BUILTINS_PACKAGE {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.class_name() == id.relative_name.as_str())
    }

    /// Whether an integer literal with this value fits the class.
    ///
    /// Unsigned classes accept the non-negative half of the literal range;
    /// `ULong` values above `i64::MAX` are not representable as literals here.
    pub const fn contains(self, value: i64) -> bool {
        match self {
            Self::Byte => value >= i8::MIN as i64 && value <= i8::MAX as i64,
            Self::Short => value >= i16::MIN as i64 && value <= i16::MAX as i64,
            Self::Int => value >= i32::MIN as i64 && value <= i32::MAX as i64,
            Self::Long => true,
            Self::UByte => value >= 0 && value <= u8::MAX as i64,
            Self::UShort => value >= 0 && value <= u16::MAX as i64,
            Self::UInt => value >= 0 && value <= u32::MAX as i64,
            Self::ULong => value >= 0,
        }
    }

    /// Type an integer literal takes when nothing constrains it.
    pub const fn default_for_literal(value: i64) -> Self {
        if Self::Int.contains(value) {
            Self::Int
        } else {
            Self::Long
        }
    }
}

/// `UByte`, `UShort`, `UInt`, `ULong`, nullable or not.
pub fn is_unsigned_type_or_nullable_unsigned(ty: &Type) -> bool {
    ty.class_id()
        .and_then(IntegerKind::from_class_id)
        .is_some_and(IntegerKind::is_unsigned)
}

// =============================================================================
// Function interfaces
// =============================================================================

/// Family of synthetic function interfaces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Function,
    SuspendFunction,
    KFunction,
    KSuspendFunction,
}

impl FunctionKind {
    pub const ALL: [Self; 4] = [
        Self::Function,
        Self::SuspendFunction,
        Self::KFunction,
        Self::KSuspendFunction,
    ];

    pub const fn package(self) -> &'static str {
        match self {
            Self::Function => "kotlin",
            Self::SuspendFunction => "kotlin.coroutines",
            Self::KFunction | Self::KSuspendFunction => "kotlin.reflect",
        }
    }

    pub const fn class_name_prefix(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::SuspendFunction => "SuspendFunction",
            Self::KFunction => "KFunction",
            Self::KSuspendFunction => "KSuspendFunction",
        }
    }

    pub const fn is_reflect(self) -> bool {
        matches!(self, Self::KFunction | Self::KSuspendFunction)
    }

    pub fn class_id(self, arity: usize) -> ClassId {
        ClassId::new(
            self.package(),
            &format!("{}{arity}", self.class_name_prefix()),
        )
    }

    /// Recognise `FunctionN`-style class ids, returning the kind and arity.
    pub fn parse(id: &ClassId) -> Option<(Self, usize)> {
        Self::ALL.into_iter().find_map(|kind| {
            if id.package.as_str() != kind.package() {
                return None;
            }
            let arity = id
                .relative_name
                .as_str()
                .strip_prefix(kind.class_name_prefix())?;
            if arity.is_empty() || !arity.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            arity.parse().ok().map(|arity| (kind, arity))
        })
    }
}

/// Build `FunctionN<P1, ..., PN, R>` for the given kind.
pub fn function_type(kind: FunctionKind, parameters: Vec<Type>, return_type: Type) -> Type {
    let arity = parameters.len();
    let mut arguments = parameters;
    arguments.push(return_type);
    Type::class(kind.class_id(arity), arguments)
}

/// Any of the function interface families.
pub fn is_some_function_type(ty: &Type) -> bool {
    ty.class_id().is_some_and(|id| FunctionKind::parse(id).is_some())
}

/// Parameter types of a function type, receiver included when it is encoded
/// as the first parameter.
pub fn function_parameter_types(ty: &Type) -> &[Type] {
    match ty.arguments().split_last() {
        Some((_, parameters)) if is_some_function_type(ty) => parameters,
        _ => &[],
    }
}

pub fn function_return_type(ty: &Type) -> Option<&Type> {
    if !is_some_function_type(ty) {
        return None;
    }
    ty.arguments().last()
}
