//! Names and declaration identifiers.
//!
//! Identifiers are cheap to clone (`Arc<str>` backed) and hash by content, so
//! they can be used directly as cache keys by providers and scope caches.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A simple (unqualified) identifier, e.g. `invoke` or `Comparator`.
///
/// Special names are wrapped in angle brackets (`<shared dependencies>`) and
/// never clash with user identifiers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(Arc<str>);

impl Name {
    pub fn identifier(text: &str) -> Self {
        Self(Arc::from(text))
    }

    pub fn special(text: &str) -> Self {
        Self(Arc::from(format!("<{text}>")))
    }

    pub fn is_special(&self) -> bool {
        self.0.starts_with('<')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::identifier(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dot-separated qualified name, used for packages and nested class paths.
///
/// The root package is the empty name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FqName(Arc<str>);

impl FqName {
    pub fn root() -> Self {
        Self(Arc::from(""))
    }

    pub fn new(text: &str) -> Self {
        Self(Arc::from(text))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn child(&self, name: &Name) -> Self {
        if self.is_root() {
            Self(Arc::from(name.as_str()))
        } else {
            Self(Arc::from(format!("{}.{}", self.0, name)))
        }
    }

    /// Last segment of the name, or `None` for the root.
    pub fn short_name(&self) -> Option<Name> {
        if self.is_root() {
            return None;
        }
        let last = self.0.rsplit('.').next().unwrap_or(&self.0);
        Some(Name::identifier(last))
    }
}

impl fmt::Debug for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a classifier: package plus (possibly nested) relative name.
///
/// Rendered as `package/Outer.Inner`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId {
    pub package: FqName,
    pub relative_name: FqName,
    #[serde(default)]
    pub is_local: bool,
}

impl ClassId {
    pub fn new(package: &str, relative_name: &str) -> Self {
        Self {
            package: FqName::new(package),
            relative_name: FqName::new(relative_name),
            is_local: false,
        }
    }

    /// Parse the `package/Relative.Name` form. A missing slash means the root package.
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once('/') {
            Some((package, relative)) => Self::new(&package.replace('/', "."), relative),
            None => Self::new("", text),
        }
    }

    pub fn short_class_name(&self) -> Name {
        self.relative_name
            .short_name()
            .unwrap_or_else(|| Name::special("anonymous"))
    }

    pub fn nested(&self, name: &Name) -> Self {
        Self {
            package: self.package.clone(),
            relative_name: self.relative_name.child(name),
            is_local: self.is_local,
        }
    }

    pub fn as_fq_name(&self) -> FqName {
        if self.package.is_root() {
            self.relative_name.clone()
        } else {
            FqName::new(&format!("{}.{}", self.package, self.relative_name))
        }
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.package.as_str().replace('.', "/"),
            self.relative_name
        )
    }
}

/// Identity of a callable: package, optional owning class and simple name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallableId {
    pub package: FqName,
    #[serde(default)]
    pub class_name: Option<FqName>,
    pub callable_name: Name,
}

impl CallableId {
    /// A top-level callable.
    pub fn top_level(package: &str, name: &str) -> Self {
        Self {
            package: FqName::new(package),
            class_name: None,
            callable_name: Name::identifier(name),
        }
    }

    /// A member of `owner`.
    pub fn member(owner: &ClassId, name: &Name) -> Self {
        Self {
            package: owner.package.clone(),
            class_name: Some(owner.relative_name.clone()),
            callable_name: name.clone(),
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.class_name.as_ref().map(|relative| ClassId {
            package: self.package.clone(),
            relative_name: relative.clone(),
            is_local: false,
        })
    }
}

impl fmt::Debug for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let package = self.package.as_str().replace('.', "/");
        match &self.class_name {
            Some(class_name) => write!(f, "{package}/{class_name}.{}", self.callable_name),
            None => write!(f, "{package}/{}", self.callable_name),
        }
    }
}

#[cfg(test)]
#[path = "../tests/name_tests.rs"]
mod tests;
