//! Declaration sources: the ingestion boundary behind leaf providers.

use kres_common::{CallableId, ClassId};
use kres_types::{CallableDecl, CallableSymbol, ClassDecl, ClassSymbol};
use indexmap::IndexMap;
use std::fmt;

/// One physical source of declarations: parsed module sources, deserialized
/// binary metadata, builtins, or declarations generated by an extension.
///
/// Lookups are pure. A miss is `None` or an empty list.
pub trait DeclarationSource: Send + Sync + fmt::Debug {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol>;

    /// Callables with exactly this id, in declaration order.
    fn callables(&self, id: &CallableId) -> Vec<CallableSymbol>;

    /// Every class id this source can answer for, when enumerable.
    fn class_ids(&self) -> Vec<ClassId> {
        Vec::new()
    }
}

/// In-memory declaration table.
///
/// Filled once through `add_class` / `add_callable` and then shared behind an
/// `Arc`. Class members are indexed as callables of their owning class.
#[derive(Default)]
pub struct DeclarationTable {
    label: String,
    classes: IndexMap<ClassId, ClassSymbol>,
    callables: IndexMap<CallableId, Vec<CallableSymbol>>,
}

impl DeclarationTable {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Add a class and index its members. A second class with the same id
    /// replaces the first.
    pub fn add_class(&mut self, class: ClassDecl) -> ClassSymbol {
        let symbol = class.into_symbol();
        for member in &symbol.members {
            self.callables
                .entry(member.id.clone())
                .or_default()
                .push(member.clone());
        }
        self.classes.insert(symbol.id.clone(), symbol.clone());
        symbol
    }

    pub fn add_callable(&mut self, callable: CallableDecl) -> CallableSymbol {
        let symbol = callable.into_symbol();
        self.callables
            .entry(symbol.id.clone())
            .or_default()
            .push(symbol.clone());
        symbol
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.callables.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.callables.is_empty()
    }
}

impl fmt::Debug for DeclarationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationTable")
            .field("label", &self.label)
            .field("classes", &self.classes.len())
            .field("callables", &self.callables.len())
            .finish()
    }
}

impl DeclarationSource for DeclarationTable {
    fn class_symbol(&self, id: &ClassId) -> Option<ClassSymbol> {
        self.classes.get(id).cloned()
    }

    fn callables(&self, id: &CallableId) -> Vec<CallableSymbol> {
        self.callables.get(id).cloned().unwrap_or_default()
    }

    fn class_ids(&self) -> Vec<ClassId> {
        self.classes.keys().cloned().collect()
    }
}
