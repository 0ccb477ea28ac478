//! Project configuration.
//!
//! A project is described by one JSON document:
//!
//! ```json
//! {
//!   "language": { "enabledFeatures": ["ImplicitSignedToUnsignedIntegerConversion"] },
//!   "modules": [
//!     { "name": "stdlib", "kind": "library" },
//!     { "name": "common", "dependencies": ["stdlib"] },
//!     { "name": "jvm", "dependencies": ["stdlib"], "dependsOn": ["common"] },
//!     { "name": "jvmTest", "dependencies": ["jvm"], "friends": ["jvm"] }
//!   ]
//! }
//! ```
//!
//! Modules default to `source`. Every library module ends up in one library
//! session; every source module gets its own session.

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use kres_common::LanguageVersionSettings;
use serde::Deserialize;
use std::path::Path;

/// Name reserved for the implicit library module every source module
/// depends on.
pub const LIBRARY_BUCKET: &str = "project-libraries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    #[default]
    Source,
    Library,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub friends: Vec<String>,
    /// Multiplatform refinement edges: this module provides `actual`s for
    /// the `expect`s of these modules.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Per-module override of the project settings. Source modules only.
    #[serde(default)]
    pub language: Option<LanguageVersionSettings>,
}

impl ModuleConfig {
    /// Every outgoing edge, in declaration order.
    pub fn edges(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(&self.friends)
            .chain(&self.depends_on)
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub language: LanguageVersionSettings,
    pub modules: Vec<ModuleConfig>,
}

impl ProjectConfig {
    /// Parse and validate a configuration document.
    pub fn parse(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source).context("failed to parse project JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project config: {}", path.display()))?;
        Self::parse(&source)
            .with_context(|| format!("invalid project config: {}", path.display()))
    }

    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|module| module.name == name)
    }

    /// Reject duplicate or reserved names, unknown edges, library modules
    /// depending on source modules, and dependency cycles.
    pub fn validate(&self) -> Result<()> {
        let mut by_name: IndexMap<&str, &ModuleConfig> = IndexMap::new();
        for module in &self.modules {
            if module.name == LIBRARY_BUCKET {
                bail!("module name `{LIBRARY_BUCKET}` is reserved");
            }
            if by_name.insert(module.name.as_str(), module).is_some() {
                bail!("duplicate module `{}`", module.name);
            }
        }

        for module in &self.modules {
            for edge in module.edges() {
                let Some(target) = by_name.get(edge) else {
                    bail!("module `{}` depends on unknown module `{edge}`", module.name);
                };
                if module.kind == ModuleKind::Library && target.kind == ModuleKind::Source {
                    bail!(
                        "library module `{}` cannot depend on source module `{edge}`",
                        module.name
                    );
                }
            }
            if module.kind == ModuleKind::Library && module.language.is_some() {
                bail!("library module `{}` cannot override language settings", module.name);
            }
        }

        if let Some(cycle) = depends_on_cycle(&by_name) {
            bail!("dependsOn cycle: {}", cycle.join(" -> "));
        }
        self.topological_order().map(|_| ())
    }

    /// Module indices such that every module comes after all modules it has
    /// an edge to. Ties keep declaration order.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let index: IndexMap<&str, usize> = self
            .modules
            .iter()
            .enumerate()
            .map(|(position, module)| (module.name.as_str(), position))
            .collect();
        let mut remaining: Vec<usize> = self
            .modules
            .iter()
            .map(|module| module.edges().filter(|edge| index.contains_key(edge)).count())
            .collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.modules.len()];
        for (position, module) in self.modules.iter().enumerate() {
            for edge in module.edges() {
                if let Some(&target) = index.get(edge) {
                    dependents[target].push(position);
                }
            }
        }

        let mut order = Vec::with_capacity(self.modules.len());
        let mut done = vec![false; self.modules.len()];
        while order.len() < self.modules.len() {
            let ready = (0..self.modules.len()).find(|&position| !done[position] && remaining[position] == 0);
            let Some(next) = ready else {
                let stuck: Vec<&str> = (0..self.modules.len())
                    .filter(|&position| !done[position])
                    .map(|position| self.modules[position].name.as_str())
                    .collect();
                bail!("dependency cycle among modules: {}", stuck.join(", "));
            };
            done[next] = true;
            order.push(next);
            for &dependent in &dependents[next] {
                remaining[dependent] -= 1;
            }
        }
        Ok(order)
    }
}

/// First cycle along `dependsOn` edges, as a closed path of names.
fn depends_on_cycle(modules: &IndexMap<&str, &ModuleConfig>) -> Option<Vec<String>> {
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; modules.len()];
    for start in 0..modules.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        // explicit stack of (module, next edge to visit)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::OnStack;
        while let Some(top) = stack.last_mut() {
            let (current, next_edge) = *top;
            top.1 += 1;
            let (_, module) = modules.get_index(current)?;
            let Some(edge) = module.depends_on.get(next_edge) else {
                marks[current] = Mark::Done;
                stack.pop();
                continue;
            };
            let Some(target) = modules.get_index_of(edge.as_str()) else {
                continue;
            };
            match marks[target] {
                Mark::Unvisited => {
                    marks[target] = Mark::OnStack;
                    stack.push((target, 0));
                }
                Mark::OnStack => {
                    let from = stack.iter().position(|&(module, _)| module == target)?;
                    let mut cycle: Vec<String> = stack[from..]
                        .iter()
                        .filter_map(|&(module, _)| modules.get_index(module))
                        .map(|(name, _)| (*name).to_string())
                        .collect();
                    cycle.push(edge.clone());
                    return Some(cycle);
                }
                Mark::Done => {}
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod tests;
