//! Template names and their overrides.

use std::collections::BTreeMap;

/// Maps logical template names (`crud/index`, `crud/field/image`) to template paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRegistry {
    namespace: String,
    overrides: BTreeMap<String, String>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new("@Admin")
    }
}

impl TemplateRegistry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn set_template(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), path.into());
        self
    }

    /// The override for `name`, or its path in the default namespace.
    pub fn path(&self, name: &str) -> String {
        match self.overrides.get(name) {
            Some(path) => path.clone(),
            None => format!("{}/{}.html", self.namespace, name.trim_matches('/')),
        }
    }

    pub fn is_overridden(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }
}
