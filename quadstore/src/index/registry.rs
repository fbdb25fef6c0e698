//! The per-store index registry.

use std::collections::HashMap;

use super::definition::IndexDefinition;

/// Errors raised when registering an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Index names must not be empty.
    EmptyName,
    /// An index with this name already exists.
    DuplicateName(String),
    /// The name contains a character of the key separator, so its key
    /// range could overlap another index's range.
    SeparatorInName(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "index name must not be empty"),
            Self::DuplicateName(name) => write!(f, "index '{name}' is already registered"),
            Self::SeparatorInName(name) => {
                write!(f, "index name '{}' contains a key separator character", name.escape_debug())
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered set of indexes owned by one store.
///
/// Built-ins come first and cannot be removed. Custom indexes are appended
/// at setup time; there is no removal.
#[derive(Debug)]
pub struct IndexRegistry {
    indexes: Vec<IndexDefinition>,
    by_name: HashMap<String, usize>,
    builtin_count: usize,
}

impl IndexRegistry {
    /// A registry holding the six built-in indexes.
    #[must_use]
    pub fn with_builtins() -> Self {
        let indexes = IndexDefinition::builtins();
        let by_name = indexes
            .iter()
            .enumerate()
            .map(|(position, index)| (index.name().to_owned(), position))
            .collect();
        let builtin_count = indexes.len();
        Self {
            indexes,
            by_name,
            builtin_count,
        }
    }

    /// Add an index.
    ///
    /// # Pre-conditions
    /// - `separator` is the store's key separator.
    ///
    /// Names may not contain any character of the separator. Otherwise a
    /// name like `SPOG\u{0}` would place its keys inside the `SPOG` range.
    ///
    /// On error nothing is registered.
    pub fn register(
        &mut self,
        index: IndexDefinition,
        separator: &str,
    ) -> Result<&IndexDefinition, RegistryError> {
        let name = index.name();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.chars().any(|c| separator.contains(c)) {
            return Err(RegistryError::SeparatorInName(name.to_owned()));
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_owned()));
        }

        let position = self.indexes.len();
        self.by_name.insert(name.to_owned(), position);
        self.indexes.push(index);
        Ok(&self.indexes[position])
    }

    /// Look up an index by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexDefinition> {
        self.by_name.get(name).map(|position| &self.indexes[*position])
    }

    /// All indexes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexDefinition> {
        self.indexes.iter()
    }

    /// The built-in indexes in registry order.
    #[must_use]
    pub fn builtins(&self) -> &[IndexDefinition] {
        &self.indexes[..self.builtin_count]
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.indexes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
