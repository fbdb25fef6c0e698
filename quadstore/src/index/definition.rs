use std::sync::Arc;

use crate::types::{Quad, TermRole};

/// Caller-supplied key function of a custom index.
pub type KeyGenerator = Arc<dyn Fn(&Quad) -> String + Send + Sync>;

/// Names and term orders of the built-in indexes, in registry order.
pub const BUILTIN_INDEXES: [(&str, [TermRole; 4]); 6] = {
    use TermRole::{Context as G, Object as O, Predicate as P, Subject as S};
    [
        ("SPOG", [S, P, O, G]),
        ("POG", [P, O, G, S]),
        ("OGS", [O, G, S, P]),
        ("GSP", [G, S, P, O]),
        ("GP", [G, P, S, O]),
        ("OS", [O, S, P, G]),
    ]
};

/// How an index derives its key from a quad.
#[derive(Clone)]
pub enum IndexKey {
    /// The quad's terms in the given order.
    Fragments(Vec<TermRole>),
    /// A generated key followed by the quad's terms in SPOG order.
    Generator(KeyGenerator),
}

impl std::fmt::Debug for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fragments(roles) => f.debug_tuple("Fragments").field(roles).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// A named index.
#[derive(Debug, Clone)]
pub struct IndexDefinition {
    name: String,
    key: IndexKey,
}

impl IndexDefinition {
    /// An index ordering the quad's terms as `roles`.
    pub fn fragments(name: impl Into<String>, roles: Vec<TermRole>) -> Self {
        Self {
            name: name.into(),
            key: IndexKey::Fragments(roles),
        }
    }

    /// An index keyed by `keygen(quad)`.
    pub fn custom<F>(name: impl Into<String>, keygen: F) -> Self
    where
        F: Fn(&Quad) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            key: IndexKey::Generator(Arc::new(keygen)),
        }
    }

    /// The six built-in indexes in registry order.
    #[must_use]
    pub fn builtins() -> Vec<Self> {
        BUILTIN_INDEXES
            .iter()
            .map(|(name, roles)| Self::fragments(*name, roles.to_vec()))
            .collect()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn key(&self) -> &IndexKey {
        &self.key
    }

    /// The term order, for fragment-keyed indexes.
    #[must_use]
    pub fn roles(&self) -> Option<&[TermRole]> {
        match &self.key {
            IndexKey::Fragments(roles) => Some(roles),
            IndexKey::Generator(_) => None,
        }
    }
}
