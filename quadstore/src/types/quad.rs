//! The quad record and its term roles.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque term identifier.
///
/// The store never interprets terms beyond byte comparison; richer term
/// models (IRIs, literals, blank nodes) are mapped to strings by callers.
/// See [`crate::codec::Literal`] for the sortable literal layout.
pub type Term = String;

/// One of the four positions of a quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermRole {
    Subject,
    Predicate,
    Object,
    Context,
}

impl TermRole {
    /// All roles in canonical (SPOG) order.
    pub const ALL: [Self; 4] = [Self::Subject, Self::Predicate, Self::Object, Self::Context];

    /// Human readable role name, used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
            Self::Context => "context",
        }
    }
}

impl std::fmt::Display for TermRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subject/predicate/object/context record.
///
/// An empty `context` means "no context"; the store replaces it with the
/// configured default context value before anything is written, so quads
/// read back from the store always carry a non-empty context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default, alias = "graph")]
    pub context: Term,
}

impl Quad {
    /// Create a quad with an explicit context.
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
        context: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            context: context.into(),
        }
    }

    /// Create a quad without a context.
    ///
    /// The default context is assigned when the quad is written.
    pub fn triple(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self::new(subject, predicate, object, Term::new())
    }

    /// Borrow the term in the given role.
    #[must_use]
    pub fn term(&self, role: TermRole) -> &str {
        match role {
            TermRole::Subject => &self.subject,
            TermRole::Predicate => &self.predicate,
            TermRole::Object => &self.object,
            TermRole::Context => &self.context,
        }
    }

    /// Whether the quad carries a context of its own.
    #[must_use]
    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// Replace an empty context with `default_context`.
    #[must_use]
    pub fn with_default_context(mut self, default_context: &str) -> Self {
        if self.context.is_empty() {
            default_context.clone_into(&mut self.context);
        }
        self
    }

    /// Render the quad as a JSON object.
    ///
    /// The context field is named `context_key` so adapters can keep the
    /// field naming they expose (`"graph"` by default).
    #[must_use]
    pub fn to_json(&self, context_key: &str) -> Value {
        let mut object = Map::with_capacity(4);
        object.insert("subject".to_owned(), Value::String(self.subject.clone()));
        object.insert("predicate".to_owned(), Value::String(self.predicate.clone()));
        object.insert("object".to_owned(), Value::String(self.object.clone()));
        object.insert(context_key.to_owned(), Value::String(self.context.clone()));
        Value::Object(object)
    }

    /// Read a quad from a JSON object with string fields, taking the context
    /// from `context_key`. A missing context yields an empty one.
    #[must_use]
    pub fn from_json(value: &Value, context_key: &str) -> Option<Self> {
        let field = |name: &str| value.get(name).and_then(Value::as_str);
        Some(Self::new(
            field("subject")?,
            field("predicate")?,
            field("object")?,
            field(context_key).unwrap_or_default(),
        ))
    }
}
