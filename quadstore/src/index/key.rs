//! Key encoding.
//!
//! A key is the index name followed by its segments, each preceded by the
//! separator:
//!
//! ```text
//! SPOG<sep>subject<sep>predicate<sep>object<sep>context
//! ```
//!
//! The separator must sort below any byte that can appear in a term, so a
//! term that is a strict prefix of another orders first. Encoding is pure:
//! the same index and quad always produce the same bytes.

use super::definition::{IndexDefinition, IndexKey};
use crate::types::{Quad, TermRole};

/// Incremental key writer.
#[derive(Debug, Clone)]
pub struct KeyBuilder<'a> {
    key: String,
    separator: &'a str,
}

impl<'a> KeyBuilder<'a> {
    /// Start a key in index `name`.
    #[must_use]
    pub fn new(name: &str, separator: &'a str) -> Self {
        Self {
            key: name.to_owned(),
            separator,
        }
    }

    /// Append one segment.
    pub fn push(&mut self, segment: &str) -> &mut Self {
        self.key.push_str(self.separator);
        self.key.push_str(segment);
        self
    }

    /// The key written so far, followed by a separator, ready to be
    /// extended by a range comparate.
    #[must_use]
    pub fn prefix(&self) -> String {
        let mut prefix = String::with_capacity(self.key.len() + self.separator.len());
        prefix.push_str(&self.key);
        prefix.push_str(self.separator);
        prefix
    }

    /// The complete key.
    #[must_use]
    pub fn finish(self) -> String {
        self.key
    }
}

/// Encode the key of `quad` in `index`.
#[must_use]
pub fn encode_key(index: &IndexDefinition, quad: &Quad, separator: &str) -> Vec<u8> {
    let mut builder = KeyBuilder::new(index.name(), separator);
    match index.key() {
        IndexKey::Fragments(roles) => {
            for role in roles {
                builder.push(quad.term(*role));
            }
        }
        IndexKey::Generator(keygen) => {
            builder.push(&keygen(quad));
            for role in TermRole::ALL {
                builder.push(quad.term(role));
            }
        }
    }
    builder.finish().into_bytes()
}
