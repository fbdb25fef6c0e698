//! The value stored under every index key.
//!
//! Each index entry carries the whole quad, so a scan on any index can
//! yield quads without a second lookup.

use prost::Message;

use super::CodecError;
use crate::types::Quad;

/// Wire form of a stored quad.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct StoredQuad {
    #[prost(string, tag = "1")]
    pub subject: String,
    #[prost(string, tag = "2")]
    pub predicate: String,
    #[prost(string, tag = "3")]
    pub object: String,
    #[prost(string, tag = "4")]
    pub context: String,
}

impl From<&Quad> for StoredQuad {
    #[allow(clippy::disallowed_methods)] // Clone needed for the owned wire form
    fn from(quad: &Quad) -> Self {
        Self {
            subject: quad.subject.clone(),
            predicate: quad.predicate.clone(),
            object: quad.object.clone(),
            context: quad.context.clone(),
        }
    }
}

impl From<StoredQuad> for Quad {
    fn from(stored: StoredQuad) -> Self {
        Self {
            subject: stored.subject,
            predicate: stored.predicate,
            object: stored.object,
            context: stored.context,
        }
    }
}

/// Encode a quad into its stored value bytes.
#[must_use]
pub fn encode_quad(quad: &Quad) -> Vec<u8> {
    StoredQuad::from(quad).encode_to_vec()
}

/// Decode stored value bytes back into a quad.
pub fn decode_quad(bytes: &[u8]) -> Result<Quad, CodecError> {
    Ok(StoredQuad::decode(bytes)?.into())
}
