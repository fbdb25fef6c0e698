//! Permutation indexes.
//!
//! Every quad is written once per index. Built-in indexes order the four
//! terms in a fixed permutation so that any combination of bound terms is a
//! key prefix of at least one of them:
//!
//! | Index | Key term order                       |
//! |-------|--------------------------------------|
//! | SPOG  | subject, predicate, object, context  |
//! | POG   | predicate, object, context, subject  |
//! | OGS   | object, context, subject, predicate  |
//! | GSP   | context, subject, predicate, object  |
//! | GP    | context, predicate, subject, object  |
//! | OS    | object, subject, predicate, context  |
//!
//! Custom indexes prepend a caller-generated key to the SPOG terms.

mod definition;
mod key;
mod registry;

pub use definition::{BUILTIN_INDEXES, IndexDefinition, IndexKey, KeyGenerator};
pub use key::{KeyBuilder, encode_key};
pub use registry::{IndexRegistry, RegistryError};
