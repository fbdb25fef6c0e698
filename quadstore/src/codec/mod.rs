//! Encodings: sortable literal terms and the stored value format.

mod term;
mod value;

pub use term::{
    INTEGER_WIDTH, Literal, LiteralKind, TERMINATOR, XSD, decode_number, encode_datetime_millis,
    encode_number, parse_datetime_millis,
};
pub use value::{StoredQuad, decode_quad, encode_quad};

/// Errors produced while encoding or decoding terms and values.
#[derive(Debug)]
pub enum CodecError {
    /// NaN or an infinity was given where a number is required.
    NotFinite,
    /// The number's integer part cannot be represented in the sortable form.
    OutOfRange(f64),
    /// A lexical form does not parse as its declared datatype.
    InvalidLexical { datatype: String, value: String },
    /// A term claims to be an encoded literal but is not well formed.
    MalformedTerm(String),
    /// A stored value failed to decode.
    Decode(prost::DecodeError),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFinite => write!(f, "number is not finite"),
            Self::OutOfRange(value) => write!(f, "number {value} is out of the sortable range"),
            Self::InvalidLexical { datatype, value } => {
                write!(f, "invalid lexical form '{value}' for datatype '{datatype}'")
            }
            Self::MalformedTerm(term) => write!(f, "malformed literal term '{term}'"),
            Self::Decode(e) => write!(f, "failed to decode stored quad: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<prost::DecodeError> for CodecError {
    fn from(e: prost::DecodeError) -> Self {
        Self::Decode(e)
    }
}
