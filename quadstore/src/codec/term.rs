//! Order-preserving term encodings.
//!
//! Index keys compare as byte strings, so any literal that should be range
//! queryable must be written in a form whose byte order equals its natural
//! order. Numbers and timestamps use a fixed-width decimal layout:
//!
//! ```text
//! +-------------------------+---+-------------------+
//! | integer part + 2^53     | . | fraction digits   |
//! | 17 digits, zero padded  |   | shortest, no pad  |
//! +-------------------------+---+-------------------+
//! ```
//!
//! The integer part is `floor(v)`, so the fraction `v - floor(v)` is never
//! negative: `-1.25` is written as integer `-2` and fraction `75`. Fraction
//! digits have no trailing zeros, which makes their lexicographic order equal
//! their numeric order.
//!
//! # Literal terms
//!
//! Literal terms carry a type marker ahead of their lexical form:
//!
//! ```text
//! **number:<sortable>#"1.5"^^http://www.w3.org/2001/XMLSchema#decimal
//! **datetime:<sortable>#"2020-01-01T00:00:00Z"^^http://www.w3.org/2001/XMLSchema#dateTime
//! **string#"hello"@en
//! ```
//!
//! `#` sorts below every digit, so a shorter sortable part always orders
//! before a longer one sharing its prefix, and a range comparate (the marker
//! plus sortable part plus `#`) brackets exactly the values it encodes.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::CodecError;
use crate::types::Term;

/// Width of the zero-padded integer part.
pub const INTEGER_WIDTH: usize = 17;

/// Integer parts must lie in `[-2^53, 2^53)`.
const SHIFT: i64 = 1 << 53;

/// Ends the sortable part of a literal term. Sorts below `'0'`.
pub const TERMINATOR: char = '#';

const LITERAL_PREFIX: &str = "**";
const NUMBER_MARKER: &str = "number:";
const DATETIME_MARKER: &str = "datetime:";
const STRING_MARKER: &str = "string";

pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

const NUMERIC_TYPES: [&str; 14] = [
    "byte",
    "short",
    "decimal",
    "integer",
    "int",
    "long",
    "negativeInteger",
    "positiveInteger",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "unsignedLong",
    "unsignedShort",
    "unsignedInt",
    "unsignedByte",
];

/// Encode a number into its sortable form.
///
/// # Errors
///
/// Returns an error for NaN, infinities, and values whose integer part falls
/// outside `[-2^53, 2^53)`.
#[allow(clippy::cast_possible_truncation)] // range checked before the cast
pub fn encode_number(value: f64) -> Result<String, CodecError> {
    if !value.is_finite() {
        return Err(CodecError::NotFinite);
    }

    let mut integer = value.floor();
    #[allow(clippy::cast_precision_loss)]
    let bound = SHIFT as f64;
    if integer < -bound || integer >= bound {
        return Err(CodecError::OutOfRange(value));
    }

    let mut fraction = value - integer;
    // Subtracting a negative floor can round up to a whole unit.
    if fraction >= 1.0 {
        integer += 1.0;
        fraction = 0.0;
        if integer >= bound {
            return Err(CodecError::OutOfRange(value));
        }
    }

    let shifted = integer as i64 + SHIFT;
    let digits = fraction_digits(fraction);
    Ok(format!("{shifted:0>INTEGER_WIDTH$}.{digits}"))
}

/// Decode a sortable number back into its value.
pub fn decode_number(encoded: &str) -> Result<f64, CodecError> {
    let malformed = || CodecError::MalformedTerm(encoded.to_owned());
    let (integer, fraction) = encoded.split_once('.').ok_or_else(malformed)?;
    if integer.len() != INTEGER_WIDTH || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let shifted: i64 = integer.parse().map_err(|_| malformed())?;
    #[allow(clippy::cast_precision_loss)]
    let whole = (shifted - SHIFT) as f64;
    if fraction.is_empty() {
        return Ok(whole);
    }
    let fraction: f64 = format!("0.{fraction}").parse().map_err(|_| malformed())?;
    Ok(whole + fraction)
}

/// Encode a millisecond timestamp into its sortable form.
#[allow(clippy::cast_precision_loss)] // timestamps are far inside 2^53
pub fn encode_datetime_millis(millis: i64) -> Result<String, CodecError> {
    encode_number(millis as f64)
}

/// Shortest round-trip digits of a fraction in `[0, 1)`, without `0.`.
fn fraction_digits(fraction: f64) -> String {
    if fraction == 0.0 {
        return String::new();
    }
    let text = fraction.to_string();
    text.strip_prefix("0.").unwrap_or(&text).to_owned()
}

/// Parse an `xsd:date` or `xsd:dateTime` lexical form into epoch millis.
///
/// Date-times without an offset are taken as UTC.
pub fn parse_datetime_millis(lexical: &str) -> Result<i64, CodecError> {
    let lexical = lexical.trim();
    let invalid = || CodecError::InvalidLexical {
        datatype: "dateTime".to_owned(),
        value: lexical.to_owned(),
    };

    let datetime = if let Ok(datetime) = OffsetDateTime::parse(lexical, &Rfc3339) {
        datetime
    } else if let Ok(datetime) = PrimitiveDateTime::parse(
        lexical,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        datetime.assume_utc()
    } else {
        let date = Date::parse(lexical, format_description!("[year]-[month]-[day]"))
            .map_err(|_| invalid())?;
        date.midnight().assume_utc()
    };

    i64::try_from(datetime.unix_timestamp_nanos() / 1_000_000).map_err(|_| invalid())
}

/// The sortable category of a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    DateTime,
    String,
}

/// An RDF-style literal: a lexical value with an optional datatype or
/// language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Literal {
    /// An untyped string literal.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// A literal with an explicit datatype IRI.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// A language-tagged string literal.
    pub fn language(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// An `xsd:integer` literal.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::typed(value.to_string(), format!("{XSD}integer"))
    }

    /// An `xsd:decimal` literal.
    #[must_use]
    pub fn decimal(value: f64) -> Self {
        Self::typed(value.to_string(), format!("{XSD}decimal"))
    }

    /// An `xsd:dateTime` literal.
    pub fn datetime(lexical: impl Into<String>) -> Self {
        Self::typed(lexical, format!("{XSD}dateTime"))
    }

    /// The sortable category selected by the datatype.
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        if self.language.is_some() {
            return LiteralKind::String;
        }
        let Some(local) = self
            .datatype
            .as_deref()
            .and_then(|datatype| datatype.strip_prefix(XSD))
        else {
            return LiteralKind::String;
        };
        if NUMERIC_TYPES.contains(&local) {
            LiteralKind::Number
        } else if local == "date" || local == "dateTime" {
            LiteralKind::DateTime
        } else {
            LiteralKind::String
        }
    }

    /// The lexical form, `"value"` optionally followed by `@lang` or
    /// `^^datatype`.
    #[must_use]
    pub fn lexical(&self) -> String {
        match (&self.language, &self.datatype) {
            (Some(language), _) => format!("\"{}\"@{language}", self.value),
            (None, Some(datatype)) => format!("\"{}\"^^{datatype}", self.value),
            (None, None) => format!("\"{}\"", self.value),
        }
    }

    /// The marker and sortable part shared by the stored term and range
    /// comparates, terminator included.
    fn sortable_head(&self) -> Result<String, CodecError> {
        Ok(match self.kind() {
            LiteralKind::Number => {
                let number: f64 =
                    self.value
                        .trim()
                        .parse()
                        .map_err(|_| CodecError::InvalidLexical {
                            datatype: self.datatype.clone().unwrap_or_default(),
                            value: self.value.clone(),
                        })?;
                format!(
                    "{LITERAL_PREFIX}{NUMBER_MARKER}{}{TERMINATOR}",
                    encode_number(number)?
                )
            }
            LiteralKind::DateTime => {
                let millis = parse_datetime_millis(&self.value)?;
                format!(
                    "{LITERAL_PREFIX}{DATETIME_MARKER}{}{TERMINATOR}",
                    encode_datetime_millis(millis)?
                )
            }
            LiteralKind::String => format!("{LITERAL_PREFIX}{STRING_MARKER}{TERMINATOR}"),
        })
    }

    /// Encode the literal as a store term.
    pub fn to_term(&self) -> Result<Term, CodecError> {
        let mut term = self.sortable_head()?;
        term.push_str(&self.lexical());
        Ok(term)
    }

    /// The comparate to use in a range filter against stored literals.
    ///
    /// Numbers and timestamps compare by value; strings compare by their
    /// unquoted value at prefix granularity.
    pub fn comparate(&self) -> Result<Term, CodecError> {
        let mut comparate = self.sortable_head()?;
        if self.kind() == LiteralKind::String {
            comparate.push('"');
            comparate.push_str(&self.value);
        }
        Ok(comparate)
    }

    /// Decode a literal term.
    ///
    /// Returns `Ok(None)` when `term` is not a literal term at all.
    pub fn from_term(term: &str) -> Result<Option<Self>, CodecError> {
        let Some(body) = term.strip_prefix(LITERAL_PREFIX) else {
            return Ok(None);
        };
        let malformed = || CodecError::MalformedTerm(term.to_owned());
        let (head, lexical) = body.split_once(TERMINATOR).ok_or_else(malformed)?;
        let sortable = head
            .strip_prefix(NUMBER_MARKER)
            .or_else(|| head.strip_prefix(DATETIME_MARKER));
        match sortable {
            Some(encoded) => {
                decode_number(encoded).map_err(|_| malformed())?;
            }
            None if head == STRING_MARKER => {}
            None => return Err(malformed()),
        }

        let rest = lexical.strip_prefix('"').ok_or_else(malformed)?;
        let close = rest.rfind('"').ok_or_else(malformed)?;
        let value = rest[..close].to_owned();
        let suffix = &rest[close + 1..];

        let literal = if suffix.is_empty() {
            Self::plain(value)
        } else if let Some(language) = suffix.strip_prefix('@') {
            Self::language(value, language)
        } else if let Some(datatype) = suffix.strip_prefix("^^") {
            Self::typed(value, datatype)
        } else {
            return Err(malformed());
        };
        Ok(Some(literal))
    }
}
