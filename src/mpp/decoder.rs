//! Tokenizing decoder for space-delimited response bodies.
//!
//! A record's `Response::decode` drives a [`FieldReader`] over the body,
//! consuming one token per field in declared order. Each read names its
//! field so failures carry a `record.field` path and the offending token.

use crate::mpp::frame::Frame;

/// A value decoded from one response body.
pub trait Response: Sized {
    /// Decodes a body string (marker and checksum already stripped).
    fn decode(body: &str) -> Result<Self, DecodeError>;

    /// Decodes the body of a validated frame.
    fn from_frame(frame: &Frame) -> Result<Self, DecodeError> {
        Self::decode(&frame.body)
    }
}

/// First field that failed to decode aborts the record; there are no
/// partially-populated results.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Ran out of tokens before all fields were consumed.
    #[error("end of body at field \"{path}\"")]
    EndOfBody { path: String },

    /// A token was present but could not be converted to the field's type.
    #[error("cannot decode {expected} for field \"{path}\" from token \"{token}\"")]
    BadToken {
        path: String,
        token: String,
        expected: &'static str,
    },
}

impl DecodeError {
    pub fn bad_token(path: impl Into<String>, token: impl Into<String>, expected: &'static str) -> Self {
        Self::BadToken {
            path: path.into(),
            token: token.into(),
            expected,
        }
    }
}

/// Walks the space-separated tokens of a body in lockstep with a record's
/// fields.
///
/// Tokens are split on single spaces with no merging, so consecutive
/// separators produce empty tokens that still occupy a position.
pub struct FieldReader<'a> {
    record: &'static str,
    tokens: Vec<&'a str>,
    offset: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'static str, body: &'a str) -> Self {
        Self {
            record,
            tokens: body.split(' ').collect(),
            offset: 0,
        }
    }

    fn path(&self, field: &str) -> String {
        format!("{}.{}", self.record, field)
    }

    /// Consumes the next token, or fails with a distinct end-of-body error.
    fn next_token(&mut self, field: &str) -> Result<&'a str, DecodeError> {
        let token = self
            .tokens
            .get(self.offset)
            .copied()
            .ok_or_else(|| DecodeError::EndOfBody {
                path: self.path(field),
            })?;
        self.offset += 1;
        Ok(token)
    }

    /// Single-character flag: `0` is false, `1` is true.
    pub fn boolean(&mut self, field: &str) -> Result<bool, DecodeError> {
        let token = self.next_token(field)?;
        match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(DecodeError::bad_token(self.path(field), token, "bool")),
        }
    }

    /// Fixed-width integer with the dual-radix rule: a token exactly as long
    /// as the type's bit width is a binary literal, anything else decimal.
    ///
    /// Some fields travel as bit strings of known width and others as plain
    /// decimal numbers; token length against bit width is the deciding
    /// signal.
    pub fn integer<T: WireInt>(&mut self, field: &str) -> Result<T, DecodeError> {
        let token = self.next_token(field)?;
        let radix = if token.len() == T::BITS as usize { 2 } else { 10 };
        T::from_str_radix(token, radix)
            .map_err(|_| DecodeError::bad_token(self.path(field), token, T::NAME))
    }

    /// Decimal floating point, `.` separator, locale-independent.
    pub fn float(&mut self, field: &str) -> Result<f32, DecodeError> {
        let token = self.next_token(field)?;
        token
            .parse()
            .map_err(|_| DecodeError::bad_token(self.path(field), token, "float"))
    }

    /// Token consumed verbatim.
    pub fn string(&mut self, field: &str) -> Result<String, DecodeError> {
        Ok(self.next_token(field)?.to_owned())
    }

    /// Bit-flag bundle: one token whose length must equal the bundle's bit
    /// width, read as a base-2 literal into the underlying integer.
    pub fn bits<T: WireInt>(&mut self, field: &str, width: u32) -> Result<T, DecodeError> {
        let token = self.next_token(field)?;
        if token.len() != width as usize {
            return Err(DecodeError::bad_token(self.path(field), token, "bit bundle"));
        }
        T::from_str_radix(token, 2)
            .map_err(|_| DecodeError::bad_token(self.path(field), token, "bit bundle"))
    }

    /// Raw token for fields with bespoke shapes (enums, embedded formats).
    pub fn token(&mut self, field: &str) -> Result<(&'a str, String), DecodeError> {
        let path = self.path(field);
        let token = self.next_token(field)?;
        Ok((token, path))
    }
}

/// Integer types the token walker can produce.
pub trait WireInt: Sized {
    const BITS: u32;
    const NAME: &'static str;

    fn from_str_radix(token: &str, radix: u32) -> Result<Self, std::num::ParseIntError>;
}

macro_rules! wire_int {
    ($($ty:ty),*) => {
        $(impl WireInt for $ty {
            const BITS: u32 = <$ty>::BITS;
            const NAME: &'static str = stringify!($ty);

            fn from_str_radix(token: &str, radix: u32) -> Result<Self, std::num::ParseIntError> {
                <$ty>::from_str_radix(token, radix)
            }
        })*
    };
}

wire_int!(u8, u16, u32, u64, i8, i16, i32, i64);
