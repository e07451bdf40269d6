// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable object handles and their text encoding.
//!
//! A [`Handle`] names an object owned by the external document store. It
//! survives across sessions but says nothing about whether the object still
//! exists: every stored handle has to be resolved again before use.
//!
//! The canonical text form is upper-case hexadecimal without a prefix
//! (`1A2`). Parsing is lenient: surrounding whitespace, a `0x` prefix and
//! lower-case digits are accepted, and a legacy decimal form with a leading
//! `+` is tried when the hex form does not match.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, hex_digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
    IResult,
};

use crate::error::{Error, Result};

/// Opaque identifier of a document-store object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Creates a handle from its numeric value. Zero is the null handle.
    pub fn new(value: u64) -> Option<Self> {
        (value != 0).then_some(Self(value))
    }

    /// Returns the numeric value of the handle.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Parses handle text in any supported format.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let value = match all_consuming(handle_value)(trimmed) {
            Ok((_, value)) => value,
            Err(_) => return Err(Error::MalformedHandle(text.to_string())),
        };
        Self::new(value).ok_or_else(|| Error::MalformedHandle(text.to_string()))
    }

    /// Returns the canonical text encoding.
    pub fn to_text(self) -> String {
        self.to_string()
    }

    /// Returns `true` if `text` parses to this handle.
    pub fn matches_text(self, text: &str) -> bool {
        Self::parse(text).map(|h| h == self).unwrap_or(false)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

impl FromStr for Handle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Hex form: `1A2`, `0x1a2`
fn hex_handle(input: &str) -> IResult<&str, u64> {
    preceded(
        opt(tag_no_case("0x")),
        map_res(hex_digit1, |s: &str| u64::from_str_radix(s, 16)),
    )(input)
}

/// Legacy decimal form: `+418`
fn decimal_handle(input: &str) -> IResult<&str, u64> {
    preceded(char('+'), map_res(digit1, |s: &str| s.parse::<u64>()))(input)
}

fn handle_value(input: &str) -> IResult<&str, u64> {
    alt((hex_handle, decimal_handle))(input)
}

#[cfg(feature = "serde")]
impl serde::Serialize for Handle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Handle {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Handle::parse(&text).map_err(serde::de::Error::custom)
    }
}
