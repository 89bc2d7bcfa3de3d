//-
// Copyright (c) 2026, the Tealeaf authors
//
// This file is part of Tealeaf.
//
// Tealeaf is free software: you can  redistribute it and/or modify it under
// the terms of  the GNU General Public  License as published  by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Tealeaf is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or
// FITNESS FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License
// for more details.
//
// You should have received a copy of the GNU General Public License along
// with Tealeaf. If not, see <http://www.gnu.org/licenses/>.

//! The token tree produced by the tokeniser, plus the positional readers
//! the decoders are built from.
//!
//! A reader takes a slot index instead of a bare token so that "the slot
//! isn't there at all" and "the slot is there but NIL/mis-shaped" collapse
//! into the same `None`, which is exactly the degradation the response
//! grammar calls for.

use std::borrow::Cow;
use std::str;

use crate::mime::encoded_word;

/// How a scalar was spelled on the wire.
///
/// The decoders don't care --- a quoted string and a literal carrying the
/// same bytes mean the same thing --- but the tokeniser knows, and keeping
/// the tag costs nothing while making token trees self-describing in test
/// failures and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Atom,
    Quoted,
    Literal,
    Number,
}

/// One node of a tokenised response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Protocol `NIL`.
    Nil,
    /// A leaf value. The bytes are raw wire data; they are usually ASCII
    /// but nothing guarantees it, so conversion to text is lossy and
    /// happens at read time.
    Scalar(ScalarKind, Vec<u8>),
    /// A parenthesised list.
    List(Vec<Token>),
}

impl Token {
    pub fn atom(s: impl Into<Vec<u8>>) -> Self {
        Token::Scalar(ScalarKind::Atom, s.into())
    }

    pub fn quoted(s: impl Into<Vec<u8>>) -> Self {
        Token::Scalar(ScalarKind::Quoted, s.into())
    }

    pub fn literal(s: impl Into<Vec<u8>>) -> Self {
        Token::Scalar(ScalarKind::Literal, s.into())
    }

    pub fn num(n: u32) -> Self {
        Token::Scalar(ScalarKind::Number, n.to_string().into_bytes())
    }

    pub fn list(items: impl Into<Vec<Token>>) -> Self {
        Token::List(items.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Token::List(_))
    }

    pub fn as_list(&self) -> Option<&[Token]> {
        match self {
            Token::List(items) => Some(items),
            _ => None,
        }
    }

    /// The text of a scalar, decoded lossily. `None` for NIL and lists.
    pub fn as_text(&self) -> Option<Cow<str>> {
        match self {
            Token::Scalar(_, bytes) => Some(String::from_utf8_lossy(bytes)),
            _ => None,
        }
    }
}

/// Read the scalar text at `slots[idx]`.
///
/// Out-of-range, NIL, and list-shaped slots all read as `None`.
pub fn nstring(slots: &[Token], idx: usize) -> Option<Cow<str>> {
    slots.get(idx)?.as_text()
}

/// Read the scalar at `slots[idx]` as an unsigned number.
pub fn number(slots: &[Token], idx: usize) -> Option<u32> {
    match slots.get(idx)? {
        Token::Scalar(_, bytes) => {
            str::from_utf8(bytes).ok()?.trim().parse().ok()
        },
        _ => None,
    }
}

/// Read the structured parameter list at `slots[idx]`.
///
/// The wire form is a flat list where even positions are keys and odd
/// positions are values. Keys are lowercased; values are run through the
/// encoded-word decoder since servers copy them out of MIME headers
/// verbatim. A trailing key with no value is discarded. Pairs whose key is
/// missing or empty are skipped.
///
/// An absent, NIL, or empty-list slot yields `None` --- an empty mapping is
/// never produced, so callers see "no parameters" exactly one way.
pub fn parameter_map(
    slots: &[Token],
    idx: usize,
) -> Option<Vec<(String, String)>> {
    let list = slots.get(idx)?.as_list()?;

    let mut map = Vec::with_capacity(list.len() / 2);
    for pair in list.chunks_exact(2) {
        let key = match pair[0].as_text() {
            Some(key) if !key.is_empty() => key.to_ascii_lowercase(),
            _ => continue,
        };
        let value = pair[1]
            .as_text()
            .map(|v| encoded_word::decode_text(&v).into_owned())
            .unwrap_or_default();
        map.push((key, value));
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
