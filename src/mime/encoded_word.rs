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

//! Decoding of RFC 2047 "encoded words" as they occur in `ENVELOPE` and
//! `BODYSTRUCTURE` strings.
//!
//! Servers hand the client header text verbatim, so subjects, display
//! names, and MIME parameter values may arrive as
//! `=?charset?encoding?payload?=` sequences. [`decode_text`] is the entry
//! point the decoders use; it is total --- anything that cannot be decoded
//! is passed through unchanged, matching the never-fail contract of the
//! decoders that call it.

use std::borrow::Cow;
use std::str;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENCODED_WORD: Regex =
        Regex::new(r"^=\?([!->@-~]+)\?([!->@-~]+)\?([!->@-~]*)\?=$").unwrap();
}

/// Test if `word` (in its entirety) is an RFC 2047 encoded word.
///
/// If it is, decode it and return its decoded value. Returns `None` if it
/// is not an encoded word or could not be decoded.
///
/// RFC 2047 caps encoded words at 75 characters, but real agents produce
/// longer ones and real clients interpret them, so no length limit is
/// enforced here.
///
/// The `Option` is significant to the caller: whitespace between two
/// adjacent encoded words must be deleted, while whitespace around anything
/// else must be kept, so "was an encoded word" cannot be collapsed into
/// "returned the input".
pub fn ew_decode(word: &str) -> Option<String> {
    let captures = ENCODED_WORD.captures(word)?;

    let charset = captures.get(1)?.as_str();
    let transfer_encoding = captures.get(2)?.as_str();
    let payload = captures.get(3)?.as_str();

    let content = match transfer_encoding {
        "q" | "Q" => q_decode(payload.as_bytes())?,
        "b" | "B" => base64::decode(payload).ok()?,
        _ => return None,
    };

    // encoding_rs knows every charset label that occurs in practice except
    // UTF-7, which we do not support; unknown labels degrade to None and
    // the caller keeps the raw word.
    let encoding =
        encoding_rs::Encoding::for_label_no_replacement(charset.as_bytes())?;
    Some(encoding.decode_with_bom_removal(&content).0.into_owned())
}

/// Decode the RFC 2047 Q encoding.
///
/// `_` stands for space regardless of charset, and `=XX` is a hex-encoded
/// byte. An `=` not followed by two hex digits makes the word undecodable
/// (unlike body quoted-printable there is no line structure to resynchronise
/// on), so `None` is returned and the caller falls back to the raw text.
fn q_decode(payload: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len());
    let mut iter = payload.iter().copied();
    while let Some(b) = iter.next() {
        match b {
            b'_' => out.push(b' '),
            b'=' => {
                let hex = [iter.next()?, iter.next()?];
                let hex = str::from_utf8(&hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
            },
            b => out.push(b),
        }
    }
    Some(out)
}

/// Decode all encoded words in free text, such as a `Subject` value.
///
/// Words (maximal runs of non-whitespace) that parse as encoded words are
/// decoded; everything else is copied through verbatim, as is the
/// whitespace between words --- except between two adjacent encoded words,
/// where RFC 2047 requires the separating whitespace to be deleted.
///
/// This function is total: undecodable input comes back unchanged.
pub fn decode_text(text: &str) -> Cow<str> {
    // An encoded word requires an "=" somewhere; the overwhelmingly common
    // case is plain text, which passes through without allocating.
    if memchr::memchr(b'=', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut pending_ws = "";
    let mut prev_was_ew = false;

    while !rest.is_empty() {
        let word_end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or_else(|| rest.len());
        if 0 == word_end {
            let ws_end = rest
                .find(|c: char| !c.is_ascii_whitespace())
                .unwrap_or_else(|| rest.len());
            pending_ws = &rest[..ws_end];
            rest = &rest[ws_end..];
            continue;
        }

        let word = &rest[..word_end];
        match ew_decode(word) {
            Some(decoded) => {
                if !prev_was_ew {
                    out.push_str(pending_ws);
                }
                out.push_str(&decoded);
                prev_was_ew = true;
            },
            None => {
                out.push_str(pending_ws);
                out.push_str(word);
                prev_was_ew = false;
            },
        }
        pending_ws = "";
        rest = &rest[word_end..];
    }

    out.push_str(pending_ws);
    Cow::Owned(out)
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_ew_decode() {
        assert_eq!(None, ew_decode("hello world"));
        assert_eq!(None, ew_decode("=?utf-8?x?foo?="));
        assert_eq!(None, ew_decode("=?no-such-charset?q?foo?="));

        // Examples from RFC 2047
        assert_eq!(
            "Keith Moore",
            ew_decode("=?US-ASCII?Q?Keith_Moore?=").unwrap()
        );
        assert_eq!(
            "Keld J\u{f8}rn Simonsen",
            ew_decode("=?ISO-8859-1?Q?Keld_J=F8rn_Simonsen?=").unwrap()
        );
        assert_eq!(
            "Andr\u{e9}",
            ew_decode("=?ISO-8859-1?Q?Andr=E9?=").unwrap()
        );
        assert_eq!(
            "If you can read this yo",
            ew_decode("=?ISO-8859-1?B?SWYgeW91IGNhbiByZWFkIHRoaXMgeW8=?=")
                .unwrap()
        );
        assert_eq!(
            "u understand the example.",
            ew_decode("=?ISO-8859-2?B?dSB1bmRlcnN0YW5kIHRoZSBleGFtcGxlLg==?=")
                .unwrap()
        );
    }

    #[test]
    fn test_decode_text() {
        assert_eq!("hello world", decode_text("hello world"));
        assert_eq!("", decode_text(""));
        assert_eq!("  padded  ", decode_text("  padded  "));

        assert_eq!(
            "Keith Moore <moore@cs.utk.edu>",
            decode_text("=?US-ASCII?Q?Keith_Moore?= <moore@cs.utk.edu>")
        );

        // Whitespace between adjacent encoded words is deleted...
        assert_eq!(
            "If you can read this you understand the example.",
            decode_text(
                "=?ISO-8859-1?B?SWYgeW91IGNhbiByZWFkIHRoaXMgeW8=?= \
                 =?ISO-8859-2?B?dSB1bmRlcnN0YW5kIHRoZSBleGFtcGxlLg==?="
            )
        );
        // ...but kept between an encoded word and ordinary text.
        assert_eq!(
            "a b c",
            decode_text("=?US-ASCII?Q?a?= b =?US-ASCII?Q?c?=")
        );

        // Undecodable words pass through untouched.
        assert_eq!(
            "=?broken <ok>",
            decode_text("=?broken =?US-ASCII?Q?<ok>?=")
        );
    }

    proptest! {
        #[test]
        fn decode_text_never_panics(s in r"(=\?.{0,10}\?.{0,3}\?.{0,20}\?=| |[!-~]{1,8}){0,6}") {
            decode_text(&s);
        }

        #[test]
        fn ew_decode_never_panics(s in r"=\?.*\?.*\?.*\?=") {
            ew_decode(&s);
        }
    }
}
