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

//! Decoding of the RFC 3501 / RFC 3502 `BODYSTRUCTURE` structure.
//!
//! `BODYSTRUCTURE` is the most convoluted format in the protocol. The RFC
//! describes it in prose and sequential self-amendment; the actual layouts,
//! with § marking the boundary between "basic" and "extension" fields, are:
//!
//! - `multipart/*`: (child)(child)(...) content-subtype §
//!   (content-type-parms) (content-disposition content-disposition-parms)
//!   content-language content-location
//! - `message/rfc822`: content-type content-subtype (content-type-parms)
//!   content-id content-description content-transfer-encoding size-octets
//!   (envelope) (bodystructure) size-lines §
//!   md5 (content-disposition content-disposition-parms) content-language
//!   content-location
//! - `text/*`: content-type content-subtype (content-type-parms) content-id
//!   content-description content-transfer-encoding size-octets size-lines §
//!   md5 (content-disposition content-disposition-parms) content-language
//!   content-location
//! - `*/*`: content-type content-subtype (content-type-parms) content-id
//!   content-description content-transfer-encoding size-octets §
//!   md5 (content-disposition content-disposition-parms) content-language
//!   content-location
//!
//! Every extension field is optional, servers stop after an arbitrary
//! prefix of them, and clients must accept unknown `body-extension` data
//! after the last recognised field. The decoder therefore consumes an
//! extension field only while at least one further slot remains after it;
//! the final slot is never claimed greedily, which is what keeps unknown
//! trailing extension data from being misread as a known field.
//!
//! See also <http://sgerwk.altervista.org/imapbodystructure.html>, which
//! unlike the RFC actually has useful examples.

use crate::response::envelope::Envelope;
use crate::response::token::{self, Token};
use crate::support::error::Error;

/// Ceiling on child/embedded-message recursion.
///
/// Nesting depth is server-controlled, and each level costs stack, so
/// pathological depth surfaces [`Error::NestingTooDeep`] instead of
/// recursing to exhaustion. Real messages rarely exceed a dozen levels.
pub const MAX_NESTING_DEPTH: usize = 128;

/// One node of a decoded `BODYSTRUCTURE` tree.
///
/// Fields that a server did not send, sent as NIL, or sent with an
/// unusable shape are `None`; the distinction between "absent" and "empty"
/// is part of the contract and is preserved everywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyStructure {
    /// `major/minor` MIME type, lowercased. Always present.
    pub content_type: String,
    /// Dotted 1-based position of this node in the part tree, e.g. `"2.1"`.
    /// `None` only on the root node.
    pub part: Option<String>,
    /// Child parts, for `multipart/*` nodes and for `message/rfc822` nodes
    /// (which wrap exactly one child, the embedded message's body).
    pub children: Option<Vec<BodyStructure>>,
    /// `Content-Type` parameters; keys lowercased, values decoded.
    pub parameters: Option<Vec<(String, String)>>,
    /// `Content-Id`.
    pub id: Option<String>,
    /// `Content-Description`.
    pub description: Option<String>,
    /// `Content-Transfer-Encoding`, lowercased.
    pub encoding: Option<String>,
    /// Content size in encoded octets.
    pub size: Option<u32>,
    /// The embedded message's envelope; `message/rfc822` only.
    pub envelope: Option<Box<Envelope>>,
    /// Content size in lines; `text/*` and `message/rfc822` only.
    pub line_count: Option<u32>,
    /// Content MD5, lowercased.
    pub md5: Option<String>,
    /// `Content-Disposition` type, lowercased.
    pub disposition: Option<String>,
    /// `Content-Disposition` parameters; keys lowercased, values decoded.
    pub disposition_parameters: Option<Vec<(String, String)>>,
    /// `Content-Language` tags, lowercased, empties dropped.
    pub language: Option<Vec<String>>,
    /// `Content-Location`.
    pub location: Option<String>,
}

impl BodyStructure {
    /// Decode a `BODYSTRUCTURE` token list.
    ///
    /// Data-shape problems degrade field-by-field and never fail; the only
    /// error is the recursion ceiling, which exists because nesting depth
    /// is controlled by the server.
    pub fn decode(tok: &Token) -> Result<BodyStructure, Error> {
        decode_node(tok, &[], 0)
    }
}

fn decode_node(
    tok: &Token,
    path: &[u32],
    depth: usize,
) -> Result<BodyStructure, Error> {
    if depth > MAX_NESTING_DEPTH {
        log::warn!(
            "body structure nested more than {} parts deep; giving up",
            MAX_NESTING_DEPTH
        );
        return Err(Error::NestingTooDeep);
    }

    let slots = match tok.as_list() {
        Some(slots) => slots,
        None => {
            // Not a list at all. Emit the minimal record rather than
            // failing so the rest of the response batch survives.
            return Ok(BodyStructure {
                part: part_string(path),
                ..BodyStructure::default()
            });
        },
    };

    if slots.first().map_or(false, Token::is_list) {
        decode_multipart(slots, path, depth)
    } else {
        decode_single(slots, path, depth)
    }
}

fn part_string(path: &[u32]) -> Option<String> {
    if path.is_empty() {
        None
    } else {
        Some(
            path.iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

/// `multipart/*`: leading child lists, then the subtype and extensions.
fn decode_multipart(
    slots: &[Token],
    path: &[u32],
    depth: usize,
) -> Result<BodyStructure, Error> {
    let mut node = BodyStructure {
        part: part_string(path),
        ..BodyStructure::default()
    };

    let mut cursor = 0;
    let mut children = Vec::new();
    let mut child_path = path.to_vec();
    while slots.get(cursor).map_or(false, Token::is_list) {
        child_path.push(children.len() as u32 + 1);
        children.push(decode_node(&slots[cursor], &child_path, depth + 1)?);
        child_path.pop();
        cursor += 1;
    }
    node.children = Some(children);

    let subtype = token::nstring(slots, cursor)
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    node.content_type = format!("multipart/{}", subtype);
    cursor += 1;

    // Shared Content-Type parameters, unless only the reserved final slot
    // remains.
    if cursor + 1 < slots.len() {
        node.parameters = token::parameter_map(slots, cursor);
        cursor += 1;
    }

    decode_extension_tail(slots, cursor, &mut node);
    Ok(node)
}

/// Everything that is not a multipart: the seven common fields, the
/// type-dependent extras, then the shared extension tail.
fn decode_single(
    slots: &[Token],
    path: &[u32],
    depth: usize,
) -> Result<BodyStructure, Error> {
    let mut node = BodyStructure {
        part: part_string(path),
        ..BodyStructure::default()
    };

    let major = token::nstring(slots, 0)
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    let minor = token::nstring(slots, 1)
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    node.content_type = format!("{}/{}", major, minor);
    let mut cursor = 2;

    node.parameters = token::parameter_map(slots, cursor);
    cursor += 1;
    node.id = nonempty(slots, cursor);
    cursor += 1;
    node.description = nonempty(slots, cursor);
    cursor += 1;
    node.encoding = nonempty(slots, cursor).map(|s| s.to_ascii_lowercase());
    cursor += 1;
    node.size = token::number(slots, cursor);
    cursor += 1;

    if "message/rfc822" == node.content_type {
        if slots.get(cursor).map_or(false, Token::is_list) {
            node.envelope = Some(Box::new(Envelope::decode(&slots[cursor])));
        }
        cursor += 1;

        if slots.get(cursor).map_or(false, Token::is_list) {
            // The embedded message's body shares this node's part path;
            // section addressing tells the two apart with the HEADER and
            // MIME specifiers, not with an extra path segment.
            node.children =
                Some(vec![decode_node(&slots[cursor], path, depth + 1)?]);
        }
        cursor += 1;

        node.line_count = token::number(slots, cursor);
        cursor += 1;
    } else if node.content_type.starts_with("text/") {
        // Some servers omit the line count but still send trailing
        // extension fields. When that happens the structure has exactly 11
        // fields and the disposition list sits one slot early; consuming
        // the line-count slot anyway would shift every later field by one.
        // The trigger is deliberately this narrow --- it reproduces the
        // misbehaviour actually observed, nothing more.
        let line_count_omitted = 11 == slots.len()
            && slots.get(cursor + 1).map_or(false, Token::is_list)
            && !slots.get(cursor + 2).map_or(false, Token::is_list);
        if line_count_omitted {
            log::warn!(
                "text part with 11 fields and no line count; \
                 treating the line count as absent"
            );
        } else {
            node.line_count = token::number(slots, cursor);
            cursor += 1;
        }
    }

    // MD5, unless only the reserved final slot remains.
    if cursor + 1 < slots.len() {
        node.md5 = nonempty(slots, cursor).map(|s| s.to_ascii_lowercase());
        cursor += 1;
    }

    decode_extension_tail(slots, cursor, &mut node);
    Ok(node)
}

/// The extension fields both layouts share: disposition, language,
/// location. Each is consumed only while a further slot remains; whatever
/// follows the last recognised field is future `body-extension` data and
/// is ignored.
fn decode_extension_tail(
    slots: &[Token],
    mut cursor: usize,
    node: &mut BodyStructure,
) {
    // body-fld-dsp: "(" disposition-type body-fld-param ")" or NIL.
    // An absent or empty list yields no disposition field at all.
    if cursor + 1 < slots.len() {
        if let Some(dsp) = slots[cursor].as_list() {
            node.disposition = token::nstring(dsp, 0)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_ascii_lowercase());
            node.disposition_parameters = token::parameter_map(dsp, 1);
        }
        cursor += 1;
    }

    // body-fld-lang: a single tag or a list of tags.
    if cursor + 1 < slots.len() {
        let tags: Vec<String> = match &slots[cursor] {
            Token::List(items) => items
                .iter()
                .filter_map(Token::as_text)
                .map(|s| s.to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            scalar => scalar
                .as_text()
                .map(|s| s.to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .into_iter()
                .collect(),
        };
        if !tags.is_empty() {
            node.language = Some(tags);
        }
        cursor += 1;
    }

    // body-fld-loc.
    if cursor + 1 < slots.len() {
        node.location = token::nstring(slots, cursor)
            .filter(|s| !s.is_empty())
            .map(|s| s.into_owned());
    }
}

fn nonempty(slots: &[Token], idx: usize) -> Option<String> {
    token::nstring(slots, idx)
        .filter(|s| !s.is_empty())
        .map(|s| s.into_owned())
}
