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

//! Decoding of the RFC 3501 `ENVELOPE` structure.
//!
//! The wire form is a fixed 10-slot list: date, subject, from, sender,
//! reply-to, to, cc, bcc, in-reply-to, message-id. Each slot is either a
//! string, NIL, or (for the six participant fields) a list of 4-tuples
//! `(display-name source-route local-part domain)`. The source route is an
//! RFC 822 relic and is discarded unconditionally.
//!
//! Decoding never fails. A slot that is absent, NIL, empty, or not the
//! shape its position calls for simply leaves the corresponding field
//! unset; servers in the wild get every one of these wrong somewhere.

use std::borrow::Cow;

use chrono::prelude::*;

use crate::mime::encoded_word;
use crate::response::token::{self, Token};

/// The `Date` header as reported by the server.
///
/// RFC 2822 prescribes the format, but the server copies the header out of
/// the stored message verbatim and plenty of mail in the wild carries
/// malformed dates. Rather than dropping those, the original text is kept
/// so the caller can apply its own heuristics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvelopeDate {
    /// The date parsed as RFC 2822.
    Parsed(DateTime<FixedOffset>),
    /// The date did not parse; this is the verbatim header text.
    Raw(String),
}

/// A single participant address from an `ENVELOPE`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmailAddress {
    /// Display name, decoded and whitespace-normalised. Empty when the
    /// address had none.
    pub name: String,
    /// `local@domain`. Empty (never a bare `@`) when both halves were NIL,
    /// as happens for RFC 3501's group delimiter pseudo-addresses.
    pub address: String,
}

/// The RFC 3501 `ENVELOPE` structure, decoded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Envelope {
    /// The `Date` header.
    pub date: Option<EnvelopeDate>,
    /// The `Subject` header, decoded.
    pub subject: Option<String>,
    /// The `From` header. `None` rather than empty when the server sent
    /// NIL, an empty list, or a list of all-empty addresses.
    pub from: Option<Vec<EmailAddress>>,
    /// The `Sender` header.
    pub sender: Option<Vec<EmailAddress>>,
    /// The `Reply-To` header.
    pub reply_to: Option<Vec<EmailAddress>>,
    /// The `To` header.
    pub to: Option<Vec<EmailAddress>>,
    /// The `CC` header.
    pub cc: Option<Vec<EmailAddress>>,
    /// The `BCC` header.
    pub bcc: Option<Vec<EmailAddress>>,
    /// The `In-Reply-To` header, trimmed.
    pub in_reply_to: Option<String>,
    /// The `Message-ID` header, trimmed.
    pub message_id: Option<String>,
}

impl Envelope {
    /// Decode an `ENVELOPE` token list.
    ///
    /// Never fails; anything that is not a list decodes to the all-absent
    /// envelope so one mangled item cannot abort a response batch.
    pub fn decode(tok: &Token) -> Envelope {
        let slots = match tok.as_list() {
            Some(slots) => slots,
            None => return Envelope::default(),
        };

        Envelope {
            date: token::nstring(slots, 0)
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_date(&s)),
            subject: token::nstring(slots, 1)
                .map(|s| encoded_word::decode_text(&s).into_owned())
                .filter(|s| !s.is_empty()),
            from: address_list(slots, 2),
            sender: address_list(slots, 3),
            reply_to: address_list(slots, 4),
            to: address_list(slots, 5),
            cc: address_list(slots, 6),
            bcc: address_list(slots, 7),
            in_reply_to: trimmed(slots, 8),
            message_id: trimmed(slots, 9),
        }
    }
}

fn trimmed(slots: &[Token], idx: usize) -> Option<String> {
    token::nstring(slots, idx)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> EnvelopeDate {
    let mut candidate = raw.trim();

    // Strip an RFC 822 trailing comment, e.g. "... -0700 (PDT)", which the
    // RFC 2822 parser rejects.
    if candidate.ends_with(')') {
        if let Some(open) = candidate.rfind('(') {
            candidate = candidate[..open].trim_end();
        }
    }

    match DateTime::parse_from_rfc2822(candidate) {
        Ok(datetime) => EnvelopeDate::Parsed(datetime),
        Err(_) => EnvelopeDate::Raw(raw.to_owned()),
    }
}

fn address_list(slots: &[Token], idx: usize) -> Option<Vec<EmailAddress>> {
    let list = slots.get(idx)?.as_list()?;

    let addresses: Vec<EmailAddress> =
        list.iter().filter_map(decode_address).collect();

    // A list whose every entry decoded to nothing is indistinguishable in
    // value from no list at all, and callers must see them the same way.
    if addresses.is_empty() {
        None
    } else {
        Some(addresses)
    }
}

fn decode_address(tok: &Token) -> Option<EmailAddress> {
    let parts = tok.as_list()?;

    let name = token::nstring(parts, 0)
        .map(|s| {
            collapse_whitespace(&encoded_word::decode_text(&s))
                .trim()
                .to_owned()
        })
        .unwrap_or_default();

    // parts[1] is the RFC 822 source route; discarded.

    let local = token::nstring(parts, 2).unwrap_or(Cow::Borrowed(""));
    let domain = token::nstring(parts, 3).unwrap_or(Cow::Borrowed(""));
    let address = if local.is_empty() && domain.is_empty() {
        String::new()
    } else {
        format!("{}@{}", local, domain)
    };

    if name.is_empty() && address.is_empty() {
        None
    } else {
        Some(EmailAddress { name, address })
    }
}

fn collapse_whitespace(s: &str) -> Cow<str> {
    let tidy = !s.starts_with(' ')
        && !s.ends_with(' ')
        && memchr::memchr3(b'\t', b'\r', b'\n', s.as_bytes()).is_none()
        && !s.contains('\u{c}')
        && !s.contains("  ");
    if tidy {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.split_ascii_whitespace().collect::<Vec<_>>().join(" "),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn addr(
        name: impl Into<Option<&'static str>>,
        local: impl Into<Option<&'static str>>,
        domain: impl Into<Option<&'static str>>,
    ) -> Token {
        fn slot(s: Option<&str>) -> Token {
            match s {
                Some(s) => Token::quoted(s),
                None => Token::Nil,
            }
        }
        Token::list(vec![
            slot(name.into()),
            Token::Nil,
            slot(local.into()),
            slot(domain.into()),
        ])
    }

    #[test]
    fn decode_full_envelope() {
        let envelope = Envelope::decode(&Token::list(vec![
            Token::quoted("Mon, 14 May 2001 19:36:00 -0700 (PDT)"),
            Token::quoted("Request for meeting"),
            Token::list(vec![addr("Vidal Martinez", "vmartinez", "winstead.com")]),
            Token::Nil,
            Token::Nil,
            Token::list(vec![addr(None, "kenneth.lay", "enron.com")]),
            Token::Nil,
            Token::Nil,
            Token::quoted("  <parent@thyme>  "),
            Token::quoted("<4102090.JavaMail.evans@thyme>"),
        ]));

        assert_eq!(
            Some(EnvelopeDate::Parsed(
                FixedOffset::west_opt(7 * 3600)
                    .unwrap()
                    .with_ymd_and_hms(2001, 5, 14, 19, 36, 0)
                    .unwrap()
            )),
            envelope.date
        );
        assert_eq!(Some("Request for meeting".to_owned()), envelope.subject);
        assert_eq!(
            Some(vec![EmailAddress {
                name: "Vidal Martinez".to_owned(),
                address: "vmartinez@winstead.com".to_owned(),
            }]),
            envelope.from
        );
        assert_eq!(None, envelope.sender);
        assert_eq!(None, envelope.reply_to);
        assert_eq!(
            Some(vec![EmailAddress {
                name: String::new(),
                address: "kenneth.lay@enron.com".to_owned(),
            }]),
            envelope.to
        );
        assert_eq!(None, envelope.cc);
        assert_eq!(None, envelope.bcc);
        assert_eq!(Some("<parent@thyme>".to_owned()), envelope.in_reply_to);
        assert_eq!(
            Some("<4102090.JavaMail.evans@thyme>".to_owned()),
            envelope.message_id
        );
    }

    #[test]
    fn unparseable_date_is_kept_raw() {
        let envelope = Envelope::decode(&Token::list(vec![Token::quoted(
            "a long time ago",
        )]));
        assert_eq!(
            Some(EnvelopeDate::Raw("a long time ago".to_owned())),
            envelope.date
        );
    }

    #[test]
    fn encoded_words_are_decoded() {
        let envelope = Envelope::decode(&Token::list(vec![
            Token::Nil,
            Token::quoted("=?ISO-8859-1?Q?Andr=E9?= says hi"),
            Token::list(vec![addr(
                "=?ISO-8859-1?Q?Keld_J=F8rn_Simonsen?=",
                "keld",
                "dkuug.dk",
            )]),
        ]));

        assert_eq!(
            Some("Andr\u{e9} says hi".to_owned()),
            envelope.subject
        );
        assert_eq!(
            Some(vec![EmailAddress {
                name: "Keld J\u{f8}rn Simonsen".to_owned(),
                address: "keld@dkuug.dk".to_owned(),
            }]),
            envelope.from
        );
    }

    #[test]
    fn display_name_whitespace_is_collapsed() {
        let envelope = Envelope::decode(&Token::list(vec![
            Token::Nil,
            Token::Nil,
            Token::list(vec![addr("  John \t\r\n  Doe ", "john", "example.com")]),
        ]));

        assert_eq!(
            Some(vec![EmailAddress {
                name: "John Doe".to_owned(),
                address: "john@example.com".to_owned(),
            }]),
            envelope.from
        );
    }

    #[test]
    fn empty_addresses_are_dropped() {
        // A tuple of four NILs decodes to nothing at all...
        let envelope = Envelope::decode(&Token::list(vec![
            Token::Nil,
            Token::Nil,
            Token::list(vec![
                addr(None, None, None),
                addr("John Doe", "john", "example.com"),
            ]),
        ]));
        assert_eq!(1, envelope.from.as_ref().map(Vec::len).unwrap());

        // ...and a list containing only such tuples yields an absent field,
        // not an empty list.
        let envelope = Envelope::decode(&Token::list(vec![
            Token::Nil,
            Token::Nil,
            Token::list(vec![addr(None, None, None), addr(None, None, None)]),
        ]));
        assert_eq!(None, envelope.from);
    }

    #[test]
    fn one_sided_addresses_keep_the_at_sign() {
        // Group-start pseudo-addresses have a local part and no domain.
        let envelope = Envelope::decode(&Token::list(vec![
            Token::Nil,
            Token::Nil,
            Token::list(vec![addr(None, "undisclosed-recipients", None)]),
        ]));
        assert_eq!(
            Some(vec![EmailAddress {
                name: String::new(),
                address: "undisclosed-recipients@".to_owned(),
            }]),
            envelope.from
        );
    }

    #[test]
    fn non_list_input_decodes_to_nothing() {
        assert_eq!(Envelope::default(), Envelope::decode(&Token::Nil));
        assert_eq!(
            Envelope::default(),
            Envelope::decode(&Token::quoted("ENVELOPE"))
        );
        assert_eq!(Envelope::default(), Envelope::decode(&Token::list(vec![])));
    }

    #[test]
    fn decoding_is_deterministic() {
        let tok = Token::list(vec![
            Token::quoted("Mon, 14 May 2001 19:36:00 -0700"),
            Token::quoted("subject"),
            Token::list(vec![addr("A", "a", "example.com")]),
        ]);
        assert_eq!(Envelope::decode(&tok), Envelope::decode(&tok));
    }
}
