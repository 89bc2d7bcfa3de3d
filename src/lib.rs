//-
// Copyright (c) 2026, the Tealeaf authors
//
// This file is part of Tealeaf.
//
// Tealeaf is free software: you can  redistribute it and/or modify it under
// the terms of  the GNU General Public  License as published  by the Free
// Software Foundation, either version  3 of the License, or (at your option)
// any later version.
//
// Tealeaf is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or
// FITNESS FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License
// for more details.
//
// You should have received a copy of the GNU General Public License along
// with Tealeaf. If not, see <http://www.gnu.org/licenses/>.

//! Tealeaf turns the token trees a client-side IMAP tokeniser produces for
//! `FETCH` responses into typed `ENVELOPE` and `BODYSTRUCTURE` records, as
//! defined by RFC 3501 and RFC 3502.
//!
//! The wire grammar for these structures is positional, variable-length,
//! partially optional, and recursive, and there is no schema to check the
//! result against at runtime --- a decoder that reads one slot too many or
//! too few produces a record that is structurally fine and semantically
//! garbage. The code here therefore pattern-matches on token shape before
//! consuming anything and degrades field-by-field instead of failing, so
//! that one strange `FETCH` item never takes down a whole response batch.
//!
//! What this crate deliberately does not do: tokenise raw protocol bytes,
//! validate that a response is well-formed IMAP (both are the tokeniser's
//! job), or perform any I/O. Inputs are read-only token trees; outputs are
//! freshly allocated value records with no aliasing back into the input, so
//! everything here is safe to call concurrently from any number of threads.

pub mod mime;
pub mod response;
pub mod support;
pub mod syntax;

pub use crate::response::bodystructure::BodyStructure;
pub use crate::response::envelope::{EmailAddress, Envelope, EnvelopeDate};
pub use crate::response::token::{ScalarKind, Token};
pub use crate::support::error::Error;
