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

//! Decoding of tokenised `FETCH` response data.
//!
//! The tokeniser (not part of this crate) splits the raw wire form of a
//! `FETCH` item into a tree of [`token::Token`]s: atoms, quoted strings,
//! literals, numbers, NILs, and parenthesised lists. The modules here give
//! that tree its meaning. `ENVELOPE` and `BODYSTRUCTURE` are both purely
//! positional formats --- which slot a value sits in, not what it looks
//! like, decides what it is --- so the decoders advance an explicit cursor
//! over each list and match on token shape before consuming anything.
//!
//! All decoding is tolerant. Servers disagree about which optional fields
//! to send, and RFC 3501 reserves trailing slots for future extensions, so
//! a missing, NIL, or oddly-shaped slot makes the corresponding field
//! absent rather than failing the decode.

pub mod bodystructure;
pub mod envelope;
pub mod token;
