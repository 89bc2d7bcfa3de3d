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

use thiserror::Error;

/// Errors the decoders can surface.
///
/// Malformed or truncated data never produces an error --- the decoders
/// degrade field-by-field instead, since servers routinely omit or mangle
/// optional fields and one bad `FETCH` item must not abort a whole response.
/// The sole exception is the recursion guard: nesting depth is controlled by
/// the server, so exceeding the ceiling is treated as a resource-exhaustion
/// attempt rather than a data-shape variance.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Body structure nested deeper than the supported limit")]
    NestingTooDeep,
}
