//-
// Copyright (c) 2026, Jason Lingle
//
// This file is part of Mimesect.
//
// Mimesect is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mimesect is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mimesect. If not, see <http://www.gnu.org/licenses/>.

use std::io;

use thiserror::Error;

/// Errors which can escape tree construction.
///
/// Nothing downstream of a successfully built tree raises: structurally
/// malformed signed bodies and cryptographic failures are reported through
/// absent or `false` results instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("multipart/signed entity has no 'boundary' parameter")]
    MissingBoundary,
    #[error(transparent)]
    Io(#[from] io::Error),
}
