// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/tebo/mod.rs - Tebo-ICT view (TVW) importer.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `tebo` Module
 *
 * Reading Tebo-ICT view files happens in two steps:
 *
 * 1. [parser]: Decodes the bytes into the file's own record structure.
 * 2. [interpreter]: Translates that structure into a canonical [Board].
 *
 * [fixture] holds the probe and fixture blocks the parser has to step over.
 */

pub mod fixture;
pub mod interpreter;
pub mod parser;

use crate::board::Board;
use crate::error::Result;

/// Decodes and translates a TVW file in one go.
pub fn import(data: &[u8]) -> Result<Board> {
    let parsed = parser::ParsedTeboFile::from_bytes(data)?;
    interpreter::interpret(&parsed)
}
