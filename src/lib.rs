// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/lib.rs - Converter library for printed circuit board views.
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
 * # `brdconv` Crate
 *
 * A library for converting printed circuit board views between formats.
 *
 * Every conversion goes through one canonical model, [board::Board]:
 *
 * 1. An importer reads native bytes into a [board::Board]: [tebo] for
 *    Tebo-ICT `.tvw` files and [eagle] for EAGLE XML boards.
 * 2. [board::Board::validate] checks every cross reference.
 * 3. An exporter renders the board: [toptest] for Toptest `.brd` views.
 *
 * [format] ties these together under short tags like `tebo`, which is what
 * the `brdconv` command line uses.
 *
 * ## Usage Example
 *
 * ```no_run
 * use std::fs;
 *
 * use brdconv::format::{self, BoardFormat};
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let input = fs::read("example.tvw")?;
 *
 *     // Decode, validate and re-encode in one step
 *     let output = format::convert(BoardFormat::Tebo, &input, BoardFormat::Toptest)?;
 *     fs::write("example.brd", output)?;
 *
 *     // Or stop at the canonical board
 *     let board = BoardFormat::Tebo.import(&input)?;
 *     for part in &board.parts {
 *         println!("Part: {} ({} pins)", part.name, part.pins.len());
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

pub mod board;
pub mod crypto;
pub mod eagle;
pub mod error;
pub mod fixed;
pub mod format;
pub mod geometry;
pub mod outline;
pub mod reader;
pub mod tebo;
pub mod toptest;
