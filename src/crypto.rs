// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/crypto.rs - Header string cipher used by Tebo-ICT files.
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
 * # `crypto` Module
 *
 * The three text fields in a Tebo-ICT file header are stored with a
 * position-dependent substitution cipher. Each character is shifted by an
 * amount that depends on its index in the string and on which ASCII range it
 * falls into; the lowercase `a..j` range and the digit range additionally
 * swap with each other. Anything outside the four ranges is left alone.
 *
 * Only the decode direction is known to be correct, so no encoder is
 * provided.
 */

fn decode_char(c: u8, index: usize) -> u8 {
    let step3 = (index % 3) as u8;
    let step10 = (index % 10) as u8;
    match c {
        b'a'..=b'j' => {
            let mut x = c - step3 - 4;
            if x < b'a' {
                x += 10;
            }
            154 - x
        }
        b'k'..=b'z' => {
            let x = c - step10 - 5;
            if x < b'k' { x + 16 } else { x }
        }
        b'A'..=b'Z' => {
            let x = c + step10 + 5;
            if x > b'Z' { x - 26 } else { x }
        }
        b'0'..=b'9' => {
            let mut x = c + step3 + 4;
            if x > b'9' {
                x -= 10;
            }
            x + 49
        }
        _ => c,
    }
}

/// Decodes an obfuscated header string.
///
/// The transform runs once over the input in index order and must not be
/// applied twice.
pub fn decode(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(i, &c)| decode_char(c, i))
        .collect()
}
