// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/reader.rs - Little-endian cursor over an in-memory binary file.
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

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::fixed::{Box2S, Fixed32, Vector2S};

/// Forward-only reader over a byte buffer.
///
/// Every read either consumes exactly the bytes it asks for or fails with
/// [Error::UnexpectedEof] carrying the offset where the read started.
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// The current offset from the start of the buffer.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn seek(&mut self, pos: u64) {
        self.cursor.set_position(pos);
    }

    /// Number of bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }

    fn read_with<T>(
        &mut self,
        f: impl FnOnce(&mut Cursor<&'a [u8]>) -> io::Result<T>,
    ) -> Result<T> {
        let offset = self.position();
        f(&mut self.cursor).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                // Leave the cursor where the failed read began.
                self.cursor.set_position(offset);
                Error::UnexpectedEof { offset }
            } else {
                Error::Io(e)
            }
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_with(|c| c.read_u8())
    }

    /// Reads a byte that must be 0 or 1.
    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.position();
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(Error::violation_at(
                offset,
                format!("expected boolean byte, found {v:#04x}"),
            )),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_with(|c| c.read_u16::<LittleEndian>())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_with(|c| c.read_u32::<LittleEndian>())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_with(|c| c.read_i32::<LittleEndian>())
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_with(|c| c.read_f32::<LittleEndian>())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(Error::UnexpectedEof {
                offset: self.position(),
            });
        }
        let mut buf = vec![0; len];
        self.read_with(|c| c.read_exact(&mut buf))?;
        Ok(buf)
    }

    pub fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.read_with(|c| c.read_exact(&mut buf))?;
        Ok(buf)
    }

    pub fn read_u32_array<const N: usize>(&mut self) -> Result<[u32; N]> {
        let mut buf = [0; N];
        self.read_with(|c| c.read_u32_into::<LittleEndian>(&mut buf))?;
        Ok(buf)
    }

    pub fn read_i32_array<const N: usize>(&mut self) -> Result<[i32; N]> {
        let mut buf = [0; N];
        self.read_with(|c| c.read_i32_into::<LittleEndian>(&mut buf))?;
        Ok(buf)
    }

    pub fn read_bool_array<const N: usize>(&mut self) -> Result<[bool; N]> {
        let mut buf = [false; N];
        for flag in &mut buf {
            *flag = self.read_bool()?;
        }
        Ok(buf)
    }

    pub fn read_fixed(&mut self) -> Result<Fixed32> {
        self.read_i32().map(Fixed32::from_raw)
    }

    pub fn read_vec2(&mut self) -> Result<Vector2S> {
        let x = self.read_fixed()?;
        let y = self.read_fixed()?;
        Ok(Vector2S::new(x, y))
    }

    pub fn read_box2(&mut self) -> Result<Box2S> {
        let min = self.read_vec2()?;
        let max = self.read_vec2()?;
        Ok(Box2S { min, max })
    }

    /// Reads a string with a one-byte length prefix, returning the raw
    /// content bytes.
    pub fn read_string_bytes(&mut self) -> Result<Vec<u8>> {
        let offset = self.position();
        let len = usize::from(self.read_u8()?);
        self.read_bytes(len).map_err(|e| match e {
            Error::UnexpectedEof { .. } => Error::UnexpectedEof { offset },
            e => e,
        })
    }

    /// Reads a length-prefixed string, replacing invalid UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_string_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }

    /// Reads `count` records with `read_one`.
    ///
    /// Counts come straight from the file, so the up-front allocation is
    /// capped by the bytes left rather than trusted.
    pub fn read_list<T>(
        &mut self,
        count: u32,
        mut read_one: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity((count as usize).min(self.remaining()));
        for _ in 0..count {
            items.push(read_one(self)?);
        }
        Ok(items)
    }

    /// Reads a `u32` and fails unless it equals `expected`.
    pub fn expect_u32(&mut self, expected: u32, what: &str) -> Result<u32> {
        let offset = self.position();
        let value = self.read_u32()?;
        if value != expected {
            return Err(Error::violation_at(
                offset,
                format!("{what}: expected {expected}, found {value}"),
            ));
        }
        Ok(value)
    }

    /// Reads a `u8` and fails unless it equals `expected`.
    pub fn expect_u8(&mut self, expected: u8, what: &str) -> Result<u8> {
        let offset = self.position();
        let value = self.read_u8()?;
        if value != expected {
            return Err(Error::violation_at(
                offset,
                format!("{what}: expected {expected}, found {value}"),
            ));
        }
        Ok(value)
    }

    /// Reads `N` words that must all be zero.
    pub fn expect_zero_words<const N: usize>(&mut self, what: &str) -> Result<()> {
        let offset = self.position();
        let words = self.read_u32_array::<N>()?;
        if let Some(i) = words.iter().position(|&w| w != 0) {
            return Err(Error::violation_at(
                offset + 4 * i as u64,
                format!("{what}: expected zero word, found {}", words[i]),
            ));
        }
        Ok(())
    }
}
