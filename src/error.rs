// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/error.rs - Error types shared by every board format.
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

use std::fmt;

use thiserror::Error;

/// Direction of a conversion step, as seen by a format handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reading native bytes into a [crate::board::Board].
    Import,
    /// Writing a [crate::board::Board] out as native bytes.
    Export,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Import => f.write_str("import"),
            Direction::Export => f.write_str("export"),
        }
    }
}

/// Errors raised while reading, translating or writing a board.
///
/// None of these are recoverable: a conversion that hits one is abandoned
/// and nothing is written.
#[derive(Debug, Error)]
pub enum Error {
    /// The binary cursor ran out of bytes.
    #[error("unexpected end of file at offset {offset:#010x}")]
    UnexpectedEof { offset: u64 },

    /// A structural invariant of the input did not hold.
    #[error("format violation{}: {message}", describe_offset(.offset))]
    FormatViolation {
        offset: Option<u64>,
        message: String,
    },

    /// A format handler was asked for a direction it does not support.
    #[error("format '{tag}' does not support {direction}")]
    UnsupportedOperation { tag: String, direction: Direction },

    /// No format is registered under this tag.
    #[error("unrecognized format '{0}'")]
    UnknownFormat(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a FormatViolation error located at a byte offset.
    pub fn violation_at(offset: u64, message: impl Into<String>) -> Self {
        Self::FormatViolation {
            offset: Some(offset),
            message: message.into(),
        }
    }

    /// Create a FormatViolation error with no byte location.
    pub fn violation(message: impl Into<String>) -> Self {
        Self::FormatViolation {
            offset: None,
            message: message.into(),
        }
    }

    pub fn unsupported(tag: impl Into<String>, direction: Direction) -> Self {
        Self::UnsupportedOperation {
            tag: tag.into(),
            direction,
        }
    }
}

fn describe_offset(offset: &Option<u64>) -> String {
    match offset {
        Some(offset) => format!(" at offset {offset:#010x}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::violation_at(0x1234, "magic mismatch");
        assert_eq!(
            format!("{err}"),
            "format violation at offset 0x00001234: magic mismatch"
        );

        let err = Error::violation("vertex shared by more than 2 edges");
        assert_eq!(
            format!("{err}"),
            "format violation: vertex shared by more than 2 edges"
        );

        let err = Error::UnexpectedEof { offset: 16 };
        assert_eq!(format!("{err}"), "unexpected end of file at offset 0x00000010");

        let err = Error::unsupported("toptest", Direction::Import);
        assert_eq!(format!("{err}"), "format 'toptest' does not support import");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
