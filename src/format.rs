// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/format.rs - Registry of supported board formats.
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

use tracing::info;

use crate::board::Board;
use crate::error::{Direction, Error, Result};
use crate::{eagle, tebo, toptest};

/// Every board format the converter knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardFormat {
    Tebo,
    Eagle,
    Toptest,
}

impl BoardFormat {
    /// All formats, in the order they are listed to users.
    pub const ALL: [BoardFormat; 3] = [Self::Tebo, Self::Eagle, Self::Toptest];

    /// Looks a format up by its tag. Tags are case-sensitive.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.tag() == tag)
            .ok_or_else(|| Error::UnknownFormat(tag.to_string()))
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Tebo => "tebo",
            Self::Eagle => "eagle",
            Self::Toptest => "toptest",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Tebo => "Tebo-ICT view (*.TVW)",
            Self::Eagle => "Autodesk EAGLE board (*.BRD)",
            Self::Toptest => "Toptest board view (*.BRD)",
        }
    }

    pub fn can_import(self) -> bool {
        matches!(self, Self::Tebo | Self::Eagle)
    }

    pub fn can_export(self) -> bool {
        matches!(self, Self::Toptest)
    }

    /// Reads a board from the format's native bytes. The board is validated
    /// before it is returned.
    pub fn import(self, data: &[u8]) -> Result<Board> {
        let board = match self {
            Self::Tebo => tebo::import(data)?,
            Self::Eagle => eagle::import(data)?,
            Self::Toptest => return Err(Error::unsupported(self.tag(), Direction::Import)),
        };
        board.validate()?;
        Ok(board)
    }

    /// Renders a validated board in the format's native form.
    pub fn export(self, board: &Board) -> Result<Vec<u8>> {
        match self {
            Self::Toptest => toptest::export(board),
            Self::Tebo | Self::Eagle => Err(Error::unsupported(self.tag(), Direction::Export)),
        }
    }
}

impl fmt::Display for BoardFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Converts `input` from `src` to `dst` entirely in memory.
///
/// Both directions are checked before any decoding starts, so asking for an
/// impossible conversion fails fast.
pub fn convert(src: BoardFormat, input: &[u8], dst: BoardFormat) -> Result<Vec<u8>> {
    if !src.can_import() {
        return Err(Error::unsupported(src.tag(), Direction::Import));
    }
    if !dst.can_export() {
        return Err(Error::unsupported(dst.tag(), Direction::Export));
    }
    let board = src.import(input)?;
    info!(
        "imported {} board: {} layers, {} nets, {} parts",
        src,
        board.layers.len(),
        board.nets.len(),
        board.parts.len()
    );
    dst.export(&board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for format in BoardFormat::ALL {
            assert_eq!(BoardFormat::from_tag(format.tag()).unwrap(), format);
        }
        assert!(matches!(
            BoardFormat::from_tag("gerber"),
            Err(Error::UnknownFormat(tag)) if tag == "gerber"
        ));
        assert!(BoardFormat::from_tag("TEBO").is_err());
    }

    #[test]
    fn test_capabilities() {
        let importers: Vec<_> = BoardFormat::ALL
            .into_iter()
            .filter(|f| f.can_import())
            .collect();
        assert_eq!(importers, vec![BoardFormat::Tebo, BoardFormat::Eagle]);
        let exporters: Vec<_> = BoardFormat::ALL
            .into_iter()
            .filter(|f| f.can_export())
            .collect();
        assert_eq!(exporters, vec![BoardFormat::Toptest]);
        assert_eq!(BoardFormat::Tebo.description(), "Tebo-ICT view (*.TVW)");
    }

    #[test]
    fn test_wrong_direction() {
        match convert(BoardFormat::Toptest, b"", BoardFormat::Toptest) {
            Err(Error::UnsupportedOperation { tag, direction }) => {
                assert_eq!(tag, "toptest");
                assert_eq!(direction, Direction::Import);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        match convert(BoardFormat::Tebo, b"", BoardFormat::Eagle) {
            Err(Error::UnsupportedOperation { tag, direction }) => {
                assert_eq!(tag, "eagle");
                assert_eq!(direction, Direction::Export);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            BoardFormat::Eagle.export(&Board::default()),
            Err(Error::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_empty_tebo_input() {
        assert!(matches!(
            convert(BoardFormat::Tebo, b"", BoardFormat::Toptest),
            Err(Error::UnexpectedEof { offset: 0 })
        ));
    }
}
