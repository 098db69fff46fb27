// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/toptest.rs - Toptest board view exporter.
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
 * # `toptest` Module
 *
 * Writes the plain-text `.brd` board view read by Toptest and most
 * boardview tools. All coordinates are whole mils.
 *
 * The file is a checksum line followed by five sections separated by blank
 * lines:
 *
 * ```text
 * <magic>
 * BRDOUT: <vertex count> <width> <height>
 * <x> <y>                                     (closed outline)
 *
 * NETS: <count>
 * <1-based index> <name>
 *
 * PARTS: <count>
 * <name> <min x> <min y> <max x> <max y> <first pin> <layer>
 *
 * PINS: <count>
 * <x> <y> <1-based net, 0 for none> <layer>
 *
 * NAILS: <count>
 * <x> <y> <1-based net, 0 for none> <layer>
 * ```
 *
 * Layers are coded 0 for through-hole, 1 for top and 2 for bottom. Pins and
 * nails on the top are mirrored vertically inside the outline's height.
 */

use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::debug;

use crate::board::{Board, LayerRole, NO_NET};
use crate::error::{Error, Result};
use crate::geometry::{Box2, Vector2};
use crate::outline::OutlineBuilder;

/// A point rounded to whole mils.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Point {
    x: i64,
    y: i64,
}

impl From<Vector2> for Point {
    fn from(v: Vector2) -> Self {
        Self {
            x: v.x.round() as i64,
            y: v.y.round() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Through,
    Top,
    Bottom,
}

impl Side {
    fn from_role(role: LayerRole) -> Option<Self> {
        match role {
            LayerRole::Multilayer => Some(Self::Through),
            LayerRole::Top => Some(Self::Top),
            LayerRole::Bottom => Some(Self::Bottom),
            _ => None,
        }
    }

    fn code(self) -> u8 {
        match self {
            Self::Through => 0,
            Self::Top => 1,
            Self::Bottom => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ToptestPart {
    name: String,
    min: Point,
    max: Point,
    first_pin: usize,
    side: Side,
}

/// A pin or a nail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Contact {
    pos: Point,
    /// 1-based; 0 means unconnected.
    net: u64,
    side: Side,
}

fn toptest_net(net: u32) -> u64 {
    if net == NO_NET { 0 } else { u64::from(net) + 1 }
}

/// A board reduced to what the Toptest format can hold.
#[derive(Debug, Clone, Default)]
pub struct ToptestBoard {
    outline: Vec<Point>,
    nets: Vec<String>,
    parts: Vec<ToptestPart>,
    pins: Vec<Contact>,
    nails: Vec<Contact>,
}

impl ToptestBoard {
    /// Flattens a validated board.
    pub fn from_board(board: &Board) -> Result<Self> {
        let route = board
            .find_layer(LayerRole::Route)
            .and_then(|i| board.drill_layer(i))
            .ok_or_else(|| Error::violation("board has no route layer to take an outline from"))?;
        let mut builder = OutlineBuilder::new();
        for slot in &route.slots {
            builder.add_edge(slot.edge)?;
        }
        let outline: Vec<Point> = builder.build().into_iter().map(Point::from).collect();
        if outline.is_empty() {
            return Err(Error::violation("board outline is empty"));
        }

        let mut toptest = ToptestBoard {
            outline,
            nets: board.nets.clone(),
            ..Default::default()
        };

        for part in &board.parts {
            let Some(side) = board.layers.get(part.layer).and_then(|l| Side::from_role(l.role))
            else {
                continue;
            };
            if side == Side::Through {
                continue;
            }
            let bbox = if part.bbox.is_empty() {
                Box2::new(part.pos, part.pos)
            } else {
                part.bbox
            };
            toptest.parts.push(ToptestPart {
                name: part.name.clone(),
                min: bbox.min.into(),
                max: bbox.max.into(),
                first_pin: toptest.pins.len(),
                side,
            });
            for pin in &part.pins {
                let layer = board.layers.get(pin.layer);
                let side = layer.and_then(|l| Side::from_role(l.role));
                let pad = layer
                    .and_then(|l| l.as_logic())
                    .and_then(|l| l.pads.get(pin.pad));
                let (Some(side), Some(pad)) = (side, pad) else {
                    return Err(Error::violation(format!(
                        "pin {} of part {} is not on a through-hole, top or bottom layer",
                        pin.id, part.name
                    )));
                };
                toptest.pins.push(Contact {
                    pos: pad.pos.into(),
                    net: toptest_net(pad.net),
                    side,
                });
            }
        }

        for (role, side) in [(LayerRole::Top, Side::Top), (LayerRole::Bottom, Side::Bottom)] {
            let Some(layer) = board.find_layer(role).and_then(|i| board.logic_layer(i)) else {
                continue;
            };
            toptest.nails.extend(layer.test_points.iter().map(|tp| Contact {
                pos: tp.pos.into(),
                net: toptest_net(tp.net),
                side,
            }));
        }

        debug!(
            "toptest board: {} outline vertices, {} parts, {} pins, {} nails",
            toptest.outline.len(),
            toptest.parts.len(),
            toptest.pins.len(),
            toptest.nails.len()
        );
        Ok(toptest)
    }

    fn outline_box(&self) -> (Point, Point) {
        let mut min = Point {
            x: i64::MAX,
            y: i64::MAX,
        };
        let mut max = Point {
            x: i64::MIN,
            y: i64::MIN,
        };
        for p in &self.outline {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Writes the board in Toptest text form.
    pub fn write<W: Write>(&self, mut out: W) -> Result<()> {
        let (min, max) = self.outline_box();
        let width = max.x - min.x;
        let height = max.y - min.y;
        let first = self.outline.first().copied().unwrap_or_default();
        let vertex_count = self.outline.len() + 1;

        // Top-side contacts are seen from below.
        let place = |c: &Contact| match c.side {
            Side::Top => Point {
                x: c.pos.x,
                y: height - c.pos.y,
            },
            _ => c.pos,
        };

        section(&mut out, |w| {
            let magic = 163 * (first.x + first.y)
                + 80 * vertex_count as i64
                + 79 * height
                + 84 * width;
            w.serialize([magic])?;
            w.serialize(("BRDOUT:", vertex_count, width, height))?;
            for p in self.outline.iter().chain(self.outline.first()) {
                w.serialize((p.x, p.y))?;
            }
            Ok(())
        })?;
        out.write_all(b"\n")?;

        section(&mut out, |w| {
            w.serialize(("NETS:", self.nets.len()))?;
            for (i, name) in self.nets.iter().enumerate() {
                w.serialize((i + 1, name))?;
            }
            Ok(())
        })?;
        out.write_all(b"\n")?;

        section(&mut out, |w| {
            w.serialize(("PARTS:", self.parts.len()))?;
            for part in &self.parts {
                w.serialize((
                    &part.name,
                    part.min.x,
                    part.min.y,
                    part.max.x,
                    part.max.y,
                    part.first_pin,
                    part.side.code(),
                ))?;
            }
            Ok(())
        })?;

        for (title, contacts) in [("PINS:", &self.pins), ("NAILS:", &self.nails)] {
            out.write_all(b"\n")?;
            section(&mut out, |w| {
                w.serialize((title, contacts.len()))?;
                for c in contacts {
                    let p = place(c);
                    w.serialize((p.x, p.y, c.net, c.side.code()))?;
                }
                Ok(())
            })?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Runs `write_records` against a space-separated, unquoted record writer
/// over `out`.
fn section<W: Write>(
    out: &mut W,
    write_records: impl FnOnce(&mut csv::Writer<&mut W>) -> Result<()>,
) -> Result<()> {
    let mut w = WriterBuilder::new()
        .delimiter(b' ')
        .flexible(true)
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    write_records(&mut w)?;
    w.flush()?;
    Ok(())
}

/// Renders a board as a Toptest board view.
pub fn export(board: &Board) -> Result<Vec<u8>> {
    let toptest = ToptestBoard::from_board(board)?;
    let mut out = Vec::new();
    toptest.write(&mut out)?;
    Ok(out)
}
