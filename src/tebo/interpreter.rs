// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/tebo/interpreter.rs - Translation of decoded TVW files into boards.
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
 * # `interpreter` Module
 *
 * Maps a [ParsedTeboFile] onto the canonical [Board].
 *
 * Canonical layer *i* is layer object *i* of the file, so part and pin layer
 * indices carry over unchanged; the multilayer layer is appended after
 * them. Test point tables and fixture metadata are not carried over.
 */

use tracing::{debug, warn};

use crate::board::{
    self, Board, Decal, Hole, Layer, LayerContent, LayerRole, Pad, PadDrill, Pin, PolyLine,
    Primitive, PrimitiveKind, Slot,
};
use crate::error::{Error, Result};
use crate::geometry::{Angle, Edge2, Vector2};
use crate::tebo::parser::{
    self, DCODE_BASE, LayerType, LogicObject, Object, ParsedTeboFile, ShapeKind, ThroughObject,
};

const MULTILAYER_COLOR: u32 = 0xc0c0c0;

/// Stride between consecutive pad handles.
const PAD_HANDLE_STRIDE: u32 = 8;

fn role(layer_type: LayerType) -> LayerRole {
    match layer_type {
        LayerType::Document => LayerRole::Document,
        LayerType::Top => LayerRole::Top,
        LayerType::Bottom => LayerRole::Bottom,
        LayerType::Signal => LayerRole::Signal,
        LayerType::Plane => LayerRole::Plane,
        LayerType::SolderTop => LayerRole::SolderTop,
        LayerType::SolderBottom => LayerRole::SolderBottom,
        LayerType::SilkTop => LayerRole::SilkTop,
        LayerType::SilkBottom => LayerRole::SilkBottom,
        LayerType::PasteTop => LayerRole::PasteTop,
        LayerType::PasteBottom => LayerRole::PasteBottom,
        LayerType::Drill => LayerRole::Drill,
        LayerType::Route => LayerRole::Route,
    }
}

/// File nets are signed with -1 for "none"; that bit pattern is [board::NO_NET].
fn net(net: i32) -> u32 {
    net as u32
}

fn translate_shape(shape: &parser::Shape) -> board::Shape {
    let size = shape.size.to_mils();
    match &shape.kind {
        ShapeKind::Round => board::Shape {
            kind: board::ShapeKind::Round,
            size,
            name: None,
        },
        ShapeKind::Rect => board::Shape::rect(size),
        ShapeKind::RoundRect { corner_radius } => {
            board::Shape::round_rect(size, corner_radius.to_mils())
        }
        ShapeKind::Poly {
            bbox,
            lines,
            vertices,
            ..
        } => {
            let mut poly = board::Shape::poly(bbox.to_mils(), shape.name.clone());
            poly.size = size;
            if let board::ShapeKind::Poly(geom) = &mut poly.kind {
                geom.lines = lines
                    .iter()
                    .map(|l| PolyLine {
                        edge: Edge2::new(l.start.to_mils(), l.end.to_mils()),
                        width: l.width.to_mils(),
                    })
                    .collect();
                geom.vertices = vertices.iter().map(|v| v.to_mils()).collect();
            }
            poly
        }
    }
}

fn translate_logic(obj: &LogicObject) -> Result<board::LogicLayer> {
    let shape_index = |dcode: u32| -> Result<usize> {
        dcode
            .checked_sub(DCODE_BASE)
            .map(|i| i as usize)
            .filter(|&i| i < obj.shapes.len())
            .ok_or_else(|| {
                Error::violation(format!(
                    "layer {:?} references DCode {dcode}, but has {} shapes",
                    obj.header.name,
                    obj.shapes.len()
                ))
            })
    };

    let shapes = obj.shapes.iter().map(translate_shape).collect();

    let pads = obj
        .pads
        .iter()
        .map(|pad| {
            let shape = shape_index(pad.dcode)?;
            Ok(Pad {
                net: net(pad.net),
                shape,
                pos: pad.pos.to_mils(),
                turn: Angle::from_degrees(f64::from(obj.shapes[shape].turn)),
                drill: pad.hole.as_ref().map(|hole| PadDrill {
                    offset: Vector2::ORIGIN,
                    size: hole.size.to_mils(),
                }),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut primitives = Vec::with_capacity(obj.lines.len() + obj.arcs.len() + obj.surfaces.len());
    for line in &obj.lines {
        primitives.push(Primitive {
            net: net(line.net),
            kind: PrimitiveKind::Line {
                edge: Edge2::new(line.start.to_mils(), line.end.to_mils()),
                width: obj.shapes[shape_index(line.dcode)?].size.x.to_mils(),
            },
        });
    }
    for arc in &obj.arcs {
        primitives.push(Primitive {
            net: net(arc.net),
            kind: PrimitiveKind::Arc {
                center: arc.pos.to_mils(),
                radius: arc.radius.to_mils(),
                start_angle: f64::from(arc.start_angle),
                sweep_angle: f64::from(arc.sweep_angle),
                width: obj.shapes[shape_index(arc.dcode)?].size.x.to_mils(),
            },
        });
    }
    for surface in &obj.surfaces {
        primitives.push(Primitive {
            net: net(surface.net),
            kind: PrimitiveKind::Surface {
                vertices: surface.vertices.iter().map(|v| v.to_mils()).collect(),
                cutouts: surface
                    .cutouts
                    .iter()
                    .map(|c| c.vertices.iter().map(|v| v.to_mils()).collect())
                    .collect(),
            },
        });
    }

    Ok(board::LogicLayer {
        shapes,
        pads,
        primitives,
        test_points: Vec::new(),
    })
}

fn translate_through(obj: &ThroughObject) -> Result<board::DrillLayer> {
    let tool_width = |tool: u32| -> Result<f64> {
        tool.checked_sub(1)
            .and_then(|i| obj.tools.get(i as usize))
            .map(|t| t.size.to_mils())
            .ok_or_else(|| {
                Error::violation(format!(
                    "layer {:?} references drill tool {tool}, but has {} tools",
                    obj.header.name,
                    obj.tools.len()
                ))
            })
    };

    let holes = obj
        .holes
        .iter()
        .map(|hole| {
            Ok(Hole {
                net: net(hole.net),
                width: tool_width(hole.tool)?,
                pos: hole.pos.to_mils(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let slots = obj
        .slots
        .iter()
        .map(|slot| {
            Ok(Slot {
                net: net(slot.net),
                width: tool_width(slot.tool)?,
                edge: Edge2::new(slot.begin.to_mils(), slot.end.to_mils()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(board::DrillLayer {
        holes,
        slots,
        span: board::LayerSpan::default(),
    })
}

fn translate_object(object: &Object) -> Result<Layer> {
    let header = object.header();
    let content = match object {
        Object::Logic(obj) => LayerContent::Logic(translate_logic(obj)?),
        Object::Through(obj) => LayerContent::Drill(translate_through(obj)?),
    };
    Ok(Layer {
        name: header.name.clone(),
        role: role(header.layer_type),
        pad_color: header.pad_color,
        line_color: header.line_color,
        content,
    })
}

fn translate_part(board: &Board, part: &parser::Part) -> Result<Option<board::Part>> {
    let layer = part.layer as usize;
    let side = board
        .layers
        .get(layer)
        .filter(|l| matches!(l.role, LayerRole::Top | LayerRole::Bottom));
    let Some(pads) = side.and_then(Layer::as_logic).map(|l| l.pads.len()) else {
        warn!(
            "skipping part {:?}: layer {} is not a top or bottom copper layer",
            part.name, part.layer
        );
        return Ok(None);
    };

    let pins = part
        .pins
        .iter()
        .map(|pin| {
            let pad = (pin.handle / PAD_HANDLE_STRIDE) as usize;
            if pad >= pads {
                return Err(Error::violation(format!(
                    "pin {:?} of part {:?} has handle {}, but layer {} has {} pads",
                    pin.name, part.name, pin.handle, part.layer, pads
                )));
            }
            Ok(Pin {
                layer,
                pad,
                id: pin.id,
                name: pin.name.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(board::Part {
        name: part.name.clone(),
        bbox: part.bbox.to_mils(),
        pos: part.pos.to_mils(),
        turn: Angle::from_degrees(f64::from(part.angle)),
        decal: part.decal as usize,
        height: part.height.to_mils(),
        value: part.value.clone(),
        tolerance_pos: part.tolerance_pos.clone(),
        tolerance_neg: part.tolerance_neg.clone(),
        desc: part.desc.clone(),
        layer,
        pins,
    }))
}

/// Builds the canonical board for a decoded TVW file.
///
/// # Errors
///
/// Returns [Error::FormatViolation] when a pad or trace names a DCode outside
/// its layer's shape table, a hole or slot names a drill tool that does not
/// exist, or a pin handle points past its layer's pads.
pub fn interpret(parsed: &ParsedTeboFile) -> Result<Board> {
    let mut board = Board {
        layers: Vec::with_capacity(parsed.objects.len() + 1),
        nets: parsed.nets.clone(),
        parts: Vec::with_capacity(parsed.parts.len()),
        decals: Vec::with_capacity(parsed.decals.len()),
    };

    for object in &parsed.objects {
        board.layers.push(translate_object(object)?);
    }
    let mut multilayer = Layer::logic("multilayer", LayerRole::Multilayer);
    multilayer.pad_color = MULTILAYER_COLOR;
    multilayer.line_color = MULTILAYER_COLOR;
    board.layers.push(multilayer);

    for part in &parsed.parts {
        if let Some(part) = translate_part(&board, part)? {
            board.parts.push(part);
        }
    }

    board.decals = parsed
        .decals
        .iter()
        .map(|decal| Decal {
            name: decal.name.clone(),
            outline: decal.outline.iter().map(|v| v.to_mils()).collect(),
        })
        .collect();

    debug!(
        "translated {} layers, {} nets, {} of {} parts, {} decals",
        board.layers.len(),
        board.nets.len(),
        board.parts.len(),
        parsed.parts.len(),
        board.decals.len()
    );
    Ok(board)
}
