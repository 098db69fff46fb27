// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/board.rs - Format-independent board model.
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
 * # `board` Module
 *
 * The canonical board model. Every importer fills in a [Board] and every
 * exporter reads one; nothing in here knows about any particular file
 * format.
 *
 * All lengths are in mils. Cross references are plain indices: a [Pad]
 * names a shape in its layer's shape table, a [Pin] names a layer and a pad
 * in that layer, and nets are indices into [Board::nets] with [NO_NET] as
 * the "not connected" value.
 */

use std::fmt;

use crate::error::{Error, Result};
use crate::geometry::{Angle, Box2, Edge2, Vector2};

/// Net index meaning "not connected to any net".
pub const NO_NET: u32 = u32::MAX;

/// A 24-bit RGB display color.
pub type Color = u32;

/// What a layer is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerRole {
    Document,
    Multilayer,
    Top,
    Bottom,
    Signal,
    Plane,
    SolderTop,
    SolderBottom,
    SilkTop,
    SilkBottom,
    PasteTop,
    PasteBottom,
    Drill,
    Route,
}

impl fmt::Display for LayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One outline stroke of a polygon shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyLine {
    pub edge: Edge2,
    pub width: f64,
}

/// Geometry carried only by polygon shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyShape {
    /// Explicit bounding box; not derived from the shape size.
    pub bbox: Box2,
    pub lines: Vec<PolyLine>,
    pub vertices: Vec<Vector2>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Round,
    Rect,
    RoundRect { radius: f64 },
    Oblong,
    Poly(PolyShape),
    Octagon { radius: f64 },
}

/// A pad aperture, shared by index between all pads that use it.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub size: Vector2,
    pub name: Option<String>,
}

impl Shape {
    pub fn round(diameter: f64) -> Self {
        Self {
            kind: ShapeKind::Round,
            size: Vector2::new(diameter, diameter),
            name: None,
        }
    }

    pub fn rect(size: Vector2) -> Self {
        Self {
            kind: ShapeKind::Rect,
            size,
            name: None,
        }
    }

    pub fn round_rect(size: Vector2, radius: f64) -> Self {
        Self {
            kind: ShapeKind::RoundRect { radius },
            size,
            name: None,
        }
    }

    pub fn oblong(size: Vector2) -> Self {
        Self {
            kind: ShapeKind::Oblong,
            size,
            name: None,
        }
    }

    pub fn octagon(size: Vector2, radius: f64) -> Self {
        Self {
            kind: ShapeKind::Octagon { radius },
            size,
            name: None,
        }
    }

    /// An empty polygon shape; its size is taken from `bbox`.
    pub fn poly(bbox: Box2, name: impl Into<String>) -> Self {
        Self {
            kind: ShapeKind::Poly(PolyShape {
                bbox,
                lines: Vec::new(),
                vertices: Vec::new(),
            }),
            size: bbox.size(),
            name: Some(name.into()),
        }
    }

    /// Bounding box of the shape in its local frame.
    pub fn bbox(&self) -> Box2 {
        match &self.kind {
            ShapeKind::Poly(poly) => poly.bbox,
            _ => Box2::from_size(self.size),
        }
    }
}

/// The drilled hole of a through-hole pad, relative to the pad center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PadDrill {
    pub offset: Vector2,
    pub size: Vector2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub net: u32,
    /// Index into the owning layer's shape table.
    pub shape: usize,
    /// Position in board coordinates.
    pub pos: Vector2,
    /// Rotation of the pad itself, before any part rotation.
    pub turn: Angle,
    pub drill: Option<PadDrill>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveKind {
    Line {
        edge: Edge2,
        width: f64,
    },
    /// Angles are in degrees; the sweep is not normalized so a full
    /// circle stays 360.
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
        width: f64,
    },
    /// A filled region with holes cut out of it.
    Surface {
        vertices: Vec<Vector2>,
        cutouts: Vec<Vec<Vector2>>,
    },
}

/// A piece of copper artwork that is not a pad.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub net: u32,
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestPoint {
    pub pos: Vector2,
    pub net: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hole {
    pub net: u32,
    pub width: f64,
    pub pos: Vector2,
}

/// A routed slot. Route layers use these to describe the board edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub net: u32,
    pub width: f64,
    pub edge: Edge2,
}

/// Range of copper layer numbers a drill layer passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerSpan {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogicLayer {
    pub shapes: Vec<Shape>,
    pub pads: Vec<Pad>,
    pub primitives: Vec<Primitive>,
    pub test_points: Vec<TestPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrillLayer {
    pub holes: Vec<Hole>,
    pub slots: Vec<Slot>,
    pub span: LayerSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Logic(LogicLayer),
    Drill(DrillLayer),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub role: LayerRole,
    pub pad_color: Color,
    pub line_color: Color,
    pub content: LayerContent,
}

impl Layer {
    pub fn logic(name: impl Into<String>, role: LayerRole) -> Self {
        Self {
            name: name.into(),
            role,
            pad_color: 0,
            line_color: 0,
            content: LayerContent::Logic(LogicLayer::default()),
        }
    }

    pub fn drill(name: impl Into<String>, role: LayerRole) -> Self {
        Self {
            name: name.into(),
            role,
            pad_color: 0,
            line_color: 0,
            content: LayerContent::Drill(DrillLayer::default()),
        }
    }

    pub fn as_logic(&self) -> Option<&LogicLayer> {
        match &self.content {
            LayerContent::Logic(logic) => Some(logic),
            LayerContent::Drill(_) => None,
        }
    }

    pub fn as_logic_mut(&mut self) -> Option<&mut LogicLayer> {
        match &mut self.content {
            LayerContent::Logic(logic) => Some(logic),
            LayerContent::Drill(_) => None,
        }
    }

    pub fn as_drill(&self) -> Option<&DrillLayer> {
        match &self.content {
            LayerContent::Drill(drill) => Some(drill),
            LayerContent::Logic(_) => None,
        }
    }

    pub fn as_drill_mut(&mut self) -> Option<&mut DrillLayer> {
        match &mut self.content {
            LayerContent::Drill(drill) => Some(drill),
            LayerContent::Logic(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Index of a Top or Bottom logic layer.
    pub layer: usize,
    /// Index of a pad within that layer.
    pub pad: usize,
    /// One-based position of this pin within its part.
    pub id: u32,
    /// Datasheet name, like "C6".
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Reference designator.
    pub name: String,
    /// Bounding box covering pads and package.
    pub bbox: Box2,
    pub pos: Vector2,
    pub turn: Angle,
    pub decal: usize,
    pub height: f64,
    pub value: String,
    pub tolerance_pos: String,
    pub tolerance_neg: String,
    /// Usually a part number.
    pub desc: String,
    /// Index of the Top or Bottom layer the part sits on.
    pub layer: usize,
    pub pins: Vec<Pin>,
}

/// A placeholder silhouette for a part footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    pub name: String,
    pub outline: Vec<Vector2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub layers: Vec<Layer>,
    pub nets: Vec<String>,
    pub parts: Vec<Part>,
    pub decals: Vec<Decal>,
}

impl Board {
    /// Index of the first layer with the given role.
    pub fn find_layer(&self, role: LayerRole) -> Option<usize> {
        self.layers.iter().position(|layer| layer.role == role)
    }

    pub fn logic_layer(&self, index: usize) -> Option<&LogicLayer> {
        self.layers.get(index).and_then(Layer::as_logic)
    }

    pub fn drill_layer(&self, index: usize) -> Option<&DrillLayer> {
        self.layers.get(index).and_then(Layer::as_drill)
    }

    fn check_net(&self, net: u32, what: impl fmt::Display) -> Result<()> {
        if net == NO_NET || (net as usize) < self.nets.len() {
            Ok(())
        } else {
            Err(Error::violation(format!(
                "{what} references net {net}, but the board has {} nets",
                self.nets.len()
            )))
        }
    }

    /// Checks every cross reference in the board.
    ///
    /// Importers run this before a board is handed to an exporter, so
    /// exporters may index freely.
    pub fn validate(&self) -> Result<()> {
        for role in [LayerRole::Multilayer, LayerRole::Top, LayerRole::Bottom] {
            let count = self.layers.iter().filter(|l| l.role == role).count();
            if count > 1 {
                return Err(Error::violation(format!(
                    "board has {count} {role} layers"
                )));
            }
        }

        for (li, layer) in self.layers.iter().enumerate() {
            match &layer.content {
                LayerContent::Logic(logic) => {
                    for (i, pad) in logic.pads.iter().enumerate() {
                        self.check_net(pad.net, format_args!("pad {i} of layer {li}"))?;
                        if pad.shape >= logic.shapes.len() {
                            return Err(Error::violation(format!(
                                "pad {i} of layer {li} references shape {}, but the layer has {} shapes",
                                pad.shape,
                                logic.shapes.len()
                            )));
                        }
                    }
                    for (i, prim) in logic.primitives.iter().enumerate() {
                        self.check_net(prim.net, format_args!("primitive {i} of layer {li}"))?;
                    }
                    for (i, tp) in logic.test_points.iter().enumerate() {
                        self.check_net(tp.net, format_args!("test point {i} of layer {li}"))?;
                    }
                }
                LayerContent::Drill(drill) => {
                    for (i, hole) in drill.holes.iter().enumerate() {
                        self.check_net(hole.net, format_args!("hole {i} of layer {li}"))?;
                    }
                    for (i, slot) in drill.slots.iter().enumerate() {
                        self.check_net(slot.net, format_args!("slot {i} of layer {li}"))?;
                    }
                }
            }
        }

        for part in &self.parts {
            let on_side = self
                .layers
                .get(part.layer)
                .is_some_and(|l| matches!(l.role, LayerRole::Top | LayerRole::Bottom));
            if !on_side || self.logic_layer(part.layer).is_none() {
                return Err(Error::violation(format!(
                    "part {} is not on a top or bottom layer",
                    part.name
                )));
            }
            if part.decal >= self.decals.len() {
                return Err(Error::violation(format!(
                    "part {} references decal {}, but the board has {} decals",
                    part.name,
                    part.decal,
                    self.decals.len()
                )));
            }
            for pin in &part.pins {
                let Some(logic) = self.logic_layer(pin.layer) else {
                    return Err(Error::violation(format!(
                        "pin {} of part {} references layer {}, which is not a logic layer",
                        pin.id, part.name, pin.layer
                    )));
                };
                if pin.pad >= logic.pads.len() {
                    return Err(Error::violation(format!(
                        "pin {} of part {} references pad {}, but layer {} has {} pads",
                        pin.id,
                        part.name,
                        pin.pad,
                        pin.layer,
                        logic.pads.len()
                    )));
                }
            }
        }

        for decal in &self.decals {
            if decal.outline.is_empty() {
                return Err(Error::violation(format!(
                    "decal {} has an empty outline",
                    decal.name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        let mut top = Layer::logic("top", LayerRole::Top);
        if let Some(logic) = top.as_logic_mut() {
            logic.shapes.push(Shape::round(10.0));
            logic.pads.push(Pad {
                net: 0,
                shape: 0,
                pos: Vector2::new(100.0, 100.0),
                turn: Angle::ZERO,
                drill: None,
            });
            logic.pads.push(Pad {
                net: NO_NET,
                shape: 0,
                pos: Vector2::new(200.0, 100.0),
                turn: Angle::ZERO,
                drill: None,
            });
        }
        Board {
            layers: vec![Layer::logic("multilayer", LayerRole::Multilayer), top],
            nets: vec!["GND".to_string()],
            parts: vec![Part {
                name: "R1".to_string(),
                bbox: Box2::new(Vector2::new(90.0, 90.0), Vector2::new(210.0, 110.0)),
                pos: Vector2::new(150.0, 100.0),
                turn: Angle::ZERO,
                decal: 0,
                height: 0.0,
                value: String::new(),
                tolerance_pos: String::new(),
                tolerance_neg: String::new(),
                desc: String::new(),
                layer: 1,
                pins: vec![
                    Pin {
                        layer: 1,
                        pad: 0,
                        id: 1,
                        name: "1".to_string(),
                    },
                    Pin {
                        layer: 1,
                        pad: 1,
                        id: 2,
                        name: "2".to_string(),
                    },
                ],
            }],
            decals: vec![Decal {
                name: "0805".to_string(),
                outline: Box2::from_size(Vector2::new(80.0, 50.0)).corners().to_vec(),
            }],
        }
    }

    #[test]
    fn test_valid_board() {
        let board = sample_board();
        board.validate().unwrap();
        assert_eq!(board.find_layer(LayerRole::Top), Some(1));
        assert_eq!(board.find_layer(LayerRole::Bottom), None);
        assert!(board.logic_layer(1).is_some());
        assert!(board.drill_layer(1).is_none());
        assert!(board.logic_layer(7).is_none());
    }

    #[test]
    fn test_net_out_of_range() {
        let mut board = sample_board();
        board.layers[1].as_logic_mut().unwrap().pads[0].net = 1;
        assert!(matches!(
            board.validate(),
            Err(Error::FormatViolation { offset: None, .. })
        ));
    }

    #[test]
    fn test_pin_pad_out_of_range() {
        let mut board = sample_board();
        board.parts[0].pins[1].pad = 2;
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_part_on_multilayer_rejected() {
        let mut board = sample_board();
        board.parts[0].layer = 0;
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_duplicate_top_rejected() {
        let mut board = sample_board();
        board.layers.push(Layer::logic("top2", LayerRole::Top));
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_empty_decal_rejected() {
        let mut board = sample_board();
        board.decals[0].outline.clear();
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_poly_bbox_is_explicit() {
        let bbox = Box2::new(Vector2::new(-1.0, 0.0), Vector2::new(3.0, 2.0));
        let shape = Shape::poly(bbox, "custom");
        assert_eq!(shape.bbox(), bbox);
        assert_eq!(shape.size, Vector2::new(4.0, 2.0));
        let round = Shape::round(8.0);
        assert_eq!(round.bbox().min, Vector2::new(-4.0, -4.0));
    }
}
