// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/eagle.rs - EAGLE XML board importer.
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
 * # `eagle` Module
 *
 * Imports boards saved by EAGLE 6 and later, which use an XML format.
 * Older binary `.brd` files are rejected.
 *
 * Like the TVW importer this works in two steps: [EagleBoard::from_bytes]
 * collects the parts of the document the converter cares about, and
 * [EagleBoard::to_board] lays them out as a canonical [Board]. EAGLE
 * stores millimetres; everything is converted to mils on the way in.
 */

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::board::{
    Board, Decal, Hole, Layer, LayerRole, LayerSpan, LogicLayer, NO_NET, Pad, PadDrill, Part, Pin,
    Primitive, PrimitiveKind, Shape, Slot,
};
use crate::error::{Error, Result};
use crate::geometry::{Angle, Box2, Edge2, Matrix23, Vector2};

const MM_TO_MILS: f64 = 39.3701;

/// Longest chord used when flattening a curved wire.
const ARC_CHORD_LIMIT: f64 = 8.0;
/// Arcs are never split into more chords than this.
const MAX_ARC_SECTORS: usize = 4096;

const LAYER_MULTI: i32 = 0;
const LAYER_TOP: i32 = 1;
const LAYER_BOTTOM: i32 = 16;
const LAYER_DIMENSION: i32 = 20;
const LAYER_DRILLS: i32 = 44;

const MULTILAYER_COLOR: u32 = 0xc0c0c0;

/// EAGLE's default palette, indexed by the `color` attribute of a layer.
const PALETTE: [u32; 64] = [
    0x000000, 0x23238d, 0x238d23, 0x238d8d, 0x8d2323, 0x8d238d, 0x8d8d23, 0x8d8d8d, //
    0x1c1c1c, 0x0000b4, 0x00b400, 0x00b4b4, 0xb40000, 0xb400b4, 0xb4b400, 0xb4b4b4, //
    0xa05000, 0xa07800, 0x285000, 0x505028, 0x507850, 0x285050, 0x007850, 0x005078, //
    0xc87800, 0xc8a028, 0x507800, 0x787850, 0x78a078, 0x507878, 0x28a078, 0x0078a0, //
    0x785078, 0xa07878, 0xa05050, 0x500028, 0x502850, 0x785050, 0x285078, 0x287878, //
    0xa078a0, 0xc8a0a0, 0xc87878, 0x780028, 0x785078, 0xa07878, 0x5078a0, 0x50a0a0, //
    0xc58949, 0x89a429, 0x272727, 0x8d8d8d, 0x636363, 0x767676, 0x767676, 0x767676, //
    0x474747, 0x8d8d8d, 0xb2b2b2, 0xa81d1d, 0x2da62b, 0xb4b400, 0x2360a2, 0x751eae, //
];

fn mils(mm: f64) -> f64 {
    mm * MM_TO_MILS
}

fn palette_color(index: i32) -> u32 {
    usize::try_from(index)
        .ok()
        .and_then(|i| PALETTE.get(i))
        .copied()
        .unwrap_or(PALETTE[PALETTE.len() - 1])
}

/// A parsed XML element. Text content is dropped; EAGLE keeps everything
/// the converter needs in attributes.
#[derive(Debug, Default)]
struct Node {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Node {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn parse_document(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Node> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(Node::from_start(&start)?),
                Event::Empty(start) => {
                    let node = Node::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::violation("closing tag without an open element"))?;
                    Self::attach(&mut stack, &mut root, node)?;
                }
                Event::Eof => break,
                _ => (),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::violation(format!(
                "document ends inside <{}>",
                open.name
            )));
        }
        root.ok_or_else(|| Error::violation("document has no root element"))
    }

    fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        } else if root.is_none() {
            *root = Some(node);
        } else {
            return Err(Error::violation("document has more than one root element"));
        }
        Ok(())
    }

    fn child(&self, name: &str) -> Result<&Node> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::violation(format!("<{}> has no <{name}> element", self.name)))
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Children of the optional container `section`, named `name`.
    fn items<'a>(&'a self, section: &'a str, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children(section).flat_map(move |s| s.children(name))
    }

    fn opt_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn attr(&self, key: &str) -> Result<&str> {
        self.opt_attr(key).ok_or_else(|| {
            Error::violation(format!("<{}> is missing attribute \"{key}\"", self.name))
        })
    }

    fn parse_attr<T: FromStr>(&self, key: &str) -> Result<T> {
        let value = self.attr(key)?;
        value.parse().map_err(|_| {
            Error::violation(format!(
                "<{}> attribute \"{key}\" has bad value {value:?}",
                self.name
            ))
        })
    }

    fn parse_attr_or<T: FromStr>(&self, key: &str, default: T) -> Result<T> {
        match self.opt_attr(key) {
            Some(_) => self.parse_attr(key),
            None => Ok(default),
        }
    }

    fn position(&self, x: &str, y: &str) -> Result<Vector2> {
        Ok(Vector2::new(
            mils(self.parse_attr(x)?),
            mils(self.parse_attr(y)?),
        ))
    }
}

/// A decoded `rot` attribute, written as `[S][M]R<degrees>`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Rotation {
    degrees: f64,
    mirror: bool,
    spin: bool,
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut rot = Rotation::default();
        for (i, c) in s.char_indices() {
            match c {
                'S' => rot.spin = true,
                'M' => rot.mirror = true,
                'R' => {
                    rot.degrees = s[i + 1..]
                        .parse()
                        .map_err(|_| Error::violation(format!("bad rotation {s:?}")))?;
                    break;
                }
                _ => (),
            }
        }
        Ok(rot)
    }
}

impl Rotation {
    fn read(node: &Node) -> Result<Self> {
        node.opt_attr("rot")
            .map_or(Ok(Self::default()), Rotation::from_str)
    }
}

/// Splits a curved wire into straight chords no longer than
/// [ARC_CHORD_LIMIT]. `curve` is the swept angle in degrees, positive
/// counter-clockwise.
fn tessellate(edge: Edge2, curve: f64) -> Vec<Edge2> {
    let dist = edge.length();
    if curve == 0.0 || dist <= ARC_CHORD_LIMIT {
        return vec![edge];
    }
    let sign = curve.signum();
    let sweep = Angle::from_degrees(curve).radians().abs();
    let chord = edge.b - edge.a;
    let h = dist / (2.0 * (sweep / 2.0).tan());
    let normal = Matrix23::rotation(Angle::from_degrees(sign * 90.0)) * chord.normalize();
    let center = edge.a + chord / 2.0 + normal * h;
    let spoke = edge.a - center;
    let max_sector = 2.0 * (ARC_CHORD_LIMIT / (2.0 * spoke.length())).asin();
    let sectors = ((sweep / max_sector).ceil() as usize).min(MAX_ARC_SECTORS);
    if sectors < 2 {
        return vec![edge];
    }

    let step = sweep / sectors as f64;
    let mut edges = Vec::with_capacity(sectors);
    let mut prev = edge.a;
    for i in 1..sectors {
        let turn = Matrix23::rotation(Angle::from_radians(sign * i as f64 * step));
        let v = center + turn * spoke;
        edges.push(Edge2::new(prev, v));
        prev = v;
    }
    edges.push(Edge2::new(prev, edge.b));
    edges
}

#[derive(Debug, Clone)]
struct LayerInfo {
    name: String,
    color: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PadKind {
    /// Plated through-hole pad with its `shape` attribute.
    Through { drill: f64, shape: ThroughShape },
    Smd { layer: i32, roundness: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThroughShape {
    Round,
    Square,
    Octagon,
    Long,
}

impl ThroughShape {
    fn from_attr(shape: Option<&str>) -> Self {
        match shape {
            Some("square") => Self::Square,
            Some("octagon") => Self::Octagon,
            Some("long") | Some("offset") => Self::Long,
            _ => Self::Round,
        }
    }
}

#[derive(Debug, Clone)]
struct PadInfo {
    name: String,
    /// Position within the package.
    pos: Vector2,
    size: Vector2,
    rot: f64,
    kind: PadKind,
}

impl PadInfo {
    fn read_through(node: &Node) -> Result<Self> {
        let drill = mils(node.parse_attr("drill")?);
        let diameter = match node.opt_attr("diameter") {
            Some(_) => mils(node.parse_attr("diameter")?),
            None => drill,
        };
        Ok(Self {
            name: node.attr("name")?.to_string(),
            pos: node.position("x", "y")?,
            size: Vector2::new(diameter, diameter),
            rot: Rotation::read(node)?.degrees,
            kind: PadKind::Through {
                drill,
                shape: ThroughShape::from_attr(node.opt_attr("shape")),
            },
        })
    }

    fn read_smd(node: &Node) -> Result<Self> {
        Ok(Self {
            name: node.attr("name")?.to_string(),
            pos: node.position("x", "y")?,
            size: node.position("dx", "dy")?,
            rot: Rotation::read(node)?.degrees,
            kind: PadKind::Smd {
                layer: node.parse_attr("layer")?,
                roundness: node.parse_attr_or("roundness", 0.0)?,
            },
        })
    }

    fn shape(&self) -> Shape {
        let size = self.size;
        match self.kind {
            PadKind::Through { shape, .. } => match shape {
                ThroughShape::Round => Shape::round(size.x),
                ThroughShape::Square => Shape::rect(size),
                ThroughShape::Octagon => Shape::octagon(size, size.x / 2.0),
                ThroughShape::Long => Shape::oblong(Vector2::new(2.0 * size.x, size.y)),
            },
            PadKind::Smd { roundness, .. } if roundness > 0.0 => {
                let radius = size.x.min(size.y) / 2.0 * roundness / 100.0;
                Shape::round_rect(size, radius)
            }
            PadKind::Smd { .. } => Shape::rect(size),
        }
    }

    fn layer(&self) -> i32 {
        match self.kind {
            PadKind::Through { .. } => LAYER_MULTI,
            PadKind::Smd { layer, .. } => layer,
        }
    }
}

/// Orders pad names the way a person counts them: shorter names first, so
/// "2" comes before "10".
type PadKey = (usize, String);

fn pad_key(name: &str) -> PadKey {
    (name.len(), name.to_string())
}

#[derive(Debug, Clone, Default)]
struct PackageInfo {
    pads: BTreeMap<PadKey, PadInfo>,
}

impl PackageInfo {
    fn read(node: &Node) -> Result<Self> {
        let mut pads = BTreeMap::new();
        for pad in node.children("pad") {
            let pad = PadInfo::read_through(pad)?;
            pads.insert(pad_key(&pad.name), pad);
        }
        for pad in node.children("smd") {
            let pad = PadInfo::read_smd(pad)?;
            pads.insert(pad_key(&pad.name), pad);
        }
        Ok(Self { pads })
    }

    /// Bounding box of the pads in package coordinates.
    fn bbox(&self) -> Box2 {
        let mut bbox = Box2::EMPTY;
        for pad in self.pads.values() {
            bbox.merge_box(&(Box2::from_size(pad.size) + pad.pos));
        }
        if bbox.is_empty() {
            Box2::new(Vector2::ORIGIN, Vector2::ORIGIN)
        } else {
            bbox
        }
    }
}

#[derive(Debug, Clone)]
struct ElementInfo {
    name: String,
    library: String,
    package: String,
    value: String,
    pos: Vector2,
    rot: Rotation,
}

impl ElementInfo {
    fn read(node: &Node) -> Result<Self> {
        Ok(Self {
            name: node.attr("name")?.to_string(),
            library: node.attr("library")?.to_string(),
            package: node.attr("package")?.to_string(),
            value: node.opt_attr("value").unwrap_or_default().to_string(),
            pos: node.position("x", "y")?,
            rot: Rotation::read(node)?,
        })
    }

    /// Maps package coordinates to board coordinates.
    fn transform(&self) -> Matrix23 {
        let angle = Angle::from_degrees(self.rot.degrees);
        let local = if self.rot.mirror {
            Matrix23::rotation(-angle) * Matrix23::scaling(Vector2::new(-1.0, 1.0))
        } else {
            Matrix23::rotation(angle)
        };
        Matrix23::translation(self.pos) * local
    }
}

#[derive(Debug, Clone, Copy)]
struct WireInfo {
    edge: Edge2,
    width: f64,
    layer: i32,
    curve: f64,
}

impl WireInfo {
    fn read(node: &Node) -> Result<Self> {
        Ok(Self {
            edge: Edge2::new(node.position("x1", "y1")?, node.position("x2", "y2")?),
            width: mils(node.parse_attr("width")?),
            layer: node.parse_attr("layer")?,
            curve: node.parse_attr_or("curve", 0.0)?,
        })
    }

    fn edges(&self) -> Vec<Edge2> {
        tessellate(self.edge, self.curve)
    }
}

/// A via or an unplated mounting hole.
#[derive(Debug, Clone, Copy)]
struct DrillInfo {
    pos: Vector2,
    drill: f64,
}

impl DrillInfo {
    fn read(node: &Node) -> Result<Self> {
        Ok(Self {
            pos: node.position("x", "y")?,
            drill: mils(node.parse_attr("drill")?),
        })
    }
}

#[derive(Debug, Clone)]
struct SignalInfo {
    name: String,
    /// (element, pad) pairs.
    contacts: Vec<(String, String)>,
    wires: Vec<WireInfo>,
    vias: Vec<DrillInfo>,
}

impl SignalInfo {
    fn read(node: &Node) -> Result<Self> {
        let contacts = node
            .children("contactref")
            .map(|c| Ok((c.attr("element")?.to_string(), c.attr("pad")?.to_string())))
            .collect::<Result<_>>()?;
        let wires = node
            .children("wire")
            .map(WireInfo::read)
            .collect::<Result<_>>()?;
        let vias = node
            .children("via")
            .map(DrillInfo::read)
            .collect::<Result<_>>()?;
        Ok(Self {
            name: node.attr("name")?.to_string(),
            contacts,
            wires,
            vias,
        })
    }
}

/// The parts of an EAGLE board document that carry over to a [Board].
#[derive(Debug, Clone, Default)]
pub struct EagleBoard {
    version: String,
    layers: BTreeMap<i32, LayerInfo>,
    outline: Vec<WireInfo>,
    holes: Vec<DrillInfo>,
    /// Library name, then package name.
    libraries: BTreeMap<String, BTreeMap<String, PackageInfo>>,
    elements: Vec<ElementInfo>,
    signals: Vec<SignalInfo>,
}

impl EagleBoard {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"<?xml") {
            return Err(Error::violation(
                "not an XML document; binary EAGLE boards must be re-saved with EAGLE 6 or later",
            ));
        }
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::violation(format!("document is not valid UTF-8: {e}")))?;
        let root = Node::parse_document(text)?;
        if root.name != "eagle" {
            return Err(Error::violation(format!(
                "root element is <{}>, expected <eagle>",
                root.name
            )));
        }

        let mut eagle = EagleBoard {
            version: root.opt_attr("version").unwrap_or_default().to_string(),
            ..Default::default()
        };
        let drawing = root.child("drawing")?;

        for layer in drawing.child("layers")?.children("layer") {
            let number: i32 = layer.parse_attr("number")?;
            let info = LayerInfo {
                name: layer.attr("name")?.to_string(),
                color: layer.parse_attr_or("color", 0)?,
            };
            if eagle.layers.insert(number, info).is_some() {
                return Err(Error::violation(format!("layer {number} is defined twice")));
            }
        }

        let board = drawing.child("board")?;
        for wire in board.items("plain", "wire") {
            let wire = WireInfo::read(wire)?;
            if wire.layer == LAYER_DIMENSION {
                eagle.outline.push(wire);
            }
        }
        for hole in board.items("plain", "hole") {
            eagle.holes.push(DrillInfo::read(hole)?);
        }

        for library in board.items("libraries", "library") {
            let packages = eagle
                .libraries
                .entry(library.attr("name")?.to_string())
                .or_default();
            for package in library.items("packages", "package") {
                packages.insert(package.attr("name")?.to_string(), PackageInfo::read(package)?);
            }
        }

        for element in board.items("elements", "element") {
            eagle.elements.push(ElementInfo::read(element)?);
        }
        for signal in board.items("signals", "signal") {
            eagle.signals.push(SignalInfo::read(signal)?);
        }

        debug!(
            "EAGLE {}: {} layers, {} elements, {} signals",
            eagle.version,
            eagle.layers.len(),
            eagle.elements.len(),
            eagle.signals.len()
        );
        Ok(eagle)
    }

    fn has_drills(&self) -> bool {
        !self.holes.is_empty() || self.signals.iter().any(|s| !s.vias.is_empty())
    }

    pub fn to_board(&self) -> Result<Board> {
        let mut board = Board {
            nets: self.signals.iter().map(|s| s.name.clone()).collect(),
            ..Default::default()
        };

        let mut multilayer = Layer::logic("Multilayer", LayerRole::Multilayer);
        multilayer.pad_color = MULTILAYER_COLOR;
        multilayer.line_color = MULTILAYER_COLOR;
        board.layers.push(multilayer);

        // EAGLE layer number to canonical layer index.
        let mut copper = BTreeMap::new();
        for (&number, info) in self.layers.range(LAYER_TOP..=LAYER_BOTTOM) {
            let role = match number {
                LAYER_TOP => LayerRole::Top,
                LAYER_BOTTOM => LayerRole::Bottom,
                _ => LayerRole::Signal,
            };
            let mut layer = Layer::logic(info.name.as_str(), role);
            layer.pad_color = palette_color(info.color);
            layer.line_color = layer.pad_color;
            copper.insert(number, board.layers.len());
            board.layers.push(layer);
        }

        if let Some(info) = self.layers.get(&LAYER_DIMENSION) {
            let mut layer = Layer::drill(info.name.as_str(), LayerRole::Route);
            layer.pad_color = palette_color(info.color);
            layer.line_color = layer.pad_color;
            if let Some(route) = layer.as_drill_mut() {
                for wire in &self.outline {
                    route.slots.extend(wire.edges().into_iter().map(|edge| Slot {
                        net: NO_NET,
                        width: wire.width,
                        edge,
                    }));
                }
            }
            board.layers.push(layer);
        }

        if self.has_drills() {
            let info = self.layers.get(&LAYER_DRILLS);
            let name = info.map_or("Drills", |i| i.name.as_str());
            let mut layer = Layer::drill(name, LayerRole::Drill);
            if let Some(info) = info {
                layer.pad_color = palette_color(info.color);
                layer.line_color = layer.pad_color;
            }
            if let Some(drill) = layer.as_drill_mut() {
                drill.span = LayerSpan {
                    from: LAYER_TOP as u32,
                    to: LAYER_BOTTOM as u32,
                };
                for hole in &self.holes {
                    drill.holes.push(Hole {
                        net: NO_NET,
                        width: hole.drill,
                        pos: hole.pos,
                    });
                }
                for (net, signal) in self.signals.iter().enumerate() {
                    for via in &signal.vias {
                        drill.holes.push(Hole {
                            net: net as u32,
                            width: via.drill,
                            pos: via.pos,
                        });
                    }
                }
            }
            board.layers.push(layer);
        }

        let mut decals = HashMap::new();
        for (library, packages) in &self.libraries {
            for (name, package) in packages {
                let bbox = package.bbox();
                decals.insert((library.as_str(), name.as_str()), board.decals.len());
                board.decals.push(Decal {
                    name: name.clone(),
                    outline: bbox.corners().to_vec(),
                });
            }
        }

        let mut contacts = HashMap::new();
        for (net, signal) in self.signals.iter().enumerate() {
            for (element, pad) in &signal.contacts {
                contacts.insert((element.as_str(), pad.as_str()), net as u32);
            }
        }

        let sides = Sides {
            multi: 0,
            top: copper.get(&LAYER_TOP).copied(),
            bottom: copper.get(&LAYER_BOTTOM).copied(),
        };
        for element in &self.elements {
            let key = (element.library.as_str(), element.package.as_str());
            let (Some(package), Some(&decal)) = (
                self.libraries
                    .get(&element.library)
                    .and_then(|p| p.get(&element.package)),
                decals.get(&key),
            ) else {
                return Err(Error::violation(format!(
                    "element {} uses unknown package {}/{}",
                    element.name, element.library, element.package
                )));
            };
            let part = translate_element(&mut board, &sides, element, package, decal, &contacts)?;
            board.parts.push(part);
        }

        for (net, signal) in self.signals.iter().enumerate() {
            for wire in &signal.wires {
                let Some(&index) = copper.get(&wire.layer) else {
                    continue;
                };
                let layer = logic_mut(&mut board, index)?;
                layer
                    .primitives
                    .extend(wire.edges().into_iter().map(|edge| Primitive {
                        net: net as u32,
                        kind: PrimitiveKind::Line {
                            edge,
                            width: wire.width,
                        },
                    }));
            }
        }

        debug!(
            "translated {} layers, {} nets, {} parts, {} decals",
            board.layers.len(),
            board.nets.len(),
            board.parts.len(),
            board.decals.len()
        );
        Ok(board)
    }
}

/// Canonical indices of the layers parts and pads can sit on.
struct Sides {
    multi: usize,
    top: Option<usize>,
    bottom: Option<usize>,
}

impl Sides {
    /// Where something EAGLE puts on `layer` ends up, after mirroring.
    fn resolve(&self, layer: i32, mirror: bool) -> Result<usize> {
        let (index, what) = match (layer, mirror) {
            (LAYER_MULTI, _) => return Ok(self.multi),
            (LAYER_TOP, false) | (LAYER_BOTTOM, true) => (self.top, "top"),
            (LAYER_TOP, true) | (LAYER_BOTTOM, false) => (self.bottom, "bottom"),
            _ => {
                return Err(Error::violation(format!(
                    "pads on layer {layer} are not supported"
                )));
            }
        };
        index.ok_or_else(|| Error::violation(format!("board has no {what} copper layer")))
    }
}

fn logic_mut(board: &mut Board, index: usize) -> Result<&mut LogicLayer> {
    board
        .layers
        .get_mut(index)
        .and_then(Layer::as_logic_mut)
        .ok_or_else(|| Error::violation(format!("layer {index} is not a logic layer")))
}

/// Index of `shape` in the layer's table, adding it if no equal shape is
/// there yet.
fn intern_shape(layer: &mut LogicLayer, shape: Shape) -> usize {
    match layer.shapes.iter().position(|s| *s == shape) {
        Some(index) => index,
        None => {
            layer.shapes.push(shape);
            layer.shapes.len() - 1
        }
    }
}

fn translate_element(
    board: &mut Board,
    sides: &Sides,
    element: &ElementInfo,
    package: &PackageInfo,
    decal: usize,
    contacts: &HashMap<(&str, &str), u32>,
) -> Result<Part> {
    let mirror = element.rot.mirror;
    let transform = element.transform();

    let mut bbox = Box2::EMPTY;
    for corner in package.bbox().corners() {
        bbox.merge(transform * corner);
    }

    let mut pins = Vec::with_capacity(package.pads.len());
    for (id, pad) in (1..).zip(package.pads.values()) {
        let index = sides.resolve(pad.layer(), mirror)?;
        let net = contacts
            .get(&(element.name.as_str(), pad.name.as_str()))
            .copied()
            .unwrap_or(NO_NET);
        let drill = match pad.kind {
            PadKind::Through { drill, .. } => Some(PadDrill {
                offset: Vector2::ORIGIN,
                size: Vector2::new(drill, drill),
            }),
            PadKind::Smd { .. } => None,
        };

        let layer = logic_mut(board, index)?;
        let shape = intern_shape(layer, pad.shape());
        layer.pads.push(Pad {
            net,
            shape,
            pos: transform * pad.pos,
            turn: Angle::from_degrees(pad.rot),
            drill,
        });
        pins.push(Pin {
            layer: index,
            pad: layer.pads.len() - 1,
            id,
            name: pad.name.clone(),
        });
    }

    Ok(Part {
        name: element.name.clone(),
        bbox,
        pos: element.pos,
        turn: Angle::from_degrees(element.rot.degrees),
        decal,
        height: 0.0,
        value: element.value.clone(),
        tolerance_pos: String::new(),
        tolerance_neg: String::new(),
        desc: element.package.clone(),
        layer: sides.resolve(LAYER_TOP, mirror)?,
        pins,
    })
}

/// Reads an EAGLE XML board.
pub fn import(data: &[u8]) -> Result<Board> {
    EagleBoard::from_bytes(data)?.to_board()
}
