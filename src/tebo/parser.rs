// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/tebo/parser.rs - Record decoder for Tebo-ICT TVW files.
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
 * # `parser` Module
 *
 * This module decodes a Tebo-ICT view (`*.TVW`) file into a structure that
 * mirrors the file's own record hierarchy. The file is read strictly front to
 * back; every embedded constant is checked and the first mismatch aborts the
 * whole decode.
 *
 * ## Usage Example
 *
 * ```no_run
 * use brdconv::tebo::parser::ParsedTeboFile;
 *
 * fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let data = std::fs::read("example.tvw")?;
 *     let parsed = ParsedTeboFile::from_bytes(&data)?;
 *
 *     println!("Customer: {}", parsed.header.customer);
 *     for object in &parsed.objects {
 *         println!("Layer: {}", object.header().name);
 *     }
 *
 *     Ok(())
 * }
 * ```
 */

use tracing::{debug, warn};

use crate::crypto;
use crate::error::{Error, Result};
use crate::fixed::{Box2S, Fixed32, Vector2S};
use crate::reader::BinaryReader;
use crate::tebo::fixture::{FixtureRegistry, MysteryBlock, ProbeRegistry};

/// Shape table counts are stored as the highest DCode, which starts at 10.
pub const DCODE_BASE: u32 = 10;

/// Layer role code stored in every object prologue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    Document = 0,
    Top = 1,
    Bottom = 2,
    Signal = 3,
    /// Power/ground plane.
    Plane = 4,
    SolderTop = 5,
    SolderBottom = 6,
    SilkTop = 7,
    SilkBottom = 8,
    PasteTop = 9,
    PasteBottom = 10,
    Drill = 11,
    Route = 12,
}

impl LayerType {
    fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Document,
            1 => Self::Top,
            2 => Self::Bottom,
            3 => Self::Signal,
            4 => Self::Plane,
            5 => Self::SolderTop,
            6 => Self::SolderBottom,
            7 => Self::SilkTop,
            8 => Self::SilkBottom,
            9 => Self::PasteTop,
            10 => Self::PasteBottom,
            11 => Self::Drill,
            12 => Self::Route,
            _ => return None,
        })
    }
}

/// One stroke of a polygon aperture.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyLine {
    pub start: Vector2S,
    pub end: Vector2S,
    pub width: Fixed32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Round,
    Rect,
    RoundRect {
        corner_radius: Fixed32,
    },
    Poly {
        bbox: Box2S,
        lines: Vec<PolyLine>,
        flags: [u32; 3],
        vertices: Vec<Vector2S>,
    },
}

/// An aperture in a logic layer's shape table.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub size: Vector2S,
    /// Only polygon shapes carry a name.
    pub name: String,
    /// Rotation in degrees.
    pub turn: f32,
}

impl Shape {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        r.expect_u32(1, "shape prefix")?;
        let size = r.read_vec2()?;
        let offset = r.position();
        let shape_type = r.read_u32()?;
        let shape = match shape_type {
            0 => {
                let _skip = r.read_vec2()?;
                Self {
                    kind: ShapeKind::Round,
                    size,
                    name: String::new(),
                    turn: 0.0,
                }
            }
            1 => {
                let turn = r.read_f32()?;
                let _skip = r.read_i32()?;
                Self {
                    kind: ShapeKind::Rect,
                    size,
                    name: String::new(),
                    turn,
                }
            }
            3 => {
                let turn = r.read_f32()?;
                let corner_radius = r.read_fixed()?;
                Self {
                    kind: ShapeKind::RoundRect { corner_radius },
                    size,
                    name: String::new(),
                    turn,
                }
            }
            5 => Self::read_poly(r, size)?,
            t => {
                return Err(Error::violation_at(
                    offset,
                    format!("unrecognized shape type {t}"),
                ));
            }
        };
        Ok(shape)
    }

    fn read_poly(r: &mut BinaryReader, size: Vector2S) -> Result<Self> {
        let _skip = r.read_u32()?;
        let name = r.read_string()?;
        let bbox = r.read_box2()?;
        let mut lines = Vec::new();
        let mut flags = [0; 3];
        let mut vertices = Vec::new();

        let count = r.read_u32()?;
        for _ in 0..count {
            let offset = r.position();
            match r.read_u32()? {
                2 => {
                    if !vertices.is_empty() {
                        return Err(Error::violation_at(
                            offset,
                            "polygon shape has more than one vertex list",
                        ));
                    }
                    flags = r.read_u32_array()?;
                    let n = r.read_u32()?;
                    vertices = r.read_list(n, BinaryReader::read_vec2)?;
                }
                5 => {
                    r.expect_u32(1, "polygon line parameter")?;
                    r.expect_u32(0, "polygon line parameter")?;
                    r.expect_u32(0, "polygon line parameter")?;
                    lines.push(PolyLine {
                        start: r.read_vec2()?,
                        end: r.read_vec2()?,
                        width: r.read_fixed()?,
                    });
                }
                t => {
                    return Err(Error::violation_at(
                        offset,
                        format!("unrecognized polygon sub-object type {t}"),
                    ));
                }
            }
        }

        Ok(Self {
            kind: ShapeKind::Poly {
                bbox,
                lines,
                flags,
                vertices,
            },
            size,
            name,
            turn: 0.0,
        })
    }
}

/// Drill data of a through-hole pad.
#[derive(Debug, Clone, PartialEq)]
pub struct PadHole {
    pub data: [u8; 7],
    pub size: Vector2S,
    pub param: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    /// Net index, or -1 for none.
    pub net: i32,
    pub dcode: u32,
    pub pos: Vector2S,
    pub exposed: bool,
    pub copper: bool,
    /// 0 = SMD pin, 1 = accessible, 2 = mask.
    pub test_point_param: u8,
    pub something: bool,
    pub test_point_data: Option<[u8; 12]>,
    /// Unrotated box of the exposed copper.
    pub exposed_box: Option<Box2S>,
    pub tail_param: u8,
    pub hole: Option<PadHole>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub net: i32,
    pub dcode: u32,
    pub start: Vector2S,
    pub end: Vector2S,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub net: i32,
    pub dcode: u32,
    pub pos: Vector2S,
    pub radius: Fixed32,
    pub start_angle: f32,
    pub sweep_angle: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cutout {
    pub tag: u32,
    pub vertices: Vec<Vector2S>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub net: i32,
    pub vertices: Vec<Vector2S>,
    pub line_width: Fixed32,
    pub cutouts: Vec<Cutout>,
    pub void_flags: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestPoint {
    pub flag1: bool,
    pub p1: i32,
    pub handle: i32,
    pub p2: i32,
    pub p3: i32,
    pub pos: Vector2S,
    pub p4: i32,
    pub flag2: bool,
    pub p5: i32,
    pub p6: i32,
    pub n: i32,
}

impl TestPoint {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            flag1: r.read_bool()?,
            p1: r.read_i32()?,
            handle: r.read_i32()?,
            p2: r.read_i32()?,
            p3: r.read_i32()?,
            pos: r.read_vec2()?,
            p4: r.read_i32()?,
            flag2: r.read_bool()?,
            p5: r.read_i32()?,
            p6: r.read_i32()?,
            n: r.read_i32()?,
        })
    }
}

/// Entry of the first-choice and assistant test point tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TestPoint2 {
    pub p1: u32,
    pub handle: u32,
    pub p2: u32,
    pub pos: Vector2S,
    pub pos1: Vector2S,
    pub pos2: Vector2S,
    pub flags: [bool; 6],
    pub nail: u32,
    pub param: i32,
    pub n: i32,
}

impl TestPoint2 {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let p1 = r.read_u32()?;
        let handle = r.read_u32()?;
        let p2 = r.read_u32()?;
        let pos = r.read_vec2()?;
        let pos1 = r.read_vec2()?;
        let pos2 = r.read_vec2()?;
        let [f1, f2, f3] = r.read_bool_array()?;
        let nail = r.read_u32()?;
        let param = r.read_i32()?;
        let [f4, f5, f6] = r.read_bool_array()?;
        let n = r.read_i32()?;
        Ok(Self {
            p1,
            handle,
            p2,
            pos,
            pos1,
            pos2,
            flags: [f1, f2, f3, f4, f5, f6],
            nail,
            param,
            n,
        })
    }
}

/// A link in the test sequence graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TestNode {
    pub current: u32,
    pub next: u32,
    pub flag: bool,
}

impl TestNode {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            current: r.read_u32()?,
            next: r.read_u32()?,
            flag: r.read_bool()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownItem {
    pub name: String,
    pub pos: Vector2S,
    pub params: [i32; 6],
    pub flags: [bool; 3],
    pub param4: i32,
}

impl UnknownItem {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            name: r.read_string()?,
            pos: r.read_vec2()?,
            params: r.read_i32_array()?,
            flags: r.read_bool_array()?,
            param4: r.read_i32()?,
        })
    }
}

/// Fields shared by every layer object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHeader {
    pub name: String,
    pub initial_name: String,
    pub initial_path: String,
    pub layer_type: LayerType,
    pub pad_color: u32,
    pub line_color: u32,
}

impl ObjectHeader {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let start = r.position();
        let magic = r.read_u32_array::<2>()?;
        if magic != [2, 1] {
            return Err(Error::violation_at(
                start,
                format!("bad object magic {magic:?}, expected [2, 1]"),
            ));
        }
        let name = r.read_string()?;
        let initial_name = r.read_string()?;
        let initial_path = r.read_string()?;
        let offset = r.position();
        let code = r.read_u32()?;
        let layer_type = LayerType::from_u32(code).ok_or_else(|| {
            Error::violation_at(offset, format!("unrecognized layer type {code}"))
        })?;
        let pad_color = r.read_u32()?;
        let line_color = r.read_u32()?;
        debug!("loading object {name:?} type {layer_type:?} at {start:#010x}");
        Ok(Self {
            name,
            initial_name,
            initial_path,
            layer_type,
            pad_color,
            line_color,
        })
    }
}

/// A copper-bearing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicObject {
    pub header: ObjectHeader,
    pub shapes: Vec<Shape>,
    /// Set when the layer uses the alternate field order.
    pub extra_data: bool,
    pub pads: Vec<Pad>,
    pub lines: Vec<Line>,
    pub arcs: Vec<Arc>,
    pub surfaces: Vec<Surface>,
    pub unknown_items_param: u32,
    pub unknown_items: Vec<UnknownItem>,
    pub test_points: Vec<TestPoint>,
    /// First-choice test points.
    pub test_points2_param: u32,
    pub test_points2: Vec<TestPoint2>,
    /// Assistant test points.
    pub test_points3_param: u32,
    pub test_points3: Vec<TestPoint2>,
    pub test_sequence_param: u32,
    pub test_sequence: Vec<TestNode>,
}

impl LogicObject {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let header = ObjectHeader::read(r)?;
        let mut obj = Self {
            header,
            shapes: Vec::new(),
            extra_data: false,
            pads: Vec::new(),
            lines: Vec::new(),
            arcs: Vec::new(),
            surfaces: Vec::new(),
            unknown_items_param: 0,
            unknown_items: Vec::new(),
            test_points: Vec::new(),
            test_points2_param: 0,
            test_points2: Vec::new(),
            test_points3_param: 0,
            test_points3: Vec::new(),
            test_sequence_param: 0,
            test_sequence: Vec::new(),
        };

        obj.read_shapes(r)?;
        if !obj.shapes.is_empty() {
            let offset = r.position();
            obj.extra_data = match r.read_u32()? {
                // shapes, pads, lines, arcs, surfaces
                1 => false,
                // shapes, pads, lines, arcs, surfaces, 4 words, lines, arcs
                2 => true,
                order => {
                    return Err(Error::violation_at(
                        offset,
                        format!("unrecognized data order {order}"),
                    ));
                }
            };
            r.expect_u32(0, "data order flags")?;
            r.expect_u32(1, "data order flags")?;

            obj.read_pads(r)?;
            obj.read_lines(r)?;
            obj.read_arcs(r)?;
            obj.read_surfaces(r)?;
            if obj.extra_data {
                let offset = r.position();
                let filler = r.read_u32_array::<4>()?;
                warn!(
                    "layer {:?} uses the alternate data order at {offset:#010x} (filler {filler:?})",
                    obj.header.name
                );
                obj.read_lines(r)?;
                obj.read_arcs(r)?;
                r.expect_u32(0, "alternate data order trailer")?;
            }
        }
        obj.read_unknown_items(r)?;
        obj.read_test_points(r)?;
        Ok(obj)
    }

    fn read_shapes(&mut self, r: &mut BinaryReader) -> Result<()> {
        let offset = r.position();
        let max_dcode = r.read_u32()?;
        if max_dcode == 0 {
            return Ok(());
        }
        let Some(count) = max_dcode.checked_sub(DCODE_BASE) else {
            return Err(Error::violation_at(
                offset,
                format!("shape table count {max_dcode} is below {DCODE_BASE}"),
            ));
        };
        self.shapes = r.read_list(count, Shape::read)?;
        Ok(())
    }

    fn check_dcode(&self, dcode: u32, offset: u64) -> Result<()> {
        match dcode.checked_sub(DCODE_BASE) {
            Some(i) if (i as usize) < self.shapes.len() => Ok(()),
            _ => Err(Error::violation_at(
                offset,
                format!(
                    "DCode {dcode} is outside the shape table ({} shapes)",
                    self.shapes.len()
                ),
            )),
        }
    }

    fn read_pads(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        if count == 0 {
            return Ok(());
        }
        r.expect_u32(2, "pad table prefix")?;
        let pads = r.read_list(count, |r| self.read_pad(r))?;
        self.pads.extend(pads);
        Ok(())
    }

    fn read_pad(&self, r: &mut BinaryReader) -> Result<Pad> {
        let start = r.position();
        let net = r.read_i32()?;
        let dcode = r.read_u32()?;
        let pos = r.read_vec2()?;
        let exposed = r.read_bool()?;
        let copper = r.read_bool()?;
        let test_point_param = r.read_u8()?;
        self.check_dcode(dcode, start + 4)?;

        let mut pad = Pad {
            net,
            dcode,
            pos,
            exposed,
            copper,
            test_point_param,
            something: false,
            test_point_data: None,
            exposed_box: None,
            tail_param: 0,
            hole: None,
        };

        if copper {
            pad.something = r.read_bool()?;
            if test_point_param == 1 {
                pad.test_point_data = Some(r.read_byte_array()?);
            }
            if exposed || pad.something {
                pad.exposed_box = Some(r.read_box2()?);
            }
            let has_hole = r.read_bool()?;
            pad.tail_param = r.read_u8()?;
            if has_hole {
                pad.hole = Some(PadHole {
                    data: r.read_byte_array()?,
                    size: r.read_vec2()?,
                    param: r.read_u8()?,
                });
            }
        } else if exposed || test_point_param == 1 {
            return Err(Error::violation_at(
                start,
                "non-copper pad is marked exposed or accessible",
            ));
        }
        Ok(pad)
    }

    fn read_lines(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        if count == 0 {
            return Ok(());
        }
        r.expect_u32(0, "line table prefix")?;
        let lines = r.read_list(count, |r| {
            let start = r.position();
            let net = r.read_i32()?;
            let dcode = r.read_u32()?;
            self.check_dcode(dcode, start + 4)?;
            Ok(Line {
                net,
                dcode,
                start: r.read_vec2()?,
                end: r.read_vec2()?,
            })
        })?;
        self.lines.extend(lines);
        Ok(())
    }

    fn read_arcs(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        if count == 0 {
            return Ok(());
        }
        r.expect_u32(0, "arc table prefix")?;
        let arcs = r.read_list(count, |r| {
            let start = r.position();
            let net = r.read_i32()?;
            let dcode = r.read_u32()?;
            self.check_dcode(dcode, start + 4)?;
            Ok(Arc {
                net,
                dcode,
                pos: r.read_vec2()?,
                radius: r.read_fixed()?,
                start_angle: r.read_f32()?,
                sweep_angle: r.read_f32()?,
            })
        })?;
        self.arcs.extend(arcs);
        Ok(())
    }

    fn read_surfaces(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        if count == 0 {
            return Ok(());
        }
        r.expect_u32(2, "surface table prefix")?;
        self.surfaces = r.read_list(count, |r| {
            let net = r.read_i32()?;
            let edge_count = r.read_u32()?;
            let vertices = r.read_list(edge_count, BinaryReader::read_vec2)?;
            let line_width = r.read_fixed()?;
            let void_count = r.read_u32()?;
            let cutouts = r.read_list(void_count, |r| {
                let offset = r.position();
                let tag = r.read_u32()?;
                if tag > 1 {
                    return Err(Error::violation_at(
                        offset,
                        format!("unrecognized cutout tag {tag}"),
                    ));
                }
                let n = r.read_u32()?;
                let vertices = r.read_list(n, BinaryReader::read_vec2)?;
                Ok(Cutout { tag, vertices })
            })?;
            let void_flags = if void_count > 0 { r.read_u32()? } else { 0 };
            Ok(Surface {
                net,
                vertices,
                line_width,
                cutouts,
                void_flags,
            })
        })?;
        Ok(())
    }

    fn read_unknown_items(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        self.unknown_items_param = r.read_u32()?;
        if count > 0 {
            self.unknown_items = r.read_list(count, UnknownItem::read)?;
            r.expect_u32(0, "unknown item trailer")?;
        }
        r.expect_u32(7, "unknown item trailer")?;
        Ok(())
    }

    fn read_test_points(&mut self, r: &mut BinaryReader) -> Result<()> {
        let count = r.read_u32()?;
        self.test_points = r.read_list(count, TestPoint::read)?;
        r.expect_u32(0, "test point trailer")?;
        r.expect_u32(4, "test point trailer")?;

        let count = r.read_u32()?;
        self.test_points2_param = r.read_u32()?;
        self.test_points2 = r.read_list(count, TestPoint2::read)?;

        let count = r.read_u32()?;
        self.test_points3_param = r.read_u32()?;
        self.test_points3 = r.read_list(count, TestPoint2::read)?;

        let count = r.read_u32()?;
        self.test_sequence_param = r.read_u32()?;
        self.test_sequence = r.read_list(count, TestNode::read)?;
        if self.test_sequence_param == 1 {
            r.expect_zero_words::<3>("test sequence trailer")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub flag1: bool,
    pub flag2: bool,
    pub size: Fixed32,
    pub data: [u32; 5],
    /// Possibly a color.
    pub data3: [u8; 3],
}

impl Tool {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            flag1: r.read_bool()?,
            flag2: r.read_bool()?,
            size: r.read_fixed()?,
            data: r.read_u32_array()?,
            data3: r.read_byte_array()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillHole {
    pub net: i32,
    /// One-based index into [ThroughObject::tools].
    pub tool: u32,
    pub pos: Vector2S,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrillSlot {
    pub net: i32,
    /// One-based index into [ThroughObject::tools].
    pub tool: u32,
    pub begin: Vector2S,
    pub end: Vector2S,
    /// Always zero in known files.
    pub zero: u32,
}

const DRILL_HOLE: u8 = 0x08;
const DRILL_SLOT: u8 = 0x0A;

/// A drill or route layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughObject {
    pub header: ObjectHeader,
    pub tools: Vec<Tool>,
    pub drill_param: u32,
    pub holes: Vec<DrillHole>,
    pub slots: Vec<DrillSlot>,
}

impl ThroughObject {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let header = ObjectHeader::read(r)?;
        r.expect_zero_words::<2>("through layer prefix")?;

        // Like the shape table, the stored count is one past the real one.
        let offset = r.position();
        let Some(tool_count) = r.read_u32()?.checked_sub(1) else {
            return Err(Error::violation_at(offset, "drill tool count is zero"));
        };
        let tools = r.read_list(tool_count, Tool::read)?;
        r.expect_u8(0, "drill tool trailer")?;

        let drill_count = r.read_u32()?;
        let drill_param = r.read_u32()?;
        debug!("drill features: {drill_count}, param {drill_param}");
        r.expect_zero_words::<4>("drill table prefix")?;

        let mut holes = Vec::new();
        let mut slots = Vec::new();
        for _ in 0..drill_count {
            let offset = r.position();
            match r.read_u8()? {
                DRILL_HOLE => holes.push(DrillHole {
                    net: r.read_i32()?,
                    tool: r.read_u32()?,
                    pos: r.read_vec2()?,
                }),
                DRILL_SLOT => slots.push(DrillSlot {
                    net: r.read_i32()?,
                    tool: r.read_u32()?,
                    begin: r.read_vec2()?,
                    end: r.read_vec2()?,
                    zero: r.read_u32()?,
                }),
                code => {
                    return Err(Error::violation_at(
                        offset,
                        format!("unrecognized drill code {code:#04x}"),
                    ));
                }
            }
        }

        Ok(Self {
            header,
            tools,
            drill_param,
            holes,
            slots,
        })
    }
}

/// A layer object of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Logic(LogicObject),
    Through(ThroughObject),
}

impl Object {
    const LOGIC: u32 = 3;
    const THROUGH: u32 = 1;
    const MAX_SKIPS: usize = 4;

    fn read(r: &mut BinaryReader) -> Result<Self> {
        let start = r.position();
        // The type word may be preceded by up to three zero words.
        let mut object_type = 0;
        for _ in 0..Self::MAX_SKIPS {
            object_type = r.read_u32()?;
            if object_type != 0 {
                break;
            }
        }
        let object = match object_type {
            Self::LOGIC => Self::Logic(LogicObject::read(r)?),
            Self::THROUGH => Self::Through(ThroughObject::read(r)?),
            t => {
                return Err(Error::violation_at(
                    start,
                    format!("unrecognized object type {t}"),
                ));
            }
        };
        debug!("object done at {:#010x}", r.position());
        Ok(object)
    }

    pub fn header(&self) -> &ObjectHeader {
        match self {
            Self::Logic(obj) => &obj.header,
            Self::Through(obj) => &obj.header,
        }
    }
}

/// File header. The three text fields are stored enciphered and decoded
/// on read.
#[derive(Debug, Clone, PartialEq)]
pub struct TvwHeader {
    /// Product type, e.g. "Tebo-ICT".
    pub product_type: String,
    pub customer: String,
    pub date: String,
    pub sizes: [u32; 3],
    pub layer_count: u32,
}

impl TvwHeader {
    fn read_field(r: &mut BinaryReader) -> Result<String> {
        let raw = r.read_string_bytes()?;
        Ok(String::from_utf8_lossy(&crypto::decode(&raw)).to_string())
    }

    fn read(r: &mut BinaryReader) -> Result<Self> {
        let product_type = Self::read_field(r)?;
        r.expect_u32(1, "header constant")?;
        let customer = Self::read_field(r)?;
        r.expect_u8(0, "header constant")?;
        let date = Self::read_field(r)?;
        let offset = r.position();
        let pad = r.read_byte_array::<3>()?;
        if pad != [0; 3] {
            return Err(Error::violation_at(
                offset,
                format!("header constant: expected zero bytes, found {pad:?}"),
            ));
        }
        Ok(Self {
            product_type,
            customer,
            date,
            sizes: r.read_u32_array()?,
            layer_count: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Pad index times eight.
    pub handle: u32,
    pub id: u32,
    pub name: String,
}

impl Pin {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let handle = r.read_u32()?;
        r.expect_u32(0, "pin padding")?;
        let id = r.read_u32()?;
        let name = r.read_string()?;
        r.expect_u32(0, "pin padding")?;
        Ok(Self { handle, id, name })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub bbox: Box2S,
    pub pos: Vector2S,
    /// Degrees.
    pub angle: i32,
    pub decal: u32,
    /// Component class; 0 chip, 3 resistor, 5 capacitor, 29 fiducial, ...
    pub part_type: u32,
    pub height: Fixed32,
    pub value: String,
    pub tolerance_pos: String,
    pub tolerance_neg: String,
    pub desc: String,
    pub serial: Option<String>,
    /// Index of the layer object the part sits on.
    pub layer: u32,
    pub pins: Vec<Pin>,
}

impl Part {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let name = r.read_string()?;
        let bbox = r.read_box2()?;
        let pos = r.read_vec2()?;
        let angle = r.read_i32()?;
        let decal = r.read_u32()?;
        let part_type = r.read_u32()?;
        r.expect_u32(0, "part padding")?;
        let height = r.read_fixed()?;
        let has_serial = r.read_bool()?;
        let value = r.read_string()?;
        let tolerance_pos = r.read_string()?;
        let tolerance_neg = r.read_string()?;
        let desc = r.read_string()?;
        let serial = if has_serial {
            let serial = r.read_string()?;
            r.expect_u32(0, "part serial padding")?;
            Some(serial)
        } else {
            None
        };
        let pin_count = r.read_u32()?;
        let layer = r.read_u32()?;
        r.expect_u32(0, "part padding")?;
        let pins = r.read_list(pin_count, Pin::read)?;
        Ok(Self {
            name,
            bbox,
            pos,
            angle,
            decal,
            part_type,
            height,
            value,
            tolerance_pos,
            tolerance_neg,
            desc,
            serial,
            layer,
            pins,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decal {
    pub name: String,
    pub header_params: [u32; 3],
    pub flag: bool,
    pub objects: [Option<Object>; 3],
    /// Usually 2.
    pub param: u32,
    /// Usually -1.
    pub n1: i32,
    pub outline: Vec<Vector2S>,
    pub params: [u32; 2],
}

impl Decal {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let offset = r.position();
        if !r.read_bool()? {
            return Err(Error::violation_at(offset, "decal flag is not set"));
        }
        let name = r.read_string()?;
        let header_params = r.read_u32_array()?;
        let flag = r.read_bool()?;
        let mut objects = [None, None, None];
        for object in &mut objects {
            if r.read_bool()? {
                *object = Some(Object::read(r)?);
            }
        }
        let offset = r.position();
        if !r.read_bool()? {
            return Err(Error::violation_at(offset, "decal outline flag is not set"));
        }
        let param = r.read_u32()?;
        let n1 = r.read_i32()?;
        let count = r.read_u32()?;
        let outline = r.read_list(count, BinaryReader::read_vec2)?;
        let params = r.read_u32_array()?;
        Ok(Self {
            name,
            header_params,
            flag,
            objects,
            param,
            n1,
            outline,
            params,
        })
    }
}

/// Represents a fully decoded TVW file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTeboFile {
    pub header: TvwHeader,
    /// Layer objects in file order.
    pub objects: Vec<Object>,
    pub nets: Vec<String>,
    pub probes: ProbeRegistry,
    pub fixtures: FixtureRegistry,
    pub mystery: MysteryBlock,
    pub parts: Vec<Part>,
    pub decals: Vec<Decal>,
}

impl ParsedTeboFile {
    /// Decodes a complete TVW file held in memory.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnexpectedEof] if the data ends early, or
    /// [Error::FormatViolation] at the first structural check that fails.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = BinaryReader::new(data);

        let header = TvwHeader::read(&mut r)?;
        debug!(
            "header: type {:?}, customer {:?}, date {:?}, {} layers",
            header.product_type, header.customer, header.date, header.layer_count
        );
        let objects = r.read_list(header.layer_count, Object::read)?;
        r.expect_zero_words::<4>("layer table trailer")?;

        let nets = Self::read_nets(&mut r)?;
        let probes = ProbeRegistry::read(&mut r)?;
        let fixtures = FixtureRegistry::read(&mut r)?;
        let mystery = MysteryBlock::read(&mut r)?;

        let part_count = r.read_u32()?;
        let _skip = r.read_u32()?;
        debug!("loading {part_count} parts");
        let parts = r.read_list(part_count, Part::read)?;

        r.expect_u32(3, "decal table tag")?;
        let decal_count = r.read_u32()?;
        debug!("loading {decal_count} decals");
        let decals = r.read_list(decal_count, Decal::read)?;

        debug!("done reading at {:#010x}", r.position());
        if r.remaining() > 0 {
            warn!("{} trailing bytes after the decal table", r.remaining());
        }

        Ok(Self {
            header,
            objects,
            nets,
            probes,
            fixtures,
            mystery,
            parts,
            decals,
        })
    }

    fn read_nets(r: &mut BinaryReader) -> Result<Vec<String>> {
        let offset = r.position();
        let count = r.read_u32()?;
        let count2 = r.read_u32()?;
        if count == 0 || count != count2 {
            return Err(Error::violation_at(
                offset,
                format!("net counts {count} and {count2} must be equal and nonzero"),
            ));
        }
        debug!("loading {count} nets");
        r.read_list(count, BinaryReader::read_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32s(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    fn object_prologue(name: &str, layer_type: u32) -> Vec<u8> {
        let mut buf = u32s(&[2, 1]);
        for s in [name, "", ""] {
            buf.push(s.len() as u8);
            buf.extend(s.as_bytes());
        }
        buf.extend(u32s(&[layer_type, 0xFF0000, 0x00FF00]));
        buf
    }

    #[test]
    fn test_header_is_deciphered() {
        let mut buf = vec![4];
        buf.extend(b"Tebo");
        buf.extend(u32s(&[1]));
        buf.push(3);
        buf.extend(b"ICT");
        buf.push(0);
        buf.push(2);
        buf.extend(b"AA");
        buf.extend([0, 0, 0]);
        buf.extend(u32s(&[10, 20, 30, 2]));
        let mut r = BinaryReader::new(&buf);
        let header = TvwHeader::read(&mut r).unwrap();
        assert_eq!(header.product_type, "Y04w");
        assert_eq!(header.customer, "NIA");
        assert_eq!(header.date, "FG");
        assert_eq!(header.sizes, [10, 20, 30]);
        assert_eq!(header.layer_count, 2);
    }

    #[test]
    fn test_header_constant_checked() {
        let mut buf = vec![0];
        buf.extend(u32s(&[2]));
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            TvwHeader::read(&mut r),
            Err(Error::FormatViolation {
                offset: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn test_shapes() {
        let mut buf = u32s(&[1, 500, 500, 0, 0, 0]);
        buf.extend(u32s(&[1, 1000, 200, 1]));
        buf.extend(90.0f32.to_le_bytes());
        buf.extend(u32s(&[0]));
        buf.extend(u32s(&[1, 300, 300, 3]));
        buf.extend(45.0f32.to_le_bytes());
        buf.extend(u32s(&[25]));

        let mut r = BinaryReader::new(&buf);
        let round = Shape::read(&mut r).unwrap();
        assert_eq!(round.kind, ShapeKind::Round);
        assert_eq!(round.size.x, Fixed32::from_raw(500));
        let rect = Shape::read(&mut r).unwrap();
        assert_eq!(rect.kind, ShapeKind::Rect);
        assert_eq!(rect.turn, 90.0);
        let rrect = Shape::read(&mut r).unwrap();
        assert_eq!(
            rrect.kind,
            ShapeKind::RoundRect {
                corner_radius: Fixed32::from_raw(25)
            }
        );
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_poly_shape() {
        let mut buf = u32s(&[1, 400, 400, 5, 0]);
        buf.push(4);
        buf.extend(b"POLY");
        buf.extend(u32s(&[(-200i32) as u32, (-200i32) as u32, 200, 200]));
        buf.extend(u32s(&[2]));
        // vertex list
        buf.extend(u32s(&[2, 7, 8, 9, 3, 0, 0, 100, 0, 0, 100]));
        // line
        buf.extend(u32s(&[5, 1, 0, 0, 0, 0, 100, 0, 10]));

        let mut r = BinaryReader::new(&buf);
        let shape = Shape::read(&mut r).unwrap();
        assert_eq!(shape.name, "POLY");
        let ShapeKind::Poly {
            bbox,
            lines,
            flags,
            vertices,
        } = shape.kind
        else {
            panic!("not a polygon");
        };
        assert_eq!(bbox.min.x, Fixed32::from_raw(-200));
        assert_eq!(flags, [7, 8, 9]);
        assert_eq!(vertices.len(), 3);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, Fixed32::from_raw(10));
    }

    #[test]
    fn test_unknown_shape_type() {
        let buf = u32s(&[1, 0, 0, 2]);
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            Shape::read(&mut r),
            Err(Error::FormatViolation {
                offset: Some(12),
                ..
            })
        ));
    }

    #[test]
    fn test_through_object() {
        let mut buf = u32s(&[0, 1]);
        buf.extend(object_prologue("drill", 11));
        buf.extend(u32s(&[0, 0, 2]));
        // one tool
        buf.extend([1, 0]);
        buf.extend(u32s(&[1200, 0, 0, 0, 0, 0]));
        buf.extend([1, 2, 3]);
        buf.push(0);
        buf.extend(u32s(&[2, 77, 0, 0, 0, 0]));
        buf.push(DRILL_HOLE);
        buf.extend(u32s(&[5, 1, 100, 200]));
        buf.push(DRILL_SLOT);
        buf.extend(u32s(&[u32::MAX, 1, 0, 0, 500, 0, 0]));

        let mut r = BinaryReader::new(&buf);
        let Object::Through(obj) = Object::read(&mut r).unwrap() else {
            panic!("not a through object");
        };
        assert_eq!(r.remaining(), 0);
        assert_eq!(obj.header.name, "drill");
        assert_eq!(obj.header.layer_type, LayerType::Drill);
        assert_eq!(obj.tools.len(), 1);
        assert_eq!(obj.tools[0].size, Fixed32::from_raw(1200));
        assert_eq!(obj.drill_param, 77);
        assert_eq!(obj.holes.len(), 1);
        assert_eq!(obj.holes[0].net, 5);
        assert_eq!(obj.slots.len(), 1);
        assert_eq!(obj.slots[0].net, -1);
        assert_eq!(obj.slots[0].end.x, Fixed32::from_raw(500));
    }

    #[test]
    fn test_bad_drill_code() {
        let mut buf = u32s(&[1]);
        buf.extend(object_prologue("drill", 11));
        buf.extend(u32s(&[0, 0, 1]));
        buf.push(0);
        buf.extend(u32s(&[1, 0, 0, 0, 0, 0]));
        let code_offset = buf.len() as u64;
        buf.push(0x09);

        let mut r = BinaryReader::new(&buf);
        match Object::read(&mut r) {
            Err(Error::FormatViolation {
                offset: Some(offset),
                ..
            }) => assert_eq!(offset, code_offset),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_object_type_after_four_zeros_rejected() {
        let buf = u32s(&[0, 0, 0, 0, 3]);
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            Object::read(&mut r),
            Err(Error::FormatViolation { offset: Some(0), .. })
        ));
    }

    #[test]
    fn test_bad_object_magic() {
        let mut buf = u32s(&[3]);
        buf.extend(u32s(&[2, 2]));
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            Object::read(&mut r),
            Err(Error::FormatViolation { offset: Some(4), .. })
        ));
    }

    #[test]
    fn test_logic_object_without_shapes() {
        let mut buf = u32s(&[3]);
        buf.extend(object_prologue("silk", 7));
        buf.extend(u32s(&[0])); // shapes
        buf.extend(u32s(&[0, 0, 7])); // unknown items
        buf.extend(u32s(&[0, 0, 4])); // test points
        buf.extend(u32s(&[0, 0, 0, 0, 0, 1, 0, 0, 0])); // tps2, tps3, sequence

        let mut r = BinaryReader::new(&buf);
        let Object::Logic(obj) = Object::read(&mut r).unwrap() else {
            panic!("not a logic object");
        };
        assert_eq!(r.remaining(), 0);
        assert_eq!(obj.header.layer_type, LayerType::SilkTop);
        assert!(obj.shapes.is_empty());
        assert!(obj.pads.is_empty());
        assert_eq!(obj.test_sequence_param, 1);
    }

    #[test]
    fn test_shape_count_below_base() {
        let mut buf = u32s(&[3]);
        buf.extend(object_prologue("top", 1));
        let offset = buf.len() as u64;
        buf.extend(u32s(&[9]));
        let mut r = BinaryReader::new(&buf);
        match Object::read(&mut r) {
            Err(Error::FormatViolation {
                offset: Some(o), ..
            }) => assert_eq!(o, offset),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
