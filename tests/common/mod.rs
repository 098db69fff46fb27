// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  tests/common/mod.rs - Builder for synthetic TVW files.
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

#![allow(dead_code)]

pub const LOGIC: u32 = 3;
pub const THROUGH: u32 = 1;

pub const TYPE_TOP: u32 = 1;
pub const TYPE_BOTTOM: u32 = 2;
pub const TYPE_DRILL: u32 = 11;
pub const TYPE_ROUTE: u32 = 12;

/// Writes TVW records byte by byte. Coordinates are given in mils and
/// stored in the file's hundredths of a mil.
#[derive(Debug, Default)]
pub struct TvwWriter {
    pub buf: Vec<u8>,
}

impl TvwWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend(v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend(v.to_le_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.extend(v.to_le_bytes());
        self
    }

    pub fn zeros(&mut self, words: usize) -> &mut Self {
        for _ in 0..words {
            self.u32(0);
        }
        self
    }

    pub fn str(&mut self, s: &str) -> &mut Self {
        self.u8(s.len() as u8);
        self.buf.extend(s.as_bytes());
        self
    }

    pub fn mils(&mut self, v: f64) -> &mut Self {
        self.i32((v * 100.0).round() as i32)
    }

    pub fn vec2(&mut self, x: f64, y: f64) -> &mut Self {
        self.mils(x).mils(y)
    }

    pub fn box2(&mut self, min: (f64, f64), max: (f64, f64)) -> &mut Self {
        self.vec2(min.0, min.1).vec2(max.0, max.1)
    }

    /// Header with `layer_count` layer objects following it.
    pub fn header(&mut self, layer_count: u32) -> &mut Self {
        self.str("Tebo")
            .u32(1)
            .str("ICT")
            .u8(0)
            .str("AA")
            .u8(0)
            .u8(0)
            .u8(0)
            .u32(1)
            .u32(2)
            .u32(3)
            .u32(layer_count)
    }

    pub fn object_prologue(&mut self, kind: u32, name: &str, layer_type: u32) -> &mut Self {
        self.u32(kind)
            .u32(2)
            .u32(1)
            .str(name)
            .str("")
            .str("")
            .u32(layer_type)
            .u32(0xFF0000)
            .u32(0x00FF00)
    }

    /// Shape table header for `count` shapes.
    pub fn shape_table(&mut self, count: u32) -> &mut Self {
        self.u32(10 + count)
    }

    pub fn round_shape(&mut self, diameter: f64) -> &mut Self {
        self.u32(1).vec2(diameter, diameter).u32(0).vec2(0.0, 0.0)
    }

    pub fn rect_shape(&mut self, w: f64, h: f64, turn: f32) -> &mut Self {
        self.u32(1).vec2(w, h).u32(1).f32(turn).i32(0)
    }

    /// Data order word and flags that follow a non-empty shape table.
    pub fn data_order(&mut self) -> &mut Self {
        self.u32(1).u32(0).u32(1)
    }

    /// Data order word of the alternate layout, where a second line and arc
    /// table follow the surfaces.
    pub fn data_order_extra(&mut self) -> &mut Self {
        self.u32(2).u32(0).u32(1)
    }

    pub fn pad_table(&mut self, count: u32) -> &mut Self {
        self.u32(count);
        if count > 0 {
            self.u32(2);
        }
        self
    }

    /// A plain SMD pad without test point data or a hole.
    pub fn smd_pad(&mut self, net: i32, dcode: u32, x: f64, y: f64) -> &mut Self {
        self.i32(net)
            .u32(dcode)
            .vec2(x, y)
            .bool(false)
            .bool(true)
            .u8(0)
            .bool(false)
            .bool(false)
            .u8(0)
    }

    /// A through-hole pad with an exposed box and a drilled hole.
    pub fn hole_pad(&mut self, net: i32, dcode: u32, x: f64, y: f64, drill: f64) -> &mut Self {
        self.i32(net)
            .u32(dcode)
            .vec2(x, y)
            .bool(true)
            .bool(true)
            .u8(0)
            .bool(false)
            .box2((x - 10.0, y - 10.0), (x + 10.0, y + 10.0))
            .bool(true)
            .u8(0);
        self.buf.extend([0; 7]);
        self.vec2(drill, drill).u8(0)
    }

    pub fn line_table(&mut self, lines: &[(i32, u32, (f64, f64), (f64, f64))]) -> &mut Self {
        self.u32(lines.len() as u32);
        if !lines.is_empty() {
            self.u32(0);
        }
        for &(net, dcode, a, b) in lines {
            self.i32(net).u32(dcode).vec2(a.0, a.1).vec2(b.0, b.1);
        }
        self
    }

    /// Arcs are (net, dcode, center, radius, start, sweep).
    pub fn arc_table(&mut self, arcs: &[(i32, u32, (f64, f64), f64, f32, f32)]) -> &mut Self {
        self.u32(arcs.len() as u32);
        if !arcs.is_empty() {
            self.u32(0);
        }
        for &(net, dcode, center, radius, start, sweep) in arcs {
            self.i32(net)
                .u32(dcode)
                .vec2(center.0, center.1)
                .mils(radius)
                .f32(start)
                .f32(sweep);
        }
        self
    }

    pub fn surface_table(&mut self, count: u32) -> &mut Self {
        self.u32(count);
        if count > 0 {
            self.u32(2);
        }
        self
    }

    /// A filled region with each cutout as a void.
    pub fn surface(
        &mut self,
        net: i32,
        outline: &[(f64, f64)],
        cutouts: &[&[(f64, f64)]],
    ) -> &mut Self {
        self.i32(net).u32(outline.len() as u32);
        for &(x, y) in outline {
            self.vec2(x, y);
        }
        self.mils(5.0).u32(cutouts.len() as u32);
        for cutout in cutouts {
            self.u32(0).u32(cutout.len() as u32);
            for &(x, y) in *cutout {
                self.vec2(x, y);
            }
        }
        if !cutouts.is_empty() {
            self.u32(1);
        }
        self
    }

    /// Empty arc and surface tables.
    pub fn no_arcs_or_surfaces(&mut self) -> &mut Self {
        self.u32(0).u32(0)
    }

    /// Empty unknown item and test point tables.
    pub fn logic_tail(&mut self) -> &mut Self {
        self.u32(0).u32(0).u32(7);
        self.u32(0).u32(0).u32(4);
        self.zeros(6)
    }

    pub fn unknown_items(&mut self, names: &[&str]) -> &mut Self {
        self.u32(names.len() as u32).u32(1);
        for name in names {
            self.str(name).vec2(1.0, 2.0);
            for p in 1..=6 {
                self.i32(p);
            }
            self.bool(true).bool(false).bool(true).i32(-1);
        }
        if !names.is_empty() {
            self.u32(0);
        }
        self.u32(7)
    }

    pub fn test_point_table(&mut self, handles: &[i32]) -> &mut Self {
        self.u32(handles.len() as u32);
        for &handle in handles {
            self.bool(true)
                .i32(0)
                .i32(handle)
                .i32(0)
                .i32(0)
                .vec2(10.0, 20.0)
                .i32(0)
                .bool(false)
                .i32(0)
                .i32(0)
                .i32(1);
        }
        self.u32(0).u32(4)
    }

    /// A first-choice or assistant table with one entry per nail number.
    pub fn test_point2_table(&mut self, param: u32, nails: &[u32]) -> &mut Self {
        self.u32(nails.len() as u32).u32(param);
        for (handle, &nail) in (0..).zip(nails) {
            self.u32(0)
                .u32(handle * 8)
                .u32(0)
                .vec2(10.0, 20.0)
                .vec2(10.0, 20.0)
                .vec2(10.0, 20.0)
                .bool(true)
                .bool(false)
                .bool(false)
                .u32(nail)
                .i32(-1)
                .bool(false)
                .bool(false)
                .bool(true)
                .i32(0);
        }
        self
    }

    /// A test sequence with parameter 1, which adds three trailing words.
    pub fn test_sequence(&mut self, links: &[(u32, u32)]) -> &mut Self {
        self.u32(links.len() as u32).u32(1);
        for &(current, next) in links {
            self.u32(current).u32(next).bool(false);
        }
        self.zeros(3)
    }

    /// Prefix and tool table of a through layer.
    pub fn tools(&mut self, sizes: &[f64]) -> &mut Self {
        self.zeros(2).u32(sizes.len() as u32 + 1);
        for &size in sizes {
            self.bool(true).bool(false).mils(size).zeros(5).u8(0).u8(0).u8(0);
        }
        self.u8(0)
    }

    pub fn drill_table(&mut self, count: u32) -> &mut Self {
        self.u32(count).u32(0).zeros(4)
    }

    pub fn drill_hole(&mut self, net: i32, tool: u32, x: f64, y: f64) -> &mut Self {
        self.u8(0x08).i32(net).u32(tool).vec2(x, y)
    }

    pub fn drill_slot(&mut self, net: i32, tool: u32, a: (f64, f64), b: (f64, f64)) -> &mut Self {
        self.u8(0x0A)
            .i32(net)
            .u32(tool)
            .vec2(a.0, a.1)
            .vec2(b.0, b.1)
            .u32(0)
    }

    pub fn nets(&mut self, names: &[&str]) -> &mut Self {
        self.u32(names.len() as u32).u32(names.len() as u32);
        for name in names {
            self.str(name);
        }
        self
    }

    /// Probe registry, fixture registry and the block after them, all with
    /// nothing in them.
    pub fn empty_fixtures(&mut self) -> &mut Self {
        self.zeros(2).u32(4).str("probes").mils(118.11).u32(1).u32(0);

        self.u32(0).u32(7874);
        for _ in 0..8 {
            self.str("");
        }
        for name in ["top", "bottom"] {
            self.u32(3).str(name).u32(0).u32(0).vec2(0.0, 0.0);
        }

        self.u32(50).u32(12452).vec2(1000.0, 800.0).u32(3).u32(1);
        self.bool(false).bool(false).u8(0).u8(0).zeros(4);
        for _ in 0..6 {
            self.bool(false);
        }
        self.u32(10000).zeros(3).u8(0).u8(0)
    }

    pub fn part_table(&mut self, count: u32) -> &mut Self {
        self.u32(count).u32(0)
    }

    /// A part record. Pins are (pad index, name) pairs.
    pub fn part(
        &mut self,
        name: &str,
        bbox: ((f64, f64), (f64, f64)),
        layer: u32,
        pins: &[(u32, &str)],
    ) -> &mut Self {
        self.str(name)
            .box2(bbox.0, bbox.1)
            .vec2((bbox.0.0 + bbox.1.0) / 2.0, (bbox.0.1 + bbox.1.1) / 2.0)
            .i32(90)
            .u32(0)
            .u32(3)
            .u32(0)
            .mils(25.0)
            .bool(false)
            .str("10k")
            .str("+5%")
            .str("-5%")
            .str("RES 0603")
            .u32(pins.len() as u32)
            .u32(layer)
            .u32(0);
        for (id, &(pad, pin_name)) in (1..).zip(pins) {
            self.u32(pad * 8).u32(0).u32(id).str(pin_name).u32(0);
        }
        self
    }

    pub fn decal_table(&mut self, count: u32) -> &mut Self {
        self.u32(3).u32(count)
    }

    /// A decal without layer objects.
    pub fn decal(&mut self, name: &str, outline: &[(f64, f64)]) -> &mut Self {
        self.decal_head(name);
        self.bool(false).bool(false).bool(false);
        self.decal_outline(outline)
    }

    /// Decal fields up to its three optional layer objects. Each object slot
    /// is a flag, followed by the object when set.
    pub fn decal_head(&mut self, name: &str) -> &mut Self {
        self.bool(true).str(name).zeros(3).bool(false)
    }

    pub fn decal_outline(&mut self, outline: &[(f64, f64)]) -> &mut Self {
        self.bool(true).u32(2).i32(-1).u32(outline.len() as u32);
        for &(x, y) in outline {
            self.vec2(x, y);
        }
        self.zeros(2)
    }
}

/// A complete two-sided board with a 1000 x 800 mil outline.
pub struct SampleTvw {
    pub data: Vec<u8>,
    /// Offset of the first shape record of the top layer.
    pub top_shapes: usize,
}

pub fn sample_tvw() -> SampleTvw {
    let mut w = TvwWriter::new();
    w.header(4);

    // 0: top copper, two SMD pads and a trace
    w.object_prologue(LOGIC, "top", TYPE_TOP).shape_table(2);
    let top_shapes = w.len();
    w.rect_shape(20.0, 30.0, 90.0).round_shape(10.0);
    w.data_order()
        .pad_table(2)
        .smd_pad(0, 10, 100.0, 200.0)
        .smd_pad(1, 10, 150.0, 200.0)
        .line_table(&[(0, 11, (100.0, 200.0), (100.0, 300.0))])
        .no_arcs_or_surfaces()
        .logic_tail();

    // 1: bottom copper, one through-hole pad with no net
    w.object_prologue(LOGIC, "bottom", TYPE_BOTTOM)
        .shape_table(1)
        .round_shape(60.0)
        .data_order()
        .pad_table(1)
        .hole_pad(-1, 10, 500.0, 400.0, 35.0)
        .line_table(&[])
        .no_arcs_or_surfaces()
        .logic_tail();

    // 2: board outline
    w.object_prologue(THROUGH, "outline", TYPE_ROUTE)
        .tools(&[10.0])
        .drill_table(4);
    let corners = [(0.0, 0.0), (1000.0, 0.0), (1000.0, 800.0), (0.0, 800.0)];
    for i in 0..corners.len() {
        w.drill_slot(-1, 1, corners[i], corners[(i + 1) % corners.len()]);
    }

    // 3: drills
    w.object_prologue(THROUGH, "drill", TYPE_DRILL)
        .tools(&[12.0, 35.0])
        .drill_table(2)
        .drill_hole(1, 1, 300.0, 300.0)
        .drill_hole(-1, 2, 500.0, 400.0);

    w.zeros(4);
    w.nets(&["GND", "VCC"]);
    w.empty_fixtures();

    w.part_table(3)
        .part("R1", ((90.0, 185.0), (160.0, 215.0)), 0, &[(0, "1"), (1, "2")])
        .part("J1", ((470.0, 370.0), (530.0, 430.0)), 1, &[(0, "1")])
        .part("H1", ((290.0, 290.0), (310.0, 310.0)), 3, &[]);

    w.decal_table(1)
        .decal("R0603", &[(-50.0, -20.0), (50.0, -20.0), (50.0, 20.0), (-50.0, 20.0)]);

    SampleTvw {
        data: w.buf,
        top_shapes,
    }
}
