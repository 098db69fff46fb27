// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/tebo/fixture.rs - Probe and fixture metadata blocks of Tebo-ICT files.
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
 * # `fixture` Module
 *
 * Test-fixture metadata that sits between the net list and the part table.
 * None of it reaches the board model, but every field has to be consumed to
 * find where the parts begin.
 */

use crate::error::{Error, Result};
use crate::fixed::{Fixed32, Vector2S};
use crate::reader::BinaryReader;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeBox32 {
    pub tag: i32,
    pub v1: Vector2S,
    pub v2: Vector2S,
}

impl ProbeBox32 {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            tag: r.read_i32()?,
            v1: r.read_vec2()?,
            v2: r.read_vec2()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleBox32 {
    pub tag: u32,
    pub b1: ProbeBox32,
    pub b2: ProbeBox32,
}

impl DoubleBox32 {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            tag: r.read_u32()?,
            b1: ProbeBox32::read(r)?,
            b2: ProbeBox32::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeBox8 {
    pub tag: u8,
    pub n: i32,
    pub a: i32,
    pub p1: i32,
    pub p2: i32,
}

impl ProbeBox8 {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            tag: r.read_u8()?,
            n: r.read_i32()?,
            a: r.read_i32()?,
            p1: r.read_i32()?,
            p2: r.read_i32()?,
        })
    }
}

/// One probe size slot of a fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeDataItem {
    pub size: Fixed32,
    pub params: [u32; 5],
    pub color: u32,
}

impl ProbeDataItem {
    /// Reads a presence flag and, when set, the item behind it.
    fn read_optional(r: &mut BinaryReader) -> Result<Option<Self>> {
        if !r.read_bool()? {
            return Ok(None);
        }
        Ok(Some(Self {
            size: r.read_fixed()?,
            params: r.read_u32_array()?,
            color: r.read_u32()?,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureData {
    pub p1: u32,
    pub px: [u32; 6],
    pub flags: [bool; 3],
    pub items: Vec<Option<ProbeDataItem>>,
    pub c1: u32,
    pub v1: Vector2S,
    pub v2: Vector2S,
    pub boxes: Vec<ProbeBox8>,
}

impl FixtureData {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let p1 = r.read_u32()?;
        let px = r.read_u32_array()?;
        let flags = r.read_bool_array()?;

        let offset = r.position();
        let item_count = r.read_u32()?;
        if item_count == 0 {
            return Err(Error::violation_at(
                offset,
                "fixture data has no probe items",
            ));
        }
        let items = r.read_list(item_count, ProbeDataItem::read_optional)?;

        // The box count comes before the fields that precede the boxes.
        let box_count = r.read_u32()?;
        let c1 = r.read_u32()?;
        let v1 = r.read_vec2()?;
        let v2 = r.read_vec2()?;
        let boxes = r.read_list(box_count, ProbeBox8::read)?;

        Ok(Self {
            p1,
            px,
            flags,
            items,
            c1,
            v1,
            v2,
            boxes,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeData {
    pub fixture: FixtureData,
    pub v3: Vector2S,
    pub v4: Vector2S,
    pub boxes: Vec<DoubleBox32>,
}

impl ProbeData {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let fixture = FixtureData::read(r)?;
        let v3 = r.read_vec2()?;
        let v4 = r.read_vec2()?;
        let count = r.read_u32()?;
        let boxes = r.read_list(count, DoubleBox32::read)?;
        Ok(Self {
            fixture,
            v3,
            v4,
            boxes,
        })
    }
}

/// Fixed part of a probe description.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeHeader {
    pub flag: bool,
    pub tag: u32,
    /// e.g. "Spear_B_100 Mil"
    pub name: String,
    pub sizes: [(Fixed32, u32); 3],
    pub color: u32,
    pub pairs: [(u32, u32); 4],
}

impl ProbeHeader {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let flag = r.read_bool()?;
        let tag = r.read_u32()?;
        let name = r.read_string()?;
        let mut sizes = [(Fixed32::ZERO, 0); 3];
        for size in &mut sizes {
            *size = (r.read_fixed()?, r.read_u32()?);
        }
        let color = r.read_u32()?;
        let mut pairs = [(0, 0); 4];
        for pair in &mut pairs {
            *pair = (r.read_u32()?, r.read_u32()?);
        }
        Ok(Self {
            flag,
            tag,
            name,
            sizes,
            color,
            pairs,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTail {
    pub tag: u32,
    pub flags: [bool; 3],
    pub p0: u8,
    pub params: [i32; 3],
    pub b1: ProbeBox32,
    pub b2: ProbeBox32,
}

impl ProbeTail {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            tag: r.read_u32()?,
            flags: r.read_bool_array()?,
            p0: r.read_u8()?,
            params: r.read_i32_array()?,
            b1: ProbeBox32::read(r)?,
            b2: ProbeBox32::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Probe {
    pub header: ProbeHeader,
    pub body: Option<ProbeData>,
    pub tail: ProbeTail,
}

impl Probe {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        let header = ProbeHeader::read(r)?;
        let body = if r.read_bool()? {
            Some(ProbeData::read(r)?)
        } else {
            None
        };
        let tail = ProbeTail::read(r)?;
        Ok(Self { header, body, tail })
    }
}

/// All probe types known to the fixture, grouped in packs.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRegistry {
    pub name: String,
    /// Usually 118.11 mil (3 mm).
    pub default_size: Fixed32,
    pub packs: Vec<Vec<Probe>>,
}

impl ProbeRegistry {
    pub(crate) fn read(r: &mut BinaryReader) -> Result<Self> {
        r.expect_zero_words::<2>("probe registry prefix")?;
        r.expect_u32(4, "probe registry parameter")?;
        let name = r.read_string()?;
        let default_size = r.read_fixed()?;

        let offset = r.position();
        let pack_count = r.read_u32()?;
        if pack_count == 0 {
            return Err(Error::violation_at(
                offset,
                "probe registry has no probe packs",
            ));
        }
        let packs = r.read_list(pack_count, |r| {
            let count = r.read_u32()?;
            r.read_list(count, Probe::read)
        })?;

        Ok(Self {
            name,
            default_size,
            packs,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureVariant {
    pub name: String,
    pub short_name: String,
    pub flag1: bool,
    pub flag2: bool,
    pub data: FixtureData,
}

impl FixtureVariant {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            name: r.read_string()?,
            short_name: r.read_string()?,
            flag1: r.read_bool()?,
            flag2: r.read_bool()?,
            data: FixtureData::read(r)?,
        })
    }
}

/// Fixture configuration for one side of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSetting {
    pub name: String,
    pub variants: Vec<FixtureVariant>,
    pub workspace_size: Vector2S,
}

impl FixtureSetting {
    fn read(r: &mut BinaryReader) -> Result<Self> {
        r.expect_u32(3, "fixture setting tag")?;
        let name = r.read_string()?;
        r.expect_u32(0, "fixture setting parameter")?;
        let count = r.read_u32()?;
        let variants = r.read_list(count, FixtureVariant::read)?;
        let workspace_size = r.read_vec2()?;
        Ok(Self {
            name,
            variants,
            workspace_size,
        })
    }
}

const GRID_COUNT: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRegistry {
    pub grids: Vec<String>,
    pub top: FixtureSetting,
    pub bottom: FixtureSetting,
}

impl FixtureRegistry {
    pub(crate) fn read(r: &mut BinaryReader) -> Result<Self> {
        r.expect_u32(0, "fixture registry tag")?;
        r.expect_u32(7874, "fixture registry tag")?;
        let grids = r.read_list(GRID_COUNT, BinaryReader::read_string)?;
        let top = FixtureSetting::read(r)?;
        let bottom = FixtureSetting::read(r)?;
        Ok(Self { grids, top, bottom })
    }
}

/// Board-wide settings block of unknown meaning.
///
/// Values seen in sample files are noted on the fields, but none are
/// checked.
#[derive(Debug, Clone, PartialEq)]
pub struct MysteryBlock {
    /// 50, 12452
    pub p1: u32,
    pub p2: u32,
    pub top_right: Vector2S,
    /// 3, 1
    pub p3: u32,
    pub p4: u32,
    pub flag1: bool,
    pub flag2: bool,
    pub p5: u8,
    pub p6: u8,
    pub p7: [u32; 4],
    pub flags: [bool; 6],
    /// 10000
    pub p8: u32,
    pub p9: u32,
    pub p10: u32,
    pub p11: u32,
    pub p12: u8,
    pub p13: u8,
}

impl MysteryBlock {
    pub(crate) fn read(r: &mut BinaryReader) -> Result<Self> {
        Ok(Self {
            p1: r.read_u32()?,
            p2: r.read_u32()?,
            top_right: r.read_vec2()?,
            p3: r.read_u32()?,
            p4: r.read_u32()?,
            flag1: r.read_bool()?,
            flag2: r.read_bool()?,
            p5: r.read_u8()?,
            p6: r.read_u8()?,
            p7: r.read_u32_array()?,
            flags: r.read_bool_array()?,
            p8: r.read_u32()?,
            p9: r.read_u32()?,
            p10: r.read_u32()?,
            p11: r.read_u32()?,
            p12: r.read_u8()?,
            p13: r.read_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend(v.to_le_bytes());
    }

    fn push_str(buf: &mut Vec<u8>, s: &str) {
        buf.push(s.len() as u8);
        buf.extend(s.as_bytes());
    }

    fn fixture_data(buf: &mut Vec<u8>) {
        push_u32(buf, 5);
        for _ in 0..6 {
            push_u32(buf, 0);
        }
        buf.extend([1, 0, 1]);
        push_u32(buf, 2); // items
        buf.push(0);
        buf.push(1);
        push_u32(buf, 300);
        for p in 1..=5 {
            push_u32(buf, p);
        }
        push_u32(buf, 0x00FF00);
        push_u32(buf, 1); // boxes
        push_u32(buf, 9);
        for _ in 0..4 {
            push_u32(buf, 0);
        }
        buf.push(2);
        for _ in 0..4 {
            push_u32(buf, 7);
        }
    }

    #[test]
    fn test_fixture_data() {
        let mut buf = Vec::new();
        fixture_data(&mut buf);
        let mut r = BinaryReader::new(&buf);
        let data = FixtureData::read(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(data.p1, 5);
        assert_eq!(data.flags, [true, false, true]);
        assert_eq!(data.items.len(), 2);
        assert!(data.items[0].is_none());
        let item = data.items[1].as_ref().unwrap();
        assert_eq!(item.size, Fixed32::from_raw(300));
        assert_eq!(item.params, [1, 2, 3, 4, 5]);
        assert_eq!(data.c1, 9);
        assert_eq!(data.boxes.len(), 1);
        assert_eq!(data.boxes[0].tag, 2);
    }

    #[test]
    fn test_fixture_registry() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 7874);
        for i in 0..8 {
            push_str(&mut buf, &format!("grid{i}"));
        }
        for side in ["top", "bottom"] {
            push_u32(&mut buf, 3);
            push_str(&mut buf, side);
            push_u32(&mut buf, 0);
            push_u32(&mut buf, 1);
            push_str(&mut buf, "variant");
            push_str(&mut buf, "v");
            buf.extend([1, 0]);
            fixture_data(&mut buf);
            push_u32(&mut buf, 1000);
            push_u32(&mut buf, 2000);
        }
        let mut r = BinaryReader::new(&buf);
        let reg = FixtureRegistry::read(&mut r).unwrap();
        assert_eq!(r.remaining(), 0);
        assert_eq!(reg.grids[7], "grid7");
        assert_eq!(reg.top.name, "top");
        assert_eq!(reg.bottom.variants[0].short_name, "v");
        assert_eq!(reg.bottom.workspace_size.y, Fixed32::from_raw(2000));
    }

    #[test]
    fn test_fixture_registry_tag_checked() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 7875);
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            FixtureRegistry::read(&mut r),
            Err(Error::FormatViolation {
                offset: Some(4),
                ..
            })
        ));
    }

    #[test]
    fn test_probe_registry_needs_packs() {
        let mut buf = Vec::new();
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 4);
        push_str(&mut buf, "probes");
        push_u32(&mut buf, 11811);
        push_u32(&mut buf, 0);
        let mut r = BinaryReader::new(&buf);
        assert!(matches!(
            ProbeRegistry::read(&mut r),
            Err(Error::FormatViolation { .. })
        ));
    }
}
