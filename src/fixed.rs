// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/fixed.rs - Hundredths fixed-point scalars used by Tebo-ICT files.
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
use std::ops::{Add, Sub};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::geometry::{Box2, Vector2};

const DECIMAL_PLACES: u32 = 2;
const SCALE: i32 = 100;

/// A signed length stored as a count of hundredths.
///
/// Arithmetic and ordering work on the raw integer, so repeated sums never
/// drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed32(i32);

impl Fixed32 {
    pub const ZERO: Fixed32 = Fixed32(0);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Rounds `value` to the nearest hundredth.
    pub fn from_value(value: f64) -> Self {
        Self((value * f64::from(SCALE)).round() as i32)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// The integer part, truncated toward zero.
    pub const fn int(self) -> i32 {
        self.0 / SCALE
    }

    /// The absolute fractional part, in hundredths.
    pub const fn frac(self) -> i32 {
        (self.0 % SCALE).abs()
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(i64::from(self.0), DECIMAL_PLACES)
    }

    /// Converts to the canonical model's mil scale.
    pub fn to_mils(self) -> f64 {
        self.to_decimal().to_f64().unwrap_or_default()
    }
}

impl fmt::Display for Fixed32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Fixed32 {
    type Output = Fixed32;
    fn add(self, rhs: Fixed32) -> Fixed32 {
        Fixed32(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed32 {
    type Output = Fixed32;
    fn sub(self, rhs: Fixed32) -> Fixed32 {
        Fixed32(self.0.wrapping_sub(rhs.0))
    }
}

/// A point made of two fixed-point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Vector2S {
    pub x: Fixed32,
    pub y: Fixed32,
}

impl Vector2S {
    pub const fn new(x: Fixed32, y: Fixed32) -> Self {
        Self { x, y }
    }

    pub fn to_mils(self) -> Vector2 {
        Vector2::new(self.x.to_mils(), self.y.to_mils())
    }
}

impl fmt::Display for Vector2S {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A bounding box in fixed-point coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Box2S {
    pub min: Vector2S,
    pub max: Vector2S,
}

impl Box2S {
    pub fn size(&self) -> Vector2S {
        Vector2S::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }

    pub fn to_mils(self) -> Box2 {
        Box2::new(self.min.to_mils(), self.max.to_mils())
    }
}
