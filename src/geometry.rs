// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/geometry.rs - Planar geometry primitives in board space.
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
 * # `geometry` Module
 *
 * Double-precision geometry used by the canonical board model. All lengths
 * are in mils (1/1000 inch).
 */

use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A point or displacement on the board plane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ORIGIN: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the unit vector pointing the same way, or the origin for a
    /// zero-length vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 { Self::ORIGIN } else { self / len }
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        *self = *self + rhs;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;
    fn mul(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Vector2;
    fn div(self, rhs: f64) -> Vector2 {
        Vector2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2 {
    pub min: Vector2,
    pub max: Vector2,
}

impl Box2 {
    /// A box that contains nothing; merging any point into it yields that
    /// point.
    pub const EMPTY: Box2 = Box2 {
        min: Vector2::new(f64::MAX, f64::MAX),
        max: Vector2::new(f64::MIN, f64::MIN),
    };

    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// A box of the given size centered on the origin.
    pub fn from_size(size: Vector2) -> Self {
        Self::new(-size / 2.0, size / 2.0)
    }

    /// A square box of half-width `radius` around `center`.
    pub fn around(center: Vector2, radius: f64) -> Self {
        let r = Vector2::new(radius, radius);
        Self::new(center - r, center + r)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width(), self.height())
    }

    pub fn center(&self) -> Vector2 {
        self.min + self.size() / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Inclusive point containment.
    pub fn contains(&self, v: Vector2) -> bool {
        self.min.x <= v.x && v.x <= self.max.x && self.min.y <= v.y && v.y <= self.max.y
    }

    pub fn contains_box(&self, b: &Box2) -> bool {
        self.contains(b.min) && self.contains(b.max)
    }

    pub fn merge(&mut self, p: Vector2) -> &mut Self {
        self.min = Vector2::new(self.min.x.min(p.x), self.min.y.min(p.y));
        self.max = Vector2::new(self.max.x.max(p.x), self.max.y.max(p.y));
        self
    }

    pub fn merge_box(&mut self, b: &Box2) -> &mut Self {
        self.merge(b.min);
        self.merge(b.max)
    }

    /// The four corners in counter-clockwise order starting at `min`.
    pub fn corners(&self) -> [Vector2; 4] {
        [
            self.min,
            Vector2::new(self.max.x, self.min.y),
            self.max,
            Vector2::new(self.min.x, self.max.y),
        ]
    }
}

impl Default for Box2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Add<Vector2> for Box2 {
    type Output = Box2;
    fn add(self, offset: Vector2) -> Box2 {
        Box2::new(self.min + offset, self.max + offset)
    }
}

/// An undirected segment between two points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edge2 {
    pub a: Vector2,
    pub b: Vector2,
}

impl Edge2 {
    pub const fn new(a: Vector2, b: Vector2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        (self.b - self.a).length()
    }
}

/// A plane angle, kept in radians and normalized into (-2π, 2π).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    fn normalize(radians: f64) -> f64 {
        if radians <= -2.0 * PI {
            radians + (-radians / (2.0 * PI)).round() * 2.0 * PI
        } else if radians >= 2.0 * PI {
            radians - (radians / (2.0 * PI)).round() * 2.0 * PI
        } else {
            radians
        }
    }

    pub fn from_radians(radians: f64) -> Self {
        Self(Self::normalize(radians))
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_radians(degrees.to_radians())
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle::from_radians(self.0 + rhs.0)
    }
}

impl Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(-self.0)
    }
}

/// A 2x3 affine transform: rotation/scale in the first two columns and a
/// translation in the third.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix23 {
    m00: f64,
    m01: f64,
    m02: f64,
    m10: f64,
    m11: f64,
    m12: f64,
}

impl Matrix23 {
    pub const IDENTITY: Matrix23 = Matrix23 {
        m00: 1.0,
        m01: 0.0,
        m02: 0.0,
        m10: 0.0,
        m11: 1.0,
        m12: 0.0,
    };

    pub fn translation(offset: Vector2) -> Self {
        Self {
            m02: offset.x,
            m12: offset.y,
            ..Self::IDENTITY
        }
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotation(angle: Angle) -> Self {
        let (sin, cos) = angle.radians().sin_cos();
        Self {
            m00: cos,
            m01: -sin,
            m10: sin,
            m11: cos,
            ..Self::IDENTITY
        }
    }

    pub fn scaling(factor: Vector2) -> Self {
        Self {
            m00: factor.x,
            m11: factor.y,
            ..Self::IDENTITY
        }
    }
}

impl Mul for Matrix23 {
    type Output = Matrix23;
    fn mul(self, m: Matrix23) -> Matrix23 {
        Matrix23 {
            m00: self.m00 * m.m00 + self.m01 * m.m10,
            m01: self.m00 * m.m01 + self.m01 * m.m11,
            m02: self.m00 * m.m02 + self.m01 * m.m12 + self.m02,
            m10: self.m10 * m.m00 + self.m11 * m.m10,
            m11: self.m10 * m.m01 + self.m11 * m.m11,
            m12: self.m10 * m.m02 + self.m11 * m.m12 + self.m12,
        }
    }
}

impl Mul<Vector2> for Matrix23 {
    type Output = Vector2;
    fn mul(self, v: Vector2) -> Vector2 {
        Vector2::new(
            self.m00 * v.x + self.m01 * v.y + self.m02,
            self.m10 * v.x + self.m11 * v.y + self.m12,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vector2, b: Vector2) {
        assert!((a - b).length() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_box_merge_from_empty() {
        let mut bbox = Box2::EMPTY;
        assert!(bbox.is_empty());
        bbox.merge(Vector2::new(3.0, -1.0));
        bbox.merge(Vector2::new(-2.0, 4.0));
        assert_eq!(bbox.min, Vector2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Vector2::new(3.0, 4.0));
        assert_eq!(bbox.size(), Vector2::new(5.0, 5.0));
    }

    #[test]
    fn test_box_containment() {
        let outer = Box2::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        let inner = Box2::new(Vector2::new(3.0, 3.0), Vector2::new(7.0, 7.0));
        assert!(outer.contains_box(&inner));
        assert!(!inner.contains_box(&outer));
        assert!(outer.contains_box(&outer));
    }

    #[test]
    fn test_box_from_size_is_centered() {
        let bbox = Box2::from_size(Vector2::new(4.0, 2.0));
        assert_eq!(bbox.min, Vector2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Vector2::new(2.0, 1.0));
    }

    #[test]
    fn test_angle_normalization() {
        assert!((Angle::from_degrees(450.0).degrees() - 90.0).abs() < 1e-9);
        assert!((Angle::from_degrees(-360.0).degrees()).abs() < 1e-9);
        assert!((Angle::from_degrees(270.0).degrees() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrix_transforms() {
        let v = Vector2::new(1.0, 0.0);
        assert_close(
            Matrix23::rotation(Angle::from_degrees(90.0)) * v,
            Vector2::new(0.0, 1.0),
        );
        let m = Matrix23::translation(Vector2::new(10.0, 20.0))
            * Matrix23::rotation(Angle::from_degrees(180.0));
        assert_close(m * v, Vector2::new(9.0, 20.0));
        let mirror = Matrix23::scaling(Vector2::new(-1.0, 1.0));
        assert_close(mirror * Vector2::new(2.0, 3.0), Vector2::new(-2.0, 3.0));
    }
}
