// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/outline.rs - Board outline reconstruction from loose edges.
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
 * # `outline` Module
 *
 * Turns an unordered set of undirected edges into ordered vertex loops and
 * picks the outermost one as the board outline.
 *
 * ## Usage Example
 *
 * ```
 * use brdconv::geometry::{Edge2, Vector2};
 * use brdconv::outline::OutlineBuilder;
 *
 * let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
 * let mut builder = OutlineBuilder::new();
 * for i in 0..corners.len() {
 *     let (ax, ay) = corners[i];
 *     let (bx, by) = corners[(i + 1) % corners.len()];
 *     builder.add_edge(Edge2::new(Vector2::new(ax, ay), Vector2::new(bx, by))).unwrap();
 * }
 * assert_eq!(builder.build().len(), 4);
 * ```
 */

use std::collections::{HashMap, VecDeque};

use crate::error::{Error, Result};
use crate::geometry::{Box2, Edge2, Vector2};

type Loop = VecDeque<usize>;

#[derive(Debug)]
struct Vertex {
    pos: Vector2,
    neighbors: [Option<usize>; 2],
}

impl Vertex {
    fn add_neighbor(&mut self, index: usize) -> bool {
        match self.neighbors.iter_mut().find(|n| n.is_none()) {
            Some(slot) => {
                *slot = Some(index);
                true
            }
            None => false,
        }
    }

    /// The neighbor that is not `prev`, if any.
    fn next(&self, prev: usize) -> Option<usize> {
        self.neighbors.iter().flatten().copied().find(|&n| n != prev)
    }
}

/// Collects edges and reconstructs the enclosing outline.
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    vertices: Vec<Vertex>,
    lookup: HashMap<(u64, u64), usize>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(v: Vector2) -> (u64, u64) {
        // Adding zero folds -0.0 into 0.0 so both unify.
        ((v.x + 0.0).to_bits(), (v.y + 0.0).to_bits())
    }

    fn find_vertex(&mut self, v: Vector2) -> usize {
        let key = Self::key(v);
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.vertices.len();
        self.vertices.push(Vertex {
            pos: v,
            neighbors: [None; 2],
        });
        self.lookup.insert(key, index);
        index
    }

    /// Adds one undirected edge. Degenerate edges are ignored.
    ///
    /// Fails once any vertex would get a third incident edge.
    pub fn add_edge(&mut self, edge: Edge2) -> Result<()> {
        if Self::key(edge.a) == Self::key(edge.b) {
            return Ok(());
        }
        let ia = self.find_vertex(edge.a);
        let ib = self.find_vertex(edge.b);
        for (from, to, pos) in [(ia, ib, edge.a), (ib, ia, edge.b)] {
            if !self.vertices[from].add_neighbor(to) {
                return Err(Error::violation(format!(
                    "vertex ({pos}) is shared by more than 2 edges"
                )));
            }
        }
        Ok(())
    }

    fn next_loop(&self, visited: &mut [bool], entry: usize) -> Loop {
        let mut lp = Loop::new();

        let mut index = Some(entry);
        let mut prev = entry;
        while let Some(i) = index {
            if visited[i] {
                // Closed loop.
                return lp;
            }
            lp.push_back(i);
            visited[i] = true;
            index = self.vertices[i].next(prev);
            prev = i;
        }

        // Dead end. The seed may have been in the middle of an open chain,
        // so walk the other way from it too.
        if lp.len() > 1 {
            let mut index = self.vertices[entry].next(lp[1]);
            let mut prev = entry;
            while let Some(i) = index {
                if visited[i] {
                    break;
                }
                lp.push_front(i);
                visited[i] = true;
                index = self.vertices[i].next(prev);
                prev = i;
            }
        }
        lp
    }

    fn loop_bbox(&self, lp: &Loop) -> Box2 {
        let mut bbox = Box2::EMPTY;
        for &i in lp {
            bbox.merge(self.vertices[i].pos);
        }
        bbox
    }

    /// Extracts every loop and returns the vertices of the outermost one in
    /// walk order. Returns an empty outline when no edges were added.
    pub fn build(&self) -> Vec<Vector2> {
        if self.vertices.is_empty() {
            return Vec::new();
        }

        let mut visited = vec![false; self.vertices.len()];
        let mut loops = Vec::new();
        while let Some(seed) = visited.iter().position(|&v| !v) {
            loops.push(self.next_loop(&mut visited, seed));
        }

        let first = self.vertices[0].pos;
        let mut best_box = Box2::new(first, first);
        let mut best = 0;
        for (i, lp) in loops.iter().enumerate() {
            let bbox = self.loop_bbox(lp);
            if bbox.contains_box(&best_box) {
                best_box = bbox;
                best = i;
            }
        }

        loops[best]
            .iter()
            .map(|&i| self.vertices[i].pos)
            .collect()
    }
}
