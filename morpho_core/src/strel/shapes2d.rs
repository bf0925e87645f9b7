/*
This file is part of morpho_core.
Copyright (C) 2026 the morpho_core contributors

morpho_core is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
//! 2D structuring-element catalogue (spec §4.3, §6's `Shape2D`).

use super::van_herk::line_extreme;
use super::Strel;
use crate::error::MorphResult;
use crate::raster::Raster;

/// The direction and length of a line-shaped structuring element, shared by
/// [`Line`] (2D) and its 3D counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub dir: (i64, i64, i64),
    pub len: usize,
    anchor_from_start: usize,
}

impl Line {
    pub fn new(dir: (i64, i64, i64), len: usize) -> Self {
        assert!(len > 0, "a line must have at least one pixel");
        Line {
            dir,
            len,
            anchor_from_start: len / 2,
        }
    }

    pub fn horizontal(len: usize) -> Self {
        Line::new((1, 0, 0), len)
    }

    pub fn vertical(len: usize) -> Self {
        Line::new((0, 1, 0), len)
    }

    pub fn diag45(len: usize) -> Self {
        Line::new((1, 1, 0), len)
    }

    pub fn diag135(len: usize) -> Self {
        Line::new((1, -1, 0), len)
    }

    pub(crate) fn with_anchor_from_start(dir: (i64, i64, i64), len: usize, anchor_from_start: usize) -> Self {
        Line {
            dir,
            len,
            anchor_from_start,
        }
    }

    pub(crate) fn extreme(&self, raster: &Raster, want_max: bool) -> Raster {
        line_extreme(raster, self.dir, self.len, self.anchor_from_start, want_max)
    }

    /// The concrete (non-boxed) point reflection of this line, for callers
    /// (like [`super::shapes3d::Extruded2D`]) that compose lines directly
    /// instead of going through the `Strel` trait object.
    pub(crate) fn reversed(&self) -> Line {
        Line {
            dir: self.dir,
            len: self.len,
            anchor_from_start: self.len - 1 - self.anchor_from_start,
        }
    }
}

impl Strel for Line {
    fn is_3d(&self) -> bool {
        self.dir.2 != 0
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        (0..self.len)
            .map(|i| {
                let k = i as i64 - self.anchor_from_start as i64;
                (self.dir.0 * k, self.dir.1 * k, self.dir.2 * k)
            })
            .collect()
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(self.reversed())
    }

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(self.is_3d(), raster)?;
        Ok(self.extreme(raster, true))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(self.is_3d(), raster)?;
        Ok(self.extreme(raster, false))
    }
}

/// A `side`x`side` square, decomposed into a horizontal then a vertical line
/// pass (each O(N) via [`super::van_herk`]) instead of an O(`side`^2) naive
/// offset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    side: usize,
    anchor_from_start: usize,
}

impl Square {
    pub fn new(side: usize) -> Self {
        assert!(side > 0);
        Square {
            side,
            anchor_from_start: side / 2,
        }
    }

    fn lines(&self) -> (Line, Line) {
        let mk = |dir| Line {
            dir,
            len: self.side,
            anchor_from_start: self.anchor_from_start,
        };
        (mk((1, 0, 0)), mk((0, 1, 0)))
    }
}

impl Strel for Square {
    fn is_3d(&self) -> bool {
        false
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let (h, v) = self.lines();
        let mut out = Vec::with_capacity(self.side * self.side);
        for &(hx, _, _) in &h.shifts() {
            for &(_, vy, _) in &v.shifts() {
                out.push((hx, vy, 0));
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(Square {
            side: self.side,
            anchor_from_start: self.side - 1 - self.anchor_from_start,
        })
    }

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(false, raster)?;
        let (h, v) = self.lines();
        let tmp = h.extreme(raster, true);
        Ok(v.extreme(&tmp, true))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(false, raster)?;
        let (h, v) = self.lines();
        let tmp = h.extreme(raster, false);
        Ok(v.extreme(&tmp, false))
    }
}

/// Radius-based shape, inherently point-symmetric: its offset set is
/// defined by a distance predicate from the true origin, so it never needs
/// a distinct reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusKind2D {
    Diamond,
    Disk,
    Octagon,
    Cross3x3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusShape2D {
    kind: RadiusKind2D,
    radius: usize,
}

impl RadiusShape2D {
    fn predicate(&self, dx: i64, dy: i64) -> bool {
        match self.kind {
            RadiusKind2D::Cross3x3 => (dx == 0 || dy == 0) && dx.abs() + dy.abs() <= 1,
            RadiusKind2D::Diamond => dx.abs() + dy.abs() <= self.radius as i64,
            RadiusKind2D::Disk => {
                let r = self.radius as f64;
                ((dx * dx + dy * dy) as f64) <= r * r
            }
            RadiusKind2D::Octagon => {
                let r = self.radius as i64;
                dx.abs() <= r && dy.abs() <= r && dx.abs() + dy.abs() <= (3 * r) / 2
            }
        }
    }
}

impl Strel for RadiusShape2D {
    fn is_3d(&self) -> bool {
        false
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let r = match self.kind {
            RadiusKind2D::Cross3x3 => 1,
            _ => self.radius as i64,
        };
        let mut out = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if self.predicate(dx, dy) {
                    out.push((dx, dy, 0));
                }
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(*self)
    }
}

/// A disk of the given radius (`dx^2 + dy^2 <= radius^2`).
pub fn disk(radius: usize) -> RadiusShape2D {
    RadiusShape2D {
        kind: RadiusKind2D::Disk,
        radius,
    }
}

/// A cityblock diamond of the given radius (`|dx| + |dy| <= radius`).
pub fn diamond(radius: usize) -> RadiusShape2D {
    RadiusShape2D {
        kind: RadiusKind2D::Diamond,
        radius,
    }
}

/// An octagon approximating a disk of the given "radius" via alternating
/// square/diamond constraints.
pub fn octagon(radius: usize) -> RadiusShape2D {
    RadiusShape2D {
        kind: RadiusKind2D::Octagon,
        radius,
    }
}

/// The minimal 3x3 plus-shaped neighborhood (4-connectivity plus centre).
pub fn cross3x3() -> RadiusShape2D {
    RadiusShape2D {
        kind: RadiusKind2D::Cross3x3,
        radius: 1,
    }
}

/// The complete enumerable catalogue of built-in 2D shapes, for hosts that
/// select a shape by name/parameter rather than constructing one directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape2D {
    Square { side: usize },
    Diamond { radius: usize },
    Octagon { radius: usize },
    Disk { radius: usize },
    Cross3x3,
    LineHorizontal { len: usize },
    LineVertical { len: usize },
    LineDiag45 { len: usize },
    LineDiag135 { len: usize },
}

pub fn build(shape: Shape2D) -> Box<dyn Strel> {
    match shape {
        Shape2D::Square { side } => Box::new(Square::new(side)),
        Shape2D::Diamond { radius } => Box::new(diamond(radius)),
        Shape2D::Octagon { radius } => Box::new(octagon(radius)),
        Shape2D::Disk { radius } => Box::new(disk(radius)),
        Shape2D::Cross3x3 => Box::new(cross3x3()),
        Shape2D::LineHorizontal { len } => Box::new(Line::horizontal(len)),
        Shape2D::LineVertical { len } => Box::new(Line::vertical(len)),
        Shape2D::LineDiag45 { len } => Box::new(Line::diag45(len)),
        Shape2D::LineDiag135 { len } => Box::new(Line::diag135(len)),
    }
}

/// Applies a disk to `raster`: the fast distance-based binary path when the
/// input is already known binary (see [`crate::distance`]), the general
/// offset-list path otherwise.
pub fn dilate_disk_or_fallback(radius: usize, raster: &Raster) -> MorphResult<Raster> {
    if raster.is_binary() {
        crate::distance::binary_dilation_disk(raster, radius)
    } else {
        disk(radius).dilation(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;

    #[test]
    fn line_reverse_flips_even_length_anchor() {
        let line = Line::horizontal(4);
        assert_eq!(line.shifts(), vec![(-2, 0, 0), (-1, 0, 0), (0, 0, 0), (1, 0, 0)]);
        let rev = line.reverse();
        assert_eq!(rev.shifts(), vec![(-1, 0, 0), (0, 0, 0), (1, 0, 0), (2, 0, 0)]);
    }

    #[test]
    fn odd_line_is_self_symmetric() {
        let line = Line::horizontal(5);
        let rev = line.reverse();
        let mut fwd = line.shifts();
        let mut back = rev.shifts();
        fwd.sort();
        back.sort();
        assert_eq!(fwd, back);
    }

    #[test]
    fn square_decomposition_matches_naive() {
        let square = Square::new(3);
        let mut r = Raster::new_2d(6, 6, ElementKind::U8);
        r.set_f64(3, 3, 0, 100.0).unwrap();
        let fast = square.dilation(&r).unwrap();
        let naive = super::super::naive_dilation(&r, &square.shifts());
        assert_eq!(fast, naive);
    }

    #[test]
    fn disk_is_self_reverse() {
        let disk = disk(2);
        let mut shifts = disk.shifts();
        let mut rev = disk.reverse().shifts();
        shifts.sort();
        rev.sort();
        assert_eq!(shifts, rev);
    }

    #[test]
    fn octagon_contains_diamond_and_excludes_square_corners() {
        let oct = octagon(2);
        let shifts = oct.shifts();
        assert!(shifts.contains(&(0, 0, 0)));
        assert!(!shifts.contains(&(2, 2, 0))); // corner excluded by the cut
        assert!(shifts.contains(&(2, 0, 0)));
    }

    #[test]
    fn build_from_shape2d_dispatches_correctly() {
        let strel = build(Shape2D::Cross3x3);
        assert_eq!(strel.size(), 5);
    }
}
