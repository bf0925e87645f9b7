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
//! 3D structuring-element catalogue (spec §4.3, §6's `Shape3D`).

use super::shapes2d::Line;
use super::Strel;
use crate::error::MorphResult;
use crate::raster::Raster;

/// A `side`x`side`x`side` cube, decomposed into three orthogonal line passes
/// instead of an O(`side`^3) naive offset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cube {
    side: usize,
    anchor_from_start: usize,
}

impl Cube {
    pub fn new(side: usize) -> Self {
        assert!(side > 0);
        Cube {
            side,
            anchor_from_start: side / 2,
        }
    }

    fn lines(&self) -> (Line, Line, Line) {
        let mk = |dir| Line::with_anchor_from_start(dir, self.side, self.anchor_from_start);
        (mk((1, 0, 0)), mk((0, 1, 0)), mk((0, 0, 1)))
    }
}

impl Strel for Cube {
    fn is_3d(&self) -> bool {
        true
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let (lx, ly, lz) = self.lines();
        let mut out = Vec::with_capacity(self.side * self.side * self.side);
        for &(x, _, _) in &lx.shifts() {
            for &(_, y, _) in &ly.shifts() {
                for &(_, _, z) in &lz.shifts() {
                    out.push((x, y, z));
                }
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(Cube {
            side: self.side,
            anchor_from_start: self.side - 1 - self.anchor_from_start,
        })
    }

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let (lx, ly, lz) = self.lines();
        let t1 = lx.extreme(raster, true);
        let t2 = ly.extreme(&t1, true);
        Ok(lz.extreme(&t2, true))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let (lx, ly, lz) = self.lines();
        let t1 = lx.extreme(raster, false);
        let t2 = ly.extreme(&t1, false);
        Ok(lz.extreme(&t2, false))
    }
}

/// Independent per-axis radii, decomposed the same way as [`Cube`]. Useful
/// when the 3D footprint isn't isotropic (e.g. anisotropic voxel spacing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cuboid {
    rx: usize,
    ry: usize,
    rz: usize,
}

impl Cuboid {
    pub fn new(rx: usize, ry: usize, rz: usize) -> Self {
        Cuboid { rx, ry, rz }
    }

    fn lines(&self) -> (Line, Line, Line) {
        (
            Line::new((1, 0, 0), 2 * self.rx + 1),
            Line::new((0, 1, 0), 2 * self.ry + 1),
            Line::new((0, 0, 1), 2 * self.rz + 1),
        )
    }
}

impl Strel for Cuboid {
    fn is_3d(&self) -> bool {
        true
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let (lx, ly, lz) = self.lines();
        let mut out = Vec::new();
        for &(x, _, _) in &lx.shifts() {
            for &(_, y, _) in &ly.shifts() {
                for &(_, _, z) in &lz.shifts() {
                    out.push((x, y, z));
                }
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(*self) // every axis radius is centred: odd length, self-symmetric
    }

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let (lx, ly, lz) = self.lines();
        let t1 = lx.extreme(raster, true);
        let t2 = ly.extreme(&t1, true);
        Ok(lz.extreme(&t2, true))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let (lx, ly, lz) = self.lines();
        let t1 = lx.extreme(raster, false);
        let t2 = ly.extreme(&t1, false);
        Ok(lz.extreme(&t2, false))
    }
}

/// Radius-based 3D shape, point-symmetric by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusKind3D {
    Ball,
    Ellipsoid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusShape3D {
    kind: RadiusKind3D,
    rx: usize,
    ry: usize,
    rz: usize,
}

impl RadiusShape3D {
    fn predicate(&self, dx: i64, dy: i64, dz: i64) -> bool {
        match self.kind {
            RadiusKind3D::Ball => {
                let r = self.rx as f64; // ball uses a single radius; rx holds it
                ((dx * dx + dy * dy + dz * dz) as f64) <= r * r
            }
            RadiusKind3D::Ellipsoid => {
                let (a, b, c) = (self.rx as f64, self.ry as f64, self.rz as f64);
                if a == 0.0 || b == 0.0 || c == 0.0 {
                    return dx == 0 && dy == 0 && dz == 0;
                }
                let nx = dx as f64 / a;
                let ny = dy as f64 / b;
                let nz = dz as f64 / c;
                nx * nx + ny * ny + nz * nz <= 1.0
            }
        }
    }

    fn bound(&self) -> (i64, i64, i64) {
        match self.kind {
            RadiusKind3D::Ball => (self.rx as i64, self.rx as i64, self.rx as i64),
            RadiusKind3D::Ellipsoid => (self.rx as i64, self.ry as i64, self.rz as i64),
        }
    }
}

impl Strel for RadiusShape3D {
    fn is_3d(&self) -> bool {
        true
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let (bx, by, bz) = self.bound();
        let mut out = Vec::new();
        for dz in -bz..=bz {
            for dy in -by..=by {
                for dx in -bx..=bx {
                    if self.predicate(dx, dy, dz) {
                        out.push((dx, dy, dz));
                    }
                }
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(*self)
    }
}

/// A ball of the given radius (`dx^2 + dy^2 + dz^2 <= radius^2`).
pub fn ball(radius: usize) -> RadiusShape3D {
    RadiusShape3D {
        kind: RadiusKind3D::Ball,
        rx: radius,
        ry: radius,
        rz: radius,
    }
}

/// An axis-aligned ellipsoid with independent semi-axes.
pub fn ellipsoid(rx: usize, ry: usize, rz: usize) -> RadiusShape3D {
    RadiusShape3D {
        kind: RadiusKind3D::Ellipsoid,
        rx,
        ry,
        rz,
    }
}

/// A 2D shape extruded along z by `depth`: the 2D shape applied slice-wise
/// (parallelised across slices with `rayon`, the one place this engine
/// exploits independent z-slices), composed with an axial line pass.
pub struct Extruded2D {
    base: Box<dyn Strel>,
    axial: Line,
}

impl Extruded2D {
    pub fn new(base: Box<dyn Strel>, depth: usize) -> Self {
        assert!(!base.is_3d(), "the base shape of an extrusion must be 2D");
        Extruded2D {
            base,
            axial: Line::new((0, 0, 1), depth),
        }
    }

    fn slicewise(&self, raster: &Raster, dilate: bool) -> MorphResult<Raster> {
        use rayon::prelude::*;
        let (sx, sy, sz) = raster.dims();
        let mut out = raster.duplicate();
        let slices: Vec<MorphResult<Raster>> = (0..sz)
            .into_par_iter()
            .map(|z| {
                let mut slice = Raster::new_2d(sx, sy, raster.element_kind());
                for y in 0..sy {
                    for x in 0..sx {
                        let v = raster.get_f64_unchecked(raster.index_unchecked(x, y, z));
                        slice.set_f64_unchecked(slice.index_unchecked(x, y, 0), v);
                    }
                }
                if dilate {
                    self.base.dilation(&slice)
                } else {
                    self.base.erosion(&slice)
                }
            })
            .collect();
        for (z, slice) in slices.into_iter().enumerate() {
            let slice = slice?;
            for y in 0..sy {
                for x in 0..sx {
                    let v = slice.get_f64_unchecked(slice.index_unchecked(x, y, 0));
                    out.set_f64_unchecked(out.index_unchecked(x, y, z), v);
                }
            }
        }
        Ok(out)
    }
}

impl Strel for Extruded2D {
    fn is_3d(&self) -> bool {
        true
    }

    fn shifts(&self) -> Vec<(i64, i64, i64)> {
        let mut out = Vec::new();
        for &(x, y, _) in &self.base.shifts() {
            for &(_, _, z) in &self.axial.shifts() {
                out.push((x, y, z));
            }
        }
        out
    }

    fn reverse(&self) -> Box<dyn Strel> {
        Box::new(Extruded2D {
            base: self.base.reverse(),
            axial: self.axial.reversed(),
        })
    }

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let per_slice = self.slicewise(raster, true)?;
        Ok(self.axial.extreme(&per_slice, true))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        super::check_dimension(true, raster)?;
        let per_slice = self.slicewise(raster, false)?;
        Ok(self.axial.extreme(&per_slice, false))
    }
}

/// The complete enumerable catalogue of built-in 3D shapes.
#[derive(Debug, Clone, Copy)]
pub enum Shape3D {
    Cube { side: usize },
    Cuboid { rx: usize, ry: usize, rz: usize },
    Ball { radius: usize },
    Ellipsoid { rx: usize, ry: usize, rz: usize },
    LineX { len: usize },
    LineY { len: usize },
    LineZ { len: usize },
}

pub fn build(shape: Shape3D) -> Box<dyn Strel> {
    match shape {
        Shape3D::Cube { side } => Box::new(Cube::new(side)),
        Shape3D::Cuboid { rx, ry, rz } => Box::new(Cuboid::new(rx, ry, rz)),
        Shape3D::Ball { radius } => Box::new(ball(radius)),
        Shape3D::Ellipsoid { rx, ry, rz } => Box::new(ellipsoid(rx, ry, rz)),
        Shape3D::LineX { len } => Box::new(Line::new((1, 0, 0), len)),
        Shape3D::LineY { len } => Box::new(Line::new((0, 1, 0), len)),
        Shape3D::LineZ { len } => Box::new(Line::new((0, 0, 1), len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;

    #[test]
    fn cube_decomposition_matches_naive() {
        let cube = Cube::new(3);
        let mut r = Raster::new_3d(5, 5, 5, ElementKind::U8);
        r.set_f64(2, 2, 2, 100.0).unwrap();
        let fast = cube.dilation(&r).unwrap();
        let naive = super::super::naive_dilation(&r, &cube.shifts());
        assert_eq!(fast, naive);
    }

    #[test]
    fn ball_is_self_reverse() {
        let b = ball(2);
        let mut fwd = b.shifts();
        let mut rev = b.reverse().shifts();
        fwd.sort();
        rev.sort();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn shape3d_on_2d_raster_is_rejected() {
        let cube = Cube::new(3);
        let r2d = Raster::new_2d(4, 4, ElementKind::U8);
        assert!(cube.dilation(&r2d).is_err());
    }

    #[test]
    fn extruded_2d_matches_depth_along_z() {
        let base = super::super::shapes2d::cross3x3();
        let strel = Extruded2D::new(Box::new(base), 3);
        let mut r = Raster::new_3d(5, 5, 5, ElementKind::U8);
        r.set_f64(2, 2, 2, 255.0).unwrap();
        let out = strel.dilation(&r).unwrap();
        assert_eq!(out.get_f64(2, 2, 1).unwrap(), 255.0);
        assert_eq!(out.get_f64(2, 2, 3).unwrap(), 255.0);
        assert_eq!(out.get_f64(2, 2, 0).unwrap(), 0.0);
        assert_eq!(out.get_f64(1, 2, 2).unwrap(), 255.0);
    }
}
