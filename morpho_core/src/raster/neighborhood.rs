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
//! Neighbor iteration and connectivity (spec §4.1, §6).

use crate::error::{MorphError, MorphResult};
use crate::raster::Raster;

/// 2D connectivity, exhaustive per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity2D {
    C4,
    C8,
}

/// 3D connectivity, exhaustive per spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity3D {
    C6,
    C26,
}

/// Internal unification of [`Connectivity2D`]/[`Connectivity3D`] so the
/// flood-fill, reconstruction and labeling engines are written once instead
/// of once per dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    C4,
    C8,
    C6,
    C26,
}

impl From<Connectivity2D> for Connectivity {
    fn from(c: Connectivity2D) -> Self {
        match c {
            Connectivity2D::C4 => Connectivity::C4,
            Connectivity2D::C8 => Connectivity::C8,
        }
    }
}

impl From<Connectivity3D> for Connectivity {
    fn from(c: Connectivity3D) -> Self {
        match c {
            Connectivity3D::C6 => Connectivity::C6,
            Connectivity3D::C26 => Connectivity::C26,
        }
    }
}

impl Connectivity {
    pub fn code(self) -> u8 {
        match self {
            Connectivity::C4 => 4,
            Connectivity::C8 => 8,
            Connectivity::C6 => 6,
            Connectivity::C26 => 26,
        }
    }

    pub fn is_3d(self) -> bool {
        matches!(self, Connectivity::C6 | Connectivity::C26)
    }

    /// Validate `self` against a raster's dimensionality, per spec §4.2:
    /// valid values are `{4, 8}` for a 2D raster, `{6, 26}` for a 3D raster.
    pub fn validate(self, raster: &Raster) -> MorphResult<()> {
        if self.is_3d() != raster.is_3d() {
            return Err(MorphError::InvalidConnectivity(self.code()));
        }
        Ok(())
    }

    /// All offsets of the full neighborhood (never includes the centre).
    pub fn offsets(self) -> Vec<(i64, i64, i64)> {
        match self {
            Connectivity::C4 => vec![(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0)],
            Connectivity::C8 => {
                let mut v = Connectivity::C4.offsets();
                v.extend_from_slice(&[(1, 1, 0), (1, -1, 0), (-1, 1, 0), (-1, -1, 0)]);
                v
            }
            Connectivity::C6 => vec![
                (1, 0, 0),
                (-1, 0, 0),
                (0, 1, 0),
                (0, -1, 0),
                (0, 0, 1),
                (0, 0, -1),
            ],
            Connectivity::C26 => {
                let mut v = Vec::with_capacity(26);
                for dz in -1..=1 {
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if (dx, dy, dz) != (0, 0, 0) {
                                v.push((dx, dy, dz));
                            }
                        }
                    }
                }
                v
            }
        }
    }

    /// The "causal" half of the neighborhood used by reconstruction's
    /// forward raster scan: offsets that precede the centre in scan order
    /// (z, then y, then x).
    pub fn causal_offsets(self) -> Vec<(i64, i64, i64)> {
        self.offsets()
            .into_iter()
            .filter(|&(dx, dy, dz)| (dz, dy, dx) < (0, 0, 0))
            .collect()
    }

    /// The "anti-causal" half used by the backward scan: the point reflection
    /// of [`Self::causal_offsets`].
    pub fn anti_causal_offsets(self) -> Vec<(i64, i64, i64)> {
        self.causal_offsets()
            .into_iter()
            .map(|(dx, dy, dz)| (-dx, -dy, -dz))
            .collect()
    }
}

/// Visit every in-bounds neighbor of `(x, y, z)` under `conn`. Never visits
/// the centre and never yields an out-of-bounds position.
pub fn for_each_neighbor<F: FnMut(i64, i64, i64)>(
    raster: &Raster,
    x: i64,
    y: i64,
    z: i64,
    conn: Connectivity,
    mut f: F,
) {
    for (dx, dy, dz) in conn.offsets() {
        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
        if raster.in_bounds(nx, ny, nz) {
            f(nx, ny, nz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;

    #[test]
    fn c4_has_four_offsets_no_diagonals() {
        let offs = Connectivity::C4.offsets();
        assert_eq!(offs.len(), 4);
        assert!(offs.iter().all(|&(dx, dy, dz)| dz == 0 && dx.abs() + dy.abs() == 1));
    }

    #[test]
    fn c26_excludes_only_centre() {
        let offs = Connectivity::C26.offsets();
        assert_eq!(offs.len(), 26);
        assert!(!offs.contains(&(0, 0, 0)));
    }

    #[test]
    fn c6_is_face_neighbors_only() {
        let offs = Connectivity::C6.offsets();
        assert_eq!(offs.len(), 6);
        assert!(offs
            .iter()
            .all(|&(dx, dy, dz)| dx.abs() + dy.abs() + dz.abs() == 1));
    }

    #[test]
    fn neighbor_iteration_respects_bounds() {
        let r = Raster::new_2d(3, 3, ElementKind::U8);
        let mut seen = Vec::new();
        for_each_neighbor(&r, 0, 0, 0, Connectivity::C8, |x, y, z| seen.push((x, y, z)));
        // corner pixel: only 3 of 8 offsets are in-bounds
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&(x, y, _)| x >= 0 && y >= 0));
    }

    #[test]
    fn invalid_connectivity_for_dimensionality_is_rejected() {
        let r2d = Raster::new_2d(3, 3, ElementKind::U8);
        assert!(Connectivity::C26.validate(&r2d).is_err());
        assert!(Connectivity::C4.validate(&r2d).is_ok());
    }

    #[test]
    fn causal_and_anticausal_are_point_reflections_and_partition_the_neighborhood() {
        let causal = Connectivity::C8.causal_offsets();
        let anti = Connectivity::C8.anti_causal_offsets();
        assert_eq!(causal.len(), 4);
        assert_eq!(anti.len(), 4);
        for (dx, dy, dz) in causal {
            assert!(anti.contains(&(-dx, -dy, -dz)));
        }
    }
}
