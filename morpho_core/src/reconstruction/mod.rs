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
//! Geodesic morphological reconstruction (spec §4.4).
//!
//! Implements Vincent's hybrid sequential/queue algorithm: a forward raster
//! scan, a backward raster scan that also seeds a FIFO queue at pixels whose
//! value could still propagate, then a queue-driven fix-up pass that
//! finishes the job in roughly one extra pass over the pixels it actually
//! touches instead of iterating the whole raster to a fixed point.

use crate::error::{MorphError, MorphResult};
use crate::raster::neighborhood::Connectivity;
use crate::raster::Raster;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconstructionKind {
    ByDilation,
    ByErosion,
}

fn check_preconditions(marker: &Raster, mask: &Raster, kind: ReconstructionKind) -> MorphResult<()> {
    if marker.dims() != mask.dims() {
        return Err(MorphError::ShapeMismatch {
            message: "marker and mask must share dimensions".into(),
        });
    }
    if marker.element_kind() != mask.element_kind() {
        return Err(MorphError::ShapeMismatch {
            message: "marker and mask must share an element kind".into(),
        });
    }
    let violated = match kind {
        ReconstructionKind::ByDilation => (0..marker.len())
            .any(|i| marker.get_f64_unchecked(i) > mask.get_f64_unchecked(i)),
        ReconstructionKind::ByErosion => (0..marker.len())
            .any(|i| marker.get_f64_unchecked(i) < mask.get_f64_unchecked(i)),
    };
    if violated {
        let relation = match kind {
            ReconstructionKind::ByDilation => "marker <= mask",
            ReconstructionKind::ByErosion => "marker >= mask",
        };
        return Err(MorphError::PreconditionViolated {
            message: format!("reconstruction requires {} everywhere", relation),
        });
    }
    Ok(())
}

/// Reconstructs `marker` under `mask` by repeated geodesic dilation until
/// idempotence, via Vincent's algorithm. Precondition: `marker <= mask`
/// pointwise.
pub fn reconstruct_by_dilation(
    marker: &Raster,
    mask: &Raster,
    conn: impl Into<Connectivity>,
) -> MorphResult<Raster> {
    reconstruct(marker, mask, conn.into(), ReconstructionKind::ByDilation)
}

/// Reconstructs `marker` over `mask` by repeated geodesic erosion until
/// idempotence. Precondition: `marker >= mask` pointwise.
pub fn reconstruct_by_erosion(
    marker: &Raster,
    mask: &Raster,
    conn: impl Into<Connectivity>,
) -> MorphResult<Raster> {
    reconstruct(marker, mask, conn.into(), ReconstructionKind::ByErosion)
}

fn reconstruct(
    marker: &Raster,
    mask: &Raster,
    conn: Connectivity,
    kind: ReconstructionKind,
) -> MorphResult<Raster> {
    conn.validate(mask)?;
    check_preconditions(marker, mask, kind)?;

    let mut out = marker.duplicate();
    let dims = out.dims();
    let (sx, sy, sz) = dims;
    let by_dilation = kind == ReconstructionKind::ByDilation;
    let extreme = |a: f64, b: f64| if by_dilation { a.max(b) } else { a.min(b) };
    let clamp_to_mask = |v: f64, m: f64| if by_dilation { v.min(m) } else { v.max(m) };
    let dominates = |a: f64, b: f64| if by_dilation { a > b } else { a < b };

    let causal = conn.causal_offsets();
    let anti_causal = conn.anti_causal_offsets();

    // forward scan: pull in causal-neighbor extrema, clamp to the mask
    for z in 0..sz as i64 {
        for y in 0..sy as i64 {
            for x in 0..sx as i64 {
                let idx = out.index_unchecked(x as usize, y as usize, z as usize);
                let mut v = out.get_f64_unchecked(idx);
                for &(dx, dy, dz) in &causal {
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    if out.in_bounds(nx, ny, nz) {
                        let nidx = out.index_unchecked(nx as usize, ny as usize, nz as usize);
                        v = extreme(v, out.get_f64_unchecked(nidx));
                    }
                }
                v = clamp_to_mask(v, mask.get_f64_unchecked(idx));
                out.set_f64_unchecked(idx, v);
            }
        }
    }

    // backward scan: pull in anti-causal-neighbor extrema, clamp to the
    // mask, and seed the fix-up queue wherever a neighbor could still
    // propagate further than the raster scan order allowed.
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut queued = vec![false; out.len()];
    for z in (0..sz as i64).rev() {
        for y in (0..sy as i64).rev() {
            for x in (0..sx as i64).rev() {
                let idx = out.index_unchecked(x as usize, y as usize, z as usize);
                let mut v = out.get_f64_unchecked(idx);
                for &(dx, dy, dz) in &anti_causal {
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    if out.in_bounds(nx, ny, nz) {
                        let nidx = out.index_unchecked(nx as usize, ny as usize, nz as usize);
                        v = extreme(v, out.get_f64_unchecked(nidx));
                    }
                }
                v = clamp_to_mask(v, mask.get_f64_unchecked(idx));
                out.set_f64_unchecked(idx, v);

                for &(dx, dy, dz) in &anti_causal {
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    if !out.in_bounds(nx, ny, nz) {
                        continue;
                    }
                    let nidx = out.index_unchecked(nx as usize, ny as usize, nz as usize);
                    let n_mask = mask.get_f64_unchecked(nidx);
                    let n_val = out.get_f64_unchecked(nidx);
                    if dominates(v, n_val) && n_mask != n_val && !queued[nidx] {
                        queue.push_back(nidx);
                        queued[nidx] = true;
                    }
                }
            }
        }
    }

    // queue fix-up: propagate until no pixel can change any further
    while let Some(p_idx) = queue.pop_front() {
        queued[p_idx] = false;
        let (px, py, pz) = unflatten(p_idx, sx, sy);
        let p_val = out.get_f64_unchecked(p_idx);
        for &(dx, dy, dz) in &conn.offsets() {
            let (nx, ny, nz) = (px as i64 + dx, py as i64 + dy, pz as i64 + dz);
            if !out.in_bounds(nx, ny, nz) {
                continue;
            }
            let nidx = out.index_unchecked(nx as usize, ny as usize, nz as usize);
            let n_val = out.get_f64_unchecked(nidx);
            let n_mask = mask.get_f64_unchecked(nidx);
            if dominates(p_val, n_val) && n_mask != n_val {
                let updated = clamp_to_mask(p_val, n_mask);
                out.set_f64_unchecked(nidx, updated);
                if !queued[nidx] {
                    queue.push_back(nidx);
                    queued[nidx] = true;
                }
            }
        }
    }

    Ok(out)
}

fn unflatten(idx: usize, sx: usize, sy: usize) -> (usize, usize, usize) {
    let z = idx / (sx * sy);
    let rem = idx % (sx * sy);
    let y = rem / sx;
    let x = rem % sx;
    (x, y, z)
}

/// `keep_largest_region`/`fill_small_holes`-style convenience: fills holes
/// in a binary raster via reconstruction by erosion from a border-seeded
/// marker (spec §4.3a).
///
/// The marker starts at the element kind's max value everywhere except the
/// border (which is copied from `raster`), then reconstruction by erosion
/// under `raster` pulls the interior down to meet any hole that connects to
/// the border, leaving interior holes filled.
pub fn fill_holes(raster: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    conn.validate(raster)?;
    let (sx, sy, sz) = raster.dims();
    let mut marker = Raster::new_3d(sx, sy, sz, raster.element_kind());
    let max_v = raster.max_value();
    for i in 0..marker.len() {
        marker.set_f64_unchecked(i, max_v);
    }
    for z in 0..sz {
        for y in 0..sy {
            for x in 0..sx {
                let border_z = sz > 1 && (z == 0 || z == sz - 1);
                let on_border = x == 0 || y == 0 || x == sx - 1 || y == sy - 1 || border_z;
                if on_border {
                    let idx = marker.index_unchecked(x, y, z);
                    marker.set_f64_unchecked(idx, raster.get_f64_unchecked(idx));
                }
            }
        }
    }
    reconstruct_by_erosion(&marker, raster, conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;
    use crate::raster::neighborhood::Connectivity2D;
    use crate::raster::Region;

    #[test]
    fn reconstruction_by_dilation_keeps_only_marker_connected_peaks() {
        // E3: two plateaus in the mask, only one carries a marker seed.
        let mut mask = Raster::new_2d(10, 3, ElementKind::U8);
        mask.fill(
            Region {
                x0: 0,
                y0: 0,
                z0: 0,
                x1: 3,
                y1: 3,
                z1: 1,
            },
            200.0,
        );
        mask.fill(
            Region {
                x0: 6,
                y0: 0,
                z0: 0,
                x1: 9,
                y1: 3,
                z1: 1,
            },
            200.0,
        );
        let mut marker = Raster::new_2d(10, 3, ElementKind::U8);
        marker.set_f64(1, 1, 0, 200.0).unwrap();

        let out = reconstruct_by_dilation(&marker, &mask, Connectivity2D::C8).unwrap();
        assert_eq!(out.get_f64(1, 1, 0).unwrap(), 200.0);
        assert_eq!(out.get_f64(7, 1, 0).unwrap(), 0.0); // un-seeded plateau stays down
    }

    #[test]
    fn reconstruction_result_is_bounded_by_mask() {
        // invariant 4: reconstruct(marker, mask) <= mask everywhere (by dilation)
        let mut mask = Raster::new_2d(8, 8, ElementKind::U8);
        for i in 0..mask.len() {
            mask.set_f64_unchecked(i, ((i * 37) % 200) as f64);
        }
        let mut marker = mask.duplicate();
        for i in 0..marker.len() {
            let v = marker.get_f64_unchecked(i);
            marker.set_f64_unchecked(i, (v - 10.0).max(0.0));
        }
        let out = reconstruct_by_dilation(&marker, &mask, Connectivity2D::C4).unwrap();
        for i in 0..out.len() {
            assert!(out.get_f64_unchecked(i) <= mask.get_f64_unchecked(i));
        }
    }

    #[test]
    fn reconstruction_is_idempotent() {
        // invariant 4 (idempotence half)
        let mut mask = Raster::new_2d(6, 6, ElementKind::U8);
        mask.fill(
            Region {
                x0: 1,
                y0: 1,
                z0: 0,
                x1: 5,
                y1: 5,
                z1: 1,
            },
            150.0,
        );
        let mut marker = Raster::new_2d(6, 6, ElementKind::U8);
        marker.set_f64(2, 2, 0, 150.0).unwrap();
        let once = reconstruct_by_dilation(&marker, &mask, Connectivity2D::C4).unwrap();
        let twice = reconstruct_by_dilation(&once, &mask, Connectivity2D::C4).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn marker_above_mask_violates_precondition() {
        let mask = Raster::new_2d(3, 3, ElementKind::U8);
        let mut marker = Raster::new_2d(3, 3, ElementKind::U8);
        marker.set_f64(1, 1, 0, 10.0).unwrap();
        assert!(matches!(
            reconstruct_by_dilation(&marker, &mask, Connectivity2D::C4),
            Err(MorphError::PreconditionViolated { .. })
        ));
    }

    #[test]
    fn fill_holes_closes_an_interior_hole_but_not_a_border_notch() {
        // E4
        let mut r = Raster::new_2d(7, 7, ElementKind::U8);
        r.fill(
            Region {
                x0: 1,
                y0: 1,
                z0: 0,
                x1: 6,
                y1: 6,
                z1: 1,
            },
            255.0,
        );
        r.set_f64(3, 3, 0, 0.0).unwrap(); // interior hole
        let out = fill_holes(&r, Connectivity2D::C4).unwrap();
        assert_eq!(out.get_f64(3, 3, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0); // border background untouched
    }

}
