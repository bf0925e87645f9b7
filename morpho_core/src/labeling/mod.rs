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
//! Connected-component labeling and its derived binary utilities (spec
//! §4.7).

use crate::error::{MorphError, MorphResult};
use crate::floodfill::flood_fill_into;
use crate::pixel::ElementKind;
use crate::raster::neighborhood::Connectivity;
use crate::raster::Raster;

fn kind_for_bit_depth(bit_depth: u32) -> MorphResult<ElementKind> {
    match bit_depth {
        8 => Ok(ElementKind::U8),
        16 => Ok(ElementKind::U16),
        32 => Ok(ElementKind::F32),
        _ => Err(MorphError::InvalidInput {
            message: format!("unsupported label bit depth {}", bit_depth),
        }),
    }
}

/// Flood-fill-based labeling of a binary raster (spec §4.7): scan order,
/// assign the next label to each unlabeled foreground pixel, and flood-fill
/// it into a fresh label raster of the requested bit depth.
pub fn label(raster: &Raster, conn: impl Into<Connectivity>, bit_depth: u32) -> MorphResult<Raster> {
    let conn = conn.into();
    conn.validate(raster)?;
    let kind = kind_for_bit_depth(bit_depth)?;
    let (sx, sy, sz) = raster.dims();
    let mut labels = Raster::new_3d(sx, sy, sz, kind);
    let max_labels = (1u64 << bit_depth.min(63)) - 1;

    let mut next_label: u64 = 0;
    for z in 0..sz as i64 {
        for y in 0..sy as i64 {
            for x in 0..sx as i64 {
                let idx = raster.index_unchecked(x as usize, y as usize, z as usize);
                if raster.get_f64_unchecked(idx) == 0.0 || labels.get_f64_unchecked(idx) != 0.0 {
                    continue;
                }
                next_label += 1;
                if next_label > max_labels {
                    return Err(MorphError::LabelOverflow {
                        count: next_label,
                        bit_depth,
                        max: max_labels,
                    });
                }
                flood_fill_into(raster, (x, y, z), &mut labels, next_label as f64, conn)?;
            }
        }
    }
    Ok(labels)
}

fn label_sizes(labels: &Raster) -> Vec<(u64, usize)> {
    let mut counts = std::collections::HashMap::new();
    for i in 0..labels.len() {
        let v = labels.get_f64_unchecked(i);
        if v != 0.0 {
            *counts.entry(v.round() as u64).or_insert(0usize) += 1;
        }
    }
    let mut v: Vec<(u64, usize)> = counts.into_iter().collect();
    v.sort_unstable();
    v
}

fn rebinarize(labels: &Raster, keep: impl Fn(u64) -> bool) -> Raster {
    let (sx, sy, sz) = labels.dims();
    let mut out = Raster::new_3d(sx, sy, sz, ElementKind::U8);
    for i in 0..labels.len() {
        let v = labels.get_f64_unchecked(i);
        let kept = v != 0.0 && keep(v.round() as u64);
        out.set_f64_unchecked(i, if kept { 255.0 } else { 0.0 });
    }
    out
}

/// The connected region with the most pixels, re-binarised (255/0). Ties are
/// broken by the smallest label id (i.e. scan order of first appearance).
pub fn largest_region(raster: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let labels = label(raster, conn, 32)?;
    let sizes = label_sizes(&labels);
    let winner = sizes.into_iter().max_by_key(|&(_, count)| count).map(|(l, _)| l);
    Ok(rebinarize(&labels, |l| Some(l) == winner))
}

/// The complement of [`largest_region`]: every foreground pixel except the
/// single largest connected region.
pub fn remove_largest(raster: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let labels = label(raster, conn, 32)?;
    let sizes = label_sizes(&labels);
    let loser = sizes.into_iter().max_by_key(|&(_, count)| count).map(|(l, _)| l);
    Ok(rebinarize(&labels, |l| Some(l) != loser))
}

/// Binary area opening by labeling (spec §4.5's "binary attribute filter"):
/// keep every connected region whose pixel count is at least `min_size`.
pub fn size_opening(raster: &Raster, conn: impl Into<Connectivity>, min_size: u32) -> MorphResult<Raster> {
    let conn = conn.into();
    let labels = label(raster, conn, 32)?;
    let sizes: std::collections::HashMap<u64, usize> = label_sizes(&labels).into_iter().collect();
    Ok(rebinarize(&labels, |l| {
        sizes.get(&l).copied().unwrap_or(0) >= min_size as usize
    }))
}

/// Convenience facade over [`largest_region`] for callers cleaning up a
/// binary mask (spec §4.2a).
pub fn keep_largest_region(raster: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    largest_region(raster, conn)
}

/// Fills background holes no larger than `max_hole_size`, leaving holes
/// connected to the raster border (not holes at all) and oversized interior
/// holes untouched (spec §4.2a). Grounded the same way as
/// [`crate::reconstruction::fill_holes`] but selective by hole size: the
/// background is labeled, and only the labels that neither touch the border
/// nor exceed the size cap are painted foreground.
pub fn fill_small_holes(raster: &Raster, conn: impl Into<Connectivity>, max_hole_size: u32) -> MorphResult<Raster> {
    let conn = conn.into();
    conn.validate(raster)?;
    let mut background = raster.duplicate();
    for i in 0..background.len() {
        let v = background.get_f64_unchecked(i);
        background.set_f64_unchecked(i, if v == 0.0 { 255.0 } else { 0.0 });
    }
    let labels = label(&background, conn, 32)?;
    let sizes: std::collections::HashMap<u64, usize> = label_sizes(&labels).into_iter().collect();

    let (sx, sy, sz) = raster.dims();
    let mut border_labels = std::collections::HashSet::new();
    for z in 0..sz {
        for y in 0..sy {
            for x in 0..sx {
                let on_border = x == 0 || y == 0 || x == sx - 1 || y == sy - 1 || (sz > 1 && (z == 0 || z == sz - 1));
                if on_border {
                    let idx = labels.index_unchecked(x, y, z);
                    let l = labels.get_f64_unchecked(idx);
                    if l != 0.0 {
                        border_labels.insert(l.round() as u64);
                    }
                }
            }
        }
    }

    let mut out = raster.duplicate();
    for i in 0..out.len() {
        let l = labels.get_f64_unchecked(i);
        if l == 0.0 {
            continue;
        }
        let label_id = l.round() as u64;
        let is_small_interior_hole =
            !border_labels.contains(&label_id) && sizes.get(&label_id).copied().unwrap_or(0) <= max_hole_size as usize;
        if is_small_interior_hole {
            out.set_f64_unchecked(i, out.max_value());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;
    use crate::raster::neighborhood::Connectivity2D;
    use crate::raster::Region;

    fn square(r: &mut Raster, x0: usize, y0: usize, x1: usize, y1: usize) {
        r.fill(
            Region {
                x0,
                y0,
                z0: 0,
                x1,
                y1,
                z1: 1,
            },
            255.0,
        );
    }

    #[test]
    fn label_assigns_distinct_ids_to_disjoint_blobs() {
        let mut r = Raster::new_2d(8, 3, ElementKind::U8);
        square(&mut r, 0, 0, 2, 2);
        square(&mut r, 5, 0, 7, 2);
        let labels = label(&r, Connectivity2D::C4, 8).unwrap();
        let a = labels.get_f64(0, 0, 0).unwrap();
        let b = labels.get_f64(6, 0, 0).unwrap();
        assert_ne!(a, 0.0);
        assert_ne!(b, 0.0);
        assert_ne!(a, b);
        assert_eq!(labels.get_f64(3, 0, 0).unwrap(), 0.0); // background unlabeled
    }

    #[test]
    fn labeling_round_trip_reproduces_the_binary_input() {
        // invariant 8
        let mut r = Raster::new_2d(10, 6, ElementKind::U8);
        square(&mut r, 1, 1, 3, 3);
        square(&mut r, 6, 2, 9, 5);
        let labels = label(&r, Connectivity2D::C8, 16).unwrap();
        let mut rebuilt = r.duplicate();
        for i in 0..rebuilt.len() {
            let v = if labels.get_f64_unchecked(i) != 0.0 { 255.0 } else { 0.0 };
            rebuilt.set_f64_unchecked(i, v);
        }
        assert_eq!(rebuilt, r);
    }

    #[test]
    fn label_overflow_is_reported_when_label_count_exceeds_bit_depth_capacity() {
        // 300 isolated single-pixel blobs (every other column, C4 so the
        // background gap prevents merging) — more than an 8-bit output's
        // 255-label capacity.
        let mut r = Raster::new_2d(600, 1, ElementKind::U8);
        for x in (0..600).step_by(2) {
            r.set_f64(x, 0, 0, 255.0).unwrap();
        }
        let err = label(&r, Connectivity2D::C4, 8);
        assert!(matches!(err, Err(MorphError::LabelOverflow { .. })));
    }

    #[test]
    fn largest_region_keeps_only_the_biggest_blob() {
        let mut r = Raster::new_2d(10, 4, ElementKind::U8);
        square(&mut r, 0, 0, 1, 1); // 1x1
        square(&mut r, 4, 0, 8, 3); // 4x3 = 12
        let out = largest_region(&r, Connectivity2D::C8).unwrap();
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0);
        assert_eq!(out.get_f64(5, 1, 0).unwrap(), 255.0);
    }

    #[test]
    fn size_opening_drops_small_blobs_only() {
        let mut r = Raster::new_2d(10, 4, ElementKind::U8);
        square(&mut r, 0, 0, 1, 1); // size 1
        square(&mut r, 4, 0, 7, 3); // size 9
        let out = size_opening(&r, Connectivity2D::C8, 5).unwrap();
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0);
        assert_eq!(out.get_f64(5, 1, 0).unwrap(), 255.0);
    }

    #[test]
    fn fill_small_holes_fills_only_holes_under_the_cap() {
        let mut r = Raster::new_2d(12, 12, ElementKind::U8);
        square(&mut r, 1, 1, 11, 11);
        r.set_f64(3, 3, 0, 0.0).unwrap(); // 1-pixel hole: small
        square_hole(&mut r, 7, 7, 9, 9); // 2x2 hole: still small with cap 5
        let out = fill_small_holes(&r, Connectivity2D::C4, 3).unwrap();
        assert_eq!(out.get_f64(3, 3, 0).unwrap(), 255.0); // filled
        assert_eq!(out.get_f64(7, 7, 0).unwrap(), 0.0); // 2x2=4 > cap 3, untouched
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0); // border background untouched
    }

    fn square_hole(r: &mut Raster, x0: usize, y0: usize, x1: usize, y1: usize) {
        r.fill(
            Region {
                x0,
                y0,
                z0: 0,
                x1,
                y1,
                z1: 1,
            },
            0.0,
        );
    }
}
