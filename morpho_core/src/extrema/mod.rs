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
//! Regional/extended extrema, imposition, and priority-queue attribute
//! openings (spec §4.5). Built directly on top of flood-fill, reconstruction
//! and (for the binary fast path) labeling.

use crate::error::MorphResult;
use crate::floodfill::flood_fill_into;
use crate::raster::neighborhood::{for_each_neighbor, Connectivity};
use crate::raster::Raster;
use crate::reconstruction::{reconstruct_by_dilation, reconstruct_by_erosion};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

fn complement(raster: &Raster) -> Raster {
    let mut out = raster.duplicate();
    let max_v = out.max_value();
    for i in 0..out.len() {
        let v = out.get_f64_unchecked(i);
        out.set_f64_unchecked(i, max_v - v);
    }
    out
}

/// Regional maxima via the flood-fill method (spec §4.5): scan for a pixel
/// with a strictly greater neighbor, flood-fill its same-valued plateau with
/// a "not a maximum" sentinel, then binarize what survives.
pub fn regional_maxima(image: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    conn.validate(image)?;
    let (sx, sy, sz) = image.dims();
    let mut sentinel = Raster::new_3d(sx, sy, sz, crate::pixel::ElementKind::U8);

    for z in 0..sz as i64 {
        for y in 0..sy as i64 {
            for x in 0..sx as i64 {
                let idx = image.index_unchecked(x as usize, y as usize, z as usize);
                if sentinel.get_f64_unchecked(idx) != 0.0 {
                    continue;
                }
                let v = image.get_f64_unchecked(idx);
                let mut has_greater = false;
                for_each_neighbor(image, x, y, z, conn, |nx, ny, nz| {
                    let nv = image.get_f64_unchecked(image.index_unchecked(nx as usize, ny as usize, nz as usize));
                    if nv > v {
                        has_greater = true;
                    }
                });
                if has_greater {
                    flood_fill_into(image, (x, y, z), &mut sentinel, 255.0, conn)?;
                }
            }
        }
    }

    let mut out = image.duplicate();
    for i in 0..out.len() {
        out.set_f64_unchecked(i, if sentinel.get_f64_unchecked(i) == 0.0 { 255.0 } else { 0.0 });
    }
    Ok(out)
}

/// Regional minima: the dual of [`regional_maxima`] under pointwise
/// complement.
pub fn regional_minima(image: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    regional_maxima(&complement(image), conn)
}

/// `extended_maxima(I, h) = regional_maxima(reconstruct_by_dilation(I, I+h))`.
/// `h = 0` reduces to the regional case.
pub fn extended_maxima(image: &Raster, h: f64, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    let mut mask = image.duplicate();
    let max_v = mask.max_value();
    for i in 0..mask.len() {
        let v = mask.get_f64_unchecked(i);
        mask.set_f64_unchecked(i, (v + h).min(max_v));
    }
    let reconstructed = reconstruct_by_dilation(image, &mask, conn)?;
    regional_maxima(&reconstructed, conn)
}

/// Symmetric to [`extended_maxima`] under complement.
pub fn extended_minima(image: &Raster, h: f64, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    extended_maxima(&complement(image), h, conn)
}

/// `impose_minima(I, M)`: forces the binary marker `M` to become the sole set
/// of regional minima of the result (spec §4.5).
pub fn impose_minima(image: &Raster, binary_marker: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    let (sx, sy, sz) = image.dims();
    let mut marker = Raster::new_3d(sx, sy, sz, image.element_kind());
    let mut mask = Raster::new_3d(sx, sy, sz, image.element_kind());
    let max_v = marker.max_value();
    for i in 0..marker.len() {
        let on_marker = binary_marker.get_f64_unchecked(i) != 0.0;
        marker.set_f64_unchecked(i, if on_marker { 0.0 } else { max_v });
        let v = image.get_f64_unchecked(i);
        mask.set_f64_unchecked(i, if on_marker { 0.0 } else { (v + 1.0).min(max_v) });
    }
    reconstruct_by_erosion(&marker, &mask, conn)
}

/// Symmetric to [`impose_minima`] under complement.
pub fn impose_maxima(image: &Raster, binary_marker: &Raster, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let out = impose_minima(&complement(image), binary_marker, conn)?;
    Ok(complement(&out))
}

#[derive(PartialEq)]
struct Entry {
    value: f64,
    seq: u64,
    idx: usize,
}
impl Eq for Entry {}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .partial_cmp(&other.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority-queue area/volume opening (spec §4.5): every regional maximum
/// whose plateau plus adjacent descending slope has fewer than `min_size`
/// pixels is merged down to the surrounding level.
pub fn area_open(image: &Raster, min_size: u32, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    conn.validate(image)?;
    let maxima = regional_maxima(image, conn)?;
    let mut out = image.duplicate();
    let mut processed = vec![false; image.len()];
    let (sx, sy, sz) = image.dims();

    for z in 0..sz as i64 {
        for y in 0..sy as i64 {
            for x in 0..sx as i64 {
                let idx = image.index_unchecked(x as usize, y as usize, z as usize);
                if processed[idx] || maxima.get_f64_unchecked(idx) == 0.0 {
                    continue;
                }
                grow_and_maybe_flatten(image, &mut out, &mut processed, idx, min_size, conn);
            }
        }
    }
    Ok(out)
}

fn grow_and_maybe_flatten(
    image: &Raster,
    out: &mut Raster,
    processed: &mut [bool],
    rep_idx: usize,
    min_size: u32,
    conn: Connectivity,
) {
    let mut heap = BinaryHeap::new();
    let mut in_heap: HashSet<usize> = HashSet::new();
    let mut accepted: HashSet<usize> = HashSet::new();
    let mut seq = 0u64;

    heap.push(Entry {
        value: image.get_f64_unchecked(rep_idx),
        seq,
        idx: rep_idx,
    });
    in_heap.insert(rep_idx);
    seq += 1;

    let mut current_level = image.get_f64_unchecked(rep_idx);

    while let Some(top) = heap.pop() {
        let top_val = image.get_f64_unchecked(top.idx);
        if top_val > current_level {
            break; // would merge into a distinct, higher maximum
        }
        accepted.insert(top.idx);
        if top_val < current_level {
            current_level = top_val;
        }
        let (tx, ty, tz) = image.unflatten(top.idx);
        for_each_neighbor(image, tx as i64, ty as i64, tz as i64, conn, |nx, ny, nz| {
            let nidx = image.index_unchecked(nx as usize, ny as usize, nz as usize);
            if !in_heap.contains(&nidx) && !accepted.contains(&nidx) {
                in_heap.insert(nidx);
                heap.push(Entry {
                    value: image.get_f64_unchecked(nidx),
                    seq,
                    idx: nidx,
                });
                seq += 1;
            }
        });
        if accepted.len() as u32 >= min_size {
            break;
        }
    }

    // Flatten every accepted pixel to the level the region settled at. For a
    // plateau that already reached `min_size` without the level ever
    // dropping this is a no-op; for a peak merged down into its surroundings
    // it is what actually performs the opening.
    for &idx in &accepted {
        out.set_f64_unchecked(idx, current_level);
    }
    for &idx in &accepted {
        processed[idx] = true;
    }
}

/// The dual attribute filter on minima (spec §4.5: "the symmetric operation
/// on minima is `volume_closing`").
pub fn volume_closing(image: &Raster, min_size: u32, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    let opened = area_open(&complement(image), min_size, conn)?;
    Ok(complement(&opened))
}

/// Binary attribute filter (spec §4.5): reduces to labeling when the input is
/// already binary, falling back to the full priority-queue algorithm
/// otherwise.
pub fn binary_area_open(image: &Raster, min_size: u32, conn: impl Into<Connectivity>) -> MorphResult<Raster> {
    let conn = conn.into();
    if image.is_binary() {
        crate::labeling::size_opening(image, conn, min_size)
    } else {
        area_open(image, min_size, conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;
    use crate::raster::neighborhood::Connectivity2D;
    use crate::raster::Region;

    #[test]
    fn regional_maxima_keeps_only_true_plateaus() {
        let mut r = Raster::new_2d(5, 5, ElementKind::U8);
        r.fill(Region::full(&r), 100.0);
        r.set_f64(2, 2, 0, 200.0).unwrap(); // a true regional maximum
        r.set_f64(0, 0, 0, 150.0).unwrap(); // dominated by a neighbor: not a maximum
        r.set_f64(0, 1, 0, 180.0).unwrap();
        let out = regional_maxima(&r, Connectivity2D::C8).unwrap();
        assert_eq!(out.get_f64(2, 2, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn extended_maxima_at_h_zero_matches_regional_maxima() {
        let mut r = Raster::new_2d(6, 6, ElementKind::U8);
        r.fill(Region::full(&r), 50.0);
        r.set_f64(3, 3, 0, 220.0).unwrap();
        let regional = regional_maxima(&r, Connectivity2D::C4).unwrap();
        let extended = extended_maxima(&r, 0.0, Connectivity2D::C4).unwrap();
        assert_eq!(regional, extended);
    }

    #[test]
    fn impose_minima_forces_the_chosen_marker_to_be_the_only_minimum() {
        let mut r = Raster::new_2d(7, 7, ElementKind::U8);
        r.fill(Region::full(&r), 200.0);
        r.set_f64(1, 1, 0, 10.0).unwrap(); // a spurious existing minimum
        let mut marker = Raster::new_2d(7, 7, ElementKind::U8);
        marker.set_f64(5, 5, 0, 255.0).unwrap();
        let out = impose_minima(&r, &marker, Connectivity2D::C4).unwrap();
        let minima = regional_minima(&out, Connectivity2D::C4).unwrap();
        assert_eq!(minima.get_f64(5, 5, 0).unwrap(), 255.0);
        assert_eq!(minima.get_f64(1, 1, 0).unwrap(), 0.0);
    }

    #[test]
    fn area_opening_merges_the_small_peak_but_keeps_the_larger_plateau() {
        // E5
        let mut r = Raster::new_2d(9, 9, ElementKind::U8);
        r.fill(Region::full(&r), 200.0);
        r.set_f64(1, 1, 0, 250.0).unwrap();
        r.fill(
            Region {
                x0: 4,
                y0: 4,
                z0: 0,
                x1: 7,
                y1: 7,
                z1: 1,
            },
            230.0,
        );
        let out = area_open(&r, 5, Connectivity2D::C8).unwrap();
        assert_eq!(out.get_f64(1, 1, 0).unwrap(), 200.0);
        assert_eq!(out.get_f64(5, 5, 0).unwrap(), 230.0);
    }

    #[test]
    fn area_opening_is_monotone_in_min_size() {
        // invariant 6
        let mut r = Raster::new_2d(9, 9, ElementKind::U8);
        r.fill(Region::full(&r), 100.0);
        r.set_f64(1, 1, 0, 180.0).unwrap();
        r.fill(
            Region {
                x0: 4,
                y0: 4,
                z0: 0,
                x1: 7,
                y1: 7,
                z1: 1,
            },
            150.0,
        );
        let small = area_open(&r, 3, Connectivity2D::C8).unwrap();
        let big = area_open(&r, 20, Connectivity2D::C8).unwrap();
        for i in 0..r.len() {
            assert!(small.get_f64_unchecked(i) >= big.get_f64_unchecked(i));
        }
    }

    #[test]
    fn binary_area_open_matches_labeling_size_opening_on_binary_input() {
        let mut r = Raster::new_2d(10, 4, ElementKind::U8);
        r.fill(
            Region {
                x0: 0,
                y0: 0,
                z0: 0,
                x1: 1,
                y1: 1,
                z1: 1,
            },
            255.0,
        );
        r.fill(
            Region {
                x0: 4,
                y0: 0,
                z0: 0,
                x1: 8,
                y1: 3,
                z1: 1,
            },
            255.0,
        );
        let via_facade = binary_area_open(&r, 5, Connectivity2D::C8).unwrap();
        let via_labeling = crate::labeling::size_opening(&r, Connectivity2D::C8, 5).unwrap();
        assert_eq!(via_facade, via_labeling);
    }
}
