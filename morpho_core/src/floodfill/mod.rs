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
//! Scan-line flood-fill (spec §4.2).
//!
//! The primitive reused by regional extrema, connected-component labeling
//! and several binary-morphology helpers. Maintains a stack of seed
//! positions; each pop expands to the maximal horizontal run through it,
//! then seeds at most one position per maximal matching sub-run on every
//! adjacent line, using the `Outside`/`InRun` state machine from spec §4's
//! "State machines" subsection.

use crate::error::{MorphError, MorphResult};
use crate::raster::neighborhood::Connectivity;
use crate::raster::Raster;

/// Offsets `(dy, dz)` of the adjacent lines scanned when expanding a run,
/// and the `delta` by which the scanned x-range is widened on each side.
fn adjacent_lines(conn: Connectivity) -> (Vec<(i64, i64)>, i64) {
    match conn {
        Connectivity::C4 => (vec![(-1, 0), (1, 0)], 0),
        Connectivity::C8 => (vec![(-1, 0), (1, 0)], 1),
        Connectivity::C6 => (vec![(-1, 0), (1, 0), (0, -1), (0, 1)], 0),
        Connectivity::C26 => {
            let mut lines = Vec::with_capacity(8);
            for dz in -1..=1 {
                for dy in -1..=1 {
                    if (dy, dz) != (0, 0) {
                        lines.push((dy, dz));
                    }
                }
            }
            (lines, 1)
        }
    }
}

/// Core scan-line traversal, generic over how a position is tested and
/// painted so both [`flood_fill`] (in-place) and [`flood_fill_into`]
/// (separate output) share one implementation.
fn scanline_fill(
    sx: i64,
    sy: i64,
    sz: i64,
    seed: (i64, i64, i64),
    conn: Connectivity,
    mut is_candidate: impl FnMut(i64, i64, i64) -> bool,
    mut paint: impl FnMut(i64, i64, i64),
) {
    let (lines, delta) = adjacent_lines(conn);
    let mut stack = vec![seed];

    while let Some((x, y, z)) = stack.pop() {
        if !is_candidate(x, y, z) {
            continue;
        }

        let mut x1 = x;
        while x1 - 1 >= 0 && is_candidate(x1 - 1, y, z) {
            x1 -= 1;
        }
        let mut x2 = x;
        while x2 + 1 < sx && is_candidate(x2 + 1, y, z) {
            x2 += 1;
        }

        for xx in x1..=x2 {
            paint(xx, y, z);
        }

        for &(dy, dz) in &lines {
            let ny = y + dy;
            let nz = z + dz;
            if ny < 0 || ny >= sy || nz < 0 || nz >= sz {
                continue;
            }
            // Outside/InRun state machine: one seed per maximal sub-run.
            let mut in_run = false;
            let scan_x1 = x1 - delta;
            let scan_x2 = x2 + delta;
            let mut xx = scan_x1;
            while xx <= scan_x2 {
                if xx < 0 || xx >= sx {
                    in_run = false;
                } else if is_candidate(xx, ny, nz) {
                    if !in_run {
                        stack.push((xx, ny, nz));
                        in_run = true;
                    }
                } else {
                    in_run = false;
                }
                xx += 1;
            }
        }
    }
}

/// In-place relabel of the maximal connected region of pixels equal to
/// `raster[seed]` with `new_value`.
pub fn flood_fill<C: Into<Connectivity>>(
    raster: &mut Raster,
    seed: (i64, i64, i64),
    new_value: f64,
    conn: C,
) -> MorphResult<()> {
    let conn = conn.into();
    conn.validate(raster)?;
    let old_value = raster
        .get_f64(seed.0, seed.1, seed.2)
        .map_err(|_| MorphError::InvalidSeed)?;
    if old_value == new_value {
        return Ok(());
    }

    let (sx, sy, sz) = raster.dims();
    let (sx64, sy64, sz64) = (sx as i64, sy as i64, sz as i64);

    // `visited` (not the raster itself) is what the candidate test consults
    // to avoid re-seeding an already-painted run; the raster is only
    // mutated once the scan has finished, so a mutable and an immutable
    // borrow of it are never alive at the same time.
    let visited = std::cell::RefCell::new(vec![false; sx * sy * sz]);
    let mut painted: Vec<(i64, i64, i64)> = Vec::new();
    scanline_fill(
        sx64,
        sy64,
        sz64,
        seed,
        conn,
        |x, y, z| {
            let idx = raster.index_unchecked(x as usize, y as usize, z as usize);
            !visited.borrow()[idx] && raster.get_f64_unchecked(idx) == old_value
        },
        |x, y, z| {
            let idx = raster.index_unchecked(x as usize, y as usize, z as usize);
            visited.borrow_mut()[idx] = true;
            painted.push((x, y, z));
        },
    );

    for (x, y, z) in painted {
        raster.set_f64(x, y, z, new_value)?;
    }
    Ok(())
}

/// Traverses `input` (read-only) and writes `new_value` into `output` at the
/// same positions, leaving `input` untouched. Used to paint labels into a
/// label raster while keeping the value raster intact.
pub fn flood_fill_into<C: Into<Connectivity>>(
    input: &Raster,
    seed: (i64, i64, i64),
    output: &mut Raster,
    new_value: f64,
    conn: C,
) -> MorphResult<()> {
    let conn = conn.into();
    conn.validate(input)?;
    if input.dims() != output.dims() {
        return Err(MorphError::ShapeMismatch {
            message: "input and output rasters must share dimensions".into(),
        });
    }
    let old_value = input
        .get_f64(seed.0, seed.1, seed.2)
        .map_err(|_| MorphError::InvalidSeed)?;

    let (sx, sy, sz) = input.dims();
    let (sx64, sy64, sz64) = (sx as i64, sy as i64, sz as i64);

    // `output`'s pre-existing contents decide which positions already count
    // as painted (per spec: "skip if output already equals new_value");
    // `visited` additionally tracks positions this call has painted itself,
    // so the scan still terminates even when `new_value` collides with
    // whatever `output` was initialized to.
    let visited = std::cell::RefCell::new(vec![false; sx * sy * sz]);
    let mut painted: Vec<(i64, i64, i64)> = Vec::new();
    scanline_fill(
        sx64,
        sy64,
        sz64,
        seed,
        conn,
        |x, y, z| {
            let idx = input.index_unchecked(x as usize, y as usize, z as usize);
            !visited.borrow()[idx]
                && input.get_f64_unchecked(idx) == old_value
                && output.get_f64_unchecked(idx) != new_value
        },
        |x, y, z| {
            let idx = input.index_unchecked(x as usize, y as usize, z as usize);
            visited.borrow_mut()[idx] = true;
            painted.push((x, y, z));
        },
    );

    for (x, y, z) in painted {
        output.set_f64(x, y, z, new_value)?;
    }
    Ok(())
}
