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
//! Structuring-element engine (spec §4.3).
//!
//! A [`Strel`] is a finite, point-anchored set of neighbor offsets; every
//! shape knows how to dilate and erode a raster with itself, and how to
//! produce its own reverse (the point reflection used by opening/closing so
//! that opening removes, rather than shifts, small bright features). Shapes
//! that admit a faster-than-naive algorithm (lines, their separable
//! combinations, and the radius-based shapes, which are already
//! point-symmetric) override the default methods; everything else falls
//! back to [`naive_dilation`]/[`naive_erosion`] over its own offset list.

pub mod shapes2d;
pub mod shapes3d;
pub mod van_herk;

use crate::error::{MorphError, MorphResult};
use crate::pixel::PixelValue;
use crate::raster::color::{apply_per_channel, ColorRaster};
use crate::raster::Raster;

pub use shapes2d::{cross3x3, diamond, disk, octagon, Line, Shape2D, Square};
pub use shapes3d::{ball, ellipsoid, Cube, Cuboid, Extruded2D, Shape3D};

/// A morphological operator built on top of dilation/erosion, named so host
/// call sites can request one generically instead of composing it by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    Dilation,
    Erosion,
    Opening,
    Closing,
    WhiteTopHat,
    BlackTopHat,
    Gradient,
    InternalGradient,
    ExternalGradient,
    Laplacian,
}

/// A structuring element: something that can dilate and erode a raster with
/// itself. Lives as a trait object (`Box<dyn Strel>`) so host code can pick
/// a shape at runtime without the engine functions becoming generic over it.
pub trait Strel: Send + Sync {
    /// Whether this shape is only meaningful against a 3D raster.
    fn is_3d(&self) -> bool;

    /// Neighbor offsets relative to the shape's own anchor. The anchor is
    /// not necessarily `(0, 0, 0)`'s position in this list — shapes with an
    /// even "diameter" parameter (square, cube, line) are not point-
    /// symmetric, which is exactly why [`Strel::reverse`] exists.
    fn shifts(&self) -> Vec<(i64, i64, i64)>;

    fn size(&self) -> usize {
        self.shifts().len()
    }

    /// The point reflection of this shape through its anchor. Symmetric
    /// shapes (radius-based: disk, ball, diamond, octagon, cuboid,
    /// ellipsoid, the 3x3 cross) return a clone of themselves; even-sized
    /// line-based shapes (line, square, cube) return a genuinely different
    /// shape.
    fn reverse(&self) -> Box<dyn Strel>;

    fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
        check_dimension(self.is_3d(), raster)?;
        Ok(naive_dilation(raster, &self.shifts()))
    }

    fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
        check_dimension(self.is_3d(), raster)?;
        Ok(naive_erosion(raster, &self.shifts()))
    }

    /// Erosion, then dilation by the reverse — removes features smaller
    /// than the shape without shifting the ones that survive.
    fn opening(&self, raster: &Raster) -> MorphResult<Raster> {
        let eroded = self.erosion(raster)?;
        self.reverse().dilation(&eroded)
    }

    /// Dilation, then erosion by the reverse.
    fn closing(&self, raster: &Raster) -> MorphResult<Raster> {
        let dilated = self.dilation(raster)?;
        self.reverse().erosion(&dilated)
    }
}

fn check_dimension(strel_is_3d: bool, raster: &Raster) -> MorphResult<()> {
    if strel_is_3d != raster.is_3d() {
        return Err(MorphError::DimensionMismatch {
            size_z: raster.size_z(),
        });
    }
    Ok(())
}

/// Pointwise maximum over a shape's full offset list; the correctness
/// baseline every specialized dilation is checked against.
pub fn naive_dilation(raster: &Raster, shifts: &[(i64, i64, i64)]) -> Raster {
    naive_extreme(raster, shifts, true)
}

/// Pointwise minimum over a shape's full offset list.
pub fn naive_erosion(raster: &Raster, shifts: &[(i64, i64, i64)]) -> Raster {
    naive_extreme(raster, shifts, false)
}

fn naive_extreme(raster: &Raster, shifts: &[(i64, i64, i64)], want_max: bool) -> Raster {
    let (sx, sy, sz) = raster.dims();
    let mut out = raster.duplicate();
    crate::dispatch_raster!(raster, |src: T| {
        let dst: &mut [T] = out.as_mut_slice::<T>();
        for z in 0..sz as i64 {
            for y in 0..sy as i64 {
                for x in 0..sx as i64 {
                    let mut acc: Option<T> = None;
                    for &(dx, dy, dz) in shifts {
                        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                        if nx < 0
                            || ny < 0
                            || nz < 0
                            || nx as usize >= sx
                            || ny as usize >= sy
                            || nz as usize >= sz
                        {
                            continue;
                        }
                        let v = src[raster.index_unchecked(nx as usize, ny as usize, nz as usize)];
                        acc = Some(match acc {
                            None => v,
                            Some(cur) => {
                                if want_max {
                                    PixelValue::max(cur, v)
                                } else {
                                    PixelValue::min(cur, v)
                                }
                            }
                        });
                    }
                    let idx = raster.index_unchecked(x as usize, y as usize, z as usize);
                    // a shape always includes its own centre via an offset
                    // of (0,0,0) in every built-in shape, so `acc` is never
                    // `None` in practice; fall back to the pixel itself if
                    // a caller-supplied shape omits it.
                    dst[idx] = acc.unwrap_or(src[idx]);
                }
            }
        }
    });
    out
}

/// `dilation(raster) - raster` — bright features thinner than the shape.
pub fn white_top_hat(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let opened = strel.opening(raster)?;
    Ok(pointwise_diff(raster, &opened))
}

/// `raster - erosion(raster)` — dark features thinner than the shape.
pub fn black_top_hat(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let closed = strel.closing(raster)?;
    Ok(pointwise_diff(&closed, raster))
}

/// `dilation(raster) - erosion(raster)` — the morphological gradient.
pub fn gradient(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let dilated = strel.dilation(raster)?;
    let eroded = strel.erosion(raster)?;
    Ok(pointwise_diff(&dilated, &eroded))
}

/// `raster - erosion(raster)` — the gradient's inward half.
pub fn internal_gradient(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let eroded = strel.erosion(raster)?;
    Ok(pointwise_diff(raster, &eroded))
}

/// `dilation(raster) - raster` — the gradient's outward half.
pub fn external_gradient(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let dilated = strel.dilation(raster)?;
    Ok(pointwise_diff(&dilated, raster))
}

/// `dilation(raster) + erosion(raster) - 2*raster`, shifted by the element
/// kind's midpoint so the zero-crossing sits at half-scale instead of
/// clamping negative results to zero. Equal to
/// `external_gradient - internal_gradient + midpoint`.
pub fn laplacian(strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    let dilated = strel.dilation(raster)?;
    let eroded = strel.erosion(raster)?;
    let mut out = raster.duplicate();
    crate::dispatch_raster!(raster, |src: T| {
        let dil: &[T] = dilated.as_slice::<T>();
        let ero: &[T] = eroded.as_slice::<T>();
        let dst: &mut [T] = out.as_mut_slice::<T>();
        for i in 0..src.len() {
            let deviation = dil[i].to_f64() + ero[i].to_f64() - 2.0 * src[i].to_f64();
            let shifted = deviation + <T as PixelValue>::midpoint().to_f64();
            dst[i] = T::from_f64_round(shifted.max(0.0).min(T::MAX_VALUE.to_f64()));
        }
    });
    Ok(out)
}

/// Applies the named derived operator.
pub fn apply(op: MorphOp, strel: &dyn Strel, raster: &Raster) -> MorphResult<Raster> {
    match op {
        MorphOp::Dilation => strel.dilation(raster),
        MorphOp::Erosion => strel.erosion(raster),
        MorphOp::Opening => strel.opening(raster),
        MorphOp::Closing => strel.closing(raster),
        MorphOp::WhiteTopHat => white_top_hat(strel, raster),
        MorphOp::BlackTopHat => black_top_hat(strel, raster),
        MorphOp::Gradient => gradient(strel, raster),
        MorphOp::InternalGradient => internal_gradient(strel, raster),
        MorphOp::ExternalGradient => external_gradient(strel, raster),
        MorphOp::Laplacian => laplacian(strel, raster),
    }
}

fn pointwise_diff(a: &Raster, b: &Raster) -> Raster {
    let mut out = a.duplicate();
    crate::dispatch_raster!(a, |abuf: T| {
        let bbuf: &[T] = b.as_slice::<T>();
        let dst: &mut [T] = out.as_mut_slice::<T>();
        for i in 0..abuf.len() {
            dst[i] = abuf[i].clamped_sub(bbuf[i]);
        }
    });
    out
}

/// Applies any `Strel`-based morphological operator channel-wise to an RGB
/// image, per the boundary split described in [`crate::raster::color`].
pub fn apply_rgb(op: MorphOp, strel: &dyn Strel, image: &ColorRaster) -> ColorRaster {
    apply_per_channel(image, |channel, _idx| {
        apply(op, strel, channel).expect("a u8 RGB channel always matches a 2D strel or fails dimension check uniformly")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ElementKind;
    use crate::raster::Region;

    fn cross3x3_shifts() -> Vec<(i64, i64, i64)> {
        vec![(0, 0, 0), (1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0)]
    }

    #[test]
    fn dilation_of_single_pixel_grows_by_the_shape() {
        // E1: single foreground pixel dilated by the 3x3 cross becomes a
        // plus-shaped blob, nothing further.
        let mut r = Raster::new_2d(5, 5, ElementKind::U8);
        r.set_f64(2, 2, 0, 255.0).unwrap();
        let out = naive_dilation(&r, &cross3x3_shifts());
        assert_eq!(out.get_f64(2, 2, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(1, 2, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(3, 2, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(2, 1, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(2, 3, 0).unwrap(), 255.0);
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 0.0);
        assert_eq!(out.get_f64(1, 1, 0).unwrap(), 0.0); // diagonal, untouched
    }

    #[test]
    fn erosion_of_rectangle_shrinks_it() {
        // E2
        let mut r = Raster::new_2d(7, 7, ElementKind::U8);
        r.fill(
            Region {
                x0: 2,
                y0: 2,
                z0: 0,
                x1: 5,
                y1: 5,
                z1: 1,
            },
            255.0,
        );
        let out = naive_erosion(&r, &cross3x3_shifts());
        assert_eq!(out.get_f64(3, 3, 0).unwrap(), 255.0); // interior survives
        assert_eq!(out.get_f64(2, 2, 0).unwrap(), 0.0); // corner erased
        assert_eq!(out.get_f64(2, 3, 0).unwrap(), 0.0); // edge erased
    }

    #[test]
    fn dilation_erosion_duality_holds() {
        // invariant 1: erosion(raster) == complement(dilation(complement(raster)))
        let mut r = Raster::new_2d(6, 6, ElementKind::U8);
        r.fill(
            Region {
                x0: 1,
                y0: 2,
                z0: 0,
                x1: 4,
                y1: 5,
                z1: 1,
            },
            200.0,
        );
        let shifts = cross3x3_shifts();
        let eroded = naive_erosion(&r, &shifts);

        let mut complement = r.duplicate();
        for i in 0..complement.len() {
            let v = complement.get_f64_unchecked(i);
            complement.set_f64_unchecked(i, complement.max_value() - v);
        }
        let dilated_complement = naive_dilation(&complement, &shifts);
        for i in 0..r.len() {
            let expected = r.max_value() - dilated_complement.get_f64_unchecked(i);
            assert_eq!(eroded.get_f64_unchecked(i), expected);
        }
    }

    #[test]
    fn erosion_is_anti_extensive_dilation_is_extensive() {
        // invariant 2
        let mut r = Raster::new_2d(5, 5, ElementKind::U8);
        r.set_f64(2, 2, 0, 150.0).unwrap();
        let shifts = cross3x3_shifts();
        let eroded = naive_erosion(&r, &shifts);
        let dilated = naive_dilation(&r, &shifts);
        for i in 0..r.len() {
            let v = r.get_f64_unchecked(i);
            assert!(eroded.get_f64_unchecked(i) <= v);
            assert!(dilated.get_f64_unchecked(i) >= v);
        }
    }

    #[test]
    fn opening_is_idempotent() {
        // invariant 3
        let square = Square::new(3);
        let mut r = Raster::new_2d(8, 8, ElementKind::U8);
        r.fill(
            Region {
                x0: 1,
                y0: 1,
                z0: 0,
                x1: 6,
                y1: 3,
                z1: 1,
            },
            255.0,
        );
        let once = square.opening(&r).unwrap();
        let twice = square.opening(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn strel_applied_to_mismatched_dimensionality_is_rejected() {
        let square = Square::new(3);
        let r3d = Raster::new_3d(4, 4, 4, ElementKind::U8);
        assert!(matches!(
            square.dilation(&r3d),
            Err(MorphError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn gradient_equals_dilation_minus_erosion() {
        let mut r = Raster::new_2d(6, 6, ElementKind::U8);
        r.set_f64(3, 3, 0, 180.0).unwrap();
        let shifts = cross3x3_shifts();
        let grad_direct = pointwise_diff(&naive_dilation(&r, &shifts), &naive_erosion(&r, &shifts));
        struct Cross;
        impl Strel for Cross {
            fn is_3d(&self) -> bool {
                false
            }
            fn shifts(&self) -> Vec<(i64, i64, i64)> {
                cross3x3_shifts()
            }
            fn reverse(&self) -> Box<dyn Strel> {
                Box::new(Cross)
            }
        }
        let grad = gradient(&Cross, &r).unwrap();
        assert_eq!(grad, grad_direct);
    }

    #[test]
    fn laplacian_is_dilation_plus_erosion_minus_twice_the_source() {
        struct Fixed;
        impl Strel for Fixed {
            fn is_3d(&self) -> bool {
                false
            }
            fn shifts(&self) -> Vec<(i64, i64, i64)> {
                vec![(0, 0, 0)]
            }
            fn reverse(&self) -> Box<dyn Strel> {
                Box::new(Fixed)
            }
            fn dilation(&self, raster: &Raster) -> MorphResult<Raster> {
                let mut out = raster.duplicate();
                out.set_f64(0, 0, 0, 200.0)?;
                Ok(out)
            }
            fn erosion(&self, raster: &Raster) -> MorphResult<Raster> {
                let mut out = raster.duplicate();
                out.set_f64(0, 0, 0, 50.0)?;
                Ok(out)
            }
        }
        let mut r = Raster::new_2d(1, 1, ElementKind::U8);
        r.set_f64(0, 0, 0, 100.0).unwrap();
        let out = laplacian(&Fixed, &r).unwrap();
        // dilation=200, erosion=50, src=100, midpoint=128 -> 200+50-200+128=178
        assert_eq!(out.get_f64(0, 0, 0).unwrap(), 178.0);
    }
}
