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
//! The raster container and its typed-element storage (spec §4.1).
//!
//! A raster is represented with a single dimension-uniform layout: a flat
//! buffer plus `(size_x, size_y, size_z)`, where a 2D raster is simply one
//! with `size_z == 1`. This keeps the scan-line, neighborhood and queue
//! engines written once instead of duplicated per dimensionality, while the
//! public `Connectivity2D`/`Connectivity3D`/`Shape2D`/`Shape3D` enums stay
//! exhaustive and dimension-specific at the API boundary, per spec §6.

pub mod color;
pub mod neighborhood;

use crate::error::{Axis, MorphError, MorphResult};
use crate::pixel::{ElementKind, PixelValue};

pub use neighborhood::{Connectivity2D, Connectivity3D};

/// Element storage for a raster: one variant per supported kind, carrying a
/// flat row-major (then slice-major for 3D) buffer of length
/// `size_x * size_y * size_z`.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl RasterData {
    fn len(&self) -> usize {
        match self {
            RasterData::U8(v) => v.len(),
            RasterData::U16(v) => v.len(),
            RasterData::F32(v) => v.len(),
        }
    }

    fn kind(&self) -> ElementKind {
        match self {
            RasterData::U8(_) => ElementKind::U8,
            RasterData::U16(_) => ElementKind::U16,
            RasterData::F32(_) => ElementKind::F32,
        }
    }

    fn get_f64(&self, idx: usize) -> f64 {
        match self {
            RasterData::U8(v) => v[idx].to_f64(),
            RasterData::U16(v) => v[idx].to_f64(),
            RasterData::F32(v) => v[idx].to_f64(),
        }
    }
}

/// A rectangular (2D) or cuboidal (3D) array of typed pixels.
///
/// Construct with [`Raster::new_2d`] / [`Raster::new_3d`]. All accessors are
/// bounds-checked unless the name says `_unchecked`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    data: RasterData,
}

/// An axis-aligned region of a raster, used by [`Raster::fill`].
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub x0: usize,
    pub y0: usize,
    pub z0: usize,
    pub x1: usize, // exclusive
    pub y1: usize, // exclusive
    pub z1: usize, // exclusive
}

impl Region {
    pub fn full(raster: &Raster) -> Self {
        Region {
            x0: 0,
            y0: 0,
            z0: 0,
            x1: raster.size_x,
            y1: raster.size_y,
            z1: raster.size_z,
        }
    }
}

impl Raster {
    pub fn new_2d(size_x: usize, size_y: usize, kind: ElementKind) -> Self {
        Self::new_3d(size_x, size_y, 1, kind)
    }

    pub fn new_3d(size_x: usize, size_y: usize, size_z: usize, kind: ElementKind) -> Self {
        let n = size_x * size_y * size_z;
        let data = match kind {
            ElementKind::U8 => RasterData::U8(vec![0u8; n]),
            ElementKind::U16 => RasterData::U16(vec![0u16; n]),
            ElementKind::F32 => RasterData::F32(vec![0.0f32; n]),
        };
        Raster {
            size_x,
            size_y,
            size_z,
            data,
        }
    }

    /// Construct a 2D raster directly from a typed buffer in row-major
    /// (y-major, x-minor) order.
    pub fn from_vec_2d<T: IntoRasterData>(size_x: usize, size_y: usize, values: Vec<T>) -> Self {
        assert_eq!(values.len(), size_x * size_y);
        Raster {
            size_x,
            size_y,
            size_z: 1,
            data: T::into_raster_data(values),
        }
    }

    pub fn from_vec_3d<T: IntoRasterData>(
        size_x: usize,
        size_y: usize,
        size_z: usize,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(values.len(), size_x * size_y * size_z);
        Raster {
            size_x,
            size_y,
            size_z,
            data: T::into_raster_data(values),
        }
    }

    pub fn size_x(&self) -> usize {
        self.size_x
    }
    pub fn size_y(&self) -> usize {
        self.size_y
    }
    pub fn size_z(&self) -> usize {
        self.size_z
    }
    pub fn is_3d(&self) -> bool {
        self.size_z > 1
    }
    pub fn element_kind(&self) -> ElementKind {
        self.data.kind()
    }
    pub fn bit_depth(&self) -> u32 {
        self.data.kind().bit_depth()
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
    pub fn data(&self) -> &RasterData {
        &self.data
    }
    pub fn data_mut(&mut self) -> &mut RasterData {
        &mut self.data
    }

    #[inline]
    fn check_bounds(&self, x: i64, y: i64, z: i64) -> MorphResult<(usize, usize, usize)> {
        if x < 0 || x as usize >= self.size_x {
            return Err(MorphError::OutOfBounds {
                axis: Axis::X,
                value: x,
                bound: self.size_x,
            });
        }
        if y < 0 || y as usize >= self.size_y {
            return Err(MorphError::OutOfBounds {
                axis: Axis::Y,
                value: y,
                bound: self.size_y,
            });
        }
        if z < 0 || z as usize >= self.size_z {
            return Err(MorphError::OutOfBounds {
                axis: Axis::Z,
                value: z,
                bound: self.size_z,
            });
        }
        Ok((x as usize, y as usize, z as usize))
    }

    #[inline]
    pub fn in_bounds(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.size_x
            && (y as usize) < self.size_y
            && (z as usize) < self.size_z
    }

    #[inline]
    pub fn index_unchecked(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size_y + y) * self.size_x + x
    }

    pub fn index(&self, x: i64, y: i64, z: i64) -> MorphResult<usize> {
        let (x, y, z) = self.check_bounds(x, y, z)?;
        Ok(self.index_unchecked(x, y, z))
    }

    /// Bounds-checked numeric read, wrapped as `f64`; used by inner loops
    /// that are written generically over the element kind.
    pub fn get_f64(&self, x: i64, y: i64, z: i64) -> MorphResult<f64> {
        let idx = self.index(x, y, z)?;
        Ok(self.data.get_f64(idx))
    }

    pub fn max_value(&self) -> f64 {
        match self.data.kind() {
            ElementKind::U8 => u8::MAX_VALUE.to_f64(),
            ElementKind::U16 => u16::MAX_VALUE.to_f64(),
            ElementKind::F32 => f32::MAX_VALUE.to_f64(),
        }
    }

    pub fn min_value(&self) -> f64 {
        0.0
    }

    pub fn duplicate(&self) -> Raster {
        self.clone()
    }

    /// Whether every pixel is exactly `0` or `255` — the binary-raster
    /// predicate named in the data model's Invariants section.
    pub fn is_binary(&self) -> bool {
        match &self.data {
            RasterData::U8(v) => v.iter().all(|&p| p == 0 || p == 255),
            RasterData::U16(v) => v.iter().all(|&p| p == 0 || p == 255),
            RasterData::F32(v) => v.iter().all(|&p| p == 0.0 || p == 255.0),
        }
    }

    pub fn fill(&mut self, region: Region, value: f64) {
        let (sx, sy, _sz) = (self.size_x, self.size_y, self.size_z);
        macro_rules! fill_kind {
            ($buf:expr, $conv:expr) => {
                for z in region.z0..region.z1 {
                    for y in region.y0..region.y1 {
                        let row = (z * sy + y) * sx;
                        for x in region.x0..region.x1 {
                            $buf[row + x] = $conv;
                        }
                    }
                }
            };
        }
        match &mut self.data {
            RasterData::U8(buf) => fill_kind!(buf, u8::from_f64_round(value)),
            RasterData::U16(buf) => fill_kind!(buf, u16::from_f64_round(value)),
            RasterData::F32(buf) => fill_kind!(buf, f32::from_f64_round(value)),
        }
    }

    pub fn set_f64(&mut self, x: i64, y: i64, z: i64, value: f64) -> MorphResult<()> {
        let idx = self.index(x, y, z)?;
        match &mut self.data {
            RasterData::U8(buf) => buf[idx] = u8::from_f64_round(value),
            RasterData::U16(buf) => buf[idx] = u16::from_f64_round(value),
            RasterData::F32(buf) => buf[idx] = f32::from_f64_round(value),
        }
        Ok(())
    }

    pub fn set_f64_unchecked(&mut self, idx: usize, value: f64) {
        match &mut self.data {
            RasterData::U8(buf) => buf[idx] = u8::from_f64_round(value),
            RasterData::U16(buf) => buf[idx] = u16::from_f64_round(value),
            RasterData::F32(buf) => buf[idx] = f32::from_f64_round(value),
        }
    }

    pub fn get_f64_unchecked(&self, idx: usize) -> f64 {
        self.data.get_f64(idx)
    }

    /// Typed access to the underlying buffer; panics if `T` does not match
    /// the raster's element kind. Used by generic engine code that already
    /// knows (and has matched on) the concrete kind.
    pub fn as_slice<T: PixelValue + FromRasterData>(&self) -> &[T] {
        T::from_raster_data(&self.data)
    }

    pub fn as_mut_slice<T: PixelValue + FromRasterData>(&mut self) -> &mut [T] {
        T::from_raster_data_mut(&mut self.data)
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Inverse of [`Self::index_unchecked`].
    pub fn unflatten(&self, idx: usize) -> (usize, usize, usize) {
        let plane = self.size_x * self.size_y;
        let z = idx / plane;
        let rem = idx % plane;
        let y = rem / self.size_x;
        let x = rem % self.size_x;
        (x, y, z)
    }
}

/// The host-adapter boundary named in spec §6: "the core consumes and
/// produces rasters via an abstract trait ... coupling to any host image
/// type is achieved at the boundary by a thin adapter supplied by the host."
/// [`Raster`] is itself the reference implementation; a host's own image type
/// only needs these four accessors to hand data to the engines.
pub trait HostRaster {
    fn host_dims(&self) -> (usize, usize, usize);
    fn host_element_kind(&self) -> ElementKind;
    fn host_get_f64(&self, x: i64, y: i64, z: i64) -> MorphResult<f64>;
    fn host_set_f64(&mut self, x: i64, y: i64, z: i64, value: f64) -> MorphResult<()>;
}

impl HostRaster for Raster {
    fn host_dims(&self) -> (usize, usize, usize) {
        self.dims()
    }
    fn host_element_kind(&self) -> ElementKind {
        self.element_kind()
    }
    fn host_get_f64(&self, x: i64, y: i64, z: i64) -> MorphResult<f64> {
        self.get_f64(x, y, z)
    }
    fn host_set_f64(&mut self, x: i64, y: i64, z: i64, value: f64) -> MorphResult<()> {
        self.set_f64(x, y, z, value)
    }
}

/// Maps a concrete pixel type onto its [`RasterData`] variant, in both
/// directions. Kept as a pair of small traits instead of one big `enum` of
/// function pointers, so generic engine code can write `T::from_raster_data`
/// without a runtime tag check beyond the one `match` at construction time.
pub trait IntoRasterData: PixelValue {
    fn into_raster_data(values: Vec<Self>) -> RasterData;
}

pub trait FromRasterData: PixelValue {
    fn from_raster_data(data: &RasterData) -> &[Self];
    fn from_raster_data_mut(data: &mut RasterData) -> &mut [Self];
}

impl IntoRasterData for u8 {
    fn into_raster_data(values: Vec<Self>) -> RasterData {
        RasterData::U8(values)
    }
}
impl IntoRasterData for u16 {
    fn into_raster_data(values: Vec<Self>) -> RasterData {
        RasterData::U16(values)
    }
}
impl IntoRasterData for f32 {
    fn into_raster_data(values: Vec<Self>) -> RasterData {
        RasterData::F32(values)
    }
}

impl FromRasterData for u8 {
    fn from_raster_data(data: &RasterData) -> &[Self] {
        match data {
            RasterData::U8(v) => v,
            _ => panic!("raster element kind is not u8"),
        }
    }
    fn from_raster_data_mut(data: &mut RasterData) -> &mut [Self] {
        match data {
            RasterData::U8(v) => v,
            _ => panic!("raster element kind is not u8"),
        }
    }
}
impl FromRasterData for u16 {
    fn from_raster_data(data: &RasterData) -> &[Self] {
        match data {
            RasterData::U16(v) => v,
            _ => panic!("raster element kind is not u16"),
        }
    }
    fn from_raster_data_mut(data: &mut RasterData) -> &mut [Self] {
        match data {
            RasterData::U16(v) => v,
            _ => panic!("raster element kind is not u16"),
        }
    }
}
impl FromRasterData for f32 {
    fn from_raster_data(data: &RasterData) -> &[Self] {
        match data {
            RasterData::F32(v) => v,
            _ => panic!("raster element kind is not f32"),
        }
    }
    fn from_raster_data_mut(data: &mut RasterData) -> &mut [Self] {
        match data {
            RasterData::F32(v) => v,
            _ => panic!("raster element kind is not f32"),
        }
    }
}

/// Dispatches a generic engine call across the three element kinds, then
/// re-wraps the result. This is the "monomorphized inner loop per variant,
/// selected once at the top of each entry point" mechanism from the design
/// notes: everything above this macro is generic over `T: PixelValue`,
/// everything at this boundary is a three-armed `match`.
#[macro_export]
macro_rules! dispatch_raster {
    ($raster:expr, |$buf:ident: $ty:ident| $body:expr) => {
        match $raster.data() {
            $crate::raster::RasterData::U8($buf) => {
                #[allow(unused)]
                type $ty = u8;
                $body
            }
            $crate::raster::RasterData::U16($buf) => {
                #[allow(unused)]
                type $ty = u16;
                $body
            }
            $crate::raster::RasterData::F32($buf) => {
                #[allow(unused)]
                type $ty = f32;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_2d_is_zero_filled_and_not_3d() {
        let r = Raster::new_2d(4, 3, ElementKind::U8);
        assert_eq!(r.size_x(), 4);
        assert_eq!(r.size_y(), 3);
        assert_eq!(r.size_z(), 1);
        assert!(!r.is_3d());
        assert_eq!(r.len(), 12);
        assert_eq!(r.get_f64(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let r = Raster::new_2d(4, 3, ElementKind::U8);
        let err = r.get_f64(4, 0, 0).unwrap_err();
        assert_eq!(
            err,
            MorphError::OutOfBounds {
                axis: Axis::X,
                value: 4,
                bound: 4
            }
        );
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut r = Raster::new_2d(2, 2, ElementKind::U16);
        r.set_f64(1, 1, 0, 1000.0).unwrap();
        assert_eq!(r.get_f64(1, 1, 0).unwrap(), 1000.0);
        assert_eq!(r.get_f64(0, 0, 0).unwrap(), 0.0);
    }

    #[test]
    fn fill_region_only_touches_region() {
        let mut r = Raster::new_2d(5, 5, ElementKind::U8);
        r.fill(
            Region {
                x0: 1,
                y0: 1,
                z0: 0,
                x1: 4,
                y1: 4,
                z1: 1,
            },
            255.0,
        );
        assert_eq!(r.get_f64(0, 0, 0).unwrap(), 0.0);
        assert_eq!(r.get_f64(2, 2, 0).unwrap(), 255.0);
        assert_eq!(r.get_f64(4, 4, 0).unwrap(), 0.0);
    }

    #[test]
    fn unflatten_inverts_index_unchecked() {
        let r = Raster::new_3d(4, 3, 2, ElementKind::U8);
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    let idx = r.index_unchecked(x, y, z);
                    assert_eq!(r.unflatten(idx), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn host_raster_adapter_delegates_to_the_inherent_methods() {
        let mut r = Raster::new_2d(2, 2, ElementKind::U8);
        HostRaster::host_set_f64(&mut r, 1, 1, 0, 90.0).unwrap();
        assert_eq!(HostRaster::host_get_f64(&r, 1, 1, 0).unwrap(), 90.0);
        assert_eq!(HostRaster::host_dims(&r), (2, 2, 1));
    }

    #[test]
    fn is_binary_detects_non_binary_values() {
        let mut r = Raster::new_2d(2, 2, ElementKind::U8);
        assert!(r.is_binary());
        r.set_f64(0, 0, 0, 128.0).unwrap();
        assert!(!r.is_binary());
    }
}
