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
//! The tagged-variant pixel model described in the design notes: a small,
//! closed set of element kinds, each with a monomorphized code path chosen
//! once at the top of every entry point rather than dispatched per pixel.

use std::fmt;

/// Element kind of a [`crate::raster::Raster`], selected once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U8,
    U16,
    F32,
}

impl ElementKind {
    pub fn bit_depth(self) -> u32 {
        match self {
            ElementKind::U8 => 8,
            ElementKind::U16 => 16,
            ElementKind::F32 => 32,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::U8 => write!(f, "u8"),
            ElementKind::U16 => write!(f, "u16"),
            ElementKind::F32 => write!(f, "f32"),
        }
    }
}

/// Numeric contract shared by every element kind the engines operate on.
///
/// Every generic engine function (flood-fill run detection, strel
/// dilation/erosion, reconstruction, distance transforms, attribute
/// openings) is written once against this trait and monomorphized per
/// element kind, matching the "tagged variant with a monomorphized inner
/// loop per variant" design note.
pub trait PixelValue: Copy + PartialOrd + PartialEq + Send + Sync + fmt::Debug + 'static {
    const KIND: ElementKind;
    const ZERO: Self;
    /// The general-purpose ceiling used by `Raster::max_value()` and every
    /// clamp/fill/sentinel call site across the engines (e.g. "paint this
    /// pixel with the brightest representable value", "this distance was
    /// never reached"). `255` for `u8`, `65535` for `u16`; the largest
    /// finite `f32` for float rasters, which are otherwise unrestricted per
    /// the data model — unlike the integer kinds this is not a value real
    /// data is expected to reach, it exists so generic engine code has a
    /// ceiling to clamp or fill with that never truncates legitimate f32
    /// values.
    const MAX_VALUE: Self;
    /// Reference range used only by [`Self::midpoint`] for the Laplacian's
    /// zero-crossing shift. `255`/`65535` for the integer kinds, same as
    /// `MAX_VALUE`; `1.0` for `f32` by convention. Never used to clamp or
    /// fill a raster — that's `MAX_VALUE`'s job.
    const LAPLACIAN_RANGE: Self;

    fn to_f64(self) -> f64;
    fn from_f64_round(v: f64) -> Self;

    /// Pointwise max/min, used by dilation/erosion inner loops.
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;

    /// `self - other`, clamped to `[ZERO, MAX_VALUE]` for integer kinds;
    /// identity (no clamp) for `f32`, per spec: "All differences are
    /// clamped to the element's value range ... unclamped for f32."
    fn clamped_sub(self, other: Self) -> Self;

    /// Half of [`Self::LAPLACIAN_RANGE`], used as the Laplacian midpoint
    /// shift.
    fn midpoint() -> Self {
        Self::from_f64_round(Self::LAPLACIAN_RANGE.to_f64() / 2.0)
    }
}

impl PixelValue for u8 {
    const KIND: ElementKind = ElementKind::U8;
    const ZERO: Self = 0;
    const MAX_VALUE: Self = 255;
    const LAPLACIAN_RANGE: Self = 255;

    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64_round(v: f64) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }
    fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }
    fn min(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }
    fn clamped_sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }
}

impl PixelValue for u16 {
    const KIND: ElementKind = ElementKind::U16;
    const ZERO: Self = 0;
    const MAX_VALUE: Self = 65535;
    const LAPLACIAN_RANGE: Self = 65535;

    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64_round(v: f64) -> Self {
        v.round().clamp(0.0, 65535.0) as u16
    }
    fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }
    fn min(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }
    fn clamped_sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }
}

impl PixelValue for f32 {
    const KIND: ElementKind = ElementKind::F32;
    const ZERO: Self = 0.0;
    const MAX_VALUE: Self = f32::MAX;
    const LAPLACIAN_RANGE: Self = 1.0;

    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64_round(v: f64) -> Self {
        v as f32
    }
    fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
    fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }
    fn clamped_sub(self, other: Self) -> Self {
        self - other
    }
}

/// The two distinguished binary values, valid for every integer kind.
pub const BACKGROUND: u8 = 0;
pub const FOREGROUND: u8 = 255;
