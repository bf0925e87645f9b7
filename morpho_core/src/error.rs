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
//! Error taxonomy for the morphology core (spec §7).
//!
//! Named after the `MorphError`/`MorphResult` convention used by the
//! `leptonica-rs` morphology crate: a small closed enum returned by value,
//! never a panic, for every failure mode the engines can observe. Clamping
//! (`NumericOverflow` in the spec's taxonomy) is deliberately not a variant
//! here — spec §7 defines clamping as the behaviour, not an error; it is
//! surfaced only through [`crate::progress::ProgressListener::on_status`].

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum MorphError {
    #[error("coordinate {axis}={value} is out of bounds (0..{bound})")]
    OutOfBounds {
        axis: Axis,
        value: i64,
        bound: usize,
    },

    #[error("seed coordinate out of bounds")]
    InvalidSeed,

    #[error("connectivity {0} is not valid for this raster's dimensionality")]
    InvalidConnectivity(u8),

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("shape mismatch: {message}")]
    ShapeMismatch { message: String },

    #[error("a 2D structuring element cannot be applied to a raster with size_z={size_z}")]
    DimensionMismatch { size_z: usize },

    #[error("precondition violated: {message}")]
    PreconditionViolated { message: String },

    #[error("label count {count} exceeds the capacity of a {bit_depth}-bit output (max {max})")]
    LabelOverflow {
        count: u64,
        bit_depth: u32,
        max: u64,
    },

    #[error("operation cancelled")]
    Cancelled,
}

pub type MorphResult<T> = Result<T, MorphError>;
