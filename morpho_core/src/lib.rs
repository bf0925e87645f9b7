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
//! 2D/3D mathematical morphology: flood-fill, structuring-element dilation
//! and erosion, geodesic reconstruction, regional/extended extrema and
//! attribute filters, chamfer/geodesic distance transforms, and
//! connected-component labeling over grayscale and binary rasters.
//!
//! The static "ImageJ plugin" surface of the system this crate grew out of
//! becomes, per idiomatic Rust convention, a set of free functions grouped
//! by module rather than a god-object of static methods. [`prelude`]
//! re-exports the common entry points for callers who want one `use`.

pub mod cancel;
pub mod distance;
pub mod error;
pub mod extrema;
pub mod floodfill;
pub mod labeling;
pub mod pixel;
pub mod progress;
pub mod raster;
pub mod reconstruction;
pub mod strel;

pub use error::{Axis, MorphError, MorphResult};
pub use pixel::ElementKind;
pub use raster::{HostRaster, Raster, Region};

/// Common entry points, re-exported flat for `use morpho_core::prelude::*;`.
pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::distance::{
        binary_dilation_ball, binary_dilation_disk, binary_erosion_ball, binary_erosion_disk,
        chamfer_distance, geodesic_distance, ChamferMask, ChamferWeight,
    };
    pub use crate::error::{MorphError, MorphResult};
    pub use crate::extrema::{
        area_open, binary_area_open, extended_maxima, extended_minima, impose_maxima, impose_minima,
        regional_maxima, regional_minima, volume_closing,
    };
    pub use crate::floodfill::{flood_fill, flood_fill_into};
    pub use crate::labeling::{
        fill_small_holes, keep_largest_region, label, largest_region, remove_largest, size_opening,
    };
    pub use crate::pixel::ElementKind;
    pub use crate::progress::{ProgressList, ProgressListener};
    pub use crate::raster::neighborhood::{Connectivity, Connectivity2D, Connectivity3D};
    pub use crate::raster::{HostRaster, Raster, Region};
    pub use crate::reconstruction::{fill_holes, reconstruct_by_dilation, reconstruct_by_erosion, ReconstructionKind};
    pub use crate::strel::{apply, gradient, laplacian, white_top_hat, black_top_hat, MorphOp, Strel};
}
