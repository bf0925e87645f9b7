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
//! Packed-RGB decomposition at the API boundary (spec §1, §4.3).
//!
//! "Multi-channel (RGB) images are handled by splitting into channels at the
//! boundary and applying the core per channel." No channel-interaction logic
//! exists inside the core; this module only splits/recomposes.

use crate::pixel::ElementKind;
use crate::raster::Raster;
use rayon::prelude::*;

/// A packed 3x`u8` RGB image, decomposed into three independent `u8`
/// rasters at the boundary and recomposed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRaster {
    pub size_x: usize,
    pub size_y: usize,
    pub pixels: Vec<[u8; 3]>,
}

impl ColorRaster {
    pub fn new(size_x: usize, size_y: usize, pixels: Vec<[u8; 3]>) -> Self {
        assert_eq!(pixels.len(), size_x * size_y);
        ColorRaster {
            size_x,
            size_y,
            pixels,
        }
    }

    pub fn split_channels(&self) -> [Raster; 3] {
        let mut channels = [
            vec![0u8; self.pixels.len()],
            vec![0u8; self.pixels.len()],
            vec![0u8; self.pixels.len()],
        ];
        for (idx, px) in self.pixels.iter().enumerate() {
            channels[0][idx] = px[0];
            channels[1][idx] = px[1];
            channels[2][idx] = px[2];
        }
        let [r, g, b] = channels;
        [
            Raster::from_vec_2d(self.size_x, self.size_y, r),
            Raster::from_vec_2d(self.size_x, self.size_y, g),
            Raster::from_vec_2d(self.size_x, self.size_y, b),
        ]
    }

    pub fn from_channels(size_x: usize, size_y: usize, channels: [Raster; 3]) -> Self {
        let n = size_x * size_y;
        let bufs: Vec<&[u8]> = channels.iter().map(|r| r.as_slice::<u8>()).collect();
        let mut pixels = vec![[0u8; 3]; n];
        for idx in 0..n {
            pixels[idx] = [bufs[0][idx], bufs[1][idx], bufs[2][idx]];
        }
        ColorRaster {
            size_x,
            size_y,
            pixels,
        }
    }

    pub fn element_kind(&self) -> ElementKind {
        ElementKind::U8
    }
}

/// Apply a per-channel operation to every channel independently and
/// recompose the result. Channels are independent by construction, so they
/// are processed with `rayon` in parallel — the one place spec §5 allows
/// the engines to exploit concurrency ("free to parallelise independent
/// channels").
pub fn apply_per_channel<F>(image: &ColorRaster, op: F) -> ColorRaster
where
    F: Fn(&Raster, usize) -> Raster + Sync,
{
    let channels = image.split_channels();
    let mut results: Vec<Raster> = (0..3)
        .into_par_iter()
        .map(|i| op(&channels[i], i))
        .collect();
    let b = results.pop().unwrap();
    let g = results.pop().unwrap();
    let r = results.pop().unwrap();
    ColorRaster::from_channels(image.size_x, image.size_y, [r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_then_recompose_round_trips() {
        let pixels = vec![[1, 2, 3], [4, 5, 6], [7, 8, 9], [10, 11, 12]];
        let img = ColorRaster::new(2, 2, pixels.clone());
        let channels = img.split_channels();
        assert_eq!(channels[0].get_f64(1, 0, 0).unwrap(), 4.0);
        let recomposed = ColorRaster::from_channels(2, 2, channels);
        assert_eq!(recomposed.pixels, pixels);
    }

    #[test]
    fn apply_per_channel_preserves_independence() {
        let pixels = vec![[10, 20, 30], [40, 50, 60]];
        let img = ColorRaster::new(2, 1, pixels);
        let out = apply_per_channel(&img, |raster, _channel_idx| {
            let mut r = raster.duplicate();
            for i in 0..r.len() {
                let v = r.get_f64_unchecked(i);
                r.set_f64_unchecked(i, v + 1.0);
            }
            r
        });
        assert_eq!(out.pixels, vec![[11, 21, 31], [41, 51, 61]]);
    }
}
