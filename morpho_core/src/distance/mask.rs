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
//! Chamfer mask catalogue (spec §3, §6).
//!
//! A chamfer mask is stored as its *causal* half only — the offsets that
//! precede the centre in scan order `(z, y, x)` ascending. The anti-causal
//! half used by the backward sweep is always the point reflection of the
//! causal half, so it is derived rather than stored twice.

/// One `(offset, weight)` entry of a chamfer mask's causal half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChamferWeight {
    pub offset: (i64, i64, i64),
    pub weight: u32,
}

/// A chamfer mask: a causal offset/weight set plus the axial weight used for
/// normalization (spec §3: "each mask has a normalization factor equal to
/// its first (axial) weight").
#[derive(Debug, Clone, PartialEq)]
pub struct ChamferMask {
    causal: Vec<ChamferWeight>,
    axial_weight: u32,
}

impl ChamferMask {
    fn new(causal: Vec<ChamferWeight>, axial_weight: u32) -> Self {
        ChamferMask {
            causal,
            axial_weight,
        }
    }

    pub fn causal_offsets(&self) -> &[ChamferWeight] {
        &self.causal
    }

    pub fn anti_causal_offsets(&self) -> Vec<ChamferWeight> {
        self.causal
            .iter()
            .map(|w| ChamferWeight {
                offset: (-w.offset.0, -w.offset.1, -w.offset.2),
                weight: w.weight,
            })
            .collect()
    }

    pub fn axial_weight(&self) -> u32 {
        self.axial_weight
    }

    pub fn is_3d(&self) -> bool {
        self.causal.iter().any(|w| w.offset.2 != 0)
    }

    /// Chessboard distance: all eight 2D neighbors weighted `1`.
    pub fn chebyshev() -> Self {
        ChamferMask::new(
            vec![
                cw(-1, 0, 0, 1),
                cw(0, -1, 0, 1),
                cw(-1, -1, 0, 1),
                cw(1, -1, 0, 1),
            ],
            1,
        )
    }

    /// Manhattan distance: only the axial 2D neighbors, weighted `1`.
    pub fn city_block() -> Self {
        ChamferMask::new(vec![cw(-1, 0, 0, 1), cw(0, -1, 0, 1)], 1)
    }

    /// The classic 3x3 "3-4" chamfer: axial weight 3, diagonal weight 4.
    pub fn chamfer_3_4() -> Self {
        ChamferMask::new(
            vec![
                cw(-1, 0, 0, 3),
                cw(0, -1, 0, 3),
                cw(-1, -1, 0, 4),
                cw(1, -1, 0, 4),
            ],
            3,
        )
    }

    /// The 5x5 "5-7-11" chamfer, adding knight-move offsets to the 3-4 mask.
    pub fn chamfer_5_7_11() -> Self {
        ChamferMask::new(
            vec![
                cw(-1, 0, 0, 5),
                cw(0, -1, 0, 5),
                cw(-1, -1, 0, 7),
                cw(1, -1, 0, 7),
                cw(-2, -1, 0, 11),
                cw(2, -1, 0, 11),
                cw(-1, -2, 0, 11),
                cw(1, -2, 0, 11),
            ],
            5,
        )
    }

    /// 3D "Borgefors 3-4-5": axial weight 3, face-diagonal 4, corner-diagonal 5.
    pub fn borgefors_3_4_5() -> Self {
        ChamferMask::new(
            vec![
                cw(-1, 0, 0, 3),
                cw(0, -1, 0, 3),
                cw(0, 0, -1, 3),
                cw(-1, -1, 0, 4),
                cw(1, -1, 0, 4),
                cw(-1, 0, -1, 4),
                cw(1, 0, -1, 4),
                cw(0, -1, -1, 4),
                cw(0, 1, -1, 4),
                cw(-1, -1, -1, 5),
                cw(1, -1, -1, 5),
                cw(-1, 1, -1, 5),
                cw(1, 1, -1, 5),
            ],
            3,
        )
    }

    /// Builds the 3x3 mask (2 weights: axial, diagonal) or the 5x5 mask (3
    /// weights: axial, diagonal, knight) from raw short weights, per spec §6.
    pub fn from_weights(weights: &[u32]) -> Option<Self> {
        match weights {
            [axial, diag] => Some(ChamferMask::new(
                vec![
                    cw(-1, 0, 0, *axial),
                    cw(0, -1, 0, *axial),
                    cw(-1, -1, 0, *diag),
                    cw(1, -1, 0, *diag),
                ],
                *axial,
            )),
            [axial, diag, knight] => Some(ChamferMask::new(
                vec![
                    cw(-1, 0, 0, *axial),
                    cw(0, -1, 0, *axial),
                    cw(-1, -1, 0, *diag),
                    cw(1, -1, 0, *diag),
                    cw(-2, -1, 0, *knight),
                    cw(2, -1, 0, *knight),
                    cw(-1, -2, 0, *knight),
                    cw(1, -2, 0, *knight),
                ],
                *axial,
            )),
            _ => None,
        }
    }
}

fn cw(dx: i64, dy: i64, dz: i64, weight: u32) -> ChamferWeight {
    ChamferWeight {
        offset: (dx, dy, dz),
        weight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anti_causal_is_the_point_reflection_of_causal() {
        let mask = ChamferMask::chamfer_3_4();
        let anti = mask.anti_causal_offsets();
        for w in mask.causal_offsets() {
            let (dx, dy, dz) = w.offset;
            assert!(anti.iter().any(|a| a.offset == (-dx, -dy, -dz) && a.weight == w.weight));
        }
    }

    #[test]
    fn from_weights_picks_the_right_mask_size() {
        let three = ChamferMask::from_weights(&[3, 4]).unwrap();
        assert_eq!(three.causal_offsets().len(), 4);
        let five = ChamferMask::from_weights(&[5, 7, 11]).unwrap();
        assert_eq!(five.causal_offsets().len(), 8);
        assert!(ChamferMask::from_weights(&[1, 2, 3, 4]).is_none());
    }

    #[test]
    fn borgefors_is_flagged_three_dimensional() {
        assert!(ChamferMask::borgefors_3_4_5().is_3d());
        assert!(!ChamferMask::chamfer_3_4().is_3d());
    }
}
