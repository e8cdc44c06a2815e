// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Morton (Z-order) codes and the integer lattice that feeds them.
//!
//! Codes interleave one bit per axis in the order x, y, z, starting with the
//! least significant bit of each coordinate. Bit `3 * i` of a code is bit `i`
//! of x, bit `3 * i + 1` is bit `i` of y and bit `3 * i + 2` is bit `i` of z.
//!
//! [`encode`] accepts up to [`AXIS_BITS`] bits per axis (a 63-bit code). The
//! [`Lattice`] used by the tree builder quantizes to [`LATTICE_BITS`] bits per
//! axis so that the [`LEVELS`]-deep radix partition consumes every significant
//! digit of a code.

use crate::types::Aabb3D;

/// Maximum number of bits per axis that [`encode`] can interleave.
pub const AXIS_BITS: u32 = 21;

/// Bits per axis produced by [`Lattice::quantize`].
pub const LATTICE_BITS: u32 = 20;

/// Largest lattice coordinate on any axis.
pub const LATTICE_MAX: u32 = (1 << LATTICE_BITS) - 1;

/// Number of 3-bit digits in a lattice code.
pub const LEVELS: u32 = LATTICE_BITS;

/// Bit span of a full lattice code; the root of a partition starts here.
pub const ROOT_SHIFT: u32 = 3 * LEVELS;

const AXIS_MASK: u64 = (1 << AXIS_BITS) - 1;

/// Spread the low 21 bits of `v` so that there are two zero bits between each.
#[inline]
fn spread(v: u32) -> u64 {
    let mut x = u64::from(v) & AXIS_MASK;
    x = (x | (x << 32)) & 0x001f_0000_0000_ffff;
    x = (x | (x << 16)) & 0x001f_0000_ff00_00ff;
    x = (x | (x << 8)) & 0x100f_00f0_0f00_f00f;
    x = (x | (x << 4)) & 0x10c3_0c30_c30c_30c3;
    x = (x | (x << 2)) & 0x1249_2492_4924_9249;
    x
}

/// Inverse of [`spread`].
#[inline]
fn compact(code: u64) -> u32 {
    let mut x = code & 0x1249_2492_4924_9249;
    x = (x | (x >> 2)) & 0x10c3_0c30_c30c_30c3;
    x = (x | (x >> 4)) & 0x100f_00f0_0f00_f00f;
    x = (x | (x >> 8)) & 0x001f_0000_ff00_00ff;
    x = (x | (x >> 16)) & 0x001f_0000_0000_ffff;
    x = (x | (x >> 32)) & AXIS_MASK;
    u32::try_from(x).unwrap_or(u32::MAX)
}

/// Interleave three lattice coordinates into a Morton code.
///
/// Bits above [`AXIS_BITS`] are ignored; callers that need range safety
/// should go through [`Lattice`], which clamps instead.
#[inline]
pub fn encode(x: u32, y: u32, z: u32) -> u64 {
    spread(x) | (spread(y) << 1) | (spread(z) << 2)
}

/// Split a Morton code back into its lattice coordinates.
#[inline]
pub fn decode(code: u64) -> [u32; 3] {
    [compact(code), compact(code >> 1), compact(code >> 2)]
}

/// The 3-bit child digit of `code` for a span that starts at `shift`.
///
/// `shift` is the bit position just above the digit, so the root digit of a
/// lattice code is `digit(code, ROOT_SHIFT)`.
#[inline]
#[allow(clippy::cast_possible_truncation, reason = "masked to 3 bits.")]
pub fn digit(code: u64, shift: u32) -> usize {
    ((code >> (shift - 3)) & 0b111) as usize
}

/// Linear map from a bounding box onto the integer lattice.
///
/// Every axis of the box is stretched onto `0..=LATTICE_MAX`. Points outside
/// the box, including ones that land a rounding error past the far face, are
/// clamped onto the boundary rather than wrapped. An axis with zero extent
/// maps every point to 0, as does the vertical axis when `ignore_z` is set.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lattice {
    origin: [f64; 3],
    scale: [f64; 3],
}

impl Lattice {
    /// Build the lattice spanning `bounds`.
    pub fn new(bounds: &Aabb3D, ignore_z: bool) -> Self {
        let extent = bounds.extent();
        let max = f64::from(LATTICE_MAX);
        let mut scale = extent.map(|e| if e > 0.0 { max / e } else { 0.0 });
        if ignore_z {
            scale[2] = 0.0;
        }
        Self {
            origin: bounds.min(),
            scale,
        }
    }

    /// Per-axis scale factors, lattice units per world unit.
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Quantize a point to lattice coordinates, clamped to `0..=LATTICE_MAX`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "the cast only sees values in (0, LATTICE_MAX); truncation is the intended floor."
    )]
    pub fn quantize(&self, p: [f64; 3]) -> [u32; 3] {
        let mut out = [0; 3];
        for axis in 0..3 {
            let v = (p[axis] - self.origin[axis]) * self.scale[axis];
            out[axis] = if v.is_nan() || v <= 0.0 {
                0
            } else if v >= f64::from(LATTICE_MAX) {
                LATTICE_MAX
            } else {
                v as u32
            };
        }
        out
    }

    /// Morton code of a point.
    pub fn code(&self, p: [f64; 3]) -> u64 {
        let [x, y, z] = self.quantize(p);
        encode(x, y, z)
    }
}
