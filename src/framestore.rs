//! Planar YUV frame buffers with subsampling-aware accessors.
//!
//! The chroma coordinate fold (`adj`) is centralised in
//! `ColorSpace::fold_chroma`, per spec.md §9's design note, and is the
//! only place that needs to know how 4:2:2/4:2:0 subsampling maps a
//! full-resolution coordinate to a chroma-plane index.

use crate::error::{Error, Result};

/// Chroma subsampling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    C444,
    C422,
    C420,
}

impl ColorSpace {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            444 => Ok(ColorSpace::C444),
            422 => Ok(ColorSpace::C422),
            420 => Ok(ColorSpace::C420),
            other => Err(Error::UnsupportedColorSpace(other)),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ColorSpace::C444 => 444,
            ColorSpace::C422 => 422,
            ColorSpace::C420 => 420,
        }
    }

    /// Chroma plane dimensions for a full-resolution (h, w).
    pub fn chroma_dims(self, h: usize, w: usize) -> (usize, usize) {
        match self {
            ColorSpace::C444 => (h, w),
            ColorSpace::C422 => (h, w / 2),
            ColorSpace::C420 => (h / 2, w / 2),
        }
    }

    /// Folds a full-resolution (l, c) to the chroma-plane coordinate.
    /// Returns `None` if either folded coordinate would be negative.
    pub fn fold_chroma(self, l: isize, c: isize) -> Option<(isize, isize)> {
        if l < 0 || c < 0 {
            return None;
        }
        match self {
            ColorSpace::C444 => Some((l, c)),
            ColorSpace::C422 => Some((l, c / 2)),
            ColorSpace::C420 => Some((l / 2, c / 2)),
        }
    }
}

/// A single planar YUV frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub color_space: ColorSpace,
    pub width: usize,
    pub height: usize,
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
}

impl Frame {
    pub fn new(color_space: ColorSpace, width: usize, height: usize) -> Self {
        let (ch, cw) = color_space.chroma_dims(height, width);
        Self {
            color_space,
            width,
            height,
            y: vec![0u8; width * height],
            u: vec![0u8; cw * ch],
            v: vec![0u8; cw * ch],
        }
    }

    pub fn chroma_dims(&self) -> (usize, usize) {
        self.color_space.chroma_dims(self.height, self.width)
    }

    /// Full-resolution pixel lookup. Returns `(0, 0, 0)` if any adjusted
    /// coordinate is negative; this is the boundary contract the MED
    /// predictor and block search depend on.
    pub fn get_pixel(&self, l: isize, c: isize) -> (u8, u8, u8) {
        if l < 0 || c < 0 || l as usize >= self.height || c as usize >= self.width {
            return (0, 0, 0);
        }
        let y = self.y[l as usize * self.width + c as usize];
        let (cl, cc) = match self.color_space.fold_chroma(l, c) {
            Some(v) => v,
            None => return (0, 0, 0),
        };
        let (_, cw) = self.chroma_dims();
        let idx = cl as usize * cw + cc as usize;
        (y, self.u[idx], self.v[idx])
    }

    /// Writes Y at (l, c), or chroma at the folded coordinate, for the
    /// given component (0 = Y, 1 = U, 2 = V).
    pub fn put_component(&mut self, component: usize, l: isize, c: isize, value: u8) {
        match component {
            0 => {
                if l >= 0 && c >= 0 {
                    self.y[l as usize * self.width + c as usize] = value;
                }
            }
            1 | 2 => {
                if let Some((cl, cc)) = self.color_space.fold_chroma(l, c) {
                    let (_, cw) = self.chroma_dims();
                    let idx = cl as usize * cw + cc as usize;
                    if component == 1 {
                        self.u[idx] = value;
                    } else {
                        self.v[idx] = value;
                    }
                }
            }
            _ => panic!("invalid component index {}", component),
        }
    }

    /// Assembles a logical `b x b x 3` block by repeated full-resolution
    /// pixel lookup, starting at (l0, c0).
    pub fn get_block(&self, l0: usize, c0: usize, b: usize) -> Vec<Vec<(u8, u8, u8)>> {
        (0..b)
            .map(|dl| {
                (0..b)
                    .map(|dc| self.get_pixel((l0 + dl) as isize, (c0 + dc) as isize))
                    .collect()
            })
            .collect()
    }

    /// Row-major block count for block size `b` (trailing partial rows
    /// and columns are not counted; non-goal: partial blocks).
    pub fn block_grid_dims(&self, b: usize) -> (usize, usize) {
        (self.height / b, self.width / b)
    }

    /// Partitions the frame into its full row-major grid of `b x b x 3`
    /// blocks, `tile[i][j] == get_block(i*b, j*b, b)`. Trailing partial
    /// rows/columns are dropped, matching `block_grid_dims`.
    pub fn tile(&self, b: usize) -> Vec<Vec<Vec<Vec<(u8, u8, u8)>>>> {
        let (rows, cols) = self.block_grid_dims(b);
        (0..rows)
            .map(|i| (0..cols).map(|j| self.get_block(i * b, j * b, b)).collect())
            .collect()
    }
}
