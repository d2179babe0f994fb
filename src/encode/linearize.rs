// src/encode/linearize.rs

//! Mapping between a 2D pixel grid and its 1D Hilbert-order sequence.
//!
//! The image is treated as if embedded in the top-left corner of a zeroed
//! `N x N` canvas. Padding cells read as zero and are dropped again on the way
//! back. When `flip_vertical` is set the rows are read bottom-up, which is the
//! orientation the compatibility format expects; the same flag must be passed
//! to both directions.

use super::hilbert::HilbertOrder;
use crate::image::pixel_grid::PixelGrid;
use crate::utils::error::{CodecError, Result};

/// One plane of `N * N` samples per channel, in curve order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearSequence {
    planes: Vec<Vec<u8>>,
}

impl LinearSequence {
    /// Assembles a sequence from per-channel planes of equal length.
    pub fn from_planes(planes: Vec<Vec<u8>>) -> Result<Self> {
        if planes.len() != 1 && planes.len() != 3 {
            return Err(CodecError::UnsupportedChannelCount(planes.len()));
        }
        let len = planes[0].len();
        if planes.iter().any(|p| p.len() != len) {
            return Err(CodecError::ShapeMismatch(
                "channel planes differ in length".to_string(),
            ));
        }
        Ok(Self { planes })
    }

    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Number of curve positions.
    pub fn len(&self) -> usize {
        self.planes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn plane(&self, channel: usize) -> &[u8] {
        &self.planes[channel]
    }

    pub fn planes(&self) -> &[Vec<u8>] {
        &self.planes
    }

    pub fn into_planes(self) -> Vec<Vec<u8>> {
        self.planes
    }
}

fn check_fits(height: usize, width: usize, curve: &HilbertOrder) -> Result<()> {
    let side = curve.side();
    if height > side || width > side {
        return Err(CodecError::ShapeMismatch(format!(
            "{}x{} image does not fit a {}x{} curve grid",
            height, width, side, side
        )));
    }
    Ok(())
}

/// Samples `grid` along `curve`, one plane per channel.
pub fn to_linear(grid: &PixelGrid, curve: &HilbertOrder, flip_vertical: bool) -> Result<LinearSequence> {
    let (height, width, channels) = grid.shape();
    check_fits(height, width, curve)?;

    let mut planes = vec![vec![0u8; curve.len()]; channels];
    for (i, &(x, y)) in curve.iter().enumerate() {
        let (row, col) = (y as usize, x as usize);
        if row >= height || col >= width {
            continue;
        }
        let src_row = if flip_vertical { height - 1 - row } else { row };
        for (plane, &sample) in planes.iter_mut().zip(grid.pixel(src_row, col)) {
            plane[i] = sample;
        }
    }

    Ok(LinearSequence { planes })
}

/// Scatters `sequence` back along `curve` and crops to `height x width`.
pub fn from_linear(
    sequence: &LinearSequence,
    curve: &HilbertOrder,
    height: usize,
    width: usize,
    flip_vertical: bool,
) -> Result<PixelGrid> {
    if sequence.len() != curve.len() {
        return Err(CodecError::ShapeMismatch(format!(
            "sequence has {} positions, curve has {}",
            sequence.len(),
            curve.len()
        )));
    }
    check_fits(height, width, curve)?;

    let mut grid = PixelGrid::new(height, width, sequence.channels())?;
    for (i, &(x, y)) in curve.iter().enumerate() {
        let (row, col) = (y as usize, x as usize);
        if row >= height || col >= width {
            continue;
        }
        let dst_row = if flip_vertical { height - 1 - row } else { row };
        for (sample, plane) in grid.pixel_mut(dst_row, col).iter_mut().zip(&sequence.planes) {
            *sample = plane[i];
        }
    }

    Ok(grid)
}
