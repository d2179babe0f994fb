// src/image/pixel_grid.rs

//! Owned raster buffer handed to and returned from the codec.
//!
//! Samples are stored row-major with channels interleaved, the same layout
//! `image::GrayImage` and `image::RgbImage` use for their raw buffers, so a
//! caller can move pixels in and out without reshuffling.

use crate::encode::hilbert::MAX_ORDER;
use crate::utils::error::{CodecError, Result};

/// Largest height or width accepted (`2^MAX_ORDER`).
pub const MAX_DIMENSION: usize = 1 << MAX_ORDER;

/// A `height x width x channels` array of 8-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

fn check_shape(height: usize, width: usize, channels: usize) -> Result<()> {
    if channels != 1 && channels != 3 {
        return Err(CodecError::UnsupportedChannelCount(channels));
    }
    if height == 0 || width == 0 || height > MAX_DIMENSION || width > MAX_DIMENSION {
        return Err(CodecError::InvalidDimensions { height, width });
    }
    Ok(())
}

impl PixelGrid {
    /// Creates a zero-filled grid.
    pub fn new(height: usize, width: usize, channels: usize) -> Result<Self> {
        check_shape(height, width, channels)?;
        Ok(Self {
            height,
            width,
            channels,
            data: vec![0; height * width * channels],
        })
    }

    /// Wraps an existing row-major, channel-interleaved buffer.
    pub fn from_raw(height: usize, width: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        check_shape(height, width, channels)?;
        if data.len() != height * width * channels {
            return Err(CodecError::InvalidDimensions { height, width });
        }
        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        (row * self.width + col) * self.channels
    }

    /// Returns the sample at `(row, col, channel)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Option<u8> {
        if row >= self.height || col >= self.width || channel >= self.channels {
            return None;
        }
        Some(self.data[self.offset(row, col) + channel])
    }

    /// Writes one sample. Panics when out of range, like slice indexing.
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: u8) {
        assert!(row < self.height && col < self.width && channel < self.channels);
        let idx = self.offset(row, col) + channel;
        self.data[idx] = value;
    }

    /// All channels of one pixel.
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        let start = self.offset(row, col);
        &self.data[start..start + self.channels]
    }

    pub fn pixel_mut(&mut self, row: usize, col: usize) -> &mut [u8] {
        let start = self.offset(row, col);
        let channels = self.channels;
        &mut self.data[start..start + channels]
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns a copy with the row order reversed.
    pub fn flipped_vertically(&self) -> Self {
        let stride = self.width * self.channels;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(stride).rev() {
            data.extend_from_slice(row);
        }
        Self {
            height: self.height,
            width: self.width,
            channels: self.channels,
            data,
        }
    }
}
