// src/pipeline/compressor.rs

//! Compression pipeline: linearize -> move-to-front -> Huffman, per channel.
//!
//! Every call is self-contained. The only shared state is the process-wide
//! Hilbert curve cache, which is read-only once a curve is published. With the
//! `rayon` feature enabled, channels of one image and images of a batch run on
//! the rayon pool.

use super::artifact::{ChannelStream, CompressedArtifact};
use crate::analysis::entropy::Histogram;
use crate::encode::hilbert::{self, Order};
use crate::encode::huffman;
use crate::encode::linearize::{from_linear, to_linear, LinearSequence};
use crate::encode::mtf;
use crate::image::pixel_grid::{PixelGrid, MAX_DIMENSION};
use crate::utils::error::{CodecError, Result};
use log::{debug, info};
use std::fmt;

/// Tunables for [`Compressor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressParams {
    /// Read rows bottom-up before walking the curve. Recorded in the
    /// artifact, so decompression always matches.
    pub flip_vertical: bool,
}

impl Default for CompressParams {
    fn default() -> Self {
        Self {
            flip_vertical: true,
        }
    }
}

/// Size report for one compressed image. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionStats {
    /// `h * w * c * 8`
    pub initial_bits: u64,
    /// Encoded streams plus code tables.
    pub compressed_bits: u64,
    /// `initial_bits / compressed_bits`
    pub ratio: f64,
    /// Entropy of the pooled MTF output over its maximum.
    pub entropy_ratio: f64,
}

impl fmt::Display for CompressionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Initial file size: {} bits", self.initial_bits)?;
        writeln!(f, "Compressed file size: {} bits", self.compressed_bits)?;
        writeln!(f, "Compression ratio: {:.4}", self.ratio)?;
        write!(f, "Entropy ratio: {:.4}", self.entropy_ratio)
    }
}

/// Output of [`Compressor::compress`].
#[derive(Debug, Clone)]
pub struct Compression {
    pub artifact: CompressedArtifact,
    pub stats: CompressionStats,
}

#[cfg(feature = "rayon")]
fn try_map<T, U, F>(items: &[T], f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
fn try_map<T, U, F>(items: &[T], f: F) -> Result<Vec<U>>
where
    F: Fn(&T) -> Result<U>,
{
    items.iter().map(f).collect()
}

#[cfg(feature = "rayon")]
fn map_each<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
fn map_each<T, U, F>(items: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    items.iter().map(f).collect()
}

fn encode_channel(plane: &[u8]) -> (ChannelStream, Histogram) {
    let ranks = mtf::encode(plane);
    let histogram = Histogram::from_bytes(&ranks);
    let (bits, table) = huffman::build_and_encode(&ranks);
    (ChannelStream { table, bits }, histogram)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor {
    params: CompressParams,
}

impl Compressor {
    pub fn new(params: CompressParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CompressParams {
        &self.params
    }

    pub fn compress(&self, grid: &PixelGrid) -> Result<Compression> {
        let (height, width, channels) = grid.shape();
        let order = Order::for_dimensions(height, width)?;
        debug!(
            "compress: {}x{}x{} -> order {} ({}x{} grid)",
            height,
            width,
            channels,
            order.value(),
            order.side(),
            order.side()
        );

        let curve = hilbert::cached(order);
        let linear = to_linear(grid, &curve, self.params.flip_vertical)?;

        let encoded = map_each(linear.planes(), |plane| encode_channel(plane));
        let mut histogram = Histogram::new();
        let mut streams = Vec::with_capacity(encoded.len());
        for (stream, channel_hist) in encoded {
            histogram.merge(&channel_hist);
            streams.push(stream);
        }

        let artifact = CompressedArtifact {
            height: height as u32,
            width: width as u32,
            channel_count: channels as u8,
            flip_vertical: self.params.flip_vertical,
            channels: streams,
        };

        let initial_bits = artifact.initial_bits();
        let compressed_bits = artifact.compressed_bits();
        let stats = CompressionStats {
            initial_bits,
            compressed_bits,
            ratio: initial_bits as f64 / compressed_bits as f64,
            entropy_ratio: histogram.entropy_ratio(),
        };
        for line in stats.to_string().lines() {
            info!("{}", line);
        }

        Ok(Compression { artifact, stats })
    }

    /// Rebuilds the grid. Orientation comes from the artifact, not from
    /// this compressor's parameters.
    pub fn decompress(&self, artifact: &CompressedArtifact) -> Result<PixelGrid> {
        let (height, width, channels) = artifact.shape();
        if channels != 1 && channels != 3 {
            return Err(CodecError::UnsupportedChannelCount(channels));
        }
        if artifact.channels.len() != channels {
            return Err(CodecError::ShapeMismatch(format!(
                "header says {} channels, artifact holds {}",
                channels,
                artifact.channels.len()
            )));
        }
        if height > MAX_DIMENSION || width > MAX_DIMENSION {
            return Err(CodecError::ShapeMismatch(format!(
                "{}x{} exceeds the largest curve grid",
                height, width
            )));
        }

        let order = Order::for_dimensions(height, width)?;
        debug!(
            "decompress: {}x{}x{} from order {}",
            height,
            width,
            channels,
            order.value()
        );

        // Streams are checked against the stored shape before the curve is
        // built, so a forged header cannot force a large allocation.
        let cells = order.cell_count();
        let planes = try_map(&artifact.channels, |stream| {
            let ranks = huffman::decode(&stream.bits, &stream.table)?;
            if ranks.len() != cells {
                return Err(CodecError::ShapeMismatch(format!(
                    "channel decodes to {} samples, {}x{} grid needs {}",
                    ranks.len(),
                    order.side(),
                    order.side(),
                    cells
                )));
            }
            Ok(mtf::decode(&ranks))
        })?;

        let curve = hilbert::cached(order);
        let linear = LinearSequence::from_planes(planes)?;
        from_linear(&linear, &curve, height, width, artifact.flip_vertical)
    }
}

/// Compresses with default parameters and returns only the artifact.
pub fn compress(grid: &PixelGrid) -> Result<CompressedArtifact> {
    Ok(Compressor::default().compress(grid)?.artifact)
}

pub fn compress_with(grid: &PixelGrid, params: &CompressParams) -> Result<Compression> {
    Compressor::new(*params).compress(grid)
}

pub fn decompress(artifact: &CompressedArtifact) -> Result<PixelGrid> {
    Compressor::default().decompress(artifact)
}

/// Compresses independent images. One result per input, in input order.
pub fn compress_batch(grids: &[PixelGrid], params: &CompressParams) -> Vec<Result<Compression>> {
    let compressor = Compressor::new(*params);
    map_each(grids, |grid| compressor.compress(grid))
}

pub fn decompress_batch(artifacts: &[CompressedArtifact]) -> Vec<Result<PixelGrid>> {
    let compressor = Compressor::default();
    map_each(artifacts, |artifact| compressor.decompress(artifact))
}
