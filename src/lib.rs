//! # Hilbert Codec
//!
//! Lossless raster compression that walks the image along a Hilbert curve,
//! applies a move-to-front transform and Huffman-codes each channel.
//!
//! This library is organized into several modules:
//! - `utils`: Error handling
//! - `image`: The pixel grid handed to and returned from the codec
//! - `encode`: Curve generation, linearization and the entropy coding stages
//! - `analysis`: Entropy diagnostics
//! - `pipeline`: The compressed artifact and the compress/decompress driver
//!
//! Image file decoding and encoding are left to the caller; the codec works on
//! raw `height x width x channels` byte buffers.

// Re-export commonly used types at the crate root
pub use utils::error::{CodecError, Result};

pub mod utils {
    pub mod error;
}

pub mod image {
    pub mod pixel_grid;
}

pub mod encode {
    pub mod bwt;
    pub mod hilbert;
    pub mod huffman;
    pub mod linearize;
    pub mod mtf;
    pub mod rle;
}

pub mod analysis {
    pub mod entropy;
}

pub mod pipeline {
    pub mod artifact;
    pub mod compressor;

    pub use self::artifact::*;
    pub use self::compressor::*;
}

// Public API exports
pub use crate::encode::hilbert::{HilbertOrder, Order, MAX_ORDER};
pub use crate::image::pixel_grid::PixelGrid;
pub use crate::pipeline::{
    compress, compress_batch, compress_with, decompress, decompress_batch, ChannelStream,
    CompressParams, CompressedArtifact, Compression, CompressionStats, Compressor,
};

pub const CODEC_VERSION: &str = "0.1.0";
