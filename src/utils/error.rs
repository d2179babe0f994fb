use std::io;
use thiserror::Error;

/// Main error type for the Hilbert/MTF/Huffman codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A Hilbert order outside `0..=MAX_ORDER` was requested
    #[error("Invalid Hilbert order: {0}")]
    InvalidOrder(i64),
    /// A stored or requested shape does not fit the working grid
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// A Huffman bit stream could not be resolved against its code table
    #[error("Decode error: {0}")]
    Decode(String),
    /// Only grayscale (1) and RGB (3) grids are supported
    #[error("Unsupported channel count: {0}")]
    UnsupportedChannelCount(usize),
    /// Zero-sized, oversized, or inconsistent grid dimensions
    #[error("Invalid dimensions: {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },
    /// The binary container is malformed
    #[error("Format error: {0}")]
    Format(String),
    /// An I/O error occurred while reading or writing an artifact
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
