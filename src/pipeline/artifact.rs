// src/pipeline/artifact.rs

//! The compressed artifact and its binary container.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! "HMTF" | version u8 | height u32 | width u32 | channels u8 | flags u8
//! per channel:
//!     entries u16
//!     per entry: symbol u8 | code_len u8 | ceil(code_len / 8) bytes
//!     bit_len u64 | ceil(bit_len / 8) bytes
//! ```
//!
//! Bit strings are packed most significant bit first and zero padded to a
//! byte boundary; the explicit lengths say where the real bits stop.

use crate::encode::huffman::{BitString, Bits, CodeTable};
use crate::utils::error::{CodecError, Result};
use bitvec::prelude::*;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

pub const MAGIC: [u8; 4] = *b"HMTF";
pub const FORMAT_VERSION: u8 = 1;

const FLAG_FLIP_VERTICAL: u8 = 0x01;

/// Huffman table and encoded stream of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStream {
    pub table: CodeTable,
    pub bits: BitString,
}

/// Everything needed to rebuild a grid: shape, orientation and one stream
/// per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    pub height: u32,
    pub width: u32,
    pub channel_count: u8,
    /// Rows were read bottom-up during linearization.
    pub flip_vertical: bool,
    pub channels: Vec<ChannelStream>,
}

impl CompressedArtifact {
    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, self.channel_count as usize)
    }

    /// Size of the raw image, `h * w * c * 8`.
    pub fn initial_bits(&self) -> u64 {
        self.height as u64 * self.width as u64 * self.channel_count as u64 * 8
    }

    /// Encoded stream bits over all channels.
    pub fn payload_bits(&self) -> u64 {
        self.channels.iter().map(|c| c.bits.len() as u64).sum()
    }

    /// Code table cost over all channels.
    pub fn table_bits(&self) -> u64 {
        self.channels.iter().map(|c| c.table.serialized_bits()).sum()
    }

    /// Payload plus table cost.
    pub fn compressed_bits(&self) -> u64 {
        self.payload_bits() + self.table_bits()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.channels.len() != self.channel_count as usize {
            return Err(CodecError::ShapeMismatch(format!(
                "header says {} channels, artifact holds {}",
                self.channel_count,
                self.channels.len()
            )));
        }

        writer.write_all(&MAGIC)?;
        writer.write_u8(FORMAT_VERSION)?;
        writer.write_u32::<BigEndian>(self.height)?;
        writer.write_u32::<BigEndian>(self.width)?;
        writer.write_u8(self.channel_count)?;
        writer.write_u8(if self.flip_vertical { FLAG_FLIP_VERTICAL } else { 0 })?;

        for channel in &self.channels {
            writer.write_u16::<BigEndian>(channel.table.len() as u16)?;
            for (symbol, code) in channel.table.iter() {
                let code_len = u8::try_from(code.len()).map_err(|_| {
                    CodecError::Format(format!(
                        "code for symbol {} is {} bits long",
                        symbol,
                        code.len()
                    ))
                })?;
                writer.write_u8(symbol)?;
                writer.write_u8(code_len)?;
                writer.write_all(&pack(code))?;
            }
            writer.write_u64::<BigEndian>(channel.bits.len() as u64)?;
            writer.write_all(&pack(&channel.bits))?;
        }

        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(CodecError::Format(format!("bad magic {:02x?}", magic)));
        }
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::Format(format!("unsupported version {}", version)));
        }

        let height = reader.read_u32::<BigEndian>()?;
        let width = reader.read_u32::<BigEndian>()?;
        let channel_count = reader.read_u8()?;
        if channel_count != 1 && channel_count != 3 {
            return Err(CodecError::UnsupportedChannelCount(channel_count as usize));
        }
        let flags = reader.read_u8()?;
        if flags & !FLAG_FLIP_VERTICAL != 0 {
            return Err(CodecError::Format(format!("unknown flags {:#04x}", flags)));
        }

        let mut channels = Vec::with_capacity(channel_count as usize);
        for _ in 0..channel_count {
            let entries = reader.read_u16::<BigEndian>()? as usize;
            if entries > 256 {
                return Err(CodecError::Format(format!("{} table entries", entries)));
            }
            let mut codes = Vec::with_capacity(entries);
            for _ in 0..entries {
                let symbol = reader.read_u8()?;
                let code_len = reader.read_u8()? as usize;
                if code_len == 0 {
                    return Err(CodecError::Format(format!(
                        "empty code for symbol {}",
                        symbol
                    )));
                }
                codes.push((symbol, read_bits(reader, code_len as u64)?));
            }
            let table = CodeTable::from_entries(codes)?;

            let bit_len = reader.read_u64::<BigEndian>()?;
            let bits = read_bits(reader, bit_len)?;
            channels.push(ChannelStream { table, bits });
        }

        Ok(Self {
            height,
            width,
            channel_count,
            flip_vertical: flags & FLAG_FLIP_VERTICAL != 0,
            channels,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let artifact = Self::read_from(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(CodecError::Format(format!(
                "{} trailing bytes after artifact",
                bytes.len()
            )));
        }
        Ok(artifact)
    }
}

fn pack(bits: &Bits) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    bytes.view_bits_mut::<Msb0>()[..bits.len()].copy_from_bitslice(bits);
    bytes
}

fn read_bits<R: Read>(reader: &mut R, bit_len: u64) -> Result<BitString> {
    let byte_len = bit_len.div_ceil(8);
    let mut bytes = Vec::new();
    reader.by_ref().take(byte_len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != byte_len {
        return Err(CodecError::Format(format!(
            "expected {} bytes of bit data, found {}",
            byte_len,
            bytes.len()
        )));
    }
    let mut bits = BitString::from_vec(bytes);
    bits.truncate(bit_len as usize);
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::huffman::build_and_encode;

    fn sample() -> CompressedArtifact {
        let (bits, table) = build_and_encode(&[0, 0, 1, 2, 0, 0, 0, 5, 5, 1, 0]);
        CompressedArtifact {
            height: 3,
            width: 2,
            channel_count: 1,
            flip_vertical: true,
            channels: vec![ChannelStream { table, bits }],
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let artifact = sample();
        let bytes = artifact.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"HMTF");
        assert_eq!(CompressedArtifact::from_bytes(&bytes).unwrap(), artifact);
    }

    #[test]
    fn test_packing_pads_with_zeros() {
        let bits: BitString = [true, false, true].into_iter().collect();
        assert_eq!(pack(&bits), vec![0b1010_0000]);
        assert!(pack(&BitString::new()).is_empty());
    }

    #[test]
    fn test_accounting() {
        let artifact = sample();
        let table = &artifact.channels[0].table;
        let expected: u64 = table.iter().map(|(_, c)| c.len() as u64 + 8).sum::<u64>()
            + artifact.channels[0].bits.len() as u64;
        assert_eq!(artifact.compressed_bits(), expected);
        assert_eq!(artifact.initial_bits(), 3 * 2 * 8);
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            CompressedArtifact::from_bytes(&bytes),
            Err(CodecError::Format(_))
        ));

        let mut bytes = sample().to_bytes().unwrap();
        bytes[13] = 2;
        assert!(matches!(
            CompressedArtifact::from_bytes(&bytes),
            Err(CodecError::UnsupportedChannelCount(2))
        ));

        let mut bytes = sample().to_bytes().unwrap();
        bytes[14] = 0x80;
        assert!(matches!(
            CompressedArtifact::from_bytes(&bytes),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_and_trailing() {
        let bytes = sample().to_bytes().unwrap();
        assert!(CompressedArtifact::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(CompressedArtifact::from_bytes(&bytes[..10]).is_err());

        let mut padded = bytes.clone();
        padded.push(0);
        assert!(matches!(
            CompressedArtifact::from_bytes(&padded),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_write_checks_channel_count() {
        let mut artifact = sample();
        artifact.channel_count = 3;
        assert!(matches!(
            artifact.to_bytes(),
            Err(CodecError::ShapeMismatch(_))
        ));
    }
}
