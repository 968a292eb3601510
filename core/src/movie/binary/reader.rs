//! Binary movie format reader

use super::MOVIE_MAGIC;
use crate::movie::types::*;
use byteorder::{LittleEndian, ReadBytesExt};
use lz4_flex::decompress_size_prepended;
use std::io::{self, Read};

/// Upper bound on a metadata block, guards against corrupt length fields
const MAX_METADATA_SIZE: usize = 1 << 20;

/// Reader for the binary movie format
pub struct BinaryReader<R: Read> {
    reader: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read a complete movie file
    pub fn read_movie(&mut self) -> io::Result<(MovieHeader, InputLog, MovieMetadata)> {
        let header = self.read_header()?;
        let log = self.read_inputs(
            header.layout,
            header.flags.contains(MovieFlags::COMPRESSED_INPUTS),
        )?;

        if log.frame_count() != header.frame_count {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "header declares {} frames but the input stream holds {}",
                    header.frame_count,
                    log.frame_count()
                ),
            ));
        }

        let metadata = if header.flags.contains(MovieFlags::HAS_METADATA) {
            let len = self.reader.read_u32::<LittleEndian>()? as usize;
            if len > MAX_METADATA_SIZE {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "metadata block exceeds size limit",
                ));
            }
            let mut json = vec![0u8; len];
            self.reader.read_exact(&mut json)?;
            serde_json::from_slice(&json)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            MovieMetadata::default()
        };

        Ok((header, log, metadata))
    }

    /// Read the 36-byte header
    pub fn read_header(&mut self) -> io::Result<MovieHeader> {
        let mut magic = [0u8; 4];
        self.reader.read_exact(&mut magic)?;
        if magic != MOVIE_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a movie file (bad magic)",
            ));
        }

        let player_count = self.reader.read_u8()?;
        let input_size = self.reader.read_u8()?;
        let flags = MovieFlags::from_bits_truncate(self.reader.read_u8()?);
        let _reserved = self.reader.read_u8()?;

        let mut id = [0u8; 16];
        self.reader.read_exact(&mut id)?;

        let rerecord_count = self.reader.read_u32::<LittleEndian>()?;
        let frame_count = self.reader.read_u64::<LittleEndian>()?;

        Ok(MovieHeader {
            layout: InputLayout::new(player_count, input_size),
            flags,
            id: MovieId::from_bytes(id),
            rerecord_count,
            frame_count,
        })
    }

    /// Read an input stream written by
    /// [`BinaryWriter::write_inputs`](super::BinaryWriter)
    pub(crate) fn read_inputs(&mut self, layout: InputLayout, compressed: bool) -> io::Result<InputLog> {
        let frame_size = layout.frame_size();
        let input_size = layout.input_size as usize;
        // Zero-sized frames carry no bytes, so nothing would bound the count
        if frame_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "controller layout has no input bytes",
            ));
        }
        let frame_count = self.reader.read_u64::<LittleEndian>()?;

        let raw = if compressed {
            let compressed_len = self.reader.read_u32::<LittleEndian>()? as usize;
            let mut compressed = vec![0u8; compressed_len];
            self.reader.read_exact(&mut compressed)?;

            let mut deltas = decompress_size_prepended(&compressed)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

            if (deltas.len() as u64) < frame_count.saturating_mul(frame_size as u64) {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "Delta buffer too short",
                ));
            }

            // Undo the XOR deltas in place
            for i in frame_size..deltas.len() {
                deltas[i] ^= deltas[i - frame_size];
            }
            deltas
        } else {
            let total = frame_count
                .checked_mul(frame_size as u64)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "frame count overflow"))?;
            let mut raw = Vec::new();
            (&mut self.reader).take(total).read_to_end(&mut raw)?;
            if raw.len() as u64 != total {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input stream truncated",
                ));
            }
            raw
        };

        Ok(raw
            .chunks_exact(frame_size)
            .take(frame_count as usize)
            .map(|frame| InputFrame::from_players(frame.chunks_exact(input_size)))
            .collect())
    }
}
