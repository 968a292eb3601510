//! Binary movie format writer

use super::MOVIE_MAGIC;
use crate::movie::types::*;
use byteorder::{LittleEndian, WriteBytesExt};
use lz4_flex::compress_prepend_size;
use std::io::{self, Write};

/// Writer for the binary movie format
pub struct BinaryWriter<W: Write> {
    writer: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write a complete movie file
    pub fn write_movie(
        &mut self,
        header: &MovieHeader,
        log: &InputLog,
        metadata: &MovieMetadata,
    ) -> io::Result<()> {
        let mut header = header.clone();
        header.frame_count = log.frame_count();
        header.flags.set(MovieFlags::HAS_METADATA, !metadata.is_empty());

        self.write_header(&header)?;
        self.write_inputs(
            log,
            header.layout,
            header.flags.contains(MovieFlags::COMPRESSED_INPUTS),
        )?;

        if header.flags.contains(MovieFlags::HAS_METADATA) {
            let json = serde_json::to_vec(metadata)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.writer.write_u32::<LittleEndian>(json.len() as u32)?;
            self.writer.write_all(&json)?;
        }

        self.writer.flush()
    }

    /// Write the 36-byte header
    fn write_header(&mut self, header: &MovieHeader) -> io::Result<()> {
        self.writer.write_all(&MOVIE_MAGIC)?;
        self.writer.write_u8(header.layout.player_count)?;
        self.writer.write_u8(header.layout.input_size)?;
        self.writer.write_u8(header.flags.bits())?;
        self.writer.write_u8(0)?; // reserved
        self.writer.write_all(header.id.as_bytes())?;
        self.writer.write_u32::<LittleEndian>(header.rerecord_count)?;
        self.writer.write_u64::<LittleEndian>(header.frame_count)?;
        Ok(())
    }

    /// Write the input stream.
    ///
    /// Every frame must match `layout`; anything else would make the stream
    /// unreadable.
    pub(crate) fn write_inputs(
        &mut self,
        log: &InputLog,
        layout: InputLayout,
        compress: bool,
    ) -> io::Result<()> {
        if layout.frame_size() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "controller layout has no input bytes",
            ));
        }
        if let Some(index) = log.iter().position(|f| !f.matches_layout(layout)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame {} does not match the {}x{} controller layout",
                    index, layout.player_count, layout.input_size
                ),
            ));
        }

        self.writer.write_u64::<LittleEndian>(log.frame_count())?;

        if compress {
            // Delta compression: XOR each frame against the previous one
            let mut prev = vec![0u8; layout.frame_size()];
            let mut delta_buffer = Vec::with_capacity(layout.frame_size() * log.frame_count() as usize);

            for frame in log.iter() {
                for (byte, prev_byte) in frame.players().flatten().zip(prev.iter_mut()) {
                    delta_buffer.push(byte ^ *prev_byte);
                    *prev_byte = *byte;
                }
            }

            let compressed = compress_prepend_size(&delta_buffer);
            self.writer.write_u32::<LittleEndian>(compressed.len() as u32)?;
            self.writer.write_all(&compressed)?;
        } else {
            for frame in log.iter() {
                for player in frame.players() {
                    self.writer.write_all(player)?;
                }
            }
        }

        Ok(())
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}
