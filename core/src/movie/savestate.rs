//! Movie block embedded in emulator savestates
//!
//! Every savestate taken while a movie is active carries the movie's identity,
//! the frame the state was taken on, and the full input log at that moment.
//! When the state is loaded again the block is extracted and checked against
//! the live movie (see [`crate::timeline`]).
//!
//! ```text
//! magic "TASL" | identity [16] | frame u64 | player_count u8 | input_size u8
//! input stream (uncompressed) | xxh3 checksum of the inputs u64
//! ```

use super::binary::{BinaryReader, BinaryWriter};
use super::types::{InputLayout, InputLog, MovieId};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Magic bytes at the start of the embedded block
pub const SAVESTATE_MAGIC: [u8; 4] = *b"TASL";

/// Movie state captured inside a savestate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavestateLog {
    /// Identity of the movie the savestate was taken from
    pub id: MovieId,
    /// Emulator frame the savestate was taken on
    pub frame: u64,
    pub layout: InputLayout,
    pub log: InputLog,
}

impl SavestateLog {
    /// Write the block at the writer's current position
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&SAVESTATE_MAGIC)?;
        writer.write_all(self.id.as_bytes())?;
        writer.write_u64::<LittleEndian>(self.frame)?;
        writer.write_u8(self.layout.player_count)?;
        writer.write_u8(self.layout.input_size)?;

        let mut inputs = BinaryWriter::new(&mut writer);
        inputs.write_inputs(&self.log, self.layout, false)?;

        writer.write_u64::<LittleEndian>(self.log.checksum())?;
        writer.flush()
    }

    /// Read a block from the reader's current position
    pub fn read_from<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != SAVESTATE_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "savestate has no movie block",
            ));
        }

        let mut id = [0u8; 16];
        reader.read_exact(&mut id)?;
        let frame = reader.read_u64::<LittleEndian>()?;
        let layout = InputLayout::new(reader.read_u8()?, reader.read_u8()?);

        let log = BinaryReader::new(&mut reader).read_inputs(layout, false)?;

        let checksum = reader.read_u64::<LittleEndian>()?;
        if checksum != log.checksum() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "savestate movie block checksum mismatch",
            ));
        }

        Ok(Self {
            id: MovieId::from_bytes(id),
            frame,
            layout,
            log,
        })
    }

    /// Extract the block stored at `offset` of a savestate stream.
    ///
    /// The stream position is restored afterwards, whether or not extraction
    /// succeeded, so the emulator core can consume the rest of the state.
    pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64) -> io::Result<Self> {
        let origin = reader.stream_position()?;
        reader.seek(SeekFrom::Start(offset))?;
        let result = Self::read_from(&mut *reader);
        reader.seek(SeekFrom::Start(origin))?;
        result
    }
}
