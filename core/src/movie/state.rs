//! Movie state machine and input log store

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::binary::{BinaryReader, BinaryWriter};
use super::savestate::SavestateLog;
use super::types::{
    InputFrame, InputLayout, InputLog, MovieFlags, MovieHeader, MovieId, MovieMetadata, MovieMode,
};
use crate::error::{MovieError, Result};

/// An input log plus the lifecycle mode that decides how it is used.
///
/// Mode transitions:
///
/// ```text
/// Inactive ──start_recording──▶ Recording ◀──switch_to_record──┐
///    │                             │                           │
///    └──start_playback──▶ Playing ◀┴──switch_to_play── Finished┘
///                           │                            ▲
///                           └────────── finish ──────────┘
/// ```
///
/// Any active mode returns to `Inactive` through [`Movie::stop`].
#[derive(Debug, Clone)]
pub struct Movie {
    header: MovieHeader,
    metadata: MovieMetadata,
    log: InputLog,
    mode: MovieMode,
    cursor: u64,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Movie {
    /// Create an empty, inactive movie backed by `path`
    pub fn new(path: impl Into<PathBuf>, layout: InputLayout) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::detached(layout)
        }
    }

    /// Create an empty, inactive movie with no backing file
    pub fn detached(layout: InputLayout) -> Self {
        Self {
            header: MovieHeader {
                layout,
                ..MovieHeader::default()
            },
            metadata: MovieMetadata::default(),
            log: InputLog::new(),
            mode: MovieMode::Inactive,
            cursor: 0,
            path: None,
            dirty: false,
        }
    }

    pub fn with_metadata(mut self, metadata: MovieMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Load a movie file. The returned movie is inactive.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format_err = |source: io::Error| MovieError::Format {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(format_err)?;
        let (header, log, metadata) = BinaryReader::new(BufReader::new(file))
            .read_movie()
            .map_err(format_err)?;

        tracing::info!(
            "Loaded movie {} ({} frames, {} rerecords)",
            path.display(),
            log.frame_count(),
            header.rerecord_count
        );

        Ok(Self {
            header,
            metadata,
            log,
            mode: MovieMode::Inactive,
            cursor: 0,
            path: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    /// Write the full log, identity and metadata to the backing file
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(MovieError::PersistenceFailure {
                path: PathBuf::new(),
                source: io::Error::new(io::ErrorKind::NotFound, "movie has no backing file"),
            });
        };

        let write = || -> io::Result<()> {
            let file = File::create(&path)?;
            BinaryWriter::new(BufWriter::new(file)).write_movie(
                &self.header,
                &self.log,
                &self.metadata,
            )
        };
        write().map_err(|source| MovieError::PersistenceFailure {
            path: path.clone(),
            source,
        })?;

        self.header.frame_count = self.log.frame_count();
        self.dirty = false;
        tracing::debug!("Wrote {} frames to {}", self.log.frame_count(), path.display());
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begin a fresh recording: clears the log and assigns a new identity
    pub fn start_recording(&mut self) -> Result<()> {
        if self.mode == MovieMode::Recording {
            return Err(MovieError::invalid("start recording", self.mode));
        }

        self.mode = MovieMode::Recording;
        self.log.clear();
        self.header.id = MovieId::generate();
        self.header.rerecord_count = 0;
        self.cursor = 0;
        self.dirty = true;
        tracing::info!("Recording started (movie {})", self.header.id);
        Ok(())
    }

    /// Begin playback from frame 0
    pub fn start_playback(&mut self) -> Result<()> {
        if self.mode == MovieMode::Recording {
            return Err(MovieError::invalid("start playback", self.mode));
        }

        self.mode = MovieMode::Playing;
        self.cursor = 0;
        tracing::info!("Playback started ({} frames)", self.log.frame_count());
        Ok(())
    }

    pub fn switch_to_play(&mut self) -> Result<()> {
        if !self.mode.is_active() {
            return Err(MovieError::invalid("switch to playback", self.mode));
        }
        self.mode = MovieMode::Playing;
        Ok(())
    }

    pub fn switch_to_record(&mut self) -> Result<()> {
        if !self.mode.is_active() {
            return Err(MovieError::invalid("switch to recording", self.mode));
        }
        self.mode = MovieMode::Recording;
        Ok(())
    }

    /// Playing → Finished once the cursor has consumed the whole log
    pub fn finish(&mut self) -> Result<()> {
        if self.mode != MovieMode::Playing || self.cursor < self.log.frame_count() {
            return Err(MovieError::invalid("finish", self.mode));
        }
        self.mode = MovieMode::Finished;
        tracing::info!("Movie finished at frame {}", self.cursor);
        Ok(())
    }

    /// Return to `Inactive`, persisting the log first unless `discard` is set.
    ///
    /// If persisting fails the movie stays in its current mode so the caller
    /// can retry.
    pub fn stop(&mut self, discard: bool) -> Result<()> {
        if !self.mode.is_active() {
            return Ok(());
        }
        if !discard {
            self.save()?;
        }
        self.mode = MovieMode::Inactive;
        self.cursor = 0;
        Ok(())
    }

    // =========================================================================
    // Log access
    // =========================================================================

    /// Write `sample` at the cursor and advance it
    pub fn capture_frame(&mut self, sample: InputFrame) -> Result<()> {
        if self.mode != MovieMode::Recording {
            return Err(MovieError::invalid("capture a frame", self.mode));
        }

        let len = self.log.frame_count();
        if self.cursor > len {
            return Err(MovieError::FrameOutOfRange {
                index: self.cursor,
                frame_count: len,
            });
        }
        if self.cursor == len {
            self.log.push_frame(sample);
        } else {
            self.log.set_frame(self.cursor, sample);
        }

        self.cursor += 1;
        self.dirty = true;
        Ok(())
    }

    /// Append `sample` to the end of the log during playback (editor mode)
    pub fn extend_frame(&mut self, sample: InputFrame) -> Result<()> {
        if self.mode != MovieMode::Playing {
            return Err(MovieError::invalid("extend the log", self.mode));
        }
        if self.cursor != self.log.frame_count() {
            return Err(MovieError::FrameOutOfRange {
                index: self.cursor,
                frame_count: self.log.frame_count(),
            });
        }

        self.log.push_frame(sample);
        self.cursor += 1;
        self.dirty = true;
        Ok(())
    }

    /// Move the cursor to follow the emulator's frame counter
    pub fn seek(&mut self, frame: u64) -> Result<()> {
        if !self.mode.is_active() {
            return Err(MovieError::invalid("seek", self.mode));
        }
        self.cursor = frame;
        Ok(())
    }

    pub fn advance_cursor(&mut self) -> Result<()> {
        if self.mode != MovieMode::Playing {
            return Err(MovieError::invalid("advance the cursor", self.mode));
        }
        if self.cursor >= self.log.frame_count() {
            return Err(MovieError::FrameOutOfRange {
                index: self.cursor,
                frame_count: self.log.frame_count(),
            });
        }
        self.cursor += 1;
        Ok(())
    }

    /// Read a logged frame during playback
    pub fn read_frame(&self, index: u64) -> Result<&InputFrame> {
        if self.mode != MovieMode::Playing {
            return Err(MovieError::invalid("read a frame", self.mode));
        }
        self.log
            .get_frame(index)
            .ok_or(MovieError::FrameOutOfRange {
                index,
                frame_count: self.log.frame_count(),
            })
    }

    /// Replace one logged frame in place (overdub, poke or scrub)
    pub fn overwrite_frame(&mut self, index: u64, sample: InputFrame) -> Result<()> {
        if !matches!(self.mode, MovieMode::Playing | MovieMode::Recording) {
            return Err(MovieError::invalid("overwrite a frame", self.mode));
        }
        if !self.log.set_frame(index, sample) {
            return Err(MovieError::FrameOutOfRange {
                index,
                frame_count: self.log.frame_count(),
            });
        }
        self.dirty = true;
        Ok(())
    }

    /// Reset one logged frame to neutral input
    pub fn clear_frame(&mut self, index: u64) -> Result<()> {
        self.overwrite_frame(index, InputFrame::neutral(self.header.layout))
    }

    // =========================================================================
    // Savestate integration
    // =========================================================================

    /// Snapshot the log for embedding into a savestate taken on `frame`
    pub fn to_savestate(&self, frame: u64) -> SavestateLog {
        SavestateLog {
            id: self.header.id,
            frame,
            layout: self.header.layout,
            log: self.log.clone(),
        }
    }

    /// Replace the log with the one carried by a loaded savestate.
    ///
    /// With `keep_tail` (multitrack) frames past the end of the savestate's
    /// log are kept so other players' input survives; otherwise the log
    /// becomes exactly the savestate's. Counts as a rerecord.
    pub fn adopt(&mut self, candidate: &SavestateLog, keep_tail: bool) -> Result<()> {
        if !self.mode.is_active() {
            return Err(MovieError::invalid("adopt a savestate log", self.mode));
        }

        let candidate_len = candidate.log.frame_count();
        let adopted_len = if keep_tail {
            candidate_len.max(self.log.frame_count())
        } else {
            candidate_len
        };
        if candidate.frame > adopted_len {
            return Err(MovieError::FrameOutOfRange {
                index: candidate.frame,
                frame_count: adopted_len,
            });
        }

        if keep_tail {
            for (index, frame) in candidate.log.iter().enumerate() {
                if !self.log.set_frame(index as u64, frame.clone()) {
                    self.log.push_frame(frame.clone());
                }
            }
        } else {
            self.log = candidate.log.clone();
        }

        self.cursor = candidate.frame;
        self.header.rerecord_count = self.header.rerecord_count.saturating_add(1);
        self.dirty = true;
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> MovieMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode.is_active()
    }

    pub fn is_recording(&self) -> bool {
        self.mode == MovieMode::Recording
    }

    pub fn is_playing(&self) -> bool {
        self.mode == MovieMode::Playing
    }

    pub fn is_finished(&self) -> bool {
        self.mode == MovieMode::Finished
    }

    pub fn frame_count(&self) -> u64 {
        self.log.frame_count()
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn id(&self) -> MovieId {
        self.header.id
    }

    pub fn layout(&self) -> InputLayout {
        self.header.layout
    }

    pub fn log(&self) -> &InputLog {
        &self.log
    }

    pub fn header(&self) -> &MovieHeader {
        &self.header
    }

    pub fn metadata(&self) -> &MovieMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MovieMetadata {
        self.dirty = true;
        &mut self.metadata
    }

    pub fn rerecord_count(&self) -> u32 {
        self.header.rerecord_count
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Toggle delta + LZ4 compression for the next save
    pub fn set_compressed(&mut self, compress: bool) {
        self.header.flags.set(MovieFlags::COMPRESSED_INPUTS, compress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> InputLayout {
        InputLayout::new(1, 1)
    }

    fn frame(value: u8) -> InputFrame {
        InputFrame::from_players([[value]])
    }

    fn recorded(frames: u8) -> Movie {
        let mut movie = Movie::detached(layout());
        movie.start_recording().unwrap();
        for i in 0..frames {
            movie.capture_frame(frame(i)).unwrap();
        }
        movie
    }

    #[test]
    fn test_capture_then_read_back() {
        let mut movie = recorded(20);
        assert_eq!(movie.frame_count(), 20);
        assert!(movie.is_dirty());

        movie.switch_to_play().unwrap();
        for i in 0..20u8 {
            assert_eq!(movie.read_frame(i as u64).unwrap(), &frame(i));
        }
    }

    #[test]
    fn test_start_recording_twice_fails() {
        let mut movie = recorded(2);
        let id = movie.id();

        let err = movie.start_recording().unwrap_err();
        assert!(matches!(
            err,
            MovieError::InvalidTransition {
                mode: MovieMode::Recording,
                ..
            }
        ));
        assert_eq!(movie.id(), id);
        assert_eq!(movie.frame_count(), 2);
    }

    #[test]
    fn test_start_recording_assigns_fresh_identity() {
        let mut movie = recorded(2);
        let first = movie.id();
        movie.stop(true).unwrap();
        movie.start_recording().unwrap();
        assert_ne!(movie.id(), first);
        assert_eq!(movie.frame_count(), 0);
    }

    #[test]
    fn test_capture_requires_recording() {
        let mut movie = Movie::detached(layout());
        assert!(movie.capture_frame(frame(1)).is_err());

        let mut movie = recorded(3);
        movie.switch_to_play().unwrap();
        assert!(movie.capture_frame(frame(1)).is_err());
    }

    #[test]
    fn test_switch_from_inactive_fails() {
        let mut movie = Movie::detached(layout());
        assert!(movie.switch_to_play().is_err());
        assert!(movie.switch_to_record().is_err());
        assert_eq!(movie.mode(), MovieMode::Inactive);
    }

    #[test]
    fn test_read_past_end_is_an_error() {
        let mut movie = recorded(3);
        movie.switch_to_play().unwrap();
        assert!(matches!(
            movie.read_frame(3),
            Err(MovieError::FrameOutOfRange {
                index: 3,
                frame_count: 3
            })
        ));
    }

    #[test]
    fn test_finish_only_at_end() {
        let mut movie = recorded(3);
        movie.switch_to_play().unwrap();
        movie.seek(1).unwrap();
        assert!(movie.finish().is_err());

        movie.seek(3).unwrap();
        movie.finish().unwrap();
        assert!(movie.is_finished());
    }

    #[test]
    fn test_advance_cursor() {
        let mut movie = recorded(2);
        movie.start_playback().unwrap_err(); // still recording
        movie.switch_to_play().unwrap();
        movie.seek(0).unwrap();

        movie.advance_cursor().unwrap();
        movie.advance_cursor().unwrap();
        assert_eq!(movie.cursor(), 2);
        assert!(movie.advance_cursor().is_err());
    }

    #[test]
    fn test_overwrite_keeps_length_and_mode() {
        let mut movie = recorded(5);
        movie.switch_to_play().unwrap();

        movie.overwrite_frame(2, frame(0xAA)).unwrap();
        assert_eq!(movie.frame_count(), 5);
        assert!(movie.is_playing());
        assert_eq!(movie.read_frame(2).unwrap(), &frame(0xAA));

        movie.clear_frame(3).unwrap();
        assert!(movie.read_frame(3).unwrap().is_neutral());

        assert!(movie.overwrite_frame(5, frame(1)).is_err());
    }

    #[test]
    fn test_capture_overwrites_inside_log() {
        let mut movie = recorded(5);
        movie.seek(1).unwrap();
        movie.capture_frame(frame(0x77)).unwrap();

        assert_eq!(movie.frame_count(), 5);
        assert_eq!(movie.log().get_frame(1), Some(&frame(0x77)));
        assert_eq!(movie.cursor(), 2);
    }

    #[test]
    fn test_adopt_replaces_log() {
        let mut movie = recorded(10);
        let mut candidate = movie.to_savestate(4);
        candidate.log.truncate(4);
        candidate.log.set_frame(3, frame(0xEE));

        movie.adopt(&candidate, false).unwrap();
        assert_eq!(movie.frame_count(), 4);
        assert_eq!(movie.cursor(), 4);
        assert_eq!(movie.rerecord_count(), 1);
        assert_eq!(movie.log().get_frame(3), Some(&frame(0xEE)));
    }

    #[test]
    fn test_adopt_keep_tail() {
        let mut movie = recorded(10);
        let mut candidate = movie.to_savestate(4);
        candidate.log.truncate(4);
        candidate.log.set_frame(0, frame(0xEE));

        movie.adopt(&candidate, true).unwrap();
        assert_eq!(movie.frame_count(), 10);
        assert_eq!(movie.log().get_frame(0), Some(&frame(0xEE)));
        assert_eq!(movie.log().get_frame(9), Some(&frame(9)));
    }

    #[test]
    fn test_adopt_rejects_frame_past_log_end() {
        let mut movie = recorded(10);
        let mut candidate = movie.to_savestate(12);
        candidate.log.truncate(8);

        assert!(matches!(
            movie.adopt(&candidate, false),
            Err(MovieError::FrameOutOfRange {
                index: 12,
                frame_count: 8
            })
        ));
        assert_eq!(movie.frame_count(), 10);
        assert_eq!(movie.rerecord_count(), 0);

        // The kept tail covers frame 10
        candidate.frame = 10;
        movie.adopt(&candidate, true).unwrap();
        assert_eq!(movie.cursor(), 10);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.tasm");

        let mut movie = Movie::new(&path, InputLayout::new(2, 2)).with_metadata(MovieMetadata {
            author: "tester".into(),
            ..Default::default()
        });
        movie.start_recording().unwrap();
        for i in 0..50u8 {
            movie
                .capture_frame(InputFrame::from_players([[i, 0], [0, i]]))
                .unwrap();
        }
        let candidate = movie.to_savestate(10);
        movie.adopt(&candidate, false).unwrap();

        let (id, log) = (movie.id(), movie.log().clone());
        movie.stop(false).unwrap();
        assert!(!movie.is_dirty());
        assert_eq!(movie.mode(), MovieMode::Inactive);

        let reloaded = Movie::load(&path).unwrap();
        assert_eq!(reloaded.id(), id);
        assert_eq!(reloaded.log(), &log);
        assert_eq!(reloaded.frame_count(), 50);
        assert_eq!(reloaded.rerecord_count(), 1);
        assert_eq!(reloaded.metadata().author, "tester");
        assert_eq!(reloaded.mode(), MovieMode::Inactive);
    }

    #[test]
    fn test_stop_persistence_failure_keeps_movie_active() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("run.tasm");

        let mut movie = Movie::new(&path, layout());
        movie.start_recording().unwrap();
        movie.capture_frame(frame(1)).unwrap();

        let err = movie.stop(false).unwrap_err();
        assert!(matches!(err, MovieError::PersistenceFailure { .. }));
        assert!(movie.is_recording());
        assert!(movie.is_dirty());

        // Discarding always succeeds
        movie.stop(true).unwrap();
        assert!(!movie.is_active());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Movie::load("/definitely/not/here.tasm").unwrap_err();
        assert!(matches!(err, MovieError::Format { .. }));
    }
}
