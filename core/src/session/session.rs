//! MovieSession core implementation

use std::io::{self, Write};
use std::path::PathBuf;

use crate::adapter::ControllerAdapter;
use crate::config::Config;
use crate::error::{MovieError, Result};
use crate::movie::{InputLayout, Movie, MovieMetadata, MovieMode};
use crate::multitrack::MultitrackRecording;

use super::types::{ConfirmCallback, EmulatorCore, MessageCallback};

/// Couples a [`Movie`] with the emulator's frame loop and savestate system.
///
/// The session owns the movie exclusively. Collaborators (core, live input,
/// savestate streams) are passed into each call rather than held.
pub struct MovieSession {
    pub(super) movie: Movie,
    pub(super) multitrack: MultitrackRecording,
    pub(super) adapter: ControllerAdapter,
    pub(super) editor_mode: bool,
    pub(super) read_only: bool,
    pub(super) config: Config,
    confirm: Option<ConfirmCallback>,
    notify: Option<MessageCallback>,
}

impl MovieSession {
    pub fn new(config: Config) -> Self {
        let layout = config.layout.input_layout();
        Self {
            movie: Movie::detached(layout),
            multitrack: MultitrackRecording::new(),
            adapter: ControllerAdapter::new(layout),
            editor_mode: false,
            read_only: true,
            config,
            confirm: None,
            notify: None,
        }
    }

    /// Install the yes/no prompt used for foreign savestates
    pub fn set_confirm_callback(&mut self, callback: impl FnMut(&str, &str) -> bool + 'static) {
        self.confirm = Some(Box::new(callback));
    }

    /// Install the status message sink
    pub fn set_message_callback(&mut self, callback: impl FnMut(&str) + 'static) {
        self.notify = Some(Box::new(callback));
    }

    pub(super) fn output(&mut self, message: &str) {
        tracing::debug!("{message}");
        if let Some(notify) = self.notify.as_mut() {
            notify(message);
        }
    }

    /// Ask the user; with no prompt installed the answer is yes
    pub(super) fn ask_yes_no(&mut self, title: &str, message: &str) -> bool {
        match self.confirm.as_mut() {
            Some(confirm) => confirm(title, message),
            None => {
                tracing::warn!("No confirmation prompt installed, auto-accepting: {title}");
                true
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begin a new recording backed by `path`.
    ///
    /// Uses the configured layout and compression. Fails if a movie is
    /// already active; stop it first.
    pub fn start_recording(
        &mut self,
        path: impl Into<PathBuf>,
        mut metadata: MovieMetadata,
    ) -> Result<()> {
        if self.movie.is_active() {
            return Err(MovieError::invalid("start a new recording", self.movie.mode()));
        }

        if metadata.author.is_empty() {
            metadata.author = self.config.recording.author.clone();
        }
        let layout = self.config.layout.input_layout();
        let mut movie = Movie::new(path, layout).with_metadata(metadata);
        movie.set_compressed(self.config.recording.compress_inputs);
        movie.start_recording()?;

        self.install(movie, layout);
        self.read_only = false;
        Ok(())
    }

    /// Open an existing movie for playback from frame 0, read-only
    pub fn open_playback(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        if self.movie.is_active() {
            return Err(MovieError::invalid("open a movie", self.movie.mode()));
        }

        let mut movie = Movie::load(path.into())?;
        movie.set_compressed(self.config.recording.compress_inputs);
        movie.start_playback()?;

        let layout = movie.layout();
        self.install(movie, layout);
        self.read_only = true;
        Ok(())
    }

    fn install(&mut self, movie: Movie, layout: InputLayout) {
        self.movie = movie;
        self.adapter = ControllerAdapter::new(layout);
    }

    /// Stop the active movie, writing it to disk unless `discard` is set.
    ///
    /// On a write failure the movie stays active and the error is returned.
    pub fn stop(&mut self, discard: bool) -> Result<()> {
        if !self.movie.is_active() {
            return Ok(());
        }

        let message = match self.movie.mode() {
            MovieMode::Recording => "Movie recording stopped.",
            MovieMode::Playing | MovieMode::Finished => "Movie playback stopped.",
            MovieMode::Inactive => "Movie stopped.",
        };

        self.movie.stop(discard)?;
        if !discard {
            let file = self
                .movie
                .path()
                .and_then(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.output(&format!("{file} written to disk."));
        }
        self.output(message);
        self.read_only = true;
        Ok(())
    }

    // =========================================================================
    // Savestates and editing
    // =========================================================================

    /// Embed the active movie into a savestate being written by the core.
    ///
    /// Returns `false` (and writes nothing) when no movie is active.
    pub fn save_state(&self, core: &impl EmulatorCore, writer: impl Write) -> io::Result<bool> {
        if !self.movie.is_active() {
            return Ok(false);
        }
        self.movie.to_savestate(core.frame()).write_to(writer)?;
        Ok(true)
    }

    /// Reset the logged input at the core's current frame. Playback only.
    pub fn clear_frame(&mut self, core: &impl EmulatorCore) -> Result<()> {
        if !self.movie.is_playing() {
            return Ok(());
        }
        let frame = core.frame();
        self.movie.clear_frame(frame)?;
        self.output(&format!("Scrubbed input at frame {frame}"));
        Ok(())
    }

    // =========================================================================
    // Toggles and accessors
    // =========================================================================

    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    pub fn movie_mut(&mut self) -> &mut Movie {
        &mut self.movie
    }

    pub fn adapter(&self) -> &ControllerAdapter {
        &self.adapter
    }

    pub fn multitrack(&self) -> &MultitrackRecording {
        &self.multitrack
    }

    pub fn multitrack_mut(&mut self) -> &mut MultitrackRecording {
        &mut self.multitrack
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        tracing::info!(
            "Movie {}",
            if read_only { "read-only" } else { "read+write" }
        );
    }

    pub fn toggle_read_only(&mut self) {
        self.set_read_only(!self.read_only);
    }

    pub fn is_editor_mode(&self) -> bool {
        self.editor_mode
    }

    pub fn set_editor_mode(&mut self, editor_mode: bool) {
        self.editor_mode = editor_mode;
    }

    /// Live input pokes into logged frames during playback
    pub fn is_poke_mode(&self) -> bool {
        self.config.playback.poke_mode
    }

    pub fn set_poke_mode(&mut self, poke_mode: bool) {
        self.config.playback.poke_mode = poke_mode;
    }
}
