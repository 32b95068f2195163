use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("Processed file is not ready")]
    NotReady,

    #[error("Unsupported file '{0}': expected a .mid or .midi file")]
    UnsupportedFile(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure reported while talking to the transformation service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The service could not be reached or the connection broke mid-way.
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    TimedOut,

    /// The service answered with an error message meant for the user.
    #[error("{0}")]
    Service(String),
}

#[derive(Error, Debug)]
pub enum MidiError {
    #[error("Invalid MIDI data: {0}")]
    Parse(#[from] midly::Error),
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Malformed MIDI: {0}")]
    MalformedMidi(#[from] MidiError),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No output device")]
    NoOutputDevice,

    #[error("Failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid service URL '{0}'")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
