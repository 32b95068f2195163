//! MIDI document model.
//!
//! Decodes a Standard MIDI File into tracks of notes timed in seconds, ready
//! to be placed on a transport clock. Only note data and tempo changes are
//! kept; controllers, program changes and other meta events are dropped.

mod document;
mod pitch;
mod tempo;

#[cfg(test)]
pub(crate) mod fixtures;

pub use document::{MidiDocument, NoteEvent, Track};
pub use pitch::Pitch;
pub use tempo::TempoMap;
