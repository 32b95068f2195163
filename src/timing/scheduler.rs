use std::sync::Arc;

use crate::audio::AudioEngine;
use crate::error::PlaybackError;
use crate::events::{EventId, Trigger};
use crate::midi::MidiDocument;

/// The live schedule of one playback.
#[derive(Debug)]
pub struct PlaybackHandle {
    document: Arc<MidiDocument>,
    started_at: f64,
    pending: Vec<EventId>,
}

impl PlaybackHandle {
    pub fn document(&self) -> &MidiDocument {
        &self.document
    }

    /// Transport time the document's zero is placed at.
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn pending(&self) -> &[EventId] {
        &self.pending
    }

    pub fn ends_at(&self) -> f64 {
        self.started_at + self.document.duration()
    }
}

/// Places MIDI documents on the engine's transport, one at a time.
pub struct PlaybackScheduler<E: AudioEngine> {
    engine: E,
    active: Option<PlaybackHandle>,
    release_tail: f64,
}

impl<E: AudioEngine> PlaybackScheduler<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            active: None,
            release_tail: 0.0,
        }
    }

    /// Extra seconds to keep the transport alive after the last note ends.
    pub fn with_release_tail(mut self, seconds: f64) -> Self {
        self.release_tail = seconds.max(0.0);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn handle(&self) -> Option<&PlaybackHandle> {
        self.active.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Decodes `data` and plays it, superseding any current playback.
    ///
    /// A blob that fails to decode leaves the current playback untouched.
    pub fn play(&mut self, data: &[u8]) -> Result<&PlaybackHandle, PlaybackError> {
        let document = MidiDocument::from_bytes(data)?;
        Ok(self.play_document(document))
    }

    pub fn play_document(&mut self, document: MidiDocument) -> &PlaybackHandle {
        self.stop();

        let started_at = self.engine.now();
        let mut pending = Vec::with_capacity(document.note_count());
        for track in document.tracks() {
            for note in &track.notes {
                let id = self
                    .engine
                    .schedule(started_at + note.time, Trigger::from(note));
                pending.push(id);
            }
        }

        if !self.engine.is_running() {
            self.engine.start();
        }

        tracing::info!(
            "Scheduled {} notes across {} tracks at t={:.3}s",
            pending.len(),
            document.tracks().len(),
            started_at
        );

        self.active.insert(PlaybackHandle {
            document: Arc::new(document),
            started_at,
            pending,
        })
    }

    /// Cancels every pending trigger and halts the transport. No-op when idle.
    pub fn stop(&mut self) {
        let Some(handle) = self.active.take() else {
            return;
        };

        for id in &handle.pending {
            self.engine.cancel(*id);
        }
        if self.engine.is_running() {
            self.engine.stop();
        }
        tracing::debug!("Cancelled {} triggers", handle.pending.len());
    }

    /// Stops the playback once the transport has passed its last note.
    /// Returns true if it did.
    pub fn finish_if_done(&mut self) -> bool {
        let done = match &self.active {
            Some(handle) => self.engine.now() >= handle.ends_at() + self.release_tail,
            None => false,
        };
        if done {
            self.stop();
        }
        done
    }
}
