use std::collections::{HashMap, VecDeque};

use midly::{MetaMessage, MidiMessage, Smf, TrackEventKind};

use super::{Pitch, TempoMap};
use crate::error::MidiError;

/// A single note, timed relative to the start of its track.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub pitch: Pitch,
    /// Seconds
    pub time: f64,
    /// Seconds
    pub duration: f64,
    /// 0.0 -> 1.0
    pub velocity: f32,
}

impl NoteEvent {
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    pub name: Option<String>,
    /// In note-on order, which is not necessarily sorted by time.
    pub notes: Vec<NoteEvent>,
}

/// Parsed, immutable view of a MIDI file.
#[derive(Debug, Clone, Default)]
pub struct MidiDocument {
    tracks: Vec<Track>,
}

impl MidiDocument {
    pub fn from_bytes(data: &[u8]) -> Result<Self, MidiError> {
        let smf = Smf::parse(data)?;
        let tempo = TempoMap::from_smf(&smf);

        let tracks = smf
            .tracks
            .iter()
            .map(|events| read_track(events, &tempo))
            .collect();

        Ok(Self { tracks })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }

    /// End of the last sounding note, in seconds.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| t.notes.iter())
            .map(NoteEvent::end)
            .fold(0.0, f64::max)
    }
}

fn read_track(events: &[midly::TrackEvent], tempo: &TempoMap) -> Track {
    let mut track = Track::default();
    // (channel, key) -> open notes as (index into track.notes, start tick)
    let mut open: HashMap<(u8, u8), VecDeque<(usize, u64)>> = HashMap::new();
    let mut tick: u64 = 0;

    for event in events {
        tick += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                let channel = channel.as_int();
                let (key, vel) = match message {
                    MidiMessage::NoteOn { key, vel } => (key.as_int(), vel.as_int()),
                    MidiMessage::NoteOff { key, .. } => (key.as_int(), 0),
                    _ => continue,
                };

                if vel > 0 {
                    open.entry((channel, key))
                        .or_default()
                        .push_back((track.notes.len(), tick));
                    track.notes.push(NoteEvent {
                        pitch: Pitch::new(key),
                        time: tempo.seconds_at(tick),
                        duration: 0.0,
                        velocity: vel as f32 / 127.0,
                    });
                } else if let Some((idx, start)) =
                    open.get_mut(&(channel, key)).and_then(|q| q.pop_front())
                {
                    track.notes[idx].duration = tempo.seconds_at(tick) - tempo.seconds_at(start);
                }
            }
            TrackEventKind::Meta(MetaMessage::TrackName(name)) if track.name.is_none() => {
                track.name = Some(String::from_utf8_lossy(name).into_owned());
            }
            _ => {}
        }
    }

    // notes never released sound until the end of the track
    for (idx, start) in open.into_values().flatten() {
        track.notes[idx].duration = tempo.seconds_at(tick) - tempo.seconds_at(start);
    }

    track
}
