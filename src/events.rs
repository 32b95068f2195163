use crate::midi::{NoteEvent, Pitch};

/// Identifies one scheduled trigger on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

/// Sound one note: the payload of a trigger command.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub pitch: Pitch,
    /// Seconds
    pub duration: f64,
    /// 0.0 -> 1.0
    pub velocity: f32,
}

impl From<&NoteEvent> for Trigger {
    fn from(note: &NoteEvent) -> Self {
        Self {
            pitch: note.pitch,
            duration: note.duration,
            velocity: note.velocity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScheduledTrigger {
    pub id: EventId,
    pub sample_timestamp: u64,
    pub trigger: Trigger,
}

/// Messages from the control thread to the audio callback.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Schedule(ScheduledTrigger),
    Cancel(EventId),
    Start,
    Stop,
}
