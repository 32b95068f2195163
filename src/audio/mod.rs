mod instrument;
mod synth;
mod voice;

pub use instrument::{SynthConfig, Wave};
pub use synth::{PolySynth, Renderer, TransportClock};
pub use voice::{ADSRConfig, EnvelopeState, Voice};

use crate::events::{EventId, Trigger};
use crate::midi::Pitch;

pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Something that can sound a note right now.
pub trait Instrument {
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, velocity: f32);
}

/// Instrument plus transport clock, as seen by the playback scheduler.
///
/// Times are transport seconds: zero is the moment the transport was last
/// started, and `now` reads zero while the transport is stopped.
pub trait AudioEngine {
    fn now(&self) -> f64;
    fn is_running(&self) -> bool;
    fn start(&mut self);
    /// Halts the clock and rewinds it to zero. Pending triggers are kept.
    fn stop(&mut self);
    fn schedule(&mut self, at: f64, trigger: Trigger) -> EventId;
    /// Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: EventId);
}
