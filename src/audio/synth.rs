use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Instrument, SynthConfig, Voice, midi_to_freq};
use crate::events::{EngineCommand, EventId, Trigger};
use crate::midi::Pitch;

/// Polyphonic synth: every trigger gets its own voice, so notes hitting at
/// the same time simply stack.
pub struct PolySynth {
    config: SynthConfig,
    sample_rate: f32,
    voices: Vec<Voice>,
}

impl PolySynth {
    pub fn new(config: SynthConfig, sample_rate: f32) -> Self {
        let voices = Vec::with_capacity(config.max_voices);
        Self {
            config,
            sample_rate,
            voices,
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn release_all(&mut self) {
        for voice in &mut self.voices {
            voice.release();
        }
    }

    pub fn render_sample(&mut self) -> f32 {
        let mut out = 0.0;
        for voice in &mut self.voices {
            out += voice.next_sample(self.config.wave, &self.config.adsr, self.sample_rate);
        }
        self.voices.retain(|v| !v.is_done());
        out * self.config.volume
    }
}

impl Instrument for PolySynth {
    fn trigger_attack_release(&mut self, pitch: Pitch, duration: f64, velocity: f32) {
        if self.config.max_voices == 0 {
            return;
        }
        if self.voices.len() >= self.config.max_voices {
            // steal the oldest voice
            self.voices.remove(0);
        }
        let hold = (duration.max(0.0) * self.sample_rate as f64).round() as u64;
        self.voices.push(Voice::new(
            midi_to_freq(pitch.key()),
            velocity.clamp(0.0, 1.0),
            hold,
        ));
    }
}

const RUN_BITS: u32 = 24;
const POSITION_BITS: u32 = 64 - RUN_BITS;
const RUN_MASK: u64 = (1 << RUN_BITS) - 1;
const POSITION_MASK: u64 = (1 << POSITION_BITS) - 1;

/// Sample position published by the audio callback.
///
/// Every stop begins a new transport run on both sides. A position published
/// during an earlier run reads as zero, so a callback that was mid-buffer
/// when the transport stopped cannot leak its old position into the next
/// playback.
#[derive(Debug, Default)]
pub struct TransportClock {
    packed: AtomicU64,
}

impl TransportClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, run: u64, position: u64) {
        let packed = ((run & RUN_MASK) << POSITION_BITS) | (position & POSITION_MASK);
        self.packed.store(packed, Ordering::Relaxed);
    }

    /// Position in samples, or 0 if nothing was published during `run` yet.
    pub fn position(&self, run: u64) -> u64 {
        let packed = self.packed.load(Ordering::Relaxed);
        if packed >> POSITION_BITS == run & RUN_MASK {
            packed & POSITION_MASK
        } else {
            0
        }
    }
}

/// Audio-thread side of the engine: transport clock, pending triggers and
/// the synth they play on.
pub struct Renderer {
    synth: PolySynth,
    /// Ordered by sample timestamp, then by id so equal timestamps fire in
    /// scheduling order.
    pending: BTreeMap<(u64, EventId), Trigger>,
    due_at: HashMap<EventId, u64>,
    running: bool,
    run: u64,
    position: u64,
    clock: Arc<TransportClock>,
    num_channels: usize,
}

impl Renderer {
    pub fn new(synth: PolySynth, num_channels: usize, clock: Arc<TransportClock>) -> Self {
        Self {
            synth,
            pending: BTreeMap::new(),
            due_at: HashMap::new(),
            running: false,
            run: 0,
            position: 0,
            clock,
            num_channels: num_channels.max(1),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn synth(&self) -> &PolySynth {
        &self.synth
    }

    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Schedule(scheduled) => {
                let (id, at) = (scheduled.id, scheduled.sample_timestamp);
                if let Some(previous) = self.due_at.insert(id, at) {
                    self.pending.remove(&(previous, id));
                }
                self.pending.insert((at, id), scheduled.trigger);
            }
            EngineCommand::Cancel(id) => {
                if let Some(at) = self.due_at.remove(&id) {
                    self.pending.remove(&(at, id));
                }
            }
            EngineCommand::Start => {
                self.running = true;
            }
            EngineCommand::Stop => {
                self.running = false;
                self.run += 1;
                self.position = 0;
                self.clock.publish(self.run, 0);
                self.synth.release_all();
            }
        }
    }

    /// Fills an interleaved buffer, firing triggers on the frame they fall on.
    pub fn process(&mut self, data: &mut [f32]) {
        let num_frames = data.len() / self.num_channels;

        for frame in 0..num_frames {
            if self.running {
                self.fire_due();
                self.position += 1;
            }

            let sample = self.synth.render_sample();
            for out in &mut data[frame * self.num_channels..(frame + 1) * self.num_channels] {
                *out = sample;
            }
        }

        if self.running {
            self.clock.publish(self.run, self.position);
        }
    }

    fn fire_due(&mut self) {
        while let Some(entry) = self.pending.first_entry() {
            let (at, id) = *entry.key();
            if at > self.position {
                break;
            }
            let trigger = entry.remove();
            self.due_at.remove(&id);
            self.synth
                .trigger_attack_release(trigger.pitch, trigger.duration, trigger.velocity);
        }
    }
}
