use serde::{Deserialize, Serialize};

use super::Wave;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ADSRConfig {
    /// Seconds
    pub attack: f32,
    /// Seconds
    pub decay: f32,
    /// 0.0 -> 1.0
    pub sustain: f32,
    /// Seconds
    pub release: f32,
}

impl Default for ADSRConfig {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeState {
    Attack { time: f32 },
    Decay { time: f32 },
    Sustain,
    Release { time: f32, from: f32 },
    Done,
}

/// One sounding note of the synth.
#[derive(Debug, Clone)]
pub struct Voice {
    pub freq: f32,
    pub velocity: f32,
    pub envelope_state: EnvelopeState,
    pub envelope_level: f32,
    phase: f32,
    /// Samples left before the release starts.
    hold: u64,
}

impl Voice {
    pub fn new(freq: f32, velocity: f32, hold: u64) -> Self {
        Self {
            freq,
            velocity,
            envelope_state: EnvelopeState::Attack { time: 0.0 },
            envelope_level: 0.0,
            phase: 0.0,
            hold,
        }
    }

    pub fn is_done(&self) -> bool {
        self.envelope_state == EnvelopeState::Done
    }

    pub fn release(&mut self) {
        if !matches!(
            self.envelope_state,
            EnvelopeState::Release { .. } | EnvelopeState::Done
        ) {
            self.envelope_state = EnvelopeState::Release {
                time: 0.0,
                from: self.envelope_level,
            };
        }
    }

    /// Renders one sample and advances oscillator and envelope by one frame.
    pub fn next_sample(&mut self, wave: Wave, adsr: &ADSRConfig, sample_rate: f32) -> f32 {
        if self.hold == 0 {
            self.release();
        } else {
            self.hold -= 1;
        }

        self.envelope_level = calculate_envelope(&self.envelope_state, adsr);
        let sample = wave.sample(self.phase) * self.envelope_level * self.velocity;

        self.phase += self.freq / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        advance_envelope(&mut self.envelope_state, adsr, 1.0 / sample_rate);

        sample
    }
}

pub fn calculate_envelope(state: &EnvelopeState, adsr: &ADSRConfig) -> f32 {
    match state {
        EnvelopeState::Attack { time } => {
            if adsr.attack == 0.0 {
                1.0
            } else {
                (time / adsr.attack).min(1.0)
            }
        }
        EnvelopeState::Decay { time } => {
            let decay_progress = if adsr.decay == 0.0 {
                1.0
            } else {
                (time / adsr.decay).min(1.0)
            };
            1.0 - (1.0 - adsr.sustain) * decay_progress
        }
        EnvelopeState::Sustain => adsr.sustain,
        EnvelopeState::Release { time, from } => {
            let release_progress = if adsr.release == 0.0 {
                1.0
            } else {
                (time / adsr.release).min(1.0)
            };
            from * (1.0 - release_progress)
        }
        EnvelopeState::Done => 0.0,
    }
}

pub fn advance_envelope(state: &mut EnvelopeState, adsr: &ADSRConfig, dt: f32) {
    match state {
        EnvelopeState::Attack { time } => {
            *time += dt;
            if *time >= adsr.attack {
                *state = EnvelopeState::Decay { time: 0.0 };
            }
        }
        EnvelopeState::Decay { time } => {
            *time += dt;
            if *time >= adsr.decay {
                *state = EnvelopeState::Sustain;
            }
        }
        EnvelopeState::Sustain | EnvelopeState::Done => {}
        EnvelopeState::Release { time, .. } => {
            *time += dt;
            if *time >= adsr.release {
                *state = EnvelopeState::Done;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1000.0;

    fn adsr() -> ADSRConfig {
        ADSRConfig {
            attack: 0.01,
            decay: 0.01,
            sustain: 0.5,
            release: 0.02,
        }
    }

    #[test]
    fn voice_goes_through_all_stages() {
        let adsr = adsr();
        let mut voice = Voice::new(100.0, 1.0, 50);

        for _ in 0..30 {
            voice.next_sample(Wave::Sine, &adsr, SR);
        }
        assert_eq!(voice.envelope_state, EnvelopeState::Sustain);

        for _ in 0..25 {
            voice.next_sample(Wave::Sine, &adsr, SR);
        }
        assert!(matches!(voice.envelope_state, EnvelopeState::Release { .. }));

        for _ in 0..25 {
            voice.next_sample(Wave::Sine, &adsr, SR);
        }
        assert!(voice.is_done());
        assert_eq!(voice.next_sample(Wave::Sine, &adsr, SR), 0.0);
    }

    #[test]
    fn early_release_fades_from_current_level() {
        let adsr = adsr();
        let mut voice = Voice::new(100.0, 1.0, 1000);
        for _ in 0..5 {
            voice.next_sample(Wave::Sine, &adsr, SR);
        }
        let level = voice.envelope_level;
        voice.release();

        assert_eq!(
            voice.envelope_state,
            EnvelopeState::Release {
                time: 0.0,
                from: level
            }
        );
        assert!(calculate_envelope(&voice.envelope_state, &adsr) <= level);
    }
}
