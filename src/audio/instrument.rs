use serde::{Deserialize, Serialize};

use super::ADSRConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    Square,
    Saw,
    Triangle,
}

impl Wave {
    /// `phase` in 0.0 -> 1.0
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
            Wave::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Wave::Saw => phase * 2.0 - 1.0,
            Wave::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub wave: Wave,
    pub adsr: ADSRConfig,
    /// 0.0 -> 1.0
    pub volume: f32,
    pub max_voices: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            wave: Wave::Triangle,
            adsr: ADSRConfig::default(),
            volume: 0.3,
            max_voices: 32,
        }
    }
}
