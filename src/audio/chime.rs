use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;
const CHIME_SECONDS: f32 = 1.2;
const CHIME_FREQ: f32 = 880.0;

/// Short decaying sine tone used as the completion cue.
/// Synthesized rather than shipped as an asset; one clip, a bit over a second.
pub struct Chime {
    num_sample: usize,
    total_samples: usize,
}

impl Chime {
    pub fn new() -> Self {
        Self {
            num_sample: 0,
            total_samples: (SAMPLE_RATE as f32 * CHIME_SECONDS) as usize,
        }
    }
}

impl Default for Chime {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples {
            return None;
        }

        let t = self.num_sample as f32 / SAMPLE_RATE as f32;
        self.num_sample += 1;

        // Exponential decay so the tone rings out instead of cutting off
        let envelope = (-4.0 * t).exp();
        let sample = (2.0 * PI * CHIME_FREQ * t).sin();

        Some(sample * envelope * 0.6)
    }
}

impl Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1 // Mono
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(CHIME_SECONDS))
    }
}
