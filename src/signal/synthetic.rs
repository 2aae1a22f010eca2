//! Synthetic ECG generator.
//!
//! The waveform is flat except for one damped oscillatory burst per heartbeat
//! (a rough stand-in for the QRS complex), plus white Gaussian noise and a
//! single injected high peak so every run carries at least one outlier.

use std::f64::consts::PI;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use super::{SignalError, Trace};

/// Parameters of the synthetic ECG waveform.
///
/// The defaults describe a 10 s recording at 360 Hz (the MIT-BIH sampling
/// rate) with a beat every 0.8 s, i.e. 75 beats per minute.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// Sampling rate in Hz
    pub sample_rate_hz: f64,

    /// Recording length in seconds
    pub duration_sec: f64,

    /// Spacing between beat onsets in seconds
    pub beat_interval_sec: f64,

    /// Width of the window each beat overwrites, in seconds
    pub pulse_width_sec: f64,

    /// Carrier frequency of the pulse in Hz
    pub pulse_center_freq_hz: f64,

    /// Peak amplitude of the pulse
    pub pulse_amplitude: f64,

    /// Envelope value at the window edge, relative to the peak
    pub pulse_edge_ratio: f64,

    /// Standard deviation of the additive noise
    pub noise_std: f64,

    /// Time at which the high peak is injected (None disables it)
    pub anomaly_time_sec: Option<f64>,

    /// Amount added to the sample at `anomaly_time_sec`
    pub anomaly_amplitude: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 360.0,
            duration_sec: 10.0,
            beat_interval_sec: 0.8,
            pulse_width_sec: 0.2,
            pulse_center_freq_hz: 5.0,
            pulse_amplitude: 1.5,
            pulse_edge_ratio: 1e-3,
            noise_std: 0.05,
            anomaly_time_sec: Some(2.0),
            anomaly_amplitude: 2.0,
        }
    }
}

impl SyntheticConfig {
    /// Total number of samples, `round(fs * duration)`
    pub fn sample_count(&self) -> usize {
        to_samples(self.sample_rate_hz * self.duration_sec)
    }

    /// Samples between two beat onsets
    pub fn beat_stride(&self) -> usize {
        to_samples(self.sample_rate_hz * self.beat_interval_sec)
    }

    /// Samples covered by one pulse window
    pub fn pulse_len(&self) -> usize {
        to_samples(self.sample_rate_hz * self.pulse_width_sec)
    }

    /// Index of the injected peak, if it falls inside the trace
    pub fn anomaly_index(&self) -> Option<usize> {
        let t = self.anomaly_time_sec?;
        let idx = to_samples(self.sample_rate_hz * t);
        (idx < self.sample_count()).then_some(idx)
    }

    fn validate(&self) -> Result<(), SignalError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SignalError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, v
                )))
            }
        };

        positive("sample_rate_hz", self.sample_rate_hz)?;
        positive("beat_interval_sec", self.beat_interval_sec)?;
        positive("pulse_width_sec", self.pulse_width_sec)?;

        if !(self.duration_sec.is_finite() && self.duration_sec >= 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "duration_sec must be non-negative, got {}",
                self.duration_sec
            )));
        }
        if !(self.noise_std.is_finite() && self.noise_std >= 0.0) {
            return Err(SignalError::InvalidConfig(format!(
                "noise_std must be non-negative, got {}",
                self.noise_std
            )));
        }
        if !(self.pulse_edge_ratio > 0.0 && self.pulse_edge_ratio < 1.0) {
            return Err(SignalError::InvalidConfig(format!(
                "pulse_edge_ratio must lie in (0, 1), got {}",
                self.pulse_edge_ratio
            )));
        }
        if self.beat_stride() == 0 {
            return Err(SignalError::InvalidConfig(
                "beat interval is shorter than one sample".to_string(),
            ));
        }

        Ok(())
    }
}

fn to_samples(x: f64) -> usize {
    if x.is_finite() && x > 0.0 {
        x.round() as usize
    } else {
        0
    }
}

/// Reusable generator with a validated configuration and a precomputed pulse
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    config: SyntheticConfig,
    pulse: Vec<f64>,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        let config = SyntheticConfig::default();
        let pulse = pulse_template(&config);
        Self { config, pulse }
    }
}

impl SyntheticGenerator {
    /// Create a generator, rejecting non-physical parameters
    pub fn new(config: SyntheticConfig) -> Result<Self, SignalError> {
        config.validate()?;
        let pulse = pulse_template(&config);
        Ok(Self { config, pulse })
    }

    /// Generator configuration
    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Generate a trace with fresh entropy
    pub fn generate(&self) -> Trace {
        self.generate_with_rng(&mut rand::thread_rng())
    }

    /// Generate a reproducible trace from a seed
    pub fn generate_seeded(&self, seed: u64) -> Trace {
        self.generate_with_rng(&mut StdRng::seed_from_u64(seed))
    }

    /// Generate a trace drawing noise from `rng`
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Trace {
        let n = self.config.sample_count();
        let fs = self.config.sample_rate_hz;

        let time: Vec<f64> = (0..n).map(|i| i as f64 / fs).collect();
        let mut voltage = vec![0.0; n];

        let mut beats = 0usize;
        for onset in (0..n).step_by(self.config.beat_stride()) {
            let end = (onset + self.pulse.len()).min(n);
            voltage[onset..end].copy_from_slice(&self.pulse[..end - onset]);
            beats += 1;
        }

        for v in voltage.iter_mut() {
            let z: f64 = StandardNormal.sample(rng);
            *v += self.config.noise_std * z;
        }

        if let Some(idx) = self.config.anomaly_index() {
            voltage[idx] += self.config.anomaly_amplitude;
        }

        debug!(
            "Generated synthetic trace: {} samples, {} beats, fs={} Hz",
            n, beats, fs
        );

        Trace { time, voltage }
    }
}

/// One beat: a Gaussian-enveloped cosine peaking at the beat onset.
///
/// `a` is chosen so the envelope drops to `pulse_edge_ratio` of its peak at
/// the far end of the window.
fn pulse_template(config: &SyntheticConfig) -> Vec<f64> {
    let width = config.pulse_width_sec;
    let a = -config.pulse_edge_ratio.ln() / (width * width);
    let omega = 2.0 * PI * config.pulse_center_freq_hz;

    (0..config.pulse_len())
        .map(|k| {
            let tau = k as f64 / config.sample_rate_hz;
            config.pulse_amplitude * (-a * tau * tau).exp() * (omega * tau).cos()
        })
        .collect()
}

/// Generate the default synthetic trace with fresh entropy
pub fn generate_synthetic() -> Trace {
    SyntheticGenerator::default().generate()
}

/// Generate the default synthetic trace from a seed
pub fn generate_synthetic_seeded(seed: u64) -> Trace {
    SyntheticGenerator::default().generate_seeded(seed)
}
