use anyhow::{Result, anyhow, bail};
use log::{debug, warn};
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::io::wav::read_mono;

/// Peak level impulse responses are scaled to when normalisation is on.
const IR_PEAK: f64 = 0.9;
/// Trailing samples quieter than this are trimmed.
const SILENCE_THRESHOLD: f64 = 1.0e-5;

/// Loads impulse responses from WAV files, ready to be used as FIR filters.
pub struct IrLoader {
    target_sample_rate: u32,
    max_seconds: u64,
    normalize: bool,
}

impl IrLoader {
    pub fn new(target_sample_rate: u32, max_seconds: u64, normalize: bool) -> Self {
        Self {
            target_sample_rate,
            max_seconds,
            normalize,
        }
    }

    /// Reads `path` as mono, checks its length, resamples it to the target
    /// rate, optionally normalises its peak and trims trailing silence.
    pub fn load(&self, path: &Path) -> Result<Vec<f64>> {
        let signal = read_mono(path)?;

        if signal.samples.len() as u64 > u64::from(signal.sample_rate) * self.max_seconds {
            bail!(
                "Failed to load IR as the IR is too long: {} seconds (max {}).",
                signal.duration_secs(),
                self.max_seconds
            );
        }

        let mut ir = if signal.sample_rate != self.target_sample_rate {
            debug!(
                "Resampling IR from {} Hz to {} Hz",
                signal.sample_rate, self.target_sample_rate
            );
            resample(&signal.samples, signal.sample_rate, self.target_sample_rate)?
        } else {
            signal.samples
        };

        if self.normalize {
            normalize_peak(&mut ir);
        }

        trim_silence(&mut ir);
        if ir.is_empty() {
            bail!("IR {} contains no audible samples", path.display());
        }

        Ok(ir)
    }
}

fn normalize_peak(ir: &mut [f64]) {
    let peak = ir.iter().fold(0.0f64, |m, &x| m.max(x.abs()));
    if peak > 0.0 {
        let g = IR_PEAK / peak;
        for s in ir.iter_mut() {
            *s *= g;
        }
    }
}

fn trim_silence(ir: &mut Vec<f64>) {
    let before = ir.len();
    let end = ir
        .iter()
        .rposition(|x| x.abs() >= SILENCE_THRESHOLD)
        .map_or(0, |last| last + 1);
    ir.truncate(end);
    if end < before {
        warn!("IR trailing silence trimmed from {before} to {end} samples");
    }
}

/// resample takes input samples at a given sample_rate and returns them in the target sample_rate
fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f64>::new(ratio, 1.0, params, samples.len(), 1)?;

    let input = vec![samples.to_vec()];
    let output = resampler.process(&input, None)?;

    output
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Resampling failed"))
}
