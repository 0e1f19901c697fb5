use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::path::Path;

/// A single-channel signal with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoSignal {
    pub samples: Vec<f64>,
    pub sample_rate: u32,
}

impl MonoSignal {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Reads a WAV file, averaging all channels down to mono.
pub fn read_mono(path: &Path) -> Result<MonoSignal> {
    let reader = WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        bail!("WAV file {} declares zero channels", path.display());
    }

    let samples: Vec<f64> = if spec.sample_format == SampleFormat::Float {
        reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read float samples")?
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
        reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| f64::from(v) / max_val))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read integer samples")?
    };

    let samples = if spec.channels > 1 {
        samples
            .chunks(spec.channels as usize)
            .map(|c| c.iter().sum::<f64>() / spec.channels as f64)
            .collect()
    } else {
        samples
    };

    debug!(
        "Read {} frames at {} Hz from {}",
        samples.len(),
        spec.sample_rate,
        path.display()
    );

    Ok(MonoSignal {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Writes a mono 32-bit float WAV file.
pub fn write_mono(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file {}", path.display()))?;
    for &sample in samples {
        writer
            .write_sample(sample as f32)
            .context("Failed to write sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    debug!("Wrote {} frames to {}", samples.len(), path.display());
    Ok(())
}
