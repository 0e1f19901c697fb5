pub mod delay_line;
pub mod fir;
pub mod partition;
pub mod upols;

pub use fir::FirConvolver;
pub use upols::Network;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::complex::zeroed_samples;
use crate::error::Result;

/// Block size used when rendering through the direct engine, which has no
/// block structure of its own.
const DIRECT_RENDER_BLOCK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Uniformly partitioned overlap-save in the frequency domain
    #[default]
    Partitioned,
    /// Time-domain FIR, only sensible for short filters
    Direct,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Partitioned => write!(f, "partitioned"),
            EngineKind::Direct => write!(f, "direct"),
        }
    }
}

/// Convolver implementation selector
/// Ignore Clippy warning here so we use enum dispatch for performance
#[allow(clippy::large_enum_variant)]
pub enum Convolver {
    Direct(FirConvolver),
    Partitioned(Network),
}

impl Convolver {
    pub fn new(kind: EngineKind, filter: &[f64], block_size: usize) -> Result<Self> {
        match kind {
            EngineKind::Partitioned => Ok(Convolver::Partitioned(Network::new(filter, block_size)?)),
            EngineKind::Direct => Ok(Convolver::Direct(FirConvolver::new(filter)?)),
        }
    }

    pub fn process(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        match self {
            Convolver::Direct(c) => c.process(input, output),
            Convolver::Partitioned(c) => c.process(input, output),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Convolver::Direct(c) => c.reset(),
            Convolver::Partitioned(c) => c.reset(),
        }
    }

    pub const fn latency(&self) -> usize {
        match self {
            Convolver::Direct(c) => c.latency(),
            Convolver::Partitioned(c) => c.latency(),
        }
    }

    pub fn filter_length(&self) -> usize {
        match self {
            Convolver::Direct(c) => c.filter_length(),
            Convolver::Partitioned(c) => c.filter_length(),
        }
    }

    pub const fn block_size(&self) -> usize {
        match self {
            Convolver::Direct(_) => DIRECT_RENDER_BLOCK,
            Convolver::Partitioned(c) => c.partition_size(),
        }
    }

    /// Convolves a whole signal and returns its full linear convolution with
    /// the filter, `signal.len() + filter_length - 1` samples, with the engine
    /// latency already removed.
    ///
    /// The signal is streamed block by block from a clean state, zero-padded
    /// at the end until the filter tail has been flushed.
    pub fn render(&mut self, signal: &[f64]) -> Result<Vec<f64>> {
        if signal.is_empty() {
            return Ok(Vec::new());
        }

        self.reset();

        let block_size = self.block_size();
        let latency = self.latency();
        let total = signal.len() + self.filter_length() - 1;
        let blocks = (latency + total).div_ceil(block_size);

        let mut rendered = zeroed_samples(blocks * block_size, "rendered signal")?;
        let mut input = zeroed_samples(block_size, "render input block")?;

        for (index, output) in rendered.chunks_exact_mut(block_size).enumerate() {
            let start = (index * block_size).min(signal.len());
            let end = (start + block_size).min(signal.len());
            let chunk = &signal[start..end];

            input[..chunk.len()].copy_from_slice(chunk);
            input[chunk.len()..].fill(0.0);

            self.process(&input, output)?;
        }

        rendered.copy_within(latency.., 0);
        rendered.truncate(total);
        Ok(rendered)
    }
}
