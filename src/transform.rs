use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use crate::complex::{Bin, zeroed_bins};
use crate::error::Result;

/// Fixed-size complex-to-complex DFT used by the convolution engine.
///
/// Both directions work in place and neither divides by the size; the engine
/// applies its own normalisation.
pub trait Transform: Send {
    fn size(&self) -> usize;

    fn forward(&mut self, buffer: &mut [Bin]);

    fn inverse(&mut self, buffer: &mut [Bin]);
}

/// `rustfft` backed transform with a shared, preallocated scratch buffer.
pub struct RustFftTransform {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    scratch: Vec<Bin>,
}

impl RustFftTransform {
    /// Plans both directions for `size` points. Planning allocates its twiddle
    /// tables infallibly, so callers acquire their own large buffers first.
    pub fn new(size: usize) -> Result<Self> {
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Ok(Self {
            size,
            forward,
            inverse,
            scratch: zeroed_bins(scratch_len, "transform scratch")?,
        })
    }
}

impl fmt::Debug for RustFftTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RustFftTransform")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Transform for RustFftTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn forward(&mut self, buffer: &mut [Bin]) {
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    fn inverse(&mut self, buffer: &mut [Bin]) {
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
    }
}
