use crate::complex::zeroed_samples;
use crate::error::{ConvolutionError, Result};

/// Time-domain FIR convolver using a ring buffer.
///
/// Zero latency, O(block_size * filter_length) per block. Serves as the
/// reference that the partitioned engine must agree with.
pub struct FirConvolver {
    /// Filter taps in original order
    coefficients: Vec<f64>,
    /// Ring buffer for input history
    history: Vec<f64>,
    /// Current write position in ring buffer
    write_pos: usize,
}

impl FirConvolver {
    pub fn new(filter: &[f64]) -> Result<Self> {
        if filter.is_empty() {
            return Err(ConvolutionError::EmptyFilter);
        }

        let mut coefficients = zeroed_samples(filter.len(), "fir coefficients")?;
        coefficients.copy_from_slice(filter);

        Ok(Self {
            coefficients,
            history: zeroed_samples(filter.len(), "fir history")?,
            write_pos: 0,
        })
    }

    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let len = self.coefficients.len();

        self.history[self.write_pos] = input;

        let mut output = 0.0;
        let mut idx = self.write_pos;
        for &coeff in &self.coefficients {
            output += self.history[idx] * coeff;
            idx = (idx + len - 1) % len;
        }

        self.write_pos = (self.write_pos + 1) % len;

        output
    }

    pub fn process(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if output.len() != input.len() {
            return Err(ConvolutionError::OutputLengthMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }
        for (y, &x) in output.iter_mut().zip(input) {
            *y = self.process_sample(x);
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.write_pos = 0;
    }

    pub const fn latency(&self) -> usize {
        0
    }

    pub fn filter_length(&self) -> usize {
        self.coefficients.len()
    }
}

/// Textbook linear convolution, `signal.len() + filter.len() - 1` samples long.
pub fn direct_convolution(signal: &[f64], filter: &[f64]) -> Vec<f64> {
    if signal.is_empty() || filter.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; signal.len() + filter.len() - 1];
    for (i, &x) in signal.iter().enumerate() {
        for (j, &h) in filter.iter().enumerate() {
            out[i + j] += x * h;
        }
    }
    out
}
