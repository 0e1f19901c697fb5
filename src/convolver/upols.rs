use log::debug;
use rustfft::num_complex::Complex;

use crate::complex::{Bin, ZERO, multiply_accumulate, zeroed_bins, zeroed_samples};
use crate::convolver::delay_line::DelayLine;
use crate::convolver::partition::{SubfilterBank, partition_count, transform_size_for};
use crate::error::{ConvolutionError, Result};
use crate::transform::{RustFftTransform, Transform};

/// Uniformly partitioned overlap-save convolution network.
///
/// The filter is split into `partition_count` blocks of `partition_size`
/// taps, each transformed once at `transform_size = 2 * partition_size`.
/// Every call to [`Network::process`] transforms the two newest input blocks,
/// multiplies each partition against the input transform of matching age and
/// keeps the alias-free half of the inverse transform.
///
/// Output trails input by exactly one block.
pub struct Network {
    partition_size: usize,
    transform_size: usize,
    normalization: f64,

    transform: Box<dyn Transform>,
    subfilters: SubfilterBank,
    delay_line: DelayLine,

    // Two most recent input blocks, old half then new half
    input_window: Vec<f64>,
    // Raw inverse transform, only the upper half is valid
    output_window: Vec<Bin>,
    accumulator: Vec<Bin>,
    // Valid half of the previous block, emitted on the next call
    pending: Vec<f64>,
}

impl Network {
    /// Builds a network for `filter` using the default `rustfft` backend.
    ///
    /// Every owned buffer is acquired before the transform is planned, so an
    /// oversized block fails with an allocation error instead of aborting.
    pub fn new(filter: &[f64], block_size: usize) -> Result<Self> {
        let transform_size = validate(filter, block_size)?;
        let buffers = Buffers::acquire(filter.len(), block_size, transform_size)?;
        let transform = RustFftTransform::new(transform_size)?;
        Self::assemble(filter, block_size, buffers, Box::new(transform))
    }

    /// Builds a network around a caller supplied transform, which must be
    /// planned for `2 * block_size` points.
    pub fn with_transform(
        filter: &[f64],
        block_size: usize,
        transform: Box<dyn Transform>,
    ) -> Result<Self> {
        let transform_size = validate(filter, block_size)?;
        if transform.size() != transform_size {
            return Err(ConvolutionError::TransformSizeMismatch {
                expected: transform_size,
                actual: transform.size(),
            });
        }

        let buffers = Buffers::acquire(filter.len(), block_size, transform_size)?;
        Self::assemble(filter, block_size, buffers, transform)
    }

    fn assemble(
        filter: &[f64],
        block_size: usize,
        buffers: Buffers,
        mut transform: Box<dyn Transform>,
    ) -> Result<Self> {
        let transform_size = transform.size();
        let subfilters = SubfilterBank::new(filter, block_size, transform.as_mut())?;

        debug!(
            "UPOLS network ready: {} taps, block {}, transform {}, {} partitions",
            filter.len(),
            block_size,
            transform_size,
            subfilters.count()
        );

        let Buffers {
            delay_line,
            input_window,
            output_window,
            accumulator,
            pending,
        } = buffers;

        Ok(Self {
            partition_size: block_size,
            transform_size,
            normalization: transform_size as f64,
            transform,
            subfilters,
            delay_line,
            input_window,
            output_window,
            accumulator,
            pending,
        })
    }

    /// Convolves one block of `partition_size` samples into `output`.
    ///
    /// Size violations are rejected before any state changes.
    pub fn process(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        let block_size = input.len();
        if !block_size.is_power_of_two() {
            return Err(ConvolutionError::BlockSizeNotPowerOfTwo(block_size));
        }
        if block_size * 2 != self.transform_size {
            return Err(ConvolutionError::BlockSizeMismatch {
                block_size,
                transform_size: self.transform_size,
            });
        }
        if output.len() != block_size {
            return Err(ConvolutionError::OutputLengthMismatch {
                expected: block_size,
                actual: output.len(),
            });
        }

        // Slide the window and pre-compensate the unnormalised inverse.
        self.input_window.copy_within(block_size.., 0);
        for (dst, &x) in self.input_window[block_size..].iter_mut().zip(input) {
            *dst = x / self.normalization;
        }

        // The head slot holds the oldest transform; overwrite it with the newest.
        let head = self.delay_line.head_mut();
        for (bin, &x) in head.iter_mut().zip(&self.input_window) {
            *bin = Complex::new(x, 0.0);
        }
        self.transform.forward(head);

        for (age, subfilter) in self.subfilters.iter().enumerate() {
            multiply_accumulate(
                &mut self.accumulator,
                subfilter,
                self.delay_line.slot_for_age(age),
            );
        }

        self.output_window.copy_from_slice(&self.accumulator);
        self.transform.inverse(&mut self.output_window);

        // The lower half wraps around and is never emitted.
        output.copy_from_slice(&self.pending);
        for (dst, bin) in self
            .pending
            .iter_mut()
            .zip(&self.output_window[block_size..])
        {
            *dst = bin.re;
        }

        self.accumulator.fill(ZERO);
        self.delay_line.rotate();

        Ok(())
    }

    /// Clears all signal history, keeping the filter.
    pub fn reset(&mut self) {
        self.input_window.fill(0.0);
        self.output_window.fill(ZERO);
        self.accumulator.fill(ZERO);
        self.pending.fill(0.0);
        self.delay_line.clear();
    }

    /// Releases every buffer owned by the network.
    pub fn destroy(self) {
        debug!(
            "Releasing UPOLS network: {} partitions of {} bins",
            self.subfilters.count(),
            self.transform_size
        );
    }

    pub const fn partition_size(&self) -> usize {
        self.partition_size
    }

    pub const fn transform_size(&self) -> usize {
        self.transform_size
    }

    pub fn partition_count(&self) -> usize {
        self.subfilters.count()
    }

    pub const fn delay_index(&self) -> usize {
        self.delay_line.head()
    }

    pub const fn normalization(&self) -> f64 {
        self.normalization
    }

    pub const fn filter_length(&self) -> usize {
        self.subfilters.filter_length()
    }

    /// Samples between an input sample and its first contribution to output.
    pub const fn latency(&self) -> usize {
        self.partition_size
    }
}

/// Streaming state owned by a network, acquired in one fallible pass.
struct Buffers {
    delay_line: DelayLine,
    input_window: Vec<f64>,
    output_window: Vec<Bin>,
    accumulator: Vec<Bin>,
    pending: Vec<f64>,
}

impl Buffers {
    fn acquire(filter_length: usize, block_size: usize, transform_size: usize) -> Result<Self> {
        Ok(Self {
            accumulator: zeroed_bins(transform_size, "accumulator")?,
            input_window: zeroed_samples(transform_size, "input window")?,
            output_window: zeroed_bins(transform_size, "output window")?,
            pending: zeroed_samples(block_size, "pending output block")?,
            delay_line: DelayLine::new(
                partition_count(filter_length, block_size),
                transform_size,
            )?,
        })
    }
}

/// Checks the construction inputs and returns the transform size.
fn validate(filter: &[f64], block_size: usize) -> Result<usize> {
    if filter.is_empty() {
        return Err(ConvolutionError::EmptyFilter);
    }
    transform_size_for(block_size)
}
