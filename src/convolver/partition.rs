use log::debug;
use rustfft::num_complex::Complex;

use crate::complex::{Bin, zeroed_bank};
use crate::error::{ConvolutionError, Result};
use crate::transform::Transform;

/// Frequency-domain partitions of an FIR filter.
///
/// Partition `k` holds taps `k * B .. (k + 1) * B`, zero-padded to the
/// transform size `2 * B` and forward transformed. The bank is read-only once
/// built.
pub struct SubfilterBank {
    partitions: Vec<Vec<Bin>>,
    filter_length: usize,
}

impl SubfilterBank {
    pub fn new(
        filter: &[f64],
        partition_size: usize,
        transform: &mut dyn Transform,
    ) -> Result<Self> {
        if filter.is_empty() {
            return Err(ConvolutionError::EmptyFilter);
        }
        let transform_size = transform_size_for(partition_size)?;
        if transform.size() != transform_size {
            return Err(ConvolutionError::TransformSizeMismatch {
                expected: transform_size,
                actual: transform.size(),
            });
        }

        let count = partition_count(filter.len(), partition_size);
        let mut partitions = zeroed_bank(count, transform_size, "sub filter bank")?;

        for (taps, partition) in filter.chunks(partition_size).zip(partitions.iter_mut()) {
            for (bin, &tap) in partition.iter_mut().zip(taps) {
                *bin = Complex::new(tap, 0.0);
            }
            transform.forward(partition);
        }

        debug!(
            "Partitioned {} taps into {} sub filters of {} bins",
            filter.len(),
            count,
            transform_size
        );

        Ok(Self {
            partitions,
            filter_length: filter.len(),
        })
    }

    pub fn count(&self) -> usize {
        self.partitions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Bin]> {
        self.partitions.iter().map(Vec::as_slice)
    }

    pub const fn filter_length(&self) -> usize {
        self.filter_length
    }
}

/// Transform size for a block of `block_size` samples, `2 * block_size`.
pub fn transform_size_for(block_size: usize) -> Result<usize> {
    if !block_size.is_power_of_two() {
        return Err(ConvolutionError::BlockSizeNotPowerOfTwo(block_size));
    }
    match block_size.checked_mul(2) {
        Some(size) => Ok(size),
        None => Err(ConvolutionError::BlockSizeTooLarge(block_size)),
    }
}

/// Number of `partition_size` blocks needed to cover `filter_length` taps.
pub const fn partition_count(filter_length: usize, partition_size: usize) -> usize {
    filter_length.div_ceil(partition_size)
}
