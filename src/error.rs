use std::collections::TryReserveError;
use thiserror::Error;

/// Failure conditions of the convolution engine.
///
/// Configuration errors are programming errors at the call site and are raised
/// before any state is touched. Allocation errors only happen while building a
/// network; whatever had been acquired up to that point is already released
/// when the error reaches the caller.
#[derive(Debug, Error)]
pub enum ConvolutionError {
    #[error("block size must be a power of two, got {0}")]
    BlockSizeNotPowerOfTwo(usize),

    #[error("block size {0} is too large, twice its value must fit the transform size")]
    BlockSizeTooLarge(usize),

    #[error("block size {block_size} must be half of the transform size {transform_size}")]
    BlockSizeMismatch {
        block_size: usize,
        transform_size: usize,
    },

    #[error("output buffer holds {actual} samples but the block size is {expected}")]
    OutputLengthMismatch { expected: usize, actual: usize },

    #[error("transform backend has size {actual}, network needs {expected}")]
    TransformSizeMismatch { expected: usize, actual: usize },

    #[error("filter must contain at least one sample")]
    EmptyFilter,

    #[error("could not allocate storage for {buffer}")]
    Allocation {
        buffer: &'static str,
        #[source]
        source: TryReserveError,
    },
}

pub type Result<T> = std::result::Result<T, ConvolutionError>;
