use rustfft::num_complex::Complex;

use crate::error::{ConvolutionError, Result};

pub type Sample = f64;
pub type Bin = Complex<Sample>;

pub const ZERO: Bin = Complex::new(0.0, 0.0);

/// Allocates `len` zeroed complex bins, reporting exhaustion instead of aborting.
pub fn zeroed_bins(len: usize, buffer: &'static str) -> Result<Vec<Bin>> {
    let mut bins = Vec::new();
    bins.try_reserve_exact(len)
        .map_err(|source| ConvolutionError::Allocation { buffer, source })?;
    bins.resize(len, ZERO);
    Ok(bins)
}

/// Allocates `len` zeroed real samples, reporting exhaustion instead of aborting.
pub fn zeroed_samples(len: usize, buffer: &'static str) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(len)
        .map_err(|source| ConvolutionError::Allocation { buffer, source })?;
    samples.resize(len, 0.0);
    Ok(samples)
}

/// Allocates `count` independent zeroed bin buffers of `len` entries each.
pub fn zeroed_bank(count: usize, len: usize, buffer: &'static str) -> Result<Vec<Vec<Bin>>> {
    let mut bank = Vec::new();
    bank.try_reserve_exact(count)
        .map_err(|source| ConvolutionError::Allocation { buffer, source })?;
    for _ in 0..count {
        bank.push(zeroed_bins(len, buffer)?);
    }
    Ok(bank)
}

#[inline]
pub fn complex_multiply(a: Bin, b: Bin) -> Bin {
    Complex::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// `acc[i] += a[i] * b[i]` over the common length.
#[inline]
pub fn multiply_accumulate(acc: &mut [Bin], a: &[Bin], b: &[Bin]) {
    for ((out, &x), &y) in acc.iter_mut().zip(a).zip(b) {
        *out += complex_multiply(x, y);
    }
}
