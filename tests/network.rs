use std::f64::consts::PI;

use rustfft::num_complex::Complex;
use upols::complex::Bin;
use upols::convolver::fir::direct_convolution;
use upols::convolver::partition::partition_count;
use upols::error::Result;
use upols::{ConvolutionError, Network, Transform};

const TOLERANCE: f64 = 1e-9;

/// O(n^2) DFT, used to check that the engine works with any conforming backend.
struct NaiveDft {
    size: usize,
}

impl NaiveDft {
    fn run(&self, buffer: &mut [Bin], sign: f64) {
        let n = self.size;
        let input = buffer.to_vec();
        for (k, out) in buffer.iter_mut().enumerate() {
            *out = input
                .iter()
                .enumerate()
                .map(|(t, &x)| {
                    let angle = sign * 2.0 * PI * (k * t % n) as f64 / n as f64;
                    x * Complex::new(angle.cos(), angle.sin())
                })
                .sum();
        }
    }
}

impl Transform for NaiveDft {
    fn size(&self) -> usize {
        self.size
    }

    fn forward(&mut self, buffer: &mut [Bin]) {
        self.run(buffer, -1.0);
    }

    fn inverse(&mut self, buffer: &mut [Bin]) {
        self.run(buffer, 1.0);
    }
}

fn test_signal(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64 * 0.37).sin() + 0.5 * (i as f64 * 1.3).cos())
        .collect()
}

/// Streams `signal` through `net` block by block, appending enough silence to
/// flush the filter tail.
fn stream(net: &mut Network, signal: &[f64], extra_blocks: usize) -> Result<Vec<f64>> {
    let block = net.partition_size();
    let mut padded = signal.to_vec();
    let blocks = signal.len().div_ceil(block) + extra_blocks;
    padded.resize(blocks * block, 0.0);

    let mut out = vec![0.0; padded.len()];
    for (input, output) in padded.chunks_exact(block).zip(out.chunks_exact_mut(block)) {
        net.process(input, output)?;
    }
    Ok(out)
}

fn assert_close(got: &[f64], want: &[f64]) {
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        let scale = w.abs().max(1.0);
        assert!(
            (g - w).abs() <= TOLERANCE * scale,
            "sample {i}: got {g}, want {w}"
        );
    }
}

#[test]
fn worked_scenario_two_tap_filter() -> Result<()> {
    let mut net = Network::new(&[1.0, 0.5, 0.0, 0.0], 4)?;
    assert_eq!(net.partition_count(), 1);
    assert_eq!(net.transform_size(), 8);

    let expected = [[0.0, 0.0, 0.0, 0.0], [1.0, 0.5, 0.0, 0.0], [0.0; 4]];
    let inputs = [[1.0, 0.0, 0.0, 0.0], [0.0; 4], [0.0; 4]];

    let mut out = [0.0; 4];
    for (input, want) in inputs.iter().zip(&expected) {
        net.process(input, &mut out)?;
        assert_close(&out, want);
    }
    Ok(())
}

#[test]
fn partition_count_rounds_up() -> Result<()> {
    assert_eq!(partition_count(10, 4), 3);
    let net = Network::new(&[0.1; 10], 4)?;
    assert_eq!(net.partition_count(), 3);
    Ok(())
}

#[test]
fn exact_and_short_final_partitions_behave_alike() -> Result<()> {
    let block = 8;
    for len in [3 * block, 3 * block - 1] {
        let filter: Vec<f64> = (0..len).map(|i| 1.0 / (i + 1) as f64).collect();
        let mut net = Network::new(&filter, block)?;
        assert_eq!(net.partition_count(), 3);

        let signal = test_signal(40);
        let out = stream(&mut net, &signal, 5)?;
        let expected = direct_convolution(&signal, &filter);
        assert_close(&out[block..block + expected.len()], &expected);
    }
    Ok(())
}

#[test]
fn zero_filter_gives_zero_output() -> Result<()> {
    for len in [1, 5, 64, 100] {
        let mut net = Network::new(&vec![0.0; len], 16)?;
        let out = stream(&mut net, &test_signal(200), 8)?;
        assert!(out.iter().all(|&y| y == 0.0), "filter length {len}");
    }
    Ok(())
}

#[test]
fn unit_impulse_appears_one_block_late() -> Result<()> {
    let block = 32;
    let mut impulse = vec![0.0; block];
    impulse[0] = 1.0;

    let mut net = Network::new(&[1.0], block)?;
    let mut out = vec![0.0; block];

    net.process(&impulse, &mut out)?;
    assert!(out.iter().all(|y| y.abs() <= TOLERANCE));

    net.process(&vec![0.0; block], &mut out)?;
    assert_close(&out, &impulse);
    Ok(())
}

#[test]
fn short_filter_matches_direct_convolution() -> Result<()> {
    let block = 16;
    let filter = [0.4, -0.3, 0.2, 0.1, -0.05];
    let signal = test_signal(157);

    let mut net = Network::new(&filter, block)?;
    let out = stream(&mut net, &signal, 2)?;
    let expected = direct_convolution(&signal, &filter);

    assert!(out[..block].iter().all(|y| y.abs() <= TOLERANCE));
    assert_close(&out[block..block + expected.len()], &expected);
    Ok(())
}

#[test]
fn long_filter_matches_direct_convolution() -> Result<()> {
    let block = 64;
    let filter: Vec<f64> = (0..1000)
        .map(|i| (-(i as f64) / 200.0).exp() * (i as f64 * 0.05).sin())
        .collect();
    let signal = test_signal(900);

    let mut net = Network::new(&filter, block)?;
    assert_eq!(net.partition_count(), 16);
    let out = stream(&mut net, &signal, 18)?;
    let expected = direct_convolution(&signal, &filter);

    assert_close(&out[block..block + expected.len()], &expected);
    Ok(())
}

#[test]
fn substituted_backend_gives_same_result() -> Result<()> {
    let block = 8;
    let filter = test_signal(21);
    let signal = test_signal(50);

    let mut fast = Network::new(&filter, block)?;
    let mut naive =
        Network::with_transform(&filter, block, Box::new(NaiveDft { size: 2 * block }))?;

    let a = stream(&mut fast, &signal, 4)?;
    let b = stream(&mut naive, &signal, 4)?;
    assert_close(&a, &b);
    Ok(())
}

#[test]
fn misconfigured_calls_are_rejected() -> Result<()> {
    assert!(matches!(
        Network::new(&[], 8),
        Err(ConvolutionError::EmptyFilter)
    ));
    assert!(matches!(
        Network::new(&[1.0], 12),
        Err(ConvolutionError::BlockSizeNotPowerOfTwo(12))
    ));
    assert!(matches!(
        Network::with_transform(&[1.0], 8, Box::new(NaiveDft { size: 8 })),
        Err(ConvolutionError::TransformSizeMismatch {
            expected: 16,
            actual: 8
        })
    ));

    assert!(matches!(
        Network::new(&[1.0], 1usize << 63),
        Err(ConvolutionError::BlockSizeTooLarge(_))
    ));
    assert!(matches!(
        Network::new(&[1.0], 1usize << 44),
        Err(ConvolutionError::Allocation { .. })
    ));

    let mut net = Network::new(&[1.0], 8)?;
    let mut out = vec![0.0; 4];
    let err = net.process(&[0.0; 4], &mut out).unwrap_err();
    assert!(err.to_string().contains("half of the transform size 16"));
    assert_eq!(net.delay_index(), 0);
    Ok(())
}

#[test]
fn unused_network_tears_down_cleanly() -> Result<()> {
    for len in [1, 63, 64, 65, 4096] {
        Network::new(&vec![0.25; len], 64)?.destroy();
    }
    Ok(())
}
