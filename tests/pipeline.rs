use anyhow::Result;
use tempfile::TempDir;
use upols::convolver::fir::direct_convolution;
use upols::convolver::{Convolver, EngineKind};
use upols::io::wav::{read_mono, write_mono};
use upols::ir::IrLoader;

#[test]
fn wav_signal_is_convolved_with_wav_ir() -> Result<()> {
    const SAMPLE_RATE: u32 = 48_000;

    let tmp = TempDir::new()?;
    let ir_path = tmp.path().join("ir.wav");
    let input_path = tmp.path().join("input.wav");
    let output_path = tmp.path().join("output.wav");

    let ir: Vec<f64> = (0..700).map(|i| 0.5 * 0.99f64.powi(i)).collect();
    let signal: Vec<f64> = (0..2000).map(|i| ((i as f64) * 0.01).sin() * 0.5).collect();
    write_mono(&ir_path, &ir, SAMPLE_RATE)?;
    write_mono(&input_path, &signal, SAMPLE_RATE)?;

    let input = read_mono(&input_path)?;
    let loaded_ir = IrLoader::new(SAMPLE_RATE, 5, false).load(&ir_path)?;
    assert_eq!(loaded_ir.len(), ir.len());

    let mut convolver = Convolver::new(EngineKind::Partitioned, &loaded_ir, 128)?;
    let rendered = convolver.render(&input.samples)?;
    write_mono(&output_path, &rendered, SAMPLE_RATE)?;

    let output = read_mono(&output_path)?;
    let expected = direct_convolution(&input.samples, &loaded_ir);
    assert_eq!(output.samples.len(), expected.len());
    for (got, want) in output.samples.iter().zip(&expected) {
        // Output passes through a 32-bit float file.
        assert!((got - want).abs() < 1e-4 * want.abs().max(1.0));
    }

    Ok(())
}

#[test]
fn engines_agree_on_short_ir() -> Result<()> {
    let ir = [0.6, 0.3, -0.2, 0.1];
    let signal: Vec<f64> = (0..333).map(|i| ((i * 31) % 17) as f64 / 17.0).collect();

    let direct = Convolver::new(EngineKind::Direct, &ir, 64)?.render(&signal)?;
    let partitioned = Convolver::new(EngineKind::Partitioned, &ir, 64)?.render(&signal)?;

    assert_eq!(direct.len(), partitioned.len());
    for (a, b) in direct.iter().zip(&partitioned) {
        assert!((a - b).abs() < 1e-9);
    }
    Ok(())
}
