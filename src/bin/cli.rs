use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;

use upols::convolver::{Convolver, EngineKind};
use upols::io::wav::{read_mono, write_mono};
use upols::ir::IrLoader;
use upols::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "upols")]
#[command(version)]
#[command(about = "Convolves a WAV file with an impulse response using partitioned FFT convolution.")]
struct Args {
    #[arg(long, short, help = "Input WAV file")]
    input: PathBuf,

    #[arg(long, env = "UPOLS_IR", help = "Impulse response WAV file")]
    ir: PathBuf,

    #[arg(long, short, help = "Output WAV file (32-bit float, mono)")]
    output: PathBuf,

    #[arg(long, env = "UPOLS_SETTINGS", help = "Settings JSON file")]
    settings: Option<PathBuf>,

    #[arg(long, env = "UPOLS_BLOCK_SIZE", help = "Block size, a power of two")]
    block_size: Option<usize>,

    #[arg(long, value_enum, env = "UPOLS_ENGINE", help = "Convolution engine")]
    engine: Option<EngineKind>,

    #[arg(long, help = "Linear output gain")]
    gain: Option<f64>,

    #[arg(long, help = "Keep the impulse response at its recorded level")]
    raw_ir: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    info!("upols v{}", env!("CARGO_PKG_VERSION"));
    info!("Args: {:?}", args);

    let mut settings = Settings::load(args.settings.as_deref())?;
    if let Some(block_size) = args.block_size {
        settings.block_size = block_size;
    }
    if let Some(engine) = args.engine {
        settings.engine = engine;
    }
    if let Some(gain) = args.gain {
        settings.output_gain = gain;
    }
    if args.raw_ir {
        settings.normalize_ir = false;
    }
    settings.validate()?;
    info!("Settings:\n{settings}");

    let signal = read_mono(&args.input)?;
    let ir = IrLoader::new(
        signal.sample_rate,
        settings.max_ir_seconds,
        settings.normalize_ir,
    )
    .load(&args.ir)
    .with_context(|| format!("failed to load impulse response '{}'", args.ir.display()))?;

    info!(
        "Signal: {} samples at {} Hz, IR: {} taps",
        signal.samples.len(),
        signal.sample_rate,
        ir.len()
    );

    let mut convolver = Convolver::new(settings.engine, &ir, settings.block_size)
        .context("failed to build convolver")?;

    let started = Instant::now();
    let mut rendered = convolver.render(&signal.samples)?;
    info!(
        "Convolved with {} engine in {:.3} s",
        settings.engine,
        started.elapsed().as_secs_f64()
    );

    if settings.output_gain != 1.0 {
        for sample in &mut rendered {
            *sample *= settings.output_gain;
        }
    }

    let peak = rendered.iter().fold(0.0f64, |m, &x| m.max(x.abs()));
    if peak > 1.0 {
        warn!("Output peaks at {peak:.3}, consider lowering --gain");
    }

    write_mono(&args.output, &rendered, signal.sample_rate)?;
    info!("Wrote {}", args.output.display());

    if let Convolver::Partitioned(network) = convolver {
        network.destroy();
    }

    Ok(())
}
