pub(crate) mod clock;
pub(crate) mod effects;
pub(crate) mod olaoutput;
pub(crate) mod options;
pub(crate) mod pixels;
pub(crate) mod random;
pub(crate) mod tickrate;

use std::net::SocketAddr;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use effects::candles::Candles;
use olaoutput::OlaOutput;
use options::CandleOptions;
use pixels::{PixelBuffer, PixelOutput};
use tickrate::TickRate;

use crate::clock::{MonotonicClock, SystemClock};
use crate::random::SeededRandom;

#[derive(Parser)]
struct Cli {
    /// TOML file overriding the built-in candle options
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// OSC address of the OLA daemon, e.g. 127.0.0.1:7770
    #[arg(short, long, value_name = "ADDR")]
    ola_addr: Option<SocketAddr>,

    /// DMX universe to send to
    #[arg(short, long, default_value_t = 0)]
    universe: u16,

    /// Seed for the flicker randomness
    #[arg(short, long)]
    seed: Option<u64>,
}

fn load_options(args: &Cli) -> Result<CandleOptions, String> {
    let mut options = match args.config.as_deref() {
        Some(path) => CandleOptions::load(path)?,
        None => CandleOptions::default(),
    };

    if let Some(seed) = args.seed {
        options.seed = seed;
    }

    Ok(options)
}

fn create_output(args: &Cli, options: &CandleOptions) -> Result<Box<dyn PixelOutput>, String> {
    if let Some(ola_addr) = args.ola_addr {
        log::info!("Sending to OLA at {} universe {}", ola_addr, args.universe);
        let ola = OlaOutput::new(ola_addr, args.universe, options.flame_count, options.brightness)?;
        return Ok(Box::new(ola));
    };

    log::info!("No OLA address given, keeping frames in memory");
    Ok(Box::new(PixelBuffer::new(
        options.flame_count,
        options.brightness,
    )))
}

fn run(
    options: &CandleOptions,
    pixels: &mut dyn PixelOutput,
    running: &AtomicBool,
) {
    let clock = SystemClock::new();
    let mut random = SeededRandom::new(options.seed);
    let mut candles = Candles::new(options, pixels.len(), clock.now());
    let mut tick_rate = TickRate::new(clock.now());

    let refresh_interval = 1.0 / options.refresh_hz;
    let mut next_refresh = clock.now();

    while running.load(Ordering::Relaxed) {
        let now = clock.now();
        candles.step(now, &mut random, pixels);

        if now >= next_refresh {
            pixels.flush();
            next_refresh = now + refresh_interval;
        }

        tick_rate.tick(now);
    }

    log::info!("Shutting down with {} flames lit", candles.lit_count());
    pixels.blackout();
    pixels.flush();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let options = match load_options(&args) {
        Ok(options) => options,
        Err(err) => {
            log::error!("Invalid options: {}", err);
            process::exit(1);
        }
    };
    log::info!(
        "Lighting {} flames, one every {}s, seed {}",
        options.flame_count,
        options.ignition_interval_secs,
        options.seed
    );

    let mut pixels = match create_output(&args, &options) {
        Ok(pixels) => pixels,
        Err(err) => {
            log::error!("Cannot set up pixel output: {}", err);
            process::exit(1);
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    let handler_running = Arc::clone(&running);
    if let Err(err) = ctrlc::set_handler(move || handler_running.store(false, Ordering::Relaxed)) {
        log::error!("Failed to install Ctrl-C handler: {}", err);
        process::exit(1);
    }

    run(&options, pixels.as_mut(), &running);
}
