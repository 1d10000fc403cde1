//! ReelForge reel bank simulator
//!
//! Usage:
//!   rf-reels-sim                       - 10 spins, normal timing
//!   rf-reels-sim --spins 100 --turbo   - 100 fast spins
//!   rf-reels-sim --seed 7 --json       - reproducible run, JSON lines
//!   rf-reels-sim --config bank.yaml    - load config from JSON/YAML

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rf_reels::{
    LogAudio, ReelBank, ReelBankConfig, ReelBankEvent, SpinOutcome, SpinTiming, SpriteStore,
    Timeline,
};

/// Symbol texture size used by the headless renderer
const SYMBOL_WIDTH: f32 = 120.0;
const SYMBOL_HEIGHT: f32 = 100.0;

/// Simulated seconds to wait for one cycle before giving up
const MAX_CYCLE_SECS: f64 = 60.0;

#[derive(Parser)]
#[command(name = "rf-reels-sim", about = "Run reel bank spin cycles on a virtual clock")]
struct Cli {
    /// Number of spins
    #[arg(short, long, default_value_t = 10)]
    spins: u32,

    /// RNG seed for reproducible outcomes
    #[arg(long)]
    seed: Option<u64>,

    /// Config file (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host frame rate driving the virtual clock
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Use turbo spin timing
    #[arg(long)]
    turbo: bool,

    /// Print outcomes as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.fps <= 0.0 || !cli.fps.is_finite() {
        bail!("--fps must be positive, got {}", cli.fps);
    }

    let mut config = match &cli.config {
        Some(path) => ReelBankConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReelBankConfig::default(),
    };
    if cli.turbo {
        config.timing = SpinTiming::turbo();
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let catalog = config.catalog.catalog().context("Invalid symbol catalog")?;
    let mut sprites = SpriteStore::with_catalog(&catalog, SYMBOL_WIDTH, SYMBOL_HEIGHT);
    let mut timeline = Timeline::new();
    let mut bank = ReelBank::builder(config)
        .audio(Box::new(LogAudio))
        .build(&mut sprites)
        .context("Failed to build reel bank")?;
    let events = bank.subscribe();

    log::info!("[Sim] {} spins at {} fps", cli.spins, cli.fps);

    let dt = 1.0 / cli.fps;
    let max_frames = (MAX_CYCLE_SECS * cli.fps).ceil() as u64;

    for _ in 0..cli.spins {
        let cycle = bank.start_spin(&mut sprites, &mut timeline)?;

        let mut outcome: Option<SpinOutcome> = None;
        let mut frames = 0u64;
        while outcome.is_none() {
            if frames >= max_frames {
                bail!("Cycle {cycle} did not complete within {MAX_CYCLE_SECS}s");
            }
            frames += 1;
            timeline.advance(dt, &mut sprites);
            while let Some(cue) = timeline.poll(&mut sprites) {
                if let Some(done) = bank.dispatch(cue, &mut sprites, &mut timeline)? {
                    outcome = Some(done);
                }
            }
        }

        for event in events.try_iter() {
            log_event(&event);
        }
        if let Some(outcome) = outcome {
            print_outcome(&outcome, frames as f64 * dt, cli.json)?;
        }
    }

    let stats = bank.stats();
    if cli.json {
        println!("{}", serde_json::to_string(stats)?);
    } else {
        println!();
        println!("Spins:           {}", stats.spins);
        println!("Wins:            {}", stats.wins);
        println!("  three of kind: {}", stats.three_of_a_kind);
        println!("  pairs:         {}", stats.pairs);
        println!("Stalls:          {}", stats.stalls);
        println!("Hit rate:        {:.1}%", stats.hit_rate());
    }
    Ok(())
}

fn log_event(event: &ReelBankEvent) {
    match serde_json::to_string(event) {
        Ok(json) => log::debug!("[Sim] event {json}"),
        Err(e) => log::warn!("[Sim] event not serializable: {e}"),
    }
}

fn print_outcome(outcome: &SpinOutcome, elapsed: f64, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(outcome)?);
        return Ok(());
    }

    let symbols: Vec<String> = outcome.payline.iter().map(|id| id.to_string()).collect();
    let result = match &outcome.win {
        Some(win) => format!("WIN {:?} of {} at {:?}", win.pattern, win.symbol, win.positions),
        None => "no win".to_string(),
    };
    let stalled = if outcome.stalled { " (stalled)" } else { "" };
    println!(
        "#{:<4} [{}]  {}  {:.2}s{}",
        outcome.cycle,
        symbols.join(" "),
        result,
        elapsed,
        stalled
    );
    Ok(())
}
