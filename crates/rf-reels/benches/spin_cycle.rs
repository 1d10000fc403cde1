//! Reel bank benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rf_reels::{
    ReelBank, ReelBankConfig, SpinTiming, SpriteStore, SymbolCatalog, SymbolId, Timeline,
    evaluate,
};

fn bench_full_cycle(c: &mut Criterion) {
    let mut sprites = SpriteStore::with_catalog(&SymbolCatalog::standard(), 120.0, 100.0);
    let mut timeline = Timeline::new();
    let mut config = ReelBankConfig::default();
    config.timing = SpinTiming::instant();
    config.seed = Some(42);
    let mut bank = ReelBank::new(config, &mut sprites).expect("bank build");

    c.bench_function("spin_cycle_instant", |b| {
        b.iter(|| {
            bank.start_spin(&mut sprites, &mut timeline).expect("start_spin");
            let mut done = false;
            while !done {
                timeline.advance(1.0 / 60.0, &mut sprites);
                while let Some(cue) = timeline.poll(&mut sprites) {
                    let outcome = bank
                        .dispatch(cue, &mut sprites, &mut timeline)
                        .expect("dispatch");
                    if let Some(outcome) = outcome {
                        black_box(outcome);
                        done = true;
                    }
                }
            }
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let paylines: Vec<[SymbolId; 3]> = (0..512u32)
        .map(|i| [SymbolId(i % 8 + 1), SymbolId(i / 8 % 8 + 1), SymbolId(i / 64 % 8 + 1)])
        .collect();

    c.bench_function("evaluate_512", |b| {
        b.iter(|| {
            for payline in &paylines {
                black_box(evaluate(black_box(payline)));
            }
        })
    });
}

criterion_group!(benches, bench_full_cycle, bench_evaluate);
criterion_main!(benches);
