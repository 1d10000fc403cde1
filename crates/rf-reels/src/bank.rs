//! Reel Bank: staggered start, stop barrier, payline hand-off
//!
//! ```text
//! start_spin ──> cancel highlight ──> remaining = R ──> delay(i × stagger) per reel
//!                                                             │
//!                 Cue::ReelStart ──> Reel::spin ──> Cue::ReelLanded ──> on_reel_stopped
//!                                                                          │
//!                                             remaining == 0 ──> payline ──> evaluate
//!                                                                          │
//!                                                      win ──> HighlightAnimator::start
//! ```
//!
//! The barrier is the shared `remaining` counter. Reels may land in any
//! order; the all-stopped signal fires when the last one reports, whatever
//! its index, and exactly once per cycle.

use serde::{Deserialize, Serialize};

use crate::audio::{AudioCue, AudioSink, NullAudio};
use crate::config::ReelBankConfig;
use crate::error::{ReelError, ReelResult};
use crate::highlight::{HighlightAnimator, HighlightTarget};
use crate::notify::{EventBus, ReelBankEvent};
use crate::reel::Reel;
use crate::scene::SymbolRenderer;
use crate::scheduler::{AnimationScheduler, Cue, TaskId};
use crate::symbols::{ReelRng, Symbol, SymbolCatalog, reel_rng};
use crate::win::{PAYLINE_LEN, Payline, WinLine, WinPattern, evaluate};

/// Number of reels in the bank
pub const REEL_COUNT: usize = PAYLINE_LEN;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOME & STATS
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of one completed spin cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub cycle: u64,
    pub payline: Payline,
    pub win: Option<WinLine>,
    /// The watchdog had to force-land at least one reel
    pub stalled: bool,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.win.is_some()
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub wins: u64,
    pub three_of_a_kind: u64,
    pub pairs: u64,
    pub stalls: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: &SpinOutcome) {
        self.spins += 1;
        if outcome.stalled {
            self.stalls += 1;
        }
        if let Some(win) = &outcome.win {
            self.wins += 1;
            match win.pattern {
                WinPattern::ThreeOfAKind => self.three_of_a_kind += 1,
                _ => self.pairs += 1,
            }
        }
    }

    /// Percentage of spins that won
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.wins as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Assembles a [`ReelBank`] with its injected collaborators
pub struct ReelBankBuilder {
    config: ReelBankConfig,
    bus: Option<EventBus>,
    audio: Option<Box<dyn AudioSink>>,
    seed: Option<u64>,
}

impl ReelBankBuilder {
    /// Notification channel the bank publishes on
    pub fn bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Overrides the config seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the config, check every catalog texture and place the reels
    pub fn build(self, sprites: &mut dyn SymbolRenderer) -> ReelResult<ReelBank> {
        self.config.validate()?;
        let catalog = self.config.catalog.catalog()?;
        if let Some(missing) = catalog.ids().find(|&id| !sprites.has_texture(id)) {
            return Err(ReelError::MissingTexture { id: missing.0 });
        }

        let mut rng = reel_rng(self.seed.or(self.config.seed));
        let pool_size = self.config.reel.filler_pool_size;

        let mut reels = Vec::with_capacity(REEL_COUNT);
        let first = Reel::new(0, 0.0, &catalog, pool_size, &mut rng, sprites)?;
        let (width, _) = sprites
            .size(first.resting().sprite)
            .ok_or(ReelError::StaleSprite {
                id: first.resting().sprite.0,
            })?;
        reels.push(first);
        for index in 1..REEL_COUNT {
            let origin_x = index as f32 * width * self.config.reel.reel_spacing;
            reels.push(Reel::new(index, origin_x, &catalog, pool_size, &mut rng, sprites)?);
        }

        log::info!(
            "[ReelBank] {} reels, symbols {}..={}, pool {}",
            REEL_COUNT,
            self.config.catalog.min_id,
            self.config.catalog.max_id,
            pool_size
        );

        Ok(ReelBank {
            highlighter: HighlightAnimator::new(self.config.highlight),
            config: self.config,
            catalog,
            rng,
            reels,
            bus: self.bus.unwrap_or_default(),
            audio: self.audio.unwrap_or_else(|| Box::new(NullAudio)),
            cycle: 0,
            remaining: 0,
            stopped: [false; REEL_COUNT],
            start_tasks: [None; REEL_COUNT],
            watchdog: None,
            stalled: false,
            last_outcome: None,
            stats: SessionStats::default(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL BANK
// ═══════════════════════════════════════════════════════════════════════════════

/// Ordered set of reels with a stop barrier
pub struct ReelBank {
    config: ReelBankConfig,
    catalog: SymbolCatalog,
    rng: ReelRng,
    reels: Vec<Reel>,
    highlighter: HighlightAnimator,
    bus: EventBus,
    audio: Box<dyn AudioSink>,
    /// Current spin cycle, 0 before the first spin
    cycle: u64,
    /// Reels still to report this cycle
    remaining: usize,
    stopped: [bool; REEL_COUNT],
    start_tasks: [Option<TaskId>; REEL_COUNT],
    watchdog: Option<TaskId>,
    stalled: bool,
    last_outcome: Option<SpinOutcome>,
    stats: SessionStats,
}

impl ReelBank {
    pub fn builder(config: ReelBankConfig) -> ReelBankBuilder {
        ReelBankBuilder {
            config,
            bus: None,
            audio: None,
            seed: None,
        }
    }

    /// Bank with default collaborators
    pub fn new(config: ReelBankConfig, sprites: &mut dyn SymbolRenderer) -> ReelResult<Self> {
        Self::builder(config).build(sprites)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN START
    // ═══════════════════════════════════════════════════════════════════════════

    /// Begin a spin cycle. Returns the new cycle number.
    pub fn start_spin(
        &mut self,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<u64> {
        if self.remaining > 0 {
            return Err(ReelError::SpinInProgress { cycle: self.cycle });
        }

        // Before any reel moves, so no symbol is pulsed and respun at once
        self.highlighter.cancel(sprites, scheduler);

        self.cycle += 1;
        let cycle = self.cycle;
        self.remaining = REEL_COUNT;
        self.stopped = [false; REEL_COUNT];
        self.stalled = false;

        let timing = self.config.timing;
        for (reel, slot) in self.start_tasks.iter_mut().enumerate() {
            let offset = reel as f64 * timing.stagger_secs;
            *slot = Some(scheduler.delay(offset, Cue::ReelStart { reel, cycle }));
        }
        self.watchdog = timing.watchdog_grace_secs.map(|grace| {
            scheduler.delay(
                timing.total_spin_duration(REEL_COUNT) + grace,
                Cue::Watchdog { cycle },
            )
        });

        self.stop_audio(AudioCue::Win);
        self.play_audio(AudioCue::SpinLoop);
        self.bus.publish(ReelBankEvent::SpinStarted { cycle });
        log::debug!("[ReelBank] cycle {} started", cycle);

        Ok(cycle)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CUE DISPATCH
    // ═══════════════════════════════════════════════════════════════════════════

    /// Route a fired cue. Returns the outcome when the cue completed the cycle.
    pub fn dispatch(
        &mut self,
        cue: Cue,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<Option<SpinOutcome>> {
        match cue {
            Cue::ReelStart { reel, cycle } => {
                if self.is_stale(cycle) {
                    return Ok(None);
                }
                self.check_index(reel)?;
                self.start_tasks[reel] = None;
                self.reels[reel].spin(
                    cycle,
                    &self.catalog,
                    &mut self.rng,
                    &self.config.timing,
                    sprites,
                    scheduler,
                )?;
                if self.start_tasks.iter().all(Option::is_none) {
                    self.rearm_watchdog(scheduler);
                }
                Ok(None)
            }
            Cue::ReelLanded { reel, cycle } => {
                if self.is_stale(cycle) {
                    return Ok(None);
                }
                self.check_index(reel)?;
                let symbol = self.reels[reel].complete(sprites)?;
                self.on_reel_stopped(reel, symbol, sprites, scheduler)
            }
            Cue::Watchdog { cycle } => self.on_watchdog(cycle, sprites, scheduler),
            Cue::Highlight { generation } => {
                self.highlighter.on_cue(generation, sprites, scheduler);
                Ok(None)
            }
        }
    }

    /// Completion handler shared by every reel
    fn on_reel_stopped(
        &mut self,
        reel: usize,
        symbol: Symbol,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<Option<SpinOutcome>> {
        if self.remaining == 0 || self.stopped[reel] {
            return Err(ReelError::DuplicateStop {
                reel,
                cycle: self.cycle,
            });
        }
        self.stopped[reel] = true;
        self.remaining -= 1;

        self.bus.publish(ReelBankEvent::ReelStopped {
            cycle: self.cycle,
            reel_index: reel,
            symbol: symbol.id,
        });
        log::debug!(
            "[ReelBank] cycle {} reel {} stopped on {}, {} remaining",
            self.cycle,
            reel,
            symbol.id,
            self.remaining
        );

        if self.remaining > 0 {
            return Ok(None);
        }
        Ok(Some(self.finish_cycle(sprites, scheduler)))
    }

    /// Barrier body: runs once per cycle, after the last reel reported
    fn finish_cycle(
        &mut self,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> SpinOutcome {
        if let Some(task) = self.watchdog.take() {
            scheduler.cancel(task);
        }

        let cycle = self.cycle;
        let payline = self.payline();
        let win = evaluate(&payline);

        self.stop_audio(AudioCue::SpinLoop);
        self.bus.publish(ReelBankEvent::AllReelsStopped {
            cycle,
            payline: payline.to_vec(),
        });

        if let Some(win) = &win {
            log::info!(
                "[ReelBank] cycle {} win: {:?} of {} at {:?}",
                cycle,
                win.pattern,
                win.symbol,
                win.positions
            );
            self.play_audio(AudioCue::Win);
            let targets = win
                .positions
                .iter()
                .map(|&reel| HighlightTarget {
                    reel,
                    sprite: self.reels[reel].resting().sprite,
                })
                .collect();
            self.highlighter.start(targets, sprites, scheduler);
            self.bus.publish(ReelBankEvent::WinPresented {
                cycle,
                win: win.clone(),
            });
        } else {
            log::debug!("[ReelBank] cycle {} no win", cycle);
        }

        let outcome = SpinOutcome {
            cycle,
            payline,
            win,
            stalled: self.stalled,
        };
        self.stats.record(&outcome);
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Restart the watchdog from the last reel start, so its deadline
    /// follows the actual landing times instead of the nominal stagger
    fn rearm_watchdog(&mut self, scheduler: &mut dyn AnimationScheduler) {
        let Some(task) = self.watchdog.take() else {
            return;
        };
        scheduler.cancel(task);
        let timing = self.config.timing;
        let grace = timing.watchdog_grace_secs.unwrap_or_default();
        self.watchdog = Some(scheduler.delay(
            timing.spin_duration_secs + grace,
            Cue::Watchdog { cycle: self.cycle },
        ));
    }

    /// Force-land whatever has not reported by the deadline
    fn on_watchdog(
        &mut self,
        cycle: u64,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<Option<SpinOutcome>> {
        if self.is_stale(cycle) || self.remaining == 0 {
            return Ok(None);
        }
        self.watchdog = None;

        let pending: Vec<usize> = (0..REEL_COUNT).filter(|&i| !self.stopped[i]).collect();
        for &reel in &pending {
            if let Some(task) = self.start_tasks[reel].take() {
                scheduler.cancel(task);
            }
        }

        log::warn!(
            "[ReelBank] cycle {} stalled, force-landing reels {:?}",
            cycle,
            pending
        );
        self.stalled = true;
        self.bus.publish(ReelBankEvent::SpinStalled {
            cycle,
            reels: pending.clone(),
        });

        let mut outcome = None;
        for reel in pending {
            let symbol = if self.reels[reel].is_spinning() {
                self.reels[reel].force_land(sprites, scheduler)?
            } else {
                self.reels[reel].resting()
            };
            if let Some(done) = self.on_reel_stopped(reel, symbol, sprites, scheduler)? {
                outcome = Some(done);
            }
        }
        Ok(outcome)
    }

    /// Stop the highlight loop without starting a spin
    pub fn stop_highlight(
        &mut self,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) {
        self.highlighter.cancel(sprites, scheduler);
    }

    fn is_stale(&self, cycle: u64) -> bool {
        if cycle != self.cycle {
            log::trace!("[ReelBank] stale cue for cycle {cycle} (current {})", self.cycle);
            return true;
        }
        false
    }

    fn check_index(&self, reel: usize) -> ReelResult<()> {
        if reel >= REEL_COUNT {
            return Err(ReelError::ReelOutOfRange {
                reel,
                count: REEL_COUNT,
            });
        }
        Ok(())
    }

    fn play_audio(&mut self, cue: AudioCue) {
        if let Err(e) = self.audio.play(cue) {
            log::warn!("[ReelBank] audio play '{}' failed: {}", cue.name(), e);
        }
    }

    fn stop_audio(&mut self, cue: AudioCue) {
        if let Err(e) = self.audio.stop(cue) {
            log::warn!("[ReelBank] audio stop '{}' failed: {}", cue.name(), e);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resting symbol ids in reel order
    pub fn payline(&self) -> Payline {
        std::array::from_fn(|i| self.reels[i].resting().id)
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&Reel> {
        self.reels.get(index)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Reels still to report in the current cycle
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// A cycle is in flight
    pub fn is_spinning(&self) -> bool {
        self.remaining > 0
    }

    pub fn highlighter(&self) -> &HighlightAnimator {
        &self.highlighter
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &ReelBankConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Receiver for this bank's events
    pub fn subscribe(&self) -> crossbeam_channel::Receiver<ReelBankEvent> {
        self.bus.subscribe()
    }
}
