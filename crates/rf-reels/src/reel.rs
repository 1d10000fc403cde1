//! Reel: one vertical strip and its spin state machine
//!
//! ```text
//!            spin()                      complete()
//!   Idle ───────────────> Spinning ───────────────────> Idle
//!   (resting only)        (strip in flight)             (resting = landing)
//! ```
//!
//! During a spin the strip is, bottom to top: the outgoing resting symbol,
//! the shuffled filler pool, then a freshly drawn landing symbol. One tween
//! moves the whole strip down by `(strip.len() - 1) × symbol height`, which
//! puts the landing symbol exactly in the resting slot. The outcome is
//! therefore fixed when the spin starts.

use rand::seq::SliceRandom;

use crate::config::SpinTiming;
use crate::error::{ReelError, ReelResult};
use crate::scene::{Property, SymbolRenderer};
use crate::scheduler::{AnimationScheduler, Cue, TaskId, Tween};
use crate::symbols::{ReelRng, Symbol, SymbolCatalog, SymbolId};

/// Vertical position of the visible slot
pub const REST_Y: f32 = 0.0;

/// Spin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    Idle,
    Spinning { cycle: u64, task: TaskId },
}

/// A single reel
#[derive(Debug)]
pub struct Reel {
    index: usize,
    origin_x: f32,
    resting: Symbol,
    /// Non-empty exactly while spinning
    strip: Vec<Symbol>,
    /// Filler ids, drawn once and reshuffled every spin
    filler_pool: Vec<SymbolId>,
    state: SpinState,
}

impl Reel {
    /// Create a reel at column `origin_x` with a random resting symbol
    pub fn new(
        index: usize,
        origin_x: f32,
        catalog: &SymbolCatalog,
        filler_pool_size: usize,
        rng: &mut ReelRng,
        sprites: &mut dyn SymbolRenderer,
    ) -> ReelResult<Self> {
        let filler_pool = (0..filler_pool_size)
            .map(|_| catalog.pick_random(rng))
            .collect();

        let id = catalog.pick_random(rng);
        let sprite = sprites.create(id)?;
        sprites.set(sprite, Property::X, origin_x);
        sprites.set(sprite, Property::Y, REST_Y);

        Ok(Self {
            index,
            origin_x,
            resting: Symbol::new(id, sprite),
            strip: Vec::new(),
            filler_pool,
            state: SpinState::Idle,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════════

    /// Build the strip and schedule its translation
    pub fn spin(
        &mut self,
        cycle: u64,
        catalog: &SymbolCatalog,
        rng: &mut ReelRng,
        timing: &SpinTiming,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<TaskId> {
        if self.is_spinning() {
            return Err(ReelError::AlreadySpinning { reel: self.index });
        }

        let (_, height) = sprites
            .size(self.resting.sprite)
            .ok_or(ReelError::StaleSprite {
                id: self.resting.sprite.0,
            })?;

        self.filler_pool.shuffle(rng);
        let landing = catalog.pick_random(rng);
        let strip = self.build_strip(landing, height, sprites)?;

        let travel = (strip.len() - 1) as f32 * height;
        let tween = strip.iter().fold(
            Tween::new(timing.spin_duration_secs, timing.easing),
            |tween, symbol| tween.by(&*sprites, symbol.sprite, Property::Y, travel),
        );
        let task = scheduler.animate(
            tween,
            Cue::ReelLanded {
                reel: self.index,
                cycle,
            },
        );

        log::trace!(
            "[Reel {}] spin cycle {} strip {} symbols, landing {}",
            self.index,
            cycle,
            strip.len(),
            landing
        );

        self.strip = strip;
        self.state = SpinState::Spinning { cycle, task };
        Ok(task)
    }

    /// Resting symbol, fillers stacked above it, landing symbol on top
    fn build_strip(
        &self,
        landing: SymbolId,
        height: f32,
        sprites: &mut dyn SymbolRenderer,
    ) -> ReelResult<Vec<Symbol>> {
        let mut strip = Vec::with_capacity(self.filler_pool.len() + 2);
        strip.push(self.resting);

        let ids = self.filler_pool.iter().copied().chain(std::iter::once(landing));
        for id in ids {
            match self.place(id, strip.len(), height, sprites) {
                Ok(symbol) => strip.push(symbol),
                Err(e) => {
                    for placed in &strip[1..] {
                        sprites.destroy(placed.sprite);
                    }
                    return Err(e);
                }
            }
        }
        Ok(strip)
    }

    fn place(
        &self,
        id: SymbolId,
        slot: usize,
        height: f32,
        sprites: &mut dyn SymbolRenderer,
    ) -> ReelResult<Symbol> {
        let sprite = sprites.create(id)?;
        sprites.set(sprite, Property::X, self.origin_x);
        sprites.set(sprite, Property::Y, REST_Y - slot as f32 * height);
        Ok(Symbol::new(id, sprite))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMPLETION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Finish the spin: the landing symbol becomes the resting symbol and
    /// every other strip sprite is destroyed.
    pub fn complete(&mut self, sprites: &mut dyn SymbolRenderer) -> ReelResult<Symbol> {
        if !self.is_spinning() {
            return Err(ReelError::UnexpectedCompletion { reel: self.index });
        }
        let landing = self
            .strip
            .pop()
            .ok_or(ReelError::UnexpectedCompletion { reel: self.index })?;

        for symbol in self.strip.drain(..) {
            sprites.destroy(symbol.sprite);
        }
        sprites.set(landing.sprite, Property::X, self.origin_x);
        sprites.set(landing.sprite, Property::Y, REST_Y);

        self.resting = landing;
        self.state = SpinState::Idle;
        Ok(landing)
    }

    /// Cancel the outstanding translation and land immediately
    pub fn force_land(
        &mut self,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> ReelResult<Symbol> {
        if let SpinState::Spinning { task, .. } = self.state {
            scheduler.cancel(task);
        }
        self.complete(sprites)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn resting(&self) -> Symbol {
        self.resting
    }

    /// Strip in flight; empty while idle
    pub fn strip(&self) -> &[Symbol] {
        &self.strip
    }

    /// Symbol the current spin will land on
    pub fn landing(&self) -> Option<Symbol> {
        if self.is_spinning() {
            self.strip.last().copied()
        } else {
            None
        }
    }

    pub fn filler_pool(&self) -> &[SymbolId] {
        &self.filler_pool
    }

    pub fn state(&self) -> SpinState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.state, SpinState::Spinning { .. })
    }
}
