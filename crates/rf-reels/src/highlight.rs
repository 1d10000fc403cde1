//! Win highlight loop
//!
//! Pulses each winning symbol in ascending reel order: scale up, scale back
//! to 1.0, short gap, next symbol. After the whole set has pulsed, pause for
//! longer and repeat until cancelled.
//!
//! Every scheduled step carries the animator's generation. Cancel and
//! restart bump the generation, so a step that slips through after a cancel
//! is recognised as stale and dropped. Targets are re-checked for liveness
//! on every step, since the owning reel may have replaced its sprite.

use crate::config::HighlightConfig;
use crate::scene::{Property, SpriteId, SymbolRenderer};
use crate::scheduler::{AnimationScheduler, Cue, Easing, TaskId, Tween};

/// Animator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    Idle,
    Looping,
}

/// Which step of the loop is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    Grow,
    Shrink,
    Gap,
    Pause,
}

/// A symbol to pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightTarget {
    pub reel: usize,
    pub sprite: SpriteId,
}

#[derive(Debug)]
struct PulseLoop {
    targets: Vec<HighlightTarget>,
    cursor: usize,
    phase: PulsePhase,
    task: TaskId,
}

/// Repeating, cancellable pulse over the winning symbols
#[derive(Debug)]
pub struct HighlightAnimator {
    config: HighlightConfig,
    generation: u64,
    active: Option<PulseLoop>,
    cycles_completed: u64,
}

impl HighlightAnimator {
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            config,
            generation: 0,
            active: None,
            cycles_completed: 0,
        }
    }

    /// Begin looping over `targets`. An empty set leaves the animator idle.
    pub fn start(
        &mut self,
        mut targets: Vec<HighlightTarget>,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) {
        self.cancel(sprites, scheduler);

        targets.sort_by_key(|t| t.reel);
        targets.retain(|t| sprites.is_alive(t.sprite));
        if targets.is_empty() {
            return;
        }

        self.generation += 1;
        self.cycles_completed = 0;
        let first = targets[0].sprite;
        let task = self.grow(first, sprites, scheduler);
        self.active = Some(PulseLoop {
            targets,
            cursor: 0,
            phase: PulsePhase::Grow,
            task,
        });
        log::debug!("[Highlight] looping, generation {}", self.generation);
    }

    /// Advance the loop. Returns `false` for stale or ignored cues.
    pub fn on_cue(
        &mut self,
        generation: u64,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> bool {
        if generation != self.generation {
            log::trace!(
                "[Highlight] stale cue (generation {generation}, current {})",
                self.generation
            );
            return false;
        }
        let Some(pulse) = self.active.as_mut() else {
            return false;
        };

        // Keep the cursor on the same target when earlier ones drop out
        let mut cursor = pulse.cursor;
        let mut current_died = false;
        let mut index = 0;
        pulse.targets.retain(|t| {
            let alive = sprites.is_alive(t.sprite);
            if !alive && index < pulse.cursor {
                cursor -= 1;
            } else if !alive && index == pulse.cursor {
                current_died = true;
            }
            index += 1;
            alive
        });
        pulse.cursor = cursor;

        if pulse.targets.is_empty() {
            log::debug!("[Highlight] every target is gone, stopping");
            self.active = None;
            return false;
        }
        // The symbol mid-pulse is gone: grow whichever target took its slot
        if current_died && matches!(pulse.phase, PulsePhase::Grow | PulsePhase::Shrink) {
            pulse.phase = PulsePhase::Gap;
        }
        if pulse.cursor >= pulse.targets.len() {
            pulse.cursor = 0;
        }

        let cue = Cue::Highlight { generation };
        let sprite = pulse.targets[pulse.cursor].sprite;
        match pulse.phase {
            PulsePhase::Grow => {
                let tween = Tween::new(self.config.pulse_secs, Easing::Power1In).to(
                    &*sprites,
                    sprite,
                    Property::Scale,
                    1.0,
                );
                pulse.task = scheduler.animate(tween, cue);
                pulse.phase = PulsePhase::Shrink;
            }
            PulsePhase::Shrink => {
                pulse.cursor += 1;
                if pulse.cursor < pulse.targets.len() {
                    pulse.task = scheduler.delay(self.config.gap_secs, cue);
                    pulse.phase = PulsePhase::Gap;
                } else {
                    pulse.cursor = 0;
                    pulse.task = scheduler.delay(self.config.cycle_pause_secs, cue);
                    pulse.phase = PulsePhase::Pause;
                    self.cycles_completed += 1;
                }
            }
            PulsePhase::Gap | PulsePhase::Pause => {
                let tween = Tween::new(self.config.pulse_secs, Easing::Power1Out).to(
                    &*sprites,
                    sprite,
                    Property::Scale,
                    self.config.scale,
                );
                pulse.task = scheduler.animate(tween, cue);
                pulse.phase = PulsePhase::Grow;
            }
        }
        true
    }

    /// Stop looping, drop the pending step and restore live targets to 1.0
    pub fn cancel(
        &mut self,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) {
        let Some(pulse) = self.active.take() else {
            return;
        };
        scheduler.cancel(pulse.task);
        for target in &pulse.targets {
            if sprites.is_alive(target.sprite) {
                sprites.set(target.sprite, Property::Scale, 1.0);
            }
        }
        self.generation += 1;
        log::debug!("[Highlight] cancelled");
    }

    fn grow(
        &self,
        sprite: SpriteId,
        sprites: &mut dyn SymbolRenderer,
        scheduler: &mut dyn AnimationScheduler,
    ) -> TaskId {
        let tween = Tween::new(self.config.pulse_secs, Easing::Power1Out).to(
            &*sprites,
            sprite,
            Property::Scale,
            self.config.scale,
        );
        scheduler.animate(
            tween,
            Cue::Highlight {
                generation: self.generation,
            },
        )
    }

    pub fn state(&self) -> HighlightState {
        if self.active.is_some() {
            HighlightState::Looping
        } else {
            HighlightState::Idle
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Pending step, if looping
    pub fn phase(&self) -> Option<PulsePhase> {
        self.active.as_ref().map(|p| p.phase)
    }

    /// Pending task, if looping
    pub fn pending_task(&self) -> Option<TaskId> {
        self.active.as_ref().map(|p| p.task)
    }

    pub fn targets(&self) -> Vec<HighlightTarget> {
        self.active
            .as_ref()
            .map(|p| p.targets.clone())
            .unwrap_or_default()
    }

    /// Full passes over the target set since the last start
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::scene::SpriteStore;
    use crate::scheduler::Timeline;
    use crate::symbols::{SymbolCatalog, SymbolId};

    fn setup() -> (HighlightAnimator, SpriteStore, Timeline) {
        let sprites = SpriteStore::with_catalog(&SymbolCatalog::standard(), 100.0, 100.0);
        (
            HighlightAnimator::new(HighlightConfig::default()),
            sprites,
            Timeline::new(),
        )
    }

    fn step(
        animator: &mut HighlightAnimator,
        timeline: &mut Timeline,
        sprites: &mut SpriteStore,
        dt: f64,
    ) {
        timeline.advance(dt, sprites);
        while let Some(cue) = timeline.poll(sprites) {
            if let Cue::Highlight { generation } = cue {
                animator.on_cue(generation, sprites, timeline);
            }
        }
    }

    fn scale(sprites: &SpriteStore, sprite: SpriteId) -> f32 {
        sprites.get(sprite, Property::Scale).unwrap()
    }

    #[test]
    fn test_empty_targets_stay_idle() {
        let (mut animator, mut sprites, mut timeline) = setup();
        animator.start(Vec::new(), &mut sprites, &mut timeline);
        assert_eq!(animator.state(), HighlightState::Idle);
        assert!(timeline.is_idle());
    }

    #[test]
    fn test_pulse_sequence() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let config = HighlightConfig::default();
        let a = sprites.create(SymbolId(1)).unwrap();
        let b = sprites.create(SymbolId(1)).unwrap();

        // Out of order on purpose: the loop runs in reel order
        animator.start(
            vec![
                HighlightTarget { reel: 2, sprite: b },
                HighlightTarget { reel: 0, sprite: a },
            ],
            &mut sprites,
            &mut timeline,
        );
        assert_eq!(animator.state(), HighlightState::Looping);
        assert_eq!(animator.phase(), Some(PulsePhase::Grow));

        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_abs_diff_eq!(scale(&sprites, a), config.scale, epsilon = 1e-4);
        assert_abs_diff_eq!(scale(&sprites, b), 1.0);
        assert_eq!(animator.phase(), Some(PulsePhase::Shrink));

        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_abs_diff_eq!(scale(&sprites, a), 1.0, epsilon = 1e-4);
        assert_eq!(animator.phase(), Some(PulsePhase::Gap));

        step(&mut animator, &mut timeline, &mut sprites, config.gap_secs);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_abs_diff_eq!(scale(&sprites, b), config.scale, epsilon = 1e-4);

        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.phase(), Some(PulsePhase::Pause));
        assert_eq!(animator.cycles_completed(), 1);

        step(&mut animator, &mut timeline, &mut sprites, config.cycle_pause_secs);
        assert_eq!(animator.phase(), Some(PulsePhase::Grow));
        assert_eq!(timeline.pending(), 1);
    }

    #[test]
    fn test_cancel_mid_pulse() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let a = sprites.create(SymbolId(3)).unwrap();
        animator.start(
            vec![HighlightTarget { reel: 0, sprite: a }],
            &mut sprites,
            &mut timeline,
        );
        let stale_generation = animator.generation();

        step(&mut animator, &mut timeline, &mut sprites, 0.1);
        assert!(scale(&sprites, a) > 1.0);

        animator.cancel(&mut sprites, &mut timeline);
        assert_eq!(animator.state(), HighlightState::Idle);
        assert!(timeline.is_idle());
        assert_abs_diff_eq!(scale(&sprites, a), 1.0);
        assert!(!animator.on_cue(stale_generation, &mut sprites, &mut timeline));
    }

    #[test]
    fn test_dead_targets_are_skipped() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let config = HighlightConfig::default();
        let a = sprites.create(SymbolId(1)).unwrap();
        let b = sprites.create(SymbolId(1)).unwrap();
        animator.start(
            vec![
                HighlightTarget { reel: 0, sprite: a },
                HighlightTarget { reel: 1, sprite: b },
            ],
            &mut sprites,
            &mut timeline,
        );

        sprites.destroy(b);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.targets().len(), 1);

        sprites.destroy(a);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.state(), HighlightState::Idle);
        assert!(timeline.is_idle());
    }

    fn three_targets(sprites: &mut SpriteStore) -> (Vec<HighlightTarget>, [SpriteId; 3]) {
        let ids = [
            sprites.create(SymbolId(2)).unwrap(),
            sprites.create(SymbolId(2)).unwrap(),
            sprites.create(SymbolId(2)).unwrap(),
        ];
        let targets = ids
            .iter()
            .enumerate()
            .map(|(reel, &sprite)| HighlightTarget { reel, sprite })
            .collect();
        (targets, ids)
    }

    #[test]
    fn test_current_target_dies_mid_pulse() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let config = HighlightConfig::default();
        let (targets, [a, b, c]) = three_targets(&mut sprites);
        animator.start(targets, &mut sprites, &mut timeline);

        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.phase(), Some(PulsePhase::Shrink));

        sprites.destroy(a);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        // Next target grows straight away instead of being skipped
        assert_eq!(animator.phase(), Some(PulsePhase::Grow));
        assert_eq!(animator.targets().len(), 2);

        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_abs_diff_eq!(scale(&sprites, b), config.scale, epsilon = 1e-4);
        assert_abs_diff_eq!(scale(&sprites, c), 1.0);
    }

    #[test]
    fn test_earlier_target_dies_keeps_cursor() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let config = HighlightConfig::default();
        let (targets, [a, _, c]) = three_targets(&mut sprites);
        animator.start(targets, &mut sprites, &mut timeline);

        // a up, a down, gap, b up
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        step(&mut animator, &mut timeline, &mut sprites, config.gap_secs);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.phase(), Some(PulsePhase::Shrink));

        sprites.destroy(a);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_eq!(animator.phase(), Some(PulsePhase::Gap));
        assert_eq!(animator.cycles_completed(), 0);

        step(&mut animator, &mut timeline, &mut sprites, config.gap_secs);
        step(&mut animator, &mut timeline, &mut sprites, config.pulse_secs);
        assert_abs_diff_eq!(scale(&sprites, c), config.scale, epsilon = 1e-4);
    }

    #[test]
    fn test_cancel_when_targets_already_gone() {
        let (mut animator, mut sprites, mut timeline) = setup();
        let a = sprites.create(SymbolId(1)).unwrap();
        animator.start(
            vec![HighlightTarget { reel: 1, sprite: a }],
            &mut sprites,
            &mut timeline,
        );
        sprites.destroy(a);

        animator.cancel(&mut sprites, &mut timeline);
        assert_eq!(animator.state(), HighlightState::Idle);
        assert!(timeline.is_idle());
    }
}
