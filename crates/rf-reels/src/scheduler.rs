//! Animation scheduling capability
//!
//! Continuations are data, not closures: every scheduled task carries a
//! [`Cue`] that the scheduler hands back when the task finishes. The host
//! feeds fired cues into [`ReelBank::dispatch`](crate::bank::ReelBank::dispatch).
//!
//! ```text
//! host frame ──> Timeline::advance(dt) ──> Timeline::poll() ──> Cue ──> ReelBank::dispatch
//!                     │                          ^                             │
//!                     └── writes tween values    └─── animate()/delay()/cancel() ┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::{Property, SpriteId, SymbolRenderer};

/// Slack for float clock comparisons
const TIME_EPSILON: f64 = 1e-9;

// ═══════════════════════════════════════════════════════════════════════════════
// CUES & TASKS
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle to a scheduled task, usable for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Continuation token delivered when a task finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Staggered start of one reel
    ReelStart { reel: usize, cycle: u64 },
    /// A reel's spin translation finished
    ReelLanded { reel: usize, cycle: u64 },
    /// Stuck-spin guard for a cycle
    Watchdog { cycle: u64 },
    /// Next step of the highlight loop
    Highlight { generation: u64 },
}

// ═══════════════════════════════════════════════════════════════════════════════
// EASING & TWEENS
// ═══════════════════════════════════════════════════════════════════════════════

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    Power1In,
    Power1Out,
    /// Quadratic ease in-out, the reel spin curve
    #[default]
    Power1InOut,
}

impl Easing {
    /// Map linear progress `t ∈ [0, 1]` onto the curve
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power1In => t * t,
            Easing::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// One property of one sprite moving from `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub sprite: SpriteId,
    pub property: Property,
    pub from: f32,
    pub to: f32,
}

impl Track {
    /// Value at eased progress `p`
    pub fn value_at(&self, p: f64) -> f32 {
        self.from + (self.to - self.from) * p as f32
    }
}

/// A timed animation over any number of sprite properties
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub tracks: Vec<Track>,
    pub duration_secs: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(duration_secs: f64, easing: Easing) -> Self {
        Self {
            tracks: Vec::new(),
            duration_secs,
            easing,
        }
    }

    /// Add a track with explicit endpoints
    pub fn track(mut self, sprite: SpriteId, property: Property, from: f32, to: f32) -> Self {
        self.tracks.push(Track {
            sprite,
            property,
            from,
            to,
        });
        self
    }

    /// Add a track moving `property` by `delta` from its current value.
    /// Dead sprites get no track.
    pub fn by(
        self,
        sprites: &dyn SymbolRenderer,
        sprite: SpriteId,
        property: Property,
        delta: f32,
    ) -> Self {
        match sprites.get(sprite, property) {
            Some(from) => self.track(sprite, property, from, from + delta),
            None => self,
        }
    }

    /// Add a track moving `property` to `target` from its current value
    pub fn to(
        self,
        sprites: &dyn SymbolRenderer,
        sprite: SpriteId,
        property: Property,
        target: f32,
    ) -> Self {
        match sprites.get(sprite, property) {
            Some(from) => self.track(sprite, property, from, target),
            None => self,
        }
    }

    /// Write the tween's state at linear progress `t` onto live sprites
    pub fn apply(&self, sprites: &mut dyn SymbolRenderer, t: f64) {
        let p = self.easing.apply(t);
        for track in &self.tracks {
            sprites.set(track.sprite, track.property, track.value_at(p));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULER CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Schedule-with-completion and delay-then-cue primitives
///
/// Every scheduled cue is delivered at most once; a cancelled task's cue is
/// never delivered.
pub trait AnimationScheduler {
    /// Start `tween` now; deliver `cue` when it finishes
    fn animate(&mut self, tween: Tween, cue: Cue) -> TaskId;

    /// Deliver `cue` after `secs`
    fn delay(&mut self, secs: f64, cue: Cue) -> TaskId;

    /// Drop a pending task. Returns `false` if it already fired or never existed.
    fn cancel(&mut self, task: TaskId) -> bool;

    /// Current clock, seconds
    fn now(&self) -> f64;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMELINE (virtual clock)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Task {
    start: f64,
    duration: f64,
    cue: Cue,
    tween: Option<Tween>,
}

impl Task {
    fn end(&self) -> f64 {
        self.start + self.duration
    }

    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            ((now - self.start) / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Deterministic virtual-clock scheduler
///
/// Time moves only when the host calls [`Timeline::advance`]. Finished
/// tasks are then handed out one at a time by [`Timeline::poll`], so a cue
/// dispatched earlier in a frame can still cancel a later one.
///
/// Tasks scheduled while a cue is being dispatched start at that cue's
/// nominal end time, not at the frame boundary. Chains of delays and tweens
/// therefore keep their exact timing whatever the frame rate.
#[derive(Debug, Default)]
pub struct Timeline {
    now: f64,
    /// Start time for newly scheduled tasks
    origin: f64,
    next_id: u64,
    tasks: BTreeMap<TaskId, Task>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `dt` seconds and write every running tween
    /// onto its sprites. Drain the finished tasks with [`Timeline::poll`].
    pub fn advance(&mut self, dt: f64, sprites: &mut dyn SymbolRenderer) {
        self.now += dt.max(0.0);
        self.origin = self.now;
        for task in self.tasks.values() {
            if let Some(tween) = &task.tween {
                tween.apply(sprites, task.progress(self.now));
            }
        }
    }

    /// Take the next finished task, ordered by (end time, task id).
    ///
    /// Its tween is written at full progress before the cue is returned.
    /// Returns `None` once nothing is due at the current time.
    pub fn poll(&mut self, sprites: &mut dyn SymbolRenderer) -> Option<Cue> {
        let due = self
            .tasks
            .iter()
            .filter(|(_, task)| task.end() <= self.now + TIME_EPSILON)
            .min_by(|a, b| a.1.end().total_cmp(&b.1.end()).then(a.0.cmp(b.0)))
            .map(|(&id, _)| id);

        let Some(task) = due.and_then(|id| self.tasks.remove(&id)) else {
            self.origin = self.now;
            return None;
        };
        if let Some(tween) = &task.tween {
            tween.apply(sprites, 1.0);
        }
        self.origin = task.end();
        Some(task.cue)
    }

    /// Number of tasks still pending
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether `task` is still pending
    pub fn is_pending(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    /// Seconds until the earliest pending task ends
    pub fn time_to_next(&self) -> Option<f64> {
        self.tasks
            .values()
            .map(|t| (t.end() - self.now).max(0.0))
            .min_by(|a, b| a.total_cmp(b))
    }

    fn push(&mut self, duration: f64, cue: Cue, tween: Option<Tween>) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.insert(
            id,
            Task {
                start: self.origin,
                duration: duration.max(0.0),
                cue,
                tween,
            },
        );
        id
    }
}

impl AnimationScheduler for Timeline {
    fn animate(&mut self, tween: Tween, cue: Cue) -> TaskId {
        let duration = tween.duration_secs;
        self.push(duration, cue, Some(tween))
    }

    fn delay(&mut self, secs: f64, cue: Cue) -> TaskId {
        self.push(secs, cue, None)
    }

    fn cancel(&mut self, task: TaskId) -> bool {
        self.tasks.remove(&task).is_some()
    }

    /// Start time of anything scheduled right now
    fn now(&self) -> f64 {
        self.origin
    }
}
