//! # rf-reels — Reel Bank for ReelForge
//!
//! Three vertical reels that start on a stagger, scroll a strip of filler
//! symbols and land on randomly drawn symbols. When the last reel lands the
//! payline is evaluated and winning symbols pulse in a loop until the next
//! spin.
//!
//! ## Features
//!
//! - **Stop Barrier**: exactly one all-stopped signal per cycle, whatever order reels land in
//! - **Payline Evaluation**: three of a kind, left/right/outer pair
//! - **Win Highlight**: cancellable pulse loop over the winning symbols
//! - **Watchdog**: force-lands reels whose completion never arrives
//! - **Headless Timeline**: deterministic virtual-clock scheduler for hosts and tests
//!
//! ## Architecture
//!
//! ```text
//! ReelBank
//!     │
//!     ├── Reel × 3 (strip, spin state machine)
//!     ├── HighlightAnimator (pulse loop)
//!     ├── EventBus (ReelBankEvent subscribers)
//!     └── AudioSink (spin loop, win jingle)
//!           │
//!           v
//!     SymbolRenderer + AnimationScheduler  (supplied by the host)
//! ```
//!
//! The scheduler hands fired [`Cue`]s back to the host one at a time, and the
//! host routes each one through [`ReelBank::dispatch`]:
//!
//! ```no_run
//! use rf_reels::{ReelBank, ReelBankConfig, SpriteStore, SymbolCatalog, Timeline};
//!
//! let mut sprites = SpriteStore::with_catalog(&SymbolCatalog::standard(), 120.0, 100.0);
//! let mut timeline = Timeline::new();
//! let mut bank = ReelBank::new(ReelBankConfig::default(), &mut sprites)?;
//!
//! bank.start_spin(&mut sprites, &mut timeline)?;
//! loop {
//!     timeline.advance(1.0 / 60.0, &mut sprites);
//!     while let Some(cue) = timeline.poll(&mut sprites) {
//!         if let Some(outcome) = bank.dispatch(cue, &mut sprites, &mut timeline)? {
//!             println!("{:?} -> {:?}", outcome.payline, outcome.win);
//!         }
//!     }
//! #   break;
//! }
//! # Ok::<(), rf_reels::ReelError>(())
//! ```

pub mod audio;
pub mod bank;
pub mod config;
pub mod error;
pub mod highlight;
pub mod notify;
pub mod reel;
pub mod scene;
pub mod scheduler;
pub mod symbols;
pub mod win;

pub use audio::*;
pub use bank::*;
pub use config::*;
pub use error::*;
pub use highlight::*;
pub use notify::*;
pub use reel::*;
pub use scene::*;
pub use scheduler::*;
pub use symbols::*;
pub use win::*;
