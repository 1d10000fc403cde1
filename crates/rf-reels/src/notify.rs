//! Event notification channel
//!
//! [`EventBus`] is a cloneable handle. The bank holds one clone and
//! publishes; any other clone can subscribe and receives its own channel.
//! Subscribers whose receiver has been dropped are pruned on the next
//! publish.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::symbols::SymbolId;
use crate::win::WinLine;

/// Events announced by the reel bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReelBankEvent {
    /// Spin accepted, reels about to start
    SpinStarted { cycle: u64 },
    /// One reel landed
    ReelStopped {
        cycle: u64,
        reel_index: usize,
        symbol: SymbolId,
    },
    /// Barrier fired: every reel of the cycle has landed
    AllReelsStopped { cycle: u64, payline: Vec<SymbolId> },
    /// Payline won; highlight loop started
    WinPresented { cycle: u64, win: WinLine },
    /// Watchdog force-landed these reels
    SpinStalled { cycle: u64, reels: Vec<usize> },
}

impl ReelBankEvent {
    pub fn cycle(&self) -> u64 {
        match self {
            ReelBankEvent::SpinStarted { cycle }
            | ReelBankEvent::ReelStopped { cycle, .. }
            | ReelBankEvent::AllReelsStopped { cycle, .. }
            | ReelBankEvent::WinPresented { cycle, .. }
            | ReelBankEvent::SpinStalled { cycle, .. } => *cycle,
        }
    }
}

/// Publish/subscribe handle
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<ReelBankEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// New receiver for every event published from now on
    pub fn subscribe(&self) -> Receiver<ReelBankEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber
    pub fn publish(&self, event: ReelBankEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
