//! The locked gift box and the modal it opens: a postcard that flips over
//! into the fireworks.

use crate::{engine::FireworksEngine, frame::FrameScheduler};
use log::info;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MILLIS_PER_DAY: u128 = 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GiftConfig {
    /// Unix seconds after which the gift can be opened.
    pub unlock_at: u64,
    /// Unix seconds the elapsed counter starts from.
    pub together_since: u64,
}

impl Default for GiftConfig {
    fn default() -> Self {
        GiftConfig {
            unlock_at: 1_764_038_100,
            together_since: 1_740_182_400,
        }
    }
}

pub fn from_unix(seconds: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(seconds)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GiftLock {
    unlock_at: SystemTime,
}

impl GiftLock {
    pub fn new(unlock_at: SystemTime) -> GiftLock {
        GiftLock { unlock_at }
    }

    pub fn is_unlocked(&self, now: SystemTime) -> bool {
        now >= self.unlock_at
    }

    /// Whole days left, rounded up; zero once unlocked.
    pub fn days_remaining(&self, now: SystemTime) -> u64 {
        match self.unlock_at.duration_since(now) {
            Ok(left) => ((left.as_millis() + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY) as u64,
            Err(_) => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalState {
    Hidden,
    Postcard,
    Fireworks,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GiftOutcome {
    Opened,
    AlreadyOpen,
    Locked { days_remaining: u64 },
}

pub struct GiftModal {
    lock: GiftLock,
    state: ModalState,
    unwrapped: bool,
}

impl GiftModal {
    pub fn new(lock: GiftLock) -> GiftModal {
        GiftModal {
            lock: lock,
            state: ModalState::Hidden,
            unwrapped: false,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    /// Whether the gift has been opened at least once.
    pub fn is_unwrapped(&self) -> bool {
        self.unwrapped
    }

    pub fn open(&mut self, now: SystemTime) -> GiftOutcome {
        if !self.lock.is_unlocked(now) {
            return GiftOutcome::Locked {
                days_remaining: self.lock.days_remaining(now),
            };
        }
        if self.state != ModalState::Hidden {
            return GiftOutcome::AlreadyOpen;
        }
        if !self.unwrapped {
            info!("Gift unwrapped");
            self.unwrapped = true;
        }
        self.state = ModalState::Postcard;
        GiftOutcome::Opened
    }

    /// Turns the postcard over and reveals the fireworks. Only meaningful
    /// while the postcard is showing.
    pub fn flip<S: FrameScheduler>(
        &mut self,
        engine: &mut FireworksEngine,
        scheduler: &mut S,
    ) -> bool {
        if self.state != ModalState::Postcard {
            return false;
        }
        self.state = ModalState::Fireworks;
        engine.start(scheduler);
        true
    }

    pub fn close<S: FrameScheduler>(&mut self, engine: &mut FireworksEngine, scheduler: &mut S) {
        self.state = ModalState::Hidden;
        engine.stop(scheduler);
    }
}
