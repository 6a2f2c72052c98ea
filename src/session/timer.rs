use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Not started, cancelled, or already expired.
    Inactive,
    /// Running with no tick since the last poll.
    Running(u32),
    /// At least one tick since the last poll.
    Ticked(u32),
    Expired,
}

/// Whole-second countdown driven by explicit `Instant`s.
#[derive(Clone, Debug)]
pub struct Countdown {
    remaining: u32,
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Countdown {
    pub fn inactive() -> Self {
        Self {
            remaining: 0,
            interval: Duration::from_secs(1),
            next_tick: None,
        }
    }

    pub fn start(secs: u32, interval: Duration, now: Instant) -> Self {
        Self {
            remaining: secs,
            interval,
            next_tick: Some(now + interval),
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Take one second off. Reaching zero stops the countdown.
    pub fn tick(&mut self) -> CountdownStatus {
        if self.next_tick.is_none() {
            return CountdownStatus::Inactive;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.next_tick = None;
            return CountdownStatus::Expired;
        }
        CountdownStatus::Ticked(self.remaining)
    }

    /// Apply every tick that fell due at or before `now`.
    pub fn poll(&mut self, now: Instant) -> CountdownStatus {
        let mut ticked = false;
        while let Some(due) = self.next_tick
            && now >= due
        {
            if self.tick() == CountdownStatus::Expired {
                return CountdownStatus::Expired;
            }
            self.next_tick = Some(due + self.interval);
            ticked = true;
        }

        match (self.next_tick, ticked) {
            (None, _) => CountdownStatus::Inactive,
            (Some(_), true) => CountdownStatus::Ticked(self.remaining),
            (Some(_), false) => CountdownStatus::Running(self.remaining),
        }
    }

    pub fn cancel(&mut self) {
        self.next_tick = None;
    }
}

/// A single deferred action. Scheduling while one is pending is refused so
/// repeated triggers collapse into one.
#[derive(Clone, Debug)]
pub struct ScheduledTask<T> {
    slot: Option<(Instant, T)>,
}

impl<T> Default for ScheduledTask<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> ScheduledTask<T> {
    pub fn schedule(&mut self, due: Instant, action: T) -> bool {
        if self.slot.is_some() {
            return false;
        }
        self.slot = Some((due, action));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((due, _)) if now >= *due => self.slot.take().map(|(_, action)| action),
            _ => None,
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.slot.take().map(|(_, action)| action)
    }
}
