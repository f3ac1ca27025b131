//! Fixed-rate deadline keeping for the host loop.

use std::thread;
use std::time::{Duration, Instant};

pub const TICKS_PER_SECOND: u32 = 60;

const SPIN_MARGIN: Duration = Duration::from_millis(1);

/// Keeps a loop running at a fixed rate. A late tick drops the intervals it
/// missed rather than running them back to back.
pub struct Pacer {
    interval: Duration,
    next: Instant,
}

impl Pacer {
    pub fn new(ticks_per_second: u32) -> Pacer {
        let interval = Duration::from_secs(1) / ticks_per_second.max(1);
        Pacer {
            interval,
            next: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next tick is due and schedules the one after it.
    pub fn wait(&mut self) {
        loop {
            let now = Instant::now();
            if now >= self.next {
                break;
            }
            let left = self.next - now;
            if left > SPIN_MARGIN {
                thread::sleep(left - SPIN_MARGIN);
            } else {
                thread::yield_now();
            }
        }
        self.next = advance(self.next, Instant::now(), self.interval);
    }
}

/// First deadline after `now`, stepping from `next` in whole intervals.
pub fn advance(next: Instant, now: Instant, interval: Duration) -> Instant {
    let mut next = next + interval;
    if next > now {
        return next;
    }
    let behind = now - next;
    let missed = (behind.as_nanos() / interval.as_nanos().max(1)) as u32;
    next += interval * missed;
    while next <= now {
        next += interval;
    }
    next
}
