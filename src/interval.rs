//! Scan-tick pacing. Adapted from the reference crate's `Loop`: the same
//! `next_iter: Instant` + sleep-the-remainder shape, stripped of its
//! thread-pool/jitter-reporting machinery since a node here is a single
//! scan loop, not one of several cooperating I/O/Program/Output threads.

use log::warn;
use std::cmp::Ordering;
use std::thread;
use std::time::{Duration, Instant};

/// Paces a node's scan loop to a fixed real-time interval, independent of
/// the simulated-time step advanced on [`crate::clock::SimClock`]. Without
/// this a node would spin as fast as the OS allows, burning a core to
/// produce log lines no one can read.
pub struct ScanPacer {
    next_iter: Instant,
    interval: Duration,
}

impl ScanPacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            next_iter: Instant::now() + interval,
            interval,
        }
    }

    /// Sleeps until the next tick boundary. Returns `false` if the
    /// previous tick overran the interval (logged as a warning), in which
    /// case the next boundary is rebased from now.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let on_time = match now.cmp(&self.next_iter) {
            Ordering::Greater => false,
            Ordering::Equal => true,
            Ordering::Less => {
                thread::sleep(self.next_iter - now);
                true
            }
        };
        if on_time {
            self.next_iter += self.interval;
        } else {
            warn!("scan loop overran interval {:?}", self.interval);
            self.next_iter = Instant::now() + self.interval;
        }
        on_time
    }
}
