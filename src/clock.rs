use log::info;
use once_cell::sync::Lazy;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static TERM_FLAG: Lazy<Arc<AtomicBool>> = Lazy::new(|| Arc::new(AtomicBool::new(false)));

/// Registers the SIGTERM/SIGINT handlers shared by every node. Mirrors the
/// reference PLC crate's `register_signals`, but each node here owns its
/// own clock rather than a shared controller-stats table.
///
/// # Panics
///
/// Will panic if the signal handlers can not be installed.
pub fn register_signals() {
    signal_hook::flag::register(SIGTERM, Arc::clone(&TERM_FLAG)).unwrap();
    signal_hook::flag::register(SIGINT, Arc::clone(&TERM_FLAG)).unwrap();
}

fn sigterm_received() -> bool {
    TERM_FLAG.load(Ordering::SeqCst)
}

/// A single-writer, process-local simulated-time clock. Each of the seven
/// nodes owns exactly one: there is no cross-process lockstep barrier in
/// this core (SPEC_FULL.md §4.1/§9 open question 4) — `advance` just
/// commits the local tick counter forward.
pub struct SimClock {
    now_ns: AtomicU64,
    step_ns: u64,
    total_duration_ns: u64,
}

impl SimClock {
    #[must_use]
    pub fn new(step_ns: u64, total_duration_ns: u64) -> Self {
        Self {
            now_ns: AtomicU64::new(0),
            step_ns,
            total_duration_ns,
        }
    }

    #[inline]
    #[must_use]
    pub fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    #[inline]
    #[must_use]
    pub fn step_ns(&self) -> u64 {
        self.step_ns
    }

    #[inline]
    #[must_use]
    pub fn total_duration_ns(&self) -> u64 {
        self.total_duration_ns
    }

    /// True once either a termination signal arrived or the configured
    /// simulation budget has been fully consumed.
    #[must_use]
    pub fn stop_requested(&self) -> bool {
        sigterm_received() || self.now_ns() >= self.total_duration_ns
    }

    pub fn advance(&self, delta_ns: u64) {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }

    /// Called once after init, before the first scan tick, mirroring the
    /// fabric's `waitForReset()` rendezvous in the source system. Locally
    /// this is a no-op placeholder: the rendezvous point this core cares
    /// about is "connections established", handled by the transport layer.
    pub fn wait_for_reset(&self) {
        info!("clock reset acknowledged, step={} ns", self.step_ns);
    }

    /// Advances by `step + 1` ns, the drain pulse issued when a node is
    /// shutting down so peers observe one final tick boundary.
    pub fn advance_drain(&self) {
        self.advance(self.step_ns + 1);
    }
}
