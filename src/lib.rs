use log::debug;
use once_cell::sync::OnceCell;
use std::env;
use std::time::Instant;

pub mod cli;
pub mod clock;
pub mod comm;
pub mod config;
pub mod error;
pub mod interval;
pub mod kpi;
pub mod plc;
pub mod station;
pub mod wire;

pub mod prelude {
    pub use crate::clock::SimClock;
    pub use crate::error::{LineError, LineResult};
    pub use log::{debug, error, info, trace, warn};
}

static NAME: OnceCell<String> = OnceCell::new();
static STARTUP_TIME: OnceCell<Instant> = OnceCell::new();

/// Uptime since [`init`] was called.
///
/// # Panics
///
/// Will panic if called before [`init`].
#[inline]
pub fn uptime() -> std::time::Duration {
    STARTUP_TIME.get().unwrap().elapsed()
}

/// Initializes the process-wide logger and panic hook. Every binary in
/// this crate (the PLC and each station) calls this once at startup,
/// mirroring the reference crate's `init()`: a `VERBOSE=1` env var raises
/// the level to `trace`, otherwise `info`.
///
/// # Panics
///
/// Will panic if called more than once per process.
pub fn init(name: &str) {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
        std::process::exit(1);
    }));
    NAME.set(name.to_owned()).expect("init called twice");
    STARTUP_TIME.set(Instant::now()).expect("init called twice");
    let verbose = env::var("VERBOSE").ok().as_deref() == Some("1");
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(if verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        })
        .init();
    debug!("log initialization completed for {name}");
}
