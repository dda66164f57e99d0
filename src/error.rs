use std::io;
use thiserror::Error;

/// Errors that cross a library seam. Transport init failures and config
/// parse failures are the two kinds a binary's `main` is expected to
/// report and exit on; everything else (malformed frames, missing config)
/// is handled in place per the error taxonomy in SPEC_FULL.md §7.
#[derive(Debug, Error)]
pub enum LineError {
    #[error("failed to bind listen port {port}: {source}")]
    ListenFailed { port: u16, source: io::Error },
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailed { addr: String, source: io::Error },
    #[error("failed to parse line_config.json: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type LineResult<T> = Result<T, LineError>;
