//! Error types for the generation core
//!
//! Generation itself never fails: degenerate geometry is skipped,
//! out-of-range parameters are clamped, and instance caps end a build
//! early. Errors only arise at the boundary (settings files, exports).

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),
}
