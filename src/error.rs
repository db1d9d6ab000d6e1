use std::io;
use std::path::PathBuf;

/// Errors raised while building or writing an archive.
#[derive(Debug, thiserror::Error)]
pub enum TarError {
    /// A source file could not be stat'd or opened. Nothing was written for
    /// the entry.
    #[error("cannot read source {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output archive could not be created.
    #[error("cannot create output {}: {source}", path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A value does not fit its fixed-width header field (strict mode only).
    #[error("{field} field overflow: {len} bytes do not fit in {capacity}")]
    FieldOverflow {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    /// The header was modified after its checksum was computed, or never
    /// finalized at all.
    #[error("header must be finalized before it is serialized")]
    NotFinalized,

    /// The body source ran dry before the declared size was reached.
    #[error("body source ended after {read} of {declared} declared bytes")]
    ShortBody { declared: u64, read: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, TarError>;
