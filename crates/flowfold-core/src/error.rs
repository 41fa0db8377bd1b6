use thiserror::Error;

/// Errors that abort a pipeline run. None of these are recoverable within a
/// single pass: a bad header, row, or filter option fails the whole run
/// rather than silently skipping data.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The export is missing one or more of the required columns.
    #[error("input is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A `Generate Time` cell did not match the `dd/MM/yyyy HH:mm` layout.
    #[error("line {line}: cannot parse Generate Time {value:?}: {source}")]
    Timestamp {
        line: u64,
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },

    /// A port cell was not an integer in 0..=65535.
    #[error("line {line}: {column} {value:?} is not a valid port number")]
    Port {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// The time-window length was zero or negative.
    #[error("time window length must be at least one minute, got {minutes}")]
    Window { minutes: i64 },

    /// The underlying CSV reader failed (I/O error, ragged row, bad UTF-8).
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
