use std::path::PathBuf;

/// Configuration error taxonomy.
///
/// All variants are fatal at startup (the process refuses to come up with a
/// broken rule file). At runtime, [`ConfigError::MissingContent`] raised by a
/// filter only rejects that rule for the event being processed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration or auxiliary file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or auxiliary file is not valid JSON, or references
    /// an unknown filter/decorator kind.
    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A filter references list content that was never loaded.
    #[error("No list content loaded for '{path}'")]
    MissingContent { path: String },
}
