use thiserror::Error;

/// Top-level error type used across the workspace.
///
/// The sampling engine itself never fails; these variants cover the
/// collaborators around it (counter source, config file, I/O).
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("config error: {0}")]
    Config(String),

    #[error("system error: {0}")]
    System(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = NoteError> = std::result::Result<T, E>;
