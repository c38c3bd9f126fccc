use thiserror::Error;

/// Errors returned by the clustering engine and the palette builder.
///
/// Both variants are raised before any clustering work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("cluster count must be between 1 and {n}, got {k}")]
    InvalidClusterCount { k: usize, n: usize },

    #[error("no colour vectors to cluster")]
    EmptyInput,
}
