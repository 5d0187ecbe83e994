use thiserror::Error;

/// Contract violations surfaced at the API boundary. The arithmetic itself
/// cannot fail; once shapes are validated a call runs to completion.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RnnError {
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("one-hot index {index} out of range for vector of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("stored hidden states and outputs do not correspond to this input; call forward first")]
    StaleState,
}
