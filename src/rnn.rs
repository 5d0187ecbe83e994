use crate::error::RnnError;

/// A model that consumes a fixed-length window of input vectors at a time.
pub trait SequenceModel {
    /// Runs the window through the model, replacing any previously stored
    /// activations.
    fn forward(&mut self, input: &[Vec<f64>]) -> Result<(), RnnError>;

    /// Updates the model parameters from the stored activations for `input`
    /// against `target`.
    fn backpropagate(&mut self, input: &[Vec<f64>], target: &[Vec<f64>]) -> Result<(), RnnError>;

    /// The output vectors computed by the last `forward` call.
    fn outputs(&self) -> &[Vec<f64>];
}
