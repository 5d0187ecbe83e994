/*
 * Single-hidden-layer Elman network unrolled over a fixed time window.
 *
 * The window length, input/output dimension and hidden width are fixed at
 * construction. forward() fills a hidden-state sequence and a softmax output
 * sequence; backpropagate() sweeps the window in reverse, accumulates
 * gradients for the three weight matrices and applies them in place.
 *
 * Gradients are hand-derived for this exact shape; there is no autodiff,
 * no gating and no batching.
 */

use crate::error::RnnError;
use crate::math::{dot, outer_product_acc, pairwise_apply, softmax, tanh_derivative};
use crate::rand_source::{SeededSource, UniformSource};
use crate::rnn::SequenceModel;
use serde::{Deserialize, Serialize};
use std::fmt;

pub struct ElmanRNN {
    time_count: usize,
    dimension: usize,
    nhidden: usize,
    learning_rate: f64,

    // u: input to hidden, v: hidden to output, w: hidden to hidden
    u: Vec<Vec<f64>>,
    v: Vec<Vec<f64>>,
    w: Vec<Vec<f64>>,

    hidden: Vec<Vec<f64>>,
    outputs: Vec<Vec<f64>>,

    delta_u: Vec<Vec<f64>>,
    delta_v: Vec<Vec<f64>>,
    delta_w: Vec<Vec<f64>>,
    delta_hidden: Vec<f64>,
    delta_hidden_next: Vec<f64>,
    delta_output: Vec<f64>,

    canonical_recurrence: bool,
    last_input: Option<Vec<Vec<f64>>>,
    source: Box<dyn UniformSource>,
}

// The random source is a trait object without Debug, so the derive is not
// available; everything else is printed.
impl fmt::Debug for ElmanRNN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElmanRNN")
            .field("time_count", &self.time_count)
            .field("dimension", &self.dimension)
            .field("nhidden", &self.nhidden)
            .field("learning_rate", &self.learning_rate)
            .field("u", &self.u)
            .field("v", &self.v)
            .field("w", &self.w)
            .field("canonical_recurrence", &self.canonical_recurrence)
            .finish()
    }
}

/// Snapshot of everything that defines a network's behavior, minus the
/// random source. Serializable, and convertible back with
/// [`ElmanRNN::from_parameters`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ElmanParameters {
    pub time_count: usize,
    pub dimension: usize,
    pub nhidden: usize,
    pub learning_rate: f64,
    pub u: Vec<Vec<f64>>,
    pub v: Vec<Vec<f64>>,
    pub w: Vec<Vec<f64>>,
}

impl ElmanRNN {
    /// New network with freshly randomized weights from an entropy-seeded
    /// source. The output dimension equals the input dimension.
    pub fn new(time_count: usize, dimension: usize, nhidden: usize, learning_rate: f64) -> Self {
        Self::with_source(
            time_count,
            dimension,
            nhidden,
            learning_rate,
            Box::new(SeededSource::from_entropy()),
        )
    }

    /// New network whose weight draws are reproducible from the seed.
    pub fn with_seed(
        time_count: usize,
        dimension: usize,
        nhidden: usize,
        learning_rate: f64,
        seed: u64,
    ) -> Self {
        Self::with_source(
            time_count,
            dimension,
            nhidden,
            learning_rate,
            Box::new(SeededSource::from_seed(seed)),
        )
    }

    pub fn with_source(
        time_count: usize,
        dimension: usize,
        nhidden: usize,
        learning_rate: f64,
        source: Box<dyn UniformSource>,
    ) -> Self {
        assert!(time_count >= 1, "window must cover at least one timestep");
        assert!(dimension >= 1, "input/output dimension must be at least 1");
        assert!(nhidden >= 1, "hidden layer must have at least one unit");

        let mut rnn = ElmanRNN {
            time_count,
            dimension,
            nhidden,
            learning_rate,
            u: vec![vec![0.0; dimension]; nhidden],
            v: vec![vec![0.0; nhidden]; dimension],
            w: vec![vec![0.0; nhidden]; nhidden],
            hidden: vec![vec![0.0; nhidden]; time_count],
            outputs: vec![vec![0.0; dimension]; time_count],
            delta_u: vec![vec![0.0; dimension]; nhidden],
            delta_v: vec![vec![0.0; nhidden]; dimension],
            delta_w: vec![vec![0.0; nhidden]; nhidden],
            delta_hidden: vec![0.0; nhidden],
            delta_hidden_next: vec![0.0; nhidden],
            delta_output: vec![0.0; dimension],
            canonical_recurrence: false,
            last_input: None,
            source,
        };
        rnn.reset();
        rnn
    }

    /// Redraws every weight uniformly from [-r, r] with r = 1/sqrt(nhidden).
    /// The same scale is used for all three matrices, keyed off the hidden
    /// width only. Stored activations become invalid.
    pub fn reset(&mut self) {
        let range = 1.0 / (self.nhidden as f64).sqrt();
        Self::randomize_matrix(&mut self.u, self.source.as_mut(), range);
        Self::randomize_matrix(&mut self.v, self.source.as_mut(), range);
        Self::randomize_matrix(&mut self.w, self.source.as_mut(), range);
        self.last_input = None;
    }

    fn randomize_matrix(matrix: &mut [Vec<f64>], source: &mut dyn UniformSource, range: f64) {
        for row in matrix.iter_mut() {
            for value in row.iter_mut() {
                *value = source.next_uniform(-range, range);
            }
        }
    }

    /// Runs the input window through the network, overwriting the stored
    /// hidden states and outputs. Every output vector is a probability
    /// distribution over the `dimension` classes.
    pub fn forward(&mut self, input: &[Vec<f64>]) -> Result<(), RnnError> {
        self.check_window(input, "input window")?;

        for t in 0..self.time_count {
            for layer in 0..self.nhidden {
                let mut sum = dot(&self.u[layer], &input[t]);
                if t > 0 {
                    sum += dot(&self.w[layer], &self.hidden[t - 1]);
                }
                self.hidden[t][layer] = sum.tanh();
            }

            for d in 0..self.dimension {
                self.outputs[t][d] = dot(&self.v[d], &self.hidden[t]);
            }
            softmax(&mut self.outputs[t]);
        }

        self.last_input = Some(input.to_vec());
        Ok(())
    }

    /// Accumulates gradients for U, V and W over the whole window in reverse
    /// time order, then applies them in place. Requires a preceding
    /// [`forward`](Self::forward) on the same input; the weight update
    /// invalidates the stored activations, so the next backpropagate needs a
    /// fresh forward.
    ///
    /// The output error at each step is `sigma * output - target` where
    /// sigma is the target's total mass (1 for one-hot targets). By default
    /// the recurrent error term at step t reads the next hidden state's
    /// activations through W. Canonical BPTT instead carries the next step's
    /// hidden error; see [`set_canonical_recurrence`](Self::set_canonical_recurrence).
    pub fn backpropagate(
        &mut self,
        input: &[Vec<f64>],
        target: &[Vec<f64>],
    ) -> Result<(), RnnError> {
        self.check_window(input, "input window")?;
        self.check_window(target, "target window")?;
        match self.last_input {
            Some(ref last) if last.as_slice() == input => {}
            _ => return Err(RnnError::StaleState),
        }

        Self::zero_matrix(&mut self.delta_u);
        Self::zero_matrix(&mut self.delta_v);
        Self::zero_matrix(&mut self.delta_w);
        for value in self.delta_hidden_next.iter_mut() {
            *value = 0.0;
        }

        for t in (0..self.time_count).rev() {
            let sigma: f64 = target[t].iter().sum();
            self.delta_output.copy_from_slice(&self.outputs[t]);
            pairwise_apply(&mut self.delta_output, &target[t], |output, tgt| {
                sigma * output - tgt
            })?;

            outer_product_acc(&self.delta_output, &self.hidden[t], &mut self.delta_v);

            for layer in 0..self.nhidden {
                let mut sum: f64 = 0.0;
                for d in 0..self.dimension {
                    sum += self.v[d][layer] * self.delta_output[d];
                }
                if t != self.time_count - 1 {
                    if self.canonical_recurrence {
                        for inner in 0..self.nhidden {
                            sum += self.w[inner][layer] * self.delta_hidden_next[inner];
                        }
                    } else {
                        for inner in 0..self.nhidden {
                            sum += self.w[layer][inner] * self.hidden[t + 1][inner];
                        }
                    }
                }
                self.delta_hidden[layer] = sum * tanh_derivative(self.hidden[t][layer]);
            }

            if t != 0 {
                outer_product_acc(&self.delta_hidden, &self.hidden[t - 1], &mut self.delta_w);
            }
            outer_product_acc(&self.delta_hidden, &input[t], &mut self.delta_u);

            self.delta_hidden_next.copy_from_slice(&self.delta_hidden);
        }

        self.apply_gradients()?;
        self.last_input = None;
        Ok(())
    }

    // weight += learning_rate * delta, the literal update rule. Note the
    // addition: combined with the sigma-scaled output error this steps in
    // the direction of the accumulated delta, not against it.
    fn apply_gradients(&mut self) -> Result<(), RnnError> {
        let rate = self.learning_rate;
        Self::scale_add(&mut self.u, &self.delta_u, rate)?;
        Self::scale_add(&mut self.v, &self.delta_v, rate)?;
        Self::scale_add(&mut self.w, &self.delta_w, rate)?;
        Ok(())
    }

    fn scale_add(
        weights: &mut [Vec<f64>],
        deltas: &[Vec<f64>],
        rate: f64,
    ) -> Result<(), RnnError> {
        for (row, delta_row) in weights.iter_mut().zip(deltas.iter()) {
            pairwise_apply(row, delta_row, |value, delta| value + rate * delta)?;
        }
        Ok(())
    }

    fn zero_matrix(matrix: &mut [Vec<f64>]) {
        for row in matrix.iter_mut() {
            for value in row.iter_mut() {
                *value = 0.0;
            }
        }
    }

    fn check_window(&self, window: &[Vec<f64>], what: &'static str) -> Result<(), RnnError> {
        if window.len() != self.time_count {
            return Err(RnnError::DimensionMismatch {
                what,
                expected: self.time_count,
                got: window.len(),
            });
        }
        for step in window.iter() {
            if step.len() != self.dimension {
                return Err(RnnError::DimensionMismatch {
                    what,
                    expected: self.dimension,
                    got: step.len(),
                });
            }
        }
        Ok(())
    }

    /// Output vectors from the last forward pass, one per timestep.
    pub fn outputs(&self) -> &[Vec<f64>] {
        &self.outputs
    }

    /// Hidden-state vectors from the last forward pass, one per timestep.
    pub fn hidden_states(&self) -> &[Vec<f64>] {
        &self.hidden
    }

    pub fn time_count(&self) -> usize {
        self.time_count
    }

    pub fn num_inputs(&self) -> usize {
        self.dimension
    }

    pub fn num_outputs(&self) -> usize {
        self.dimension
    }

    pub fn num_hidden(&self) -> usize {
        self.nhidden
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn canonical_recurrence(&self) -> bool {
        self.canonical_recurrence
    }

    /// Switches the recurrent error term to canonical BPTT, which propagates
    /// the next timestep's hidden error through W instead of the next hidden
    /// state's activations. Off by default.
    pub fn set_canonical_recurrence(&mut self, canonical: bool) {
        self.canonical_recurrence = canonical;
    }

    pub fn to_parameters(&self) -> ElmanParameters {
        ElmanParameters {
            time_count: self.time_count,
            dimension: self.dimension,
            nhidden: self.nhidden,
            learning_rate: self.learning_rate,
            u: self.u.clone(),
            v: self.v.clone(),
            w: self.w.clone(),
        }
    }

    /// Rebuilds a network from a snapshot. The source is only consulted by
    /// later [`reset`](Self::reset) calls.
    pub fn from_parameters(
        params: ElmanParameters,
        source: Box<dyn UniformSource>,
    ) -> Result<Self, RnnError> {
        let mut rnn = Self::with_source(
            params.time_count,
            params.dimension,
            params.nhidden,
            params.learning_rate,
            source,
        );
        Self::check_matrix(&params.u, rnn.nhidden, rnn.dimension, "U matrix")?;
        Self::check_matrix(&params.v, rnn.dimension, rnn.nhidden, "V matrix")?;
        Self::check_matrix(&params.w, rnn.nhidden, rnn.nhidden, "W matrix")?;
        rnn.u = params.u;
        rnn.v = params.v;
        rnn.w = params.w;
        rnn.last_input = None;
        Ok(rnn)
    }

    fn check_matrix(
        matrix: &[Vec<f64>],
        rows: usize,
        cols: usize,
        what: &'static str,
    ) -> Result<(), RnnError> {
        if matrix.len() != rows {
            return Err(RnnError::DimensionMismatch {
                what,
                expected: rows,
                got: matrix.len(),
            });
        }
        for row in matrix.iter() {
            if row.len() != cols {
                return Err(RnnError::DimensionMismatch {
                    what,
                    expected: cols,
                    got: row.len(),
                });
            }
        }
        Ok(())
    }
}

impl SequenceModel for ElmanRNN {
    fn forward(&mut self, input: &[Vec<f64>]) -> Result<(), RnnError> {
        ElmanRNN::forward(self, input)
    }

    fn backpropagate(&mut self, input: &[Vec<f64>], target: &[Vec<f64>]) -> Result<(), RnnError> {
        ElmanRNN::backpropagate(self, input, target)
    }

    fn outputs(&self) -> &[Vec<f64>] {
        ElmanRNN::outputs(self)
    }
}
