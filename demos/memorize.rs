// Trains a small network to reproduce a short ascending integer sequence.
// The sequence is one-hot encoded, used as both input and target, and the
// arg-max decoded outputs are printed as training progresses.

use elman_rnn::error::RnnError;
use elman_rnn::math::{one_hot_decode, one_hot_encode};
use elman_rnn::ElmanRNN;

pub fn main() -> Result<(), RnnError> {
    let time_count = 10;
    let dimension = 127;
    let nhidden = 20;
    let learning_rate = 0.2;
    let iterations = 1000;

    let sequence: Vec<usize> = (50..50 + time_count).collect();
    println!("sequence: {:?}", sequence);

    let input = one_hot_encode(&sequence, dimension)?;
    let mut rnn = ElmanRNN::with_seed(time_count, dimension, nhidden, learning_rate, 1);

    rnn.forward(&input)?;
    println!("before training: {:?}", one_hot_decode(rnn.outputs()));

    for iteration in 0..iterations {
        rnn.forward(&input)?;
        rnn.backpropagate(&input, &input)?;

        if iteration % 100 == 0 {
            println!(
                "iteration {:4}: {:?}",
                iteration,
                one_hot_decode(rnn.outputs())
            );
        }
    }

    rnn.forward(&input)?;
    println!("after training: {:?}", one_hot_decode(rnn.outputs()));

    Ok(())
}
