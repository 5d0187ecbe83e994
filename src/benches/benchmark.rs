use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elman_rnn::math::one_hot_encode;
use elman_rnn::ElmanRNN;

pub fn elman_benchmark(c: &mut Criterion) {
    let time_count = 10;
    let dimension = 127;
    let nhidden = 20;

    let indices: Vec<usize> = (50..50 + time_count).collect();
    let input = one_hot_encode(&indices, dimension).unwrap();

    let mut rnn = ElmanRNN::with_seed(time_count, dimension, nhidden, 0.2, 1);
    c.bench_function("elman 10x127x20 forward", |b| {
        b.iter(|| {
            rnn.forward(black_box(&input)).unwrap();
        })
    });

    let mut rnn = ElmanRNN::with_seed(time_count, dimension, nhidden, 0.2, 1);
    c.bench_function("elman 10x127x20 forward + bptt", |b| {
        b.iter(|| {
            rnn.forward(black_box(&input)).unwrap();
            rnn.backpropagate(black_box(&input), black_box(&input)).unwrap();
        })
    });
}

criterion_group!(benches, elman_benchmark);
criterion_main!(benches);
