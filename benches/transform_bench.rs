//! Transform and learner benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_rational::Ratio;

use regulus::{Matrix, RegularSequence, SequenceSpace};

type Q = Ratio<i64>;

fn naturals() -> RegularSequence<i64> {
    SequenceSpace::new(2)
        .unwrap()
        .sequence(
            vec![
                Matrix::from_rows(vec![vec![2, 0], vec![2, 1]]).unwrap(),
                Matrix::from_rows(vec![vec![0, 1], vec![-2, 3]]).unwrap(),
            ],
            vec![1, 0],
            vec![0, 1],
        )
        .unwrap()
}

fn benchmark_transforms(c: &mut Criterion) {
    let seq = naturals();

    c.bench_function("subsequence_3n_plus_1", |b| {
        b.iter(|| black_box(seq.subsequence(black_box(3), black_box(1)).unwrap()))
    });

    c.bench_function("partial_sums", |b| {
        b.iter(|| black_box(seq.partial_sums(false).unwrap()))
    });

    c.bench_function("evaluate_first_256_terms", |b| {
        b.iter(|| {
            let fresh = naturals();
            let total: i64 = fresh.terms().take(256).sum();
            black_box(total)
        })
    });
}

fn benchmark_guess(c: &mut Criterion) {
    let space = SequenceSpace::<Q>::new(2).unwrap();

    c.bench_function("guess_digit_sum", |b| {
        b.iter(|| {
            let guessed = space
                .guess(|n| Ratio::from_integer(n.count_ones() as i64))
                .unwrap();
            black_box(guessed)
        })
    });
}

criterion_group!(benches, benchmark_transforms, benchmark_guess);
criterion_main!(benches);
