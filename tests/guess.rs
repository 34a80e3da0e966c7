//! End-to-end learner scenarios
//!
//! The learner is fed black-box closures (closed forms or terms of
//! hand-built representations) and its output is checked against the
//! source sequence on the whole sample window.

use num_rational::Ratio;

use regulus::{GuessConfig, Matrix, RegularSequence, SequenceError, SequenceSpace};

type Q = Ratio<i64>;

fn q(n: i64) -> Q {
    Ratio::from_integer(n)
}

fn qm(rows: Vec<Vec<i64>>) -> Matrix<Q> {
    Matrix::from_rows(
        rows.into_iter()
            .map(|row| row.into_iter().map(q).collect())
            .collect(),
    )
    .unwrap()
}

fn digit_sum_rep(space: &SequenceSpace<Q>) -> RegularSequence<Q> {
    space
        .sequence(
            vec![
                qm(vec![vec![1, 0], vec![0, 1]]),
                qm(vec![vec![0, -1], vec![1, 2]]),
            ],
            vec![q(0), q(1)],
            vec![q(1), q(0)],
        )
        .unwrap()
}

#[test]
fn test_guess_recovers_hand_built_representation() {
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let rep = digit_sum_rep(&space);
    let guessed = space.guess(|n| rep.term(n)).unwrap();
    assert_eq!(guessed.dim(), 2);
    for n in 0..=100u64 {
        assert_eq!(guessed.term(n), rep.term(n), "n={n}");
    }
}

#[test]
fn test_guess_digit_sum_closed_form() {
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let guessed = space.guess(|n| q(n.count_ones() as i64)).unwrap();
    assert_eq!(
        guessed.terms().take(10).collect::<Vec<_>>(),
        [0, 1, 1, 2, 1, 2, 2, 3, 1, 2].map(q)
    );
}

#[test]
fn test_guess_seeded_by_ones_agrees_with_unseeded() {
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let ones = space.one_hadamard();
    let unseeded = space.guess(|n| q(n.count_ones() as i64)).unwrap();
    let seeded = space
        .guess_with(
            |n| q(n.count_ones() as i64),
            &GuessConfig::default(),
            Some(&ones),
        )
        .unwrap();
    assert_eq!(seeded.dim(), 2);
    for n in 0..=100u64 {
        assert_eq!(seeded.term(n), unseeded.term(n));
    }
}

#[test]
fn test_guess_partial_sums_of_weighted_ones() {
    // The sequence 2^(binary digit sum) and its inclusive partial sums.
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let weighted = space
        .sequence(
            vec![qm(vec![vec![1]]), qm(vec![vec![2]])],
            vec![q(1)],
            vec![q(1)],
        )
        .unwrap();
    let sums: Vec<Q> = weighted
        .terms()
        .take(110)
        .scan(q(0), |acc, t| {
            *acc = *acc + t;
            Some(*acc)
        })
        .collect();

    let guessed = space.guess(|n| sums[n as usize]).unwrap();
    assert_eq!(guessed.mu()[0], qm(vec![vec![0, 1], vec![-3, 4]]));
    assert_eq!(guessed.mu()[1], qm(vec![vec![3, 0], vec![3, 2]]));
    assert_eq!(guessed.left(), &[q(1), q(0)]);
    assert_eq!(guessed.right(), &[q(1), q(1)]);

    let direct = weighted.partial_sums(true).unwrap();
    for n in 0..=100u64 {
        assert_eq!(guessed.term(n), direct.term(n));
    }
}

#[test]
fn test_guess_base_three_with_rational_coefficients() {
    // Inclusive partial sums of the product-of-digit-weights sequence
    // over base 3; the learned matrices have genuine rational entries.
    let space = SequenceSpace::<Q>::new(3).unwrap();
    let weighted = space
        .sequence(
            vec![qm(vec![vec![1]]), qm(vec![vec![3]]), qm(vec![vec![2]])],
            vec![q(1)],
            vec![q(1)],
        )
        .unwrap();
    let sums: Vec<Q> = weighted
        .terms()
        .take(110)
        .scan(q(0), |acc, t| {
            *acc = *acc + t;
            Some(*acc)
        })
        .collect();

    let guessed = space.guess(|n| sums[n as usize]).unwrap();
    assert_eq!(guessed.mu()[0], qm(vec![vec![0, 1], vec![-6, 7]]));
    assert_eq!(
        guessed.mu()[1],
        Matrix::from_rows(vec![
            vec![Ratio::new(18, 5), Ratio::new(2, 5)],
            vec![Ratio::new(18, 5), Ratio::new(27, 5)],
        ])
        .unwrap()
    );
    assert_eq!(guessed.mu()[2], qm(vec![vec![6, 0], vec![24, 2]]));
    assert_eq!(guessed.left(), &[q(1), q(0)]);
    assert_eq!(guessed.right(), &[q(1), q(1)]);

    let direct = weighted.partial_sums(true).unwrap();
    for n in 0..=100u64 {
        assert_eq!(guessed.term(n), direct.term(n));
    }
}

#[test]
fn test_guess_zero_function_exhausts_search() {
    // Every observation matrix over the zero function is singular.
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let result = space.guess(|_| q(0));
    assert_eq!(
        result.unwrap_err(),
        SequenceError::SearchExhausted { n_max: 100 }
    );
}

#[test]
fn test_guessed_representation_minimizes_cleanly() {
    let space = SequenceSpace::<Q>::new(2).unwrap();
    let guessed = space.guess(|n| q(n as i64)).unwrap();
    let minimized = guessed.minimized().unwrap();
    assert!(minimized.dim() <= guessed.dim());
    for n in 0..=100u64 {
        assert_eq!(minimized.term(n), q(n as i64));
    }
}
