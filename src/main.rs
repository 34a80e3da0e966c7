use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigInt;
use num_rational::BigRational;
use tracing_subscriber::EnvFilter;

use regulus::{GuessConfig, Matrix, SequenceSpace};

#[derive(Parser, Debug)]
#[command(name = "regulus", about = "Exact k-regular sequence engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preview built-in example sequences and their transforms.
    Demo,
    /// Guess a linear representation from integer samples.
    Guess {
        /// File with whitespace-separated integer samples for n = 0, 1, ….
        samples: PathBuf,
        /// Digit base.
        #[arg(long, default_value_t = 2)]
        base: u32,
        /// Depth bound for admitted basis functions.
        #[arg(long, default_value_t = 10)]
        d_max: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo => run_demo()?,
        Commands::Guess {
            samples,
            base,
            d_max,
        } => run_guess(samples, base, d_max)?,
    }

    Ok(())
}

fn run_demo() -> Result<()> {
    let space = SequenceSpace::<i64>::new(2)?;

    let digit_sum = space.sequence(
        vec![
            Matrix::from_rows(vec![vec![1, 0], vec![0, 1]])?,
            Matrix::from_rows(vec![vec![0, -1], vec![1, 2]])?,
        ],
        vec![0, 1],
        vec![1, 0],
    )?;
    println!("binary digit sum:     {digit_sum}");

    let naturals = space.sequence(
        vec![
            Matrix::from_rows(vec![vec![2, 0], vec![2, 1]])?,
            Matrix::from_rows(vec![vec![0, 1], vec![-2, 3]])?,
        ],
        vec![1, 0],
        vec![0, 1],
    )?;
    println!("natural numbers:      {naturals}");
    println!("backward differences: {}", naturals.backward_differences()?);
    println!("partial sums:         {}", naturals.partial_sums(false)?);
    println!("even subsequence:     {}", naturals.subsequence(2, 0)?);

    Ok(())
}

fn run_guess(path: PathBuf, base: u32, d_max: u32) -> Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read samples from {}", path.display()))?;
    let samples = text
        .split_whitespace()
        .map(|token| {
            token
                .parse::<BigInt>()
                .with_context(|| format!("invalid integer sample '{token}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    anyhow::ensure!(!samples.is_empty(), "no samples in {}", path.display());

    let space = SequenceSpace::<BigRational>::new(base)?;
    let config = GuessConfig {
        n_max: samples.len() as u64 - 1,
        d_max,
    };
    let guessed = space
        .guess_with(
            |n| BigRational::from_integer(samples[n as usize].clone()),
            &config,
            None,
        )
        .context("no representation found; try more samples or a larger depth bound")?;

    println!("{guessed}");
    println!("dimension: {}", guessed.dim());
    for (digit, matrix) in guessed.mu().iter().enumerate() {
        println!("mu[{digit}] = {matrix:?}");
    }
    println!("left  = {}", show_vector(guessed.left()));
    println!("right = {}", show_vector(guessed.right()));

    Ok(())
}

fn show_vector(v: &[BigRational]) -> String {
    let entries: Vec<String> = v.iter().map(ToString::to_string).collect();
    format!("({})", entries.join(", "))
}
