use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::Tensor;
use crate::network::sequential::Sequential;
use crate::train::train_config::TrainConfig;
use crate::train::train_stats::TrainStats;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Runs `config.iterations` online training steps, each on a sample picked
/// uniformly at random from `train`, and returns the mean training loss of
/// the last reporting window.
///
/// # Arguments
/// - `network` — modified in place
/// - `train`   — `(input, expected)` pairs matching the network's shapes
/// - `val`     — optional held-out pairs evaluated at every report
/// - `config`  — step count, report interval, seed, progress channel, stop flag
///
/// # Early termination
/// The loop stops early if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Panics
/// Panics if `train` is empty or `report_every == 0`.
pub fn train_loop(
    network: &mut Sequential,
    train: &[(Tensor, Tensor)],
    val: Option<&[(Tensor, Tensor)]>,
    config: &TrainConfig,
) -> f32 {
    assert!(!train.is_empty(), "training set must not be empty");
    assert!(config.report_every > 0, "report_every must be at least 1");

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut window_loss = 0.0;
    let mut window_steps = 0;
    let mut last_loss = 0.0;
    let mut t_start = Instant::now();

    for iteration in 1..=config.iterations {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break;
            }
        }

        // ── One online step ────────────────────────────────────────────────
        let (input, expected) = &train[rng.gen_range(0..train.len())];
        network.feed_forward(input);
        window_loss += network.feed_backward(expected);
        window_steps += 1;

        if iteration % config.report_every != 0 && iteration != config.iterations {
            continue;
        }

        // ── Report ────────────────────────────────────────────────────────
        last_loss = window_loss / window_steps as f32;
        let (val_loss, val_accuracy) = match val {
            Some(v) if !v.is_empty() => (Some(evaluate(network, v)), Some(accuracy(network, v))),
            _ => (None, None),
        };

        let stats = TrainStats {
            iteration,
            total_iterations: config.iterations,
            train_loss: last_loss,
            val_loss,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        window_loss = 0.0;
        window_steps = 0;
        t_start = Instant::now();

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    last_loss
}

/// Mean loss over `samples` using forward passes only.
pub fn evaluate(network: &mut Sequential, samples: &[(Tensor, Tensor)]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f32 = samples
        .iter()
        .map(|(input, expected)| {
            network.feed_forward(input);
            network.loss(expected)
        })
        .sum();
    total / samples.len() as f32
}

/// Fraction of samples whose output argmax matches the target's argmax.
pub fn accuracy(network: &mut Sequential, samples: &[(Tensor, Tensor)]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let correct = samples
        .iter()
        .filter(|(input, expected)| network.feed_forward(input).argmax() == expected.argmax())
        .count();
    correct as f32 / samples.len() as f32
}
