use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};

use ferrite_cnn::train::{accuracy, evaluate};
use ferrite_cnn::{
    ActivationFunction, Layer, LossType, Sequential, SequentialDesc, Tensor, TrainConfig, TrainStats,
    train_loop, train_network,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[path = "../demos/regression_data.rs"]
mod regression_data;

use regression_data::REGRESSION_DATA;

fn regression_desc() -> SequentialDesc {
    SequentialDesc::new("regression", LossType::Mse, 0.1)
        .input(1, 1, 1)
        .fully_connected(16, Some(ActivationFunction::Sigmoid))
        .fully_connected(1, Some(ActivationFunction::Sigmoid))
}

fn regression_samples() -> Vec<(Tensor, Tensor)> {
    REGRESSION_DATA
        .iter()
        .map(|&(x, y)| (Tensor::from(vec![x]), Tensor::from(vec![y])))
        .collect()
}

/// Two-in, two-out linear network whose output equals its input.
fn identity_network() -> Sequential {
    let desc = SequentialDesc::new("identity", LossType::Mse, 0.0)
        .input(1, 2, 1)
        .fully_connected(2, None);
    let mut net = Sequential::new(desc);
    let Layer::FullyConnected(fc) = &mut net.layers_mut()[0] else {
        panic!("expected a fully-connected layer");
    };
    fc.weights = Tensor::from(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    fc.biases.fill(0.0);
    net
}

// =============================================================================
// End-to-end regression
// =============================================================================

#[test]
fn regression_curve_is_learned() {
    let samples = regression_samples();
    let mut net = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(42));

    let initial = evaluate(&mut net, &samples);
    let config = TrainConfig::new(20_000, 1_000).with_seed(42);
    let last_window = train_loop(&mut net, &samples, None, &config);
    let fitted = evaluate(&mut net, &samples);

    assert!(last_window.is_finite());
    assert!(fitted < initial * 0.5, "mean loss {fitted} vs initial {initial}");

    let low = net.feed_forward(&Tensor::from(vec![0.1]))[0];
    let high = net.feed_forward(&Tensor::from(vec![0.9]))[0];
    assert!(high > low, "f(0.9) = {high}, f(0.1) = {low}");
}

#[test]
fn demo_run_lowers_held_out_loss() {
    let samples = regression_samples();
    let mut rng = StdRng::seed_from_u64(42);
    let mut net = Sequential::with_rng(regression_desc(), &mut rng);

    let held_out_x = Tensor::from(vec![0.5]);
    let held_out_y = Tensor::from(vec![0.589633]);
    net.feed_forward(&held_out_x);
    let before = net.loss(&held_out_y);

    for _ in 0..10_000 {
        let (input, expected) = &samples[rng.gen_range(0..samples.len())];
        net.feed_forward(input);
        net.feed_backward(expected);
    }

    net.feed_forward(&held_out_x);
    let after = net.loss(&held_out_y);
    assert!(after < before * 0.75, "loss at x = 0.5 went from {before} to {after}");
}

#[test]
fn ordered_pass_matches_manual_steps() {
    let samples = regression_samples();
    let mut a = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(7));
    let mut b = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(7));

    let mean = train_network(&mut a, &samples);

    let mut total = 0.0;
    for (input, expected) in &samples {
        b.feed_forward(input);
        total += b.feed_backward(expected);
    }
    assert!((mean - total / samples.len() as f32).abs() < 1e-6);

    let probe = Tensor::from(vec![0.3]);
    let ya = a.feed_forward(&probe)[0];
    let yb = b.feed_forward(&probe)[0];
    assert_eq!(ya, yb);
}

#[test]
fn ordered_pass_over_nothing_is_zero() {
    let mut net = Sequential::new(regression_desc());
    assert_eq!(train_network(&mut net, &[]), 0.0);
}

// =============================================================================
// train_loop reporting and termination
// =============================================================================

#[test]
fn progress_is_reported_every_interval_and_at_the_end() {
    let samples = regression_samples();
    let mut net = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(1));
    let (tx, rx) = mpsc::channel::<TrainStats>();

    let mut config = TrainConfig::new(110, 25).with_seed(3);
    config.progress_tx = Some(tx);
    let validation = &samples[..10];
    train_loop(&mut net, &samples, Some(validation), &config);
    drop(config);

    let reports: Vec<TrainStats> = rx.iter().collect();
    let iterations: Vec<usize> = reports.iter().map(|s| s.iteration).collect();
    assert_eq!(iterations, [25, 50, 75, 100, 110]);

    for stats in &reports {
        assert_eq!(stats.total_iterations, 110);
        assert!(stats.train_loss.is_finite() && stats.train_loss >= 0.0);
        assert!(stats.val_loss.is_some());
        let acc = stats.val_accuracy.unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }
}

#[test]
fn no_validation_means_no_validation_stats() {
    let samples = regression_samples();
    let mut net = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(1));
    let (tx, rx) = mpsc::channel();

    let mut config = TrainConfig::new(10, 5);
    config.progress_tx = Some(tx);
    train_loop(&mut net, &samples, None, &config);
    drop(config);

    let reports: Vec<TrainStats> = rx.iter().collect();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|s| s.val_loss.is_none() && s.val_accuracy.is_none()));
}

#[test]
fn same_seed_gives_same_training_run() {
    let samples = regression_samples();
    let config = TrainConfig::new(500, 100).with_seed(99);

    let mut a = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(5));
    let mut b = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(5));
    let la = train_loop(&mut a, &samples, None, &config);
    let lb = train_loop(&mut b, &samples, None, &config);

    assert_eq!(la, lb);
    assert_eq!(evaluate(&mut a, &samples), evaluate(&mut b, &samples));
}

#[test]
fn raised_stop_flag_prevents_any_step() {
    let samples = regression_samples();
    let mut net = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(1));
    let before = evaluate(&mut net, &samples);

    let (tx, rx) = mpsc::channel();
    let mut config = TrainConfig::new(1_000, 10);
    config.progress_tx = Some(tx);
    config.stop_flag = Some(Arc::new(AtomicBool::new(true)));

    assert_eq!(train_loop(&mut net, &samples, None, &config), 0.0);
    drop(config);
    assert_eq!(rx.iter().count(), 0);
    assert_eq!(evaluate(&mut net, &samples), before);
}

#[test]
fn dropped_receiver_stops_after_first_report() {
    let samples = regression_samples();
    let mut net = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(1));
    let probe = Tensor::from(vec![0.5]);

    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut config = TrainConfig::new(1_000_000, 10).with_seed(4);
    config.progress_tx = Some(tx);
    let loss = train_loop(&mut net, &samples, None, &config);
    assert!(loss.is_finite());

    // Exactly ten steps ran: replaying them on a twin gives the same network.
    let mut twin = Sequential::with_rng(regression_desc(), &mut StdRng::seed_from_u64(1));
    train_loop(&mut twin, &samples, None, &TrainConfig::new(10, 10).with_seed(4));
    assert_eq!(net.feed_forward(&probe)[0], twin.feed_forward(&probe)[0]);
}

#[test]
#[should_panic(expected = "training set must not be empty")]
fn empty_training_set_is_rejected() {
    let mut net = Sequential::new(regression_desc());
    train_loop(&mut net, &[], None, &TrainConfig::new(10, 1));
}

// =============================================================================
// Evaluation helpers
// =============================================================================

#[test]
fn evaluate_is_mean_loss_without_training() {
    let mut net = identity_network();
    let samples = vec![
        (Tensor::from(vec![1.0, 0.0]), Tensor::from(vec![1.0, 0.0])),
        (Tensor::from(vec![0.0, 2.0]), Tensor::from(vec![0.0, 0.0])),
    ];
    // Losses 0 and (2² / 2) = 2.
    assert_eq!(evaluate(&mut net, &samples), 1.0);
    assert_eq!(evaluate(&mut net, &samples), 1.0);
    assert_eq!(evaluate(&mut net, &[]), 0.0);
}

#[test]
fn accuracy_counts_argmax_matches() {
    let mut net = identity_network();
    let samples = vec![
        (Tensor::from(vec![0.9, 0.1]), Tensor::from(vec![1.0, 0.0])),
        (Tensor::from(vec![0.2, 0.8]), Tensor::from(vec![0.0, 1.0])),
        (Tensor::from(vec![0.6, 0.4]), Tensor::from(vec![0.0, 1.0])),
        (Tensor::from(vec![0.3, 0.7]), Tensor::from(vec![1.0, 0.0])),
    ];
    assert_eq!(accuracy(&mut net, &samples), 0.5);
    assert_eq!(accuracy(&mut net, &[]), 0.0);
}
