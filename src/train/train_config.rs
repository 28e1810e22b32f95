use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};

use crate::train::train_stats::TrainStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `iterations`   — number of single-example training steps
/// - `report_every` — steps between progress reports (and validation runs)
/// - `seed`         — seeds the sample picker; `None` draws from entropy
/// - `progress_tx`  — optional channel sender; receives one `TrainStats` per
///                    report. If the receiver is dropped the loop stops
///                    after the current report.
/// - `stop_flag`    — optional atomic flag; when set to `true` from another
///                    thread the loop stops before the next step.
pub struct TrainConfig {
    pub iterations: usize,
    pub report_every: usize,
    pub seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<TrainStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(iterations: usize, report_every: usize) -> Self {
        TrainConfig {
            iterations,
            report_every,
            seed: None,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
