use serde::{Serialize, Deserialize};

/// Progress report emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the loop
/// sends one `TrainStats` every `report_every` iterations and once more when
/// it finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    /// Number of training steps completed so far.
    pub iteration: usize,
    /// Total steps requested for this run.
    pub total_iterations: usize,
    /// Mean training loss over the steps since the previous report.
    pub train_loss: f32,
    /// Mean loss over the validation set, if one was provided.
    pub val_loss: Option<f32>,
    /// Fraction of validation samples whose argmax matches the target's.
    pub val_accuracy: Option<f32>,
    /// Wall-clock time since the previous report, in milliseconds.
    pub elapsed_ms: u64,
}
