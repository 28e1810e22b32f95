use crate::math::Tensor;

/// Categorical cross-entropy between a predicted distribution and a one-hot
/// (or soft) target.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f32 = 1e-7;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * log(predicted[i] + eps))
    pub fn loss(predicted: &Tensor, expected: &Tensor) -> f32 {
        let terms = predicted.zip_with(expected, |p, e| -e * (p + EPS).ln());
        terms.sum()
    }

    /// Gradient with respect to the predicted values themselves:
    ///   ∂L/∂p_i = -expected[i] / (predicted[i] + eps)
    ///
    /// The output activation's own backward pass turns this into the
    /// gradient w.r.t. its input.
    pub fn derivative_into(predicted: &Tensor, expected: &Tensor, delta: &mut Tensor) {
        predicted.zip_with_into(expected, |p, e| -e / (p + EPS), delta);
    }
}
