use crate::math::Tensor;

pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²)
    pub fn loss(predicted: &Tensor, expected: &Tensor) -> f32 {
        let n = predicted.size() as f32;
        (predicted - expected).sum_with(|d| d * d) / n
    }

    /// Per-output gradient: 2·(predicted - expected) / n
    pub fn derivative_into(predicted: &Tensor, expected: &Tensor, delta: &mut Tensor) {
        let n = predicted.size() as f32;
        predicted.zip_with_into(expected, |p, e| 2.0 * (p - e) / n, delta);
    }
}
