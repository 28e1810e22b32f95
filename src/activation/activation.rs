use serde::{Deserialize, Serialize};

/// Nonlinearities available to activation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    /// Rational approximation `0.5·x / (1 + |x|) + 0.5`; see `Tensor::fast_sig`.
    Sigmoid,
    Tanh,
    ReLU,
    /// Vector-valued; normalised per channel by the activation layer, so the
    /// element-wise `function()`/`derivative()` do not apply to it.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise activation of a pre-activation value `x`.
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => (0.5 * x) / (1.0 + x.abs()) + 0.5,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => if x < 0.0 { 0.0 } else { x },
            ActivationFunction::Softmax => {
                panic!("ActivationFunction::Softmax has no element-wise form; \
                        it is applied per channel by the activation layer")
            }
        }
    }

    /// Element-wise derivative with respect to the pre-activation value `x`.
    ///
    /// Sigmoid uses the output-based form `a·(1 − a)` to match the layer's
    /// backward pass. Softmax yields 0, mirroring its zero-gradient backward.
    pub fn derivative(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => {
                let a = self.function(x);
                a * (1.0 - a)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x < 0.0 { 0.0 } else { 1.0 },
            ActivationFunction::Softmax => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::Softmax => "softmax",
        }
    }
}
