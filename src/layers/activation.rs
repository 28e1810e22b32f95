use crate::activation::activation::ActivationFunction;
use crate::math::{Shape, Tensor};

/// Element-wise nonlinearity (per-channel for Softmax). Shape preserving.
#[derive(Debug, Clone)]
pub struct Activation {
    shape: Shape,
    pub function: ActivationFunction,
}

impl Activation {
    pub fn new(shape: Shape, function: ActivationFunction) -> Activation {
        Activation { shape, function }
    }

    pub fn input_shape(&self) -> Shape {
        self.shape
    }

    pub fn output_shape(&self) -> Shape {
        self.shape
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        match self.function {
            ActivationFunction::Sigmoid => input.fast_sig_into(output),
            ActivationFunction::Tanh => input.map_into(f32::tanh, output),
            ActivationFunction::ReLU => input.fast_relu_into(output),
            ActivationFunction::Softmax => softmax_into(input, output),
        }
    }

    pub fn backward(
        &mut self,
        input: &Tensor,
        output: &Tensor,
        input_delta: &mut Tensor,
        output_delta: &Tensor,
    ) {
        match self.function {
            ActivationFunction::Sigmoid => {
                output.fast_sig_deriv_into(input_delta);
                input_delta.hadamard_assign(output_delta);
            }
            ActivationFunction::Tanh => {
                let tanh = self.function;
                input.zip_with_into(output_delta, |x, d| tanh.derivative(x) * d, input_delta);
            }
            ActivationFunction::ReLU => {
                input.fast_relu_deriv_into(input_delta);
                input_delta.hadamard_assign(output_delta);
            }
            // The softmax Jacobian is not propagated; upstream layers see a
            // zero gradient.
            ActivationFunction::Softmax => input_delta.fill(0.0),
        }
    }
}

/// Numerically stable softmax over each channel's slice.
fn softmax_into(input: &Tensor, output: &mut Tensor) {
    assert_eq!(input.shape(), output.shape(), "softmax: shape mismatch");
    for c in 0..input.channels() {
        let src = input.channel(c);
        let dst = output.channel_mut(c);
        let max = src.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut denom = 0.0;
        for (y, &x) in dst.iter_mut().zip(src) {
            *y = (x - max).exp();
            denom += *y;
        }
        for y in dst.iter_mut() {
            *y /= denom;
        }
    }
}
