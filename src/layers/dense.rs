use rand::Rng;

use crate::math::{Initializer, Shape, Tensor};

/// Fully-connected layer: `output = W · input + b` on column vectors.
///
/// Shapes: input `(1, inputs, 1)`, weights `(1, outputs, inputs)`,
/// biases and output `(1, outputs, 1)`. The nonlinearity, if any, is a
/// separate activation layer placed after this one.
#[derive(Debug, Clone)]
pub struct FullyConnected {
    pub weights: Tensor,
    pub biases: Tensor,
    delta_weights: Tensor,
    delta_biases: Tensor,
}

impl FullyConnected {
    /// Wraps existing parameters; gradients start at zero.
    pub fn new(weights: Tensor, biases: Tensor) -> FullyConnected {
        assert!(
            weights.channels() == 1
                && biases.shape() == Shape::new(1, weights.rows(), 1),
            "weights {} and biases {} do not describe a fully-connected layer",
            weights.shape(),
            biases.shape()
        );
        FullyConnected {
            delta_weights: Tensor::zeros(weights.shape()),
            delta_biases: Tensor::zeros(biases.shape()),
            weights,
            biases,
        }
    }

    /// Draws weights with `init`; biases start at zero.
    pub fn with_init<R: Rng + ?Sized>(
        inputs: usize,
        outputs: usize,
        init: Initializer,
        rng: &mut R,
    ) -> FullyConnected {
        let mut weights = Tensor::new(1, outputs, inputs);
        init.fill(&mut weights, inputs, rng);
        FullyConnected::new(weights, Tensor::new(1, outputs, 1))
    }

    pub fn input_shape(&self) -> Shape {
        Shape::new(1, self.weights.cols(), 1)
    }

    pub fn output_shape(&self) -> Shape {
        Shape::new(1, self.weights.rows(), 1)
    }

    /// Gradient of the loss w.r.t. the weights from the last backward pass.
    pub fn weight_gradient(&self) -> &Tensor {
        &self.delta_weights
    }

    pub fn bias_gradient(&self) -> &Tensor {
        &self.delta_biases
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        self.weights.mat_mul_into(input, output);
        *output += &self.biases;
    }

    pub fn backward(
        &mut self,
        input: &Tensor,
        _output: &Tensor,
        input_delta: &mut Tensor,
        output_delta: &Tensor,
    ) {
        self.weights.transposed().mat_mul_into(output_delta, input_delta);
        output_delta.mat_mul_into(&input.transposed(), &mut self.delta_weights);
        self.delta_biases.copy_from(output_delta);
    }

    pub fn update(&mut self, learning_rate: f32) {
        self.weights.sub_scaled_assign(&self.delta_weights, learning_rate);
        self.biases.sub_scaled_assign(&self.delta_biases, learning_rate);
    }
}
