pub mod activation;
pub mod conv;
pub mod dense;
pub mod flatten;
pub mod pooling;

pub use activation::Activation;
pub use conv::Convolutional;
pub use dense::FullyConnected;
pub use flatten::Flatten;
pub use pooling::MaxPooling;

use crate::math::{Shape, Tensor};

/// One stage of a `Sequential` network.
///
/// The set of kinds is closed; each operation dispatches to the variant.
/// `forward` reads `input` and overwrites `output`. `backward` reads the
/// cached forward values and `output_delta`, overwrites `input_delta`, and
/// stores parameter gradients inside the layer, replacing those of the
/// previous step. `update` applies the stored gradients.
#[derive(Debug, Clone)]
pub enum Layer {
    FullyConnected(FullyConnected),
    Convolutional(Convolutional),
    MaxPooling(MaxPooling),
    Flatten(Flatten),
    Activation(Activation),
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::FullyConnected(_) => "FullyConnected",
            Layer::Convolutional(_) => "Convolutional",
            Layer::MaxPooling(_) => "MaxPooling",
            Layer::Flatten(_) => "Flatten",
            Layer::Activation(_) => "Activation",
        }
    }

    pub fn input_shape(&self) -> Shape {
        match self {
            Layer::FullyConnected(l) => l.input_shape(),
            Layer::Convolutional(l) => l.input_shape(),
            Layer::MaxPooling(l) => l.input_shape(),
            Layer::Flatten(l) => l.input_shape(),
            Layer::Activation(l) => l.input_shape(),
        }
    }

    pub fn output_shape(&self) -> Shape {
        match self {
            Layer::FullyConnected(l) => l.output_shape(),
            Layer::Convolutional(l) => l.output_shape(),
            Layer::MaxPooling(l) => l.output_shape(),
            Layer::Flatten(l) => l.output_shape(),
            Layer::Activation(l) => l.output_shape(),
        }
    }

    /// Number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        match self {
            Layer::FullyConnected(l) => l.weights.size() + l.biases.size(),
            Layer::Convolutional(l) => l.kernel.size(),
            _ => 0,
        }
    }

    pub fn forward(&mut self, input: &Tensor, output: &mut Tensor) {
        match self {
            Layer::FullyConnected(l) => l.forward(input, output),
            Layer::Convolutional(l) => l.forward(input, output),
            Layer::MaxPooling(l) => l.forward(input, output),
            Layer::Flatten(l) => l.forward(input, output),
            Layer::Activation(l) => l.forward(input, output),
        }
    }

    pub fn backward(
        &mut self,
        input: &Tensor,
        output: &Tensor,
        input_delta: &mut Tensor,
        output_delta: &Tensor,
    ) {
        match self {
            Layer::FullyConnected(l) => l.backward(input, output, input_delta, output_delta),
            Layer::Convolutional(l) => l.backward(input, output, input_delta, output_delta),
            Layer::MaxPooling(l) => l.backward(input, output, input_delta, output_delta),
            Layer::Flatten(l) => l.backward(input_delta, output_delta),
            Layer::Activation(l) => l.backward(input, output, input_delta, output_delta),
        }
    }

    pub fn update(&mut self, learning_rate: f32) {
        match self {
            Layer::FullyConnected(l) => l.update(learning_rate),
            Layer::Convolutional(l) => l.update(learning_rate),
            Layer::MaxPooling(_) | Layer::Flatten(_) | Layer::Activation(_) => {}
        }
    }
}
